//! Account endpoints.

use reqwest::Method;
use tracing::info;

use crate::session::{AccessToken, User};

use super::client::ApiClient;
use super::error::ApiError;
use super::types::{Credentials, LoginResponse, MessageResponse, NicknameRequest, Signup};

impl ApiClient {
    /// Sign in with email and password.
    ///
    /// Stores the access token and user in the session and keeps the
    /// refresh cookie the backend sets.
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<User>, ApiError> {
        let body = Credentials { email, password };
        let response: LoginResponse = self.send_json(Method::POST, "/api/login", &body).await?;

        info!(email, "logged in");
        self.session_writer()
            .sign_in(AccessToken::new(response.jwt_token), response.user.clone());
        self.sync_cookies();
        Ok(response.user)
    }

    /// Create an account. Returns the backend's confirmation message.
    pub async fn signup(&self, signup: &Signup) -> Result<String, ApiError> {
        let response: MessageResponse = self.send_json(Method::POST, "/api/signup", signup).await?;
        Ok(response.message)
    }

    /// Fetch the signed-in user and record it in the session.
    pub async fn me(&self) -> Result<User, ApiError> {
        let user: User = self.get_json("/api/user/me").await?;
        self.session_writer().set_user(user.clone());
        Ok(user)
    }

    pub async fn set_nickname(&self, nickname: &str) -> Result<(), ApiError> {
        self.send_json_unit(
            Method::POST,
            "/api/user/nickname",
            &NicknameRequest { nickname },
        )
        .await?;

        if let Some(mut user) = self.session_writer().current().user {
            user.nickname = Some(nickname.to_string());
            self.session_writer().set_user(user);
        }
        Ok(())
    }

    /// Forget the session locally. The backend keeps no server-side login
    /// state beyond the refresh token, which is dropped with the cookies.
    pub fn logout(&self) {
        info!("logged out");
        self.session_writer().sign_out();
    }
}
