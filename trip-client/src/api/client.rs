//! Backend HTTP client.
//!
//! Attaches the session's access token to every request. When the backend
//! answers 401, the client trades the refresh cookie for a new access token
//! and retries the request once.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::session::{AccessToken, SessionReader, SessionWriter};

use super::error::{ApiError, error_message};
use super::types::RefreshResponse;

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const REFRESH_PATH: &str = "/api/token";

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, without a trailing slash
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Backend API client.
///
/// Cheap to clone; clones share the connection pool, cookie jar, session
/// writer and refresh lock.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    origin: Url,
    jar: Arc<Jar>,
    session: Arc<SessionWriter>,
    /// Held while a refresh is in flight so concurrent 401s refresh once.
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a client that owns `session`.
    ///
    /// Cookies recorded in the session (the refresh token) are loaded into
    /// the client's cookie jar.
    pub fn new(config: ApiConfig, session: SessionWriter) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let origin = Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl {
            url: base_url.clone(),
            message: e.to_string(),
        })?;

        let jar = Arc::new(Jar::default());
        if let Some(cookies) = session.current().cookies {
            for cookie in cookies.split("; ").filter(|c| !c.is_empty()) {
                jar.add_cookie_str(cookie, &origin);
            }
        }

        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            origin,
            jar,
            session: Arc::new(session),
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    /// A read-only handle on the session this client maintains.
    pub fn session(&self) -> SessionReader {
        self.session.subscribe()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn session_writer(&self) -> &SessionWriter {
        &self.session
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request built by `build`, refreshing the token and retrying
    /// once on 401.
    ///
    /// `build` runs once per attempt, so bodies that cannot be cloned (such
    /// as multipart forms) are rebuilt for the retry.
    pub(crate) async fn send<F>(&self, build: F) -> Result<Response, ApiError>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let token = self.session.access_token();
        let response = authorize(build(&self.http), token.as_ref())?
            .send()
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(url = %response.url(), "unauthorized, refreshing access token");
        let fresh = self.refresh(token.as_ref()).await?;

        let response = authorize(build(&self.http), Some(&fresh))?
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(url = %response.url(), "still unauthorized after refresh");
            return Err(ApiError::Unauthorized);
        }
        Ok(response)
    }

    /// Obtain a new access token, replacing `stale`.
    ///
    /// On failure the session's token is cleared.
    async fn refresh(&self, stale: Option<&AccessToken>) -> Result<AccessToken, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        // Another request refreshed, or failed to, while this one waited.
        match self.session.access_token() {
            Some(current) if Some(&current) != stale => {
                debug!("access token already refreshed");
                return Ok(current);
            }
            None if stale.is_some() => {
                debug!("session expired while waiting to refresh");
                return Err(ApiError::SessionExpired);
            }
            _ => {}
        }

        match self.request_new_token().await {
            Ok(token) => {
                debug!("access token refreshed");
                self.session.set_access_token(token.clone());
                self.sync_cookies();
                Ok(token)
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                self.session.clear_token();
                Err(ApiError::SessionExpired)
            }
        }
    }

    async fn request_new_token(&self) -> Result<AccessToken, ApiError> {
        let response = self
            .http
            .post(self.url(REFRESH_PATH))
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let body: RefreshResponse = read_json(response).await?;
        Ok(AccessToken::new(body.access_token))
    }

    /// Copy the jar's cookies for the backend origin into the session.
    pub(crate) fn sync_cookies(&self) {
        let cookies = self
            .jar
            .cookies(&self.origin)
            .and_then(|v| v.to_str().ok().map(str::to_string));
        self.session.set_cookies(cookies);
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.send(|http| http.get(&url)).await?;
        read_json(response).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%method, %url, "sending JSON");
        let response = self
            .send(|http| http.request(method.clone(), &url).json(body))
            .await?;
        read_json(response).await
    }

    /// Like [`Self::send_json`] but ignores the response body.
    pub(crate) async fn send_json_unit<B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!(%method, %url, "sending JSON");
        let response = self
            .send(|http| http.request(method.clone(), &url).json(body))
            .await?;
        expect_success(response).await.map(drop)
    }

    /// POST with no body.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self.send(|http| http.post(&url)).await?;
        read_json(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!(%url, "DELETE");
        let response = self.send(|http| http.delete(&url)).await?;
        expect_success(response).await.map(drop)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Attach `Authorization: Bearer <token>` when a token is present.
pub(crate) fn authorize(
    builder: RequestBuilder,
    token: Option<&AccessToken>,
) -> Result<RequestBuilder, ApiError> {
    let Some(token) = token else {
        return Ok(builder);
    };
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
        .map_err(|_| ApiError::InvalidHeader("access token is not a valid header value".into()))?;
    value.set_sensitive(true);
    Ok(builder.header(AUTHORIZATION, value))
}

/// Map error statuses to [`ApiError`].
pub(crate) async fn expect_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    let mut message = error_message(&body);
    if message.is_empty() {
        message = status.canonical_reason().unwrap_or_default().to_string();
    }
    Err(ApiError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Check the status and decode a JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = expect_success(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::json(e, &body))
}
