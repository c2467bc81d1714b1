//! Shared session state.
//!
//! One [`SessionWriter`] (owned by the API client's authentication flow)
//! publishes [`Session`] snapshots over a watch channel; any number of
//! [`SessionReader`]s observe them.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::store::SessionStore;
use super::token::AccessToken;

/// The signed-in user, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

impl User {
    /// Nickname when set, otherwise the email address.
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.email)
    }
}

/// A snapshot of authentication state.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<AccessToken>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    /// `Cookie` header value for the API origin. Carries the refresh token
    /// between process runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
}

impl Session {
    pub fn is_signed_in(&self) -> bool {
        self.access_token.is_some()
    }

    /// Best available name for the signed-in user.
    ///
    /// Falls back to the token's subject claim when the user profile has
    /// not been fetched yet.
    pub fn display_name(&self) -> Option<String> {
        if let Some(user) = &self.user {
            return Some(user.display_name().to_string());
        }
        self.access_token
            .as_ref()
            .and_then(|t| t.claims().ok())
            .and_then(|c| c.sub)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token)
            .field("user", &self.user)
            .field("cookies", &self.cookies.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Create a session channel seeded with `initial`.
pub fn channel(initial: Session) -> (SessionWriter, SessionReader) {
    let (tx, rx) = watch::channel(initial);
    (
        SessionWriter { tx, store: None },
        SessionReader { rx },
    )
}

/// The single writer of session state.
///
/// Every update is published to readers and, when a store is attached,
/// written to disk. Persistence failures are logged and otherwise ignored:
/// the in-memory session stays authoritative.
#[derive(Debug)]
pub struct SessionWriter {
    tx: watch::Sender<Session>,
    store: Option<SessionStore>,
}

impl SessionWriter {
    /// Persist every update to `store`.
    pub fn with_store(mut self, store: SessionStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn subscribe(&self) -> SessionReader {
        SessionReader {
            rx: self.tx.subscribe(),
        }
    }

    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn access_token(&self) -> Option<AccessToken> {
        self.tx.borrow().access_token.clone()
    }

    /// Record a successful login.
    pub fn sign_in(&self, token: AccessToken, user: Option<User>) {
        debug!(user = ?user.as_ref().map(|u| u.id), "signed in");
        self.update(|s| {
            s.access_token = Some(token);
            s.user = user;
        });
    }

    /// Replace the access token after a refresh.
    pub fn set_access_token(&self, token: AccessToken) {
        self.update(|s| s.access_token = Some(token));
    }

    pub fn set_user(&self, user: User) {
        self.update(|s| s.user = Some(user));
    }

    pub fn set_cookies(&self, cookies: Option<String>) {
        self.update(|s| s.cookies = cookies);
    }

    /// Drop the access token, keeping the rest of the session.
    pub fn clear_token(&self) {
        debug!("clearing access token");
        self.update(|s| s.access_token = None);
    }

    /// Forget everything.
    pub fn sign_out(&self) {
        debug!("signed out");
        self.update(|s| *s = Session::default());
    }

    fn update(&self, modify: impl FnOnce(&mut Session)) {
        self.tx.send_modify(modify);
        self.persist();
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let snapshot = self.current();
        if let Err(e) = store.save(&snapshot) {
            warn!(path = %store.path().display(), error = %e, "failed to persist session");
        }
    }
}

/// Read-only view of the session.
#[derive(Debug, Clone)]
pub struct SessionReader {
    rx: watch::Receiver<Session>,
}

impl SessionReader {
    pub fn current(&self) -> Session {
        self.rx.borrow().clone()
    }

    pub fn access_token(&self) -> Option<AccessToken> {
        self.rx.borrow().access_token.clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.rx.borrow().is_signed_in()
    }

    /// Wait for the next update. Returns `false` once the writer is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
