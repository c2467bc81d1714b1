//! Access tokens.
//!
//! The backend issues HS256 JWTs. The client cannot verify the signature
//! (it has no key) and does not need to: it only peeks at the claims to
//! know who is signed in and whether the token is about to expire.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error returned when a token's claims cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed access token: {reason}")]
pub struct TokenError {
    reason: &'static str,
}

/// Claims the backend puts in its access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Claims {
    /// User email.
    #[serde(default)]
    pub sub: Option<String>,

    /// Numeric user id.
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub iss: Option<String>,

    /// Issued-at, seconds since the epoch.
    #[serde(default)]
    pub iat: Option<i64>,

    /// Expiry, seconds since the epoch.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp?, 0)
    }
}

/// A bearer access token.
///
/// `Debug` output is redacted so tokens do not end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the payload segment without verifying the signature.
    pub fn claims(&self) -> Result<Claims, TokenError> {
        let mut parts = self.0.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError {
                reason: "expected three dot-separated segments",
            });
        };

        // Some encoders pad; the URL-safe engine here does not accept padding.
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|_| TokenError {
                reason: "payload is not base64url",
            })?;

        serde_json::from_slice(&bytes).map_err(|_| TokenError {
            reason: "payload is not a JSON claims object",
        })
    }

    /// True when the token's expiry is at or before `now`.
    ///
    /// Tokens without a readable expiry are treated as live; the server
    /// has the final say and answers 401 if they are not.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.claims()
            .ok()
            .and_then(|c| c.expires_at())
            .is_some_and(|exp| exp <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(<{} bytes>)", self.0.len())
    }
}
