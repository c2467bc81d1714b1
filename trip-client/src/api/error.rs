//! API client error types.

/// Errors from the backend and AI HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Server answered with an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Request was rejected even with a freshly refreshed token
    #[error("unauthorized")]
    Unauthorized,

    /// Access token expired and could not be refreshed
    #[error("session expired: sign in again")]
    SessionExpired,

    /// Resource does not exist
    #[error("not found")]
    NotFound,

    /// A token or cookie could not be put in a header
    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    /// Configured base URL could not be parsed
    #[error("invalid base URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl ApiError {
    /// Build a JSON error, keeping a prefix of the offending body.
    pub(crate) fn json(err: serde_json::Error, body: &str) -> Self {
        ApiError::Json {
            message: err.to_string(),
            body: Some(body.chars().take(500).collect()),
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// The AI service reports `{"detail": ...}`, the backend `{"message": ...}`
/// or `{"error": ...}`; anything else is returned as trimmed text.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(body) {
        for key in ["detail", "message", "error"] {
            if let Some(serde_json::Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    body.trim().to_string()
}
