//! Client configuration.
//!
//! Every setting has a default; `from_env` overrides them from `TRIP_*`
//! environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::ai::{AiConfig, DEFAULT_AI_URL};
use crate::api::{ApiConfig, DEFAULT_API_URL};
use crate::cache::RouteCacheConfig;
use crate::session::SessionStore;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_PATH: &str = ".trip-session.json";

/// An environment variable held a value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {key} value {value:?}: {reason}")]
pub struct ConfigError {
    key: &'static str,
    value: String,
    reason: String,
}

/// Everything needed to build the clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub ai_base_url: String,
    /// Backend request timeout in seconds. The AI client keeps its own,
    /// longer default unless this is raised above it.
    pub timeout_secs: u64,
    pub session_path: PathBuf,
    pub route_cache: RouteCacheConfig,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            ai_base_url: DEFAULT_AI_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            session_path: PathBuf::from(DEFAULT_SESSION_PATH),
            route_cache: RouteCacheConfig::default(),
        }
    }

    /// Read `TRIP_API_URL`, `TRIP_AI_URL`, `TRIP_TIMEOUT_SECS` and
    /// `TRIP_SESSION_PATH`, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::new();
        Ok(Self {
            api_base_url: load(&lookup, "TRIP_API_URL", defaults.api_base_url)?,
            ai_base_url: load(&lookup, "TRIP_AI_URL", defaults.ai_base_url)?,
            timeout_secs: load(&lookup, "TRIP_TIMEOUT_SECS", defaults.timeout_secs)?,
            session_path: load(&lookup, "TRIP_SESSION_PATH", defaults.session_path)?,
            route_cache: defaults.route_cache,
        })
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_ai_base_url(mut self, url: impl Into<String>) -> Self {
        self.ai_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = path.into();
        self
    }

    pub fn with_route_cache(mut self, route_cache: RouteCacheConfig) -> Self {
        self.route_cache = route_cache;
        self
    }

    pub fn api(&self) -> ApiConfig {
        ApiConfig::new()
            .with_base_url(&self.api_base_url)
            .with_timeout(self.timeout_secs)
    }

    pub fn ai(&self) -> AiConfig {
        let ai = AiConfig::new().with_base_url(&self.ai_base_url);
        let timeout = ai.timeout_secs.max(self.timeout_secs);
        ai.with_timeout(timeout)
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(&self.session_path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        debug!("{key} not set, using default: {default:?}");
        return Ok(default);
    };
    raw.trim().parse().map_err(|e: T::Err| {
        warn!("invalid {key} value: {e}");
        ConfigError {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }
    })
}
