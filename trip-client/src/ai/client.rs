//! AI service HTTP client.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::api::{ApiError, authorize, read_json};
use crate::domain::ContentLink;
use crate::session::SessionReader;

use super::types::{CoursePreferences, ExtractedSchedule, GeneratedCourse};

/// Default AI service base URL.
pub const DEFAULT_AI_URL: &str = "http://localhost:8000";

/// Extraction and generation call a language model; allow them time.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the AI client.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl AiConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_AI_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    url: &'a str,
}

/// Client for content extraction and course generation.
///
/// Reads the session for a bearer token but never refreshes it; the AI
/// service does not issue tokens.
#[derive(Debug, Clone)]
pub struct AiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionReader,
}

impl AiClient {
    pub fn new(config: AiConfig, session: SessionReader) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    async fn post<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "POST");
        let token = self.session.access_token();
        let response = authorize(self.http.post(&url), token.as_ref())?
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }

    /// Extract places from a travel video or blog post.
    pub async fn extract_content(&self, link: &ContentLink) -> Result<ExtractedSchedule, ApiError> {
        info!(link = link.as_str(), source = %link.source(), "extracting content");
        let url = link.absolute_url();
        let schedule: ExtractedSchedule = self
            .post("/api/content/extract", &ExtractRequest { url: &url })
            .await?;
        debug!(spots = schedule.spots.len(), region = %schedule.region, "extracted schedule");
        Ok(schedule)
    }

    /// Ask the generator for a course matching `preferences`.
    pub async fn generate_course(
        &self,
        preferences: &CoursePreferences,
    ) -> Result<GeneratedCourse, ApiError> {
        info!(region = preferences.region(), budget = %preferences.budget(), "generating course");
        self.post("/generate_course", preferences).await
    }
}
