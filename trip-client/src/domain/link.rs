//! Travel content links.
//!
//! Users submit links to travel videos and blog posts for extraction. Only
//! a handful of platforms are supported by the extraction service, so links
//! are validated before any request is made.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Error returned for links the extraction service cannot handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported content link: {link}")]
pub struct InvalidLink {
    link: String,
}

/// Platform a content link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    YouTube,
    NaverBlog,
    NaverInfluencer,
    NaverTv,
    Tistory,
}

impl ContentSource {
    /// Human-readable platform label.
    pub fn label(&self) -> &'static str {
        match self {
            ContentSource::YouTube => "YouTube",
            ContentSource::NaverBlog => "Naver Blog",
            ContentSource::NaverInfluencer => "Naver Influencer",
            ContentSource::NaverTv => "Naver TV",
            ContentSource::Tistory => "Tistory",
        }
    }
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

static LINK_PATTERNS: LazyLock<Vec<(ContentSource, Regex)>> = LazyLock::new(|| {
    vec![
        (
            ContentSource::YouTube,
            Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.be)/.+$").unwrap(),
        ),
        (
            ContentSource::NaverBlog,
            Regex::new(r"^(https?://)?(m\.)?blog\.naver\.com/.+$").unwrap(),
        ),
        (
            ContentSource::NaverInfluencer,
            Regex::new(r"^(https?://)?in\.naver\.com/.+$").unwrap(),
        ),
        (
            ContentSource::NaverTv,
            Regex::new(r"^(https?://)?tv\.naver\.com/.+$").unwrap(),
        ),
        (
            ContentSource::Tistory,
            Regex::new(r"^(https?://)?[a-zA-Z0-9-]+\.tistory\.com/.+$").unwrap(),
        ),
    ]
});

/// A validated link to supported travel content.
///
/// # Examples
///
/// ```
/// use trip_client::domain::{ContentLink, ContentSource};
///
/// let link = ContentLink::parse("https://youtu.be/abc123").unwrap();
/// assert_eq!(link.source(), ContentSource::YouTube);
///
/// assert!(ContentLink::parse("https://example.com/post/1").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentLink {
    url: String,
    source: ContentSource,
}

impl ContentLink {
    /// Validate a link. Surrounding whitespace is ignored.
    pub fn parse(s: &str) -> Result<Self, InvalidLink> {
        let url = s.trim();
        classify(url)
            .map(|source| Self {
                url: url.to_string(),
                source,
            })
            .ok_or_else(|| InvalidLink {
                link: url.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn source(&self) -> ContentSource {
        self.source
    }

    /// The link with a scheme, defaulting to `https://` when it was typed
    /// without one.
    pub fn absolute_url(&self) -> String {
        if self.url.starts_with("http://") || self.url.starts_with("https://") {
            self.url.clone()
        } else {
            format!("https://{}", self.url)
        }
    }
}

impl fmt::Display for ContentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Identify the platform of a link, if it is a supported one.
pub fn classify(url: &str) -> Option<ContentSource> {
    LINK_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(url))
        .map(|(source, _)| *source)
}
