//! Client for the travel backend's REST API.
//!
//! One [`ApiClient`] covers accounts, saved courses and the community
//! board. Endpoint groups live in their own files as `impl ApiClient`
//! blocks.

mod auth;
mod client;
mod community;
mod courses;
mod error;
mod types;

pub use client::{ApiClient, ApiConfig, DEFAULT_API_URL};
pub use error::ApiError;
pub use types::{
    Article, ArticleDraft, ArticleEdit, ArticlePage, ArticleSummary, Attachment, Comment,
    LikeStatus, Route, RoutePoint, Signup,
};

pub(crate) use client::{authorize, read_json};

#[cfg(test)]
mod client_tests;
