//! Saved-course endpoints.

use reqwest::Method;

use crate::domain::Course;

use super::client::ApiClient;
use super::error::ApiError;
use super::types::{RenameRequest, Route};

impl ApiClient {
    /// All courses saved by the signed-in user.
    pub async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.get_json("/api/courses/user").await
    }

    /// One course by id.
    ///
    /// The backend only lists courses per user, so this filters that list.
    pub async fn course(&self, id: &str) -> Result<Course, ApiError> {
        self.list_courses()
            .await?
            .into_iter()
            .find(|c| c.id.as_deref() == Some(id))
            .ok_or(ApiError::NotFound)
    }

    /// Save a new course. Returns it with its assigned id.
    pub async fn save_course(&self, course: &Course) -> Result<Course, ApiError> {
        self.send_json(Method::POST, "/api/courses", course).await
    }

    /// Replace a saved course wholesale, e.g. after reordering its spots.
    pub async fn replace_course(&self, id: &str, course: &Course) -> Result<Course, ApiError> {
        self.send_json(Method::PUT, &format!("/api/courses/{id}"), course)
            .await
    }

    pub async fn rename_course(&self, id: &str, name: &str) -> Result<(), ApiError> {
        self.send_json_unit(
            Method::PATCH,
            &format!("/api/courses/{id}"),
            &RenameRequest { name },
        )
        .await
    }

    pub async fn delete_course(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/api/courses/{id}")).await
    }

    /// Geocoded stops for a saved course.
    pub async fn route(&self, id: &str) -> Result<Route, ApiError> {
        self.get_json(&format!("/api/routes/{id}")).await
    }
}
