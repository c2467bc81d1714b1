//! Backend request and response bodies.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::session::User;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub jwt_token: String,
    pub user: Option<User>,
}

/// New account details.
#[derive(Debug, Clone, Serialize)]
pub struct Signup {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NicknameRequest<'a> {
    pub nickname: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RenameRequest<'a> {
    pub name: &'a str,
}

/// Geocoded stops of a saved course, in visit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub coordinates: Vec<RoutePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub name: String,
    #[serde(default)]
    pub time: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Community board list entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub like_count: i64,
}

/// A full community post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub like_count: i64,
    /// Whether the current user has liked the post.
    #[serde(default)]
    pub likecheck: bool,
    #[serde(default)]
    pub file_urls: Vec<String>,
}

/// Title and body of a post being created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
}

/// Edited post. `file_urls` lists the existing attachments to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleEdit {
    pub title: String,
    pub content: String,
    pub file_urls: Vec<String>,
}

/// A file uploaded with a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: None,
            bytes,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub likecheck: bool,
    pub like_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub article_id: i64,
    pub content: String,
    #[serde(default)]
    pub nickname: Option<String>,
    /// Author's user id.
    #[serde(default, rename = "userid")]
    pub user_id: i64,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// Whether the current user wrote it.
    #[serde(default)]
    pub minecheck: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CommentRequest<'a> {
    pub content: &'a str,
}

/// A post together with its comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePage {
    pub article: Article,
    pub comments: Vec<Comment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_from_backend_json() {
        let json = r#"{
            "id": 5,
            "title": "Busan in two days",
            "content": "...",
            "nickname": "gull",
            "userId": 9,
            "createdAt": "2024-05-01T10:20:30.123456",
            "viewCount": 12,
            "likeCount": 3,
            "likecheck": true,
            "fileUrls": ["/uploads/a.png"]
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.user_id, Some(9));
        assert!(article.likecheck);
        assert_eq!(article.file_urls, ["/uploads/a.png"]);
        assert_eq!(
            article.created_at.unwrap().format("%H:%M:%S").to_string(),
            "10:20:30"
        );
    }

    #[test]
    fn minimal_article() {
        let article: Article = serde_json::from_str(r#"{"id":1,"title":"t"}"#).unwrap();
        assert_eq!(article.view_count, 0);
        assert!(!article.likecheck);
        assert!(article.file_urls.is_empty());
    }

    #[test]
    fn comment_field_names() {
        let json = r#"{"id":2,"articleId":5,"content":"nice","nickname":"n","userid":4,"createdAt":null,"minecheck":true}"#;
        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.user_id, 4);
        assert!(comment.minecheck);
    }

    #[test]
    fn edit_serializes_camel_case() {
        let edit = ArticleEdit {
            title: "t".into(),
            content: "c".into(),
            file_urls: vec!["/u/1.png".into()],
        };
        let json = serde_json::to_value(&edit).unwrap();
        assert_eq!(json["fileUrls"][0], "/u/1.png");
    }

    #[test]
    fn signup_omits_missing_nickname() {
        let signup = Signup {
            email: "a@b.c".into(),
            password: "pw".into(),
            nickname: None,
        };
        let json = serde_json::to_string(&signup).unwrap();
        assert_eq!(json, r#"{"email":"a@b.c","password":"pw"}"#);
    }
}
