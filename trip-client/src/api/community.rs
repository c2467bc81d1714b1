//! Community board endpoints: posts, likes and comments.

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::debug;

use super::client::{ApiClient, read_json};
use super::error::ApiError;
use super::types::{
    Article, ArticleDraft, ArticleEdit, ArticlePage, ArticleSummary, Attachment, Comment,
    CommentRequest, LikeStatus,
};

/// A post's multipart body, kept in a form that can be rebuilt per attempt.
struct ArticleForm<'a> {
    article_json: String,
    files: Vec<(&'a Attachment, HeaderMap)>,
}

impl<'a> ArticleForm<'a> {
    fn new<T: Serialize>(article: &T, files: &'a [Attachment]) -> Result<Self, ApiError> {
        let article_json = serde_json::to_string(article).map_err(|e| ApiError::Json {
            message: e.to_string(),
            body: None,
        })?;

        let files = files
            .iter()
            .map(|file| {
                let mut headers = HeaderMap::new();
                if let Some(mime) = &file.mime {
                    let value = HeaderValue::from_str(mime).map_err(|_| {
                        ApiError::InvalidHeader(format!(
                            "attachment {} has an invalid MIME type",
                            file.file_name
                        ))
                    })?;
                    headers.insert(CONTENT_TYPE, value);
                }
                Ok((file, headers))
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        Ok(Self {
            article_json,
            files,
        })
    }

    fn build(&self) -> Form {
        let mut json_headers = HeaderMap::new();
        json_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut form = Form::new().part(
            "article",
            Part::text(self.article_json.clone()).headers(json_headers),
        );
        for (file, headers) in &self.files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .headers(headers.clone());
            form = form.part("files", part);
        }
        form
    }
}

impl ApiClient {
    pub async fn list_articles(&self) -> Result<Vec<ArticleSummary>, ApiError> {
        self.get_json("/api/articles").await
    }

    pub async fn article(&self, id: i64) -> Result<Article, ApiError> {
        self.get_json(&format!("/api/articles/{id}")).await
    }

    /// Publish a post with optional attachments.
    pub async fn create_article(
        &self,
        draft: &ArticleDraft,
        files: &[Attachment],
    ) -> Result<Article, ApiError> {
        let form = ArticleForm::new(draft, files)?;
        let url = self.url("/api/articles");
        debug!(%url, files = files.len(), "creating article");
        let response = self
            .send(|http| http.post(&url).multipart(form.build()))
            .await?;
        read_json(response).await
    }

    /// Edit a post. New attachments are added to those listed in
    /// `edit.file_urls`; attachments not listed are removed.
    pub async fn update_article(
        &self,
        id: i64,
        edit: &ArticleEdit,
        files: &[Attachment],
    ) -> Result<Article, ApiError> {
        let form = ArticleForm::new(edit, files)?;
        let url = self.url(&format!("/api/articles/{id}"));
        debug!(%url, files = files.len(), "updating article");
        let response = self
            .send(|http| http.put(&url).multipart(form.build()))
            .await?;
        read_json(response).await
    }

    pub async fn delete_article(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/articles/{id}")).await
    }

    /// Count a view. Returns the post with the updated view count.
    pub async fn record_view(&self, id: i64) -> Result<Article, ApiError> {
        self.post_empty(&format!("/api/articles/{id}/view")).await
    }

    pub async fn toggle_like(&self, id: i64) -> Result<LikeStatus, ApiError> {
        self.post_empty(&format!("/api/articles/{id}/like")).await
    }

    pub async fn comments(&self, article_id: i64) -> Result<Vec<Comment>, ApiError> {
        self.get_json(&format!("/api/articles/{article_id}/comments"))
            .await
    }

    pub async fn add_comment(&self, article_id: i64, content: &str) -> Result<Comment, ApiError> {
        self.send_json(
            Method::POST,
            &format!("/api/articles/{article_id}/comments"),
            &CommentRequest { content },
        )
        .await
    }

    pub async fn edit_comment(
        &self,
        article_id: i64,
        comment_id: i64,
        content: &str,
    ) -> Result<Comment, ApiError> {
        self.send_json(
            Method::PUT,
            &format!("/api/articles/{article_id}/comments/{comment_id}"),
            &CommentRequest { content },
        )
        .await
    }

    pub async fn delete_comment(&self, article_id: i64, comment_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/articles/{article_id}/comments/{comment_id}"))
            .await
    }

    /// Fetch a post and its comments concurrently.
    pub async fn load_article_page(&self, id: i64) -> Result<ArticlePage, ApiError> {
        let (article, comments) = futures::try_join!(self.article(id), self.comments(id))?;
        Ok(ArticlePage { article, comments })
    }
}
