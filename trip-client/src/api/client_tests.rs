//! Client behaviour against an in-process backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use super::*;
use crate::domain::{Course, Day, Itinerary, Spot};
use crate::session::{AccessToken, Session, SessionReader, channel};

#[derive(Default)]
struct Counters {
    refreshes: AtomicUsize,
    hits: AtomicUsize,
}

type Shared = State<Arc<Counters>>;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base: &str, token: Option<&str>) -> (ApiClient, SessionReader) {
    let session = Session {
        access_token: token.map(AccessToken::new),
        ..Session::default()
    };
    let (writer, reader) = channel(session);
    let client = ApiClient::new(ApiConfig::new().with_base_url(base), writer).unwrap();
    (client, reader)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn has_refresh_cookie(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("refresh_token=r1"))
}

/// Course list that only accepts the token "fresh".
async fn courses_fresh_only(State(c): Shared, headers: HeaderMap) -> Response {
    c.hits.fetch_add(1, Ordering::SeqCst);
    if bearer(&headers) == Some("fresh") {
        Json(json!([{ "id": "c1", "name": "Jeju", "days": [] }])).into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn always_unauthorized(State(c): Shared) -> StatusCode {
    c.hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::UNAUTHORIZED
}

async fn refresh_ok(State(c): Shared) -> Json<Value> {
    c.refreshes.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "accessToken": "fresh" }))
}

async fn refresh_with_cookie(State(c): Shared, headers: HeaderMap) -> Response {
    c.refreshes.fetch_add(1, Ordering::SeqCst);
    if has_refresh_cookie(&headers) {
        Json(json!({ "accessToken": "fresh" })).into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn refresh_rejected(State(c): Shared) -> StatusCode {
    c.refreshes.fetch_add(1, Ordering::SeqCst);
    StatusCode::UNAUTHORIZED
}

fn app(courses: Router<Arc<Counters>>, counters: &Arc<Counters>) -> Router {
    courses.with_state(counters.clone())
}

#[tokio::test]
async fn attaches_bearer_token() {
    let router = Router::new().route(
        "/api/user/me",
        get(|headers: HeaderMap| async move {
            assert_eq!(bearer(&headers), Some("t1"));
            Json(json!({ "id": 1, "email": "a@b.c", "nickname": "kim" }))
        }),
    );
    let base = serve(router).await;
    let (client, reader) = client(&base, Some("t1"));

    let user = client.me().await.unwrap();
    assert_eq!(user.nickname.as_deref(), Some("kim"));
    assert_eq!(reader.current().user, Some(user));
}

#[tokio::test]
async fn no_header_without_token() {
    let router = Router::new().route(
        "/api/articles",
        get(|headers: HeaderMap| async move {
            assert!(headers.get(header::AUTHORIZATION).is_none());
            Json(json!([]))
        }),
    );
    let base = serve(router).await;
    let (client, _) = client(&base, None);
    assert!(client.list_articles().await.unwrap().is_empty());
}

#[tokio::test]
async fn refreshes_once_and_retries() {
    let counters = Arc::new(Counters::default());
    let router = Router::new()
        .route("/api/courses/user", get(courses_fresh_only))
        .route("/api/token", post(refresh_ok));
    let base = serve(app(router, &counters)).await;
    let (client, reader) = client(&base, Some("stale"));

    let courses = client.list_courses().await.unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id.as_deref(), Some("c1"));
    assert_eq!(counters.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(counters.hits.load(Ordering::SeqCst), 2);
    assert_eq!(reader.access_token(), Some(AccessToken::new("fresh")));
}

#[tokio::test]
async fn refresh_failure_clears_token() {
    let counters = Arc::new(Counters::default());
    let router = Router::new()
        .route("/api/courses/user", get(courses_fresh_only))
        .route("/api/token", post(refresh_rejected));
    let base = serve(app(router, &counters)).await;
    let (client, reader) = client(&base, Some("stale"));

    let err = client.list_courses().await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired), "got {err:?}");
    assert_eq!(reader.access_token(), None);
    assert_eq!(counters.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn second_unauthorized_is_reported() {
    let counters = Arc::new(Counters::default());
    let router = Router::new()
        .route("/api/courses/user", get(always_unauthorized))
        .route("/api/token", post(refresh_ok));
    let base = serve(app(router, &counters)).await;
    let (client, _) = client(&base, Some("stale"));

    let err = client.list_courses().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized), "got {err:?}");
    assert_eq!(counters.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(counters.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_unauthorized_requests_refresh_once() {
    let counters = Arc::new(Counters::default());
    let router = Router::new()
        .route("/api/courses/user", get(courses_fresh_only))
        .route("/api/token", post(refresh_ok));
    let base = serve(app(router, &counters)).await;
    let (client, _) = client(&base, Some("stale"));

    let (a, b, c) = tokio::join!(
        client.list_courses(),
        client.list_courses(),
        client.list_courses()
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(counters.refreshes.load(Ordering::SeqCst), 1);
}

/// Rejects the refresh once `expected` requests have been turned away, so
/// every caller is already queued behind the first refresh.
async fn refresh_rejected_after(counters: Arc<Counters>, expected: usize) -> StatusCode {
    counters.refreshes.fetch_add(1, Ordering::SeqCst);
    while counters.hits.load(Ordering::SeqCst) < expected {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    StatusCode::UNAUTHORIZED
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_a_failed_refresh() {
    let counters = Arc::new(Counters::default());
    let router = Router::new()
        .route("/api/courses/user", get(courses_fresh_only))
        .route(
            "/api/token",
            post(|State(c): Shared| refresh_rejected_after(c, 3)),
        );
    let base = serve(app(router, &counters)).await;
    let (client, reader) = client(&base, Some("stale"));

    let (a, b, c) = tokio::join!(
        client.list_courses(),
        client.list_courses(),
        client.list_courses()
    );
    for result in [a, b, c] {
        assert!(matches!(result, Err(ApiError::SessionExpired)), "got {result:?}");
    }
    assert_eq!(counters.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(reader.access_token(), None);
}

#[tokio::test]
async fn login_keeps_refresh_cookie() {
    let counters = Arc::new(Counters::default());
    let router = Router::new()
        .route(
            "/api/login",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["email"], "a@b.c");
                assert_eq!(body["password"], "pw");
                (
                    [(header::SET_COOKIE, "refresh_token=r1; Path=/; HttpOnly")],
                    Json(json!({
                        "jwtToken": "t1",
                        "user": { "id": 1, "email": "a@b.c", "nickname": "kim" },
                        "message": "ok"
                    })),
                )
            }),
        )
        .route("/api/courses/user", get(courses_fresh_only))
        .route("/api/token", post(refresh_with_cookie));
    let base = serve(app(router, &counters)).await;
    let (client, reader) = client(&base, None);

    let user = client.login("a@b.c", "pw").await.unwrap().unwrap();
    assert_eq!(user.id, 1);

    let session = reader.current();
    assert_eq!(session.access_token, Some(AccessToken::new("t1")));
    assert!(session.cookies.unwrap().contains("refresh_token=r1"));

    // "t1" is refused; the cookie buys a fresh token.
    client.list_courses().await.unwrap();
    assert_eq!(counters.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(reader.access_token(), Some(AccessToken::new("fresh")));
}

#[tokio::test]
async fn restored_cookie_is_sent_on_refresh() {
    let counters = Arc::new(Counters::default());
    let router = Router::new()
        .route("/api/courses/user", get(courses_fresh_only))
        .route("/api/token", post(refresh_with_cookie));
    let base = serve(app(router, &counters)).await;

    let session = Session {
        access_token: Some(AccessToken::new("stale")),
        user: None,
        cookies: Some("refresh_token=r1".into()),
    };
    let (writer, reader) = channel(session);
    let client = ApiClient::new(ApiConfig::new().with_base_url(&base), writer).unwrap();

    client.list_courses().await.unwrap();
    assert_eq!(reader.access_token(), Some(AccessToken::new("fresh")));
}

#[tokio::test]
async fn logout_forgets_session() {
    let base = serve(Router::new()).await;
    let (client, reader) = client(&base, Some("t1"));
    client.logout();
    assert_eq!(reader.current(), Session::default());
}

#[tokio::test]
async fn error_statuses() {
    let router = Router::new()
        .route("/api/articles/1", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/api/articles",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "status": 500, "message": "boom" })),
                )
            }),
        )
        .route(
            "/api/articles/2",
            get(|| async { (StatusCode::OK, "not json") }),
        )
        .route(
            "/api/signup",
            post(|| async { StatusCode::CONFLICT }),
        );
    let base = serve(router).await;
    let (client, _) = client(&base, None);

    assert!(matches!(client.article(1).await, Err(ApiError::NotFound)));

    match client.list_articles().await {
        Err(ApiError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Api error, got {other:?}"),
    }

    match client.article(2).await {
        Err(ApiError::Json { body, .. }) => assert_eq!(body.as_deref(), Some("not json")),
        other => panic!("expected Json error, got {other:?}"),
    }

    let signup = Signup {
        email: "a@b.c".into(),
        password: "pw".into(),
        nickname: None,
    };
    match client.signup(&signup).await {
        Err(ApiError::Api { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "Conflict");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn course_endpoints() {
    let router = Router::new()
        .route(
            "/api/courses",
            post(|Json(mut body): Json<Value>| async move {
                assert!(body.get("id").is_none());
                body["id"] = json!("new-id");
                Json(body)
            }),
        )
        .route(
            "/api/courses/:id",
            axum::routing::put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                assert_eq!(id, "c1");
                assert_eq!(body["days"][0]["spots"][0]["time"], "08:00");
                Json(body)
            })
            .patch(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                assert_eq!(id, "c1");
                assert_eq!(body, json!({ "name": "Renamed" }));
                StatusCode::OK
            })
            .delete(|Path(id): Path<String>| async move {
                assert_eq!(id, "c1");
                StatusCode::NO_CONTENT
            }),
        )
        .route(
            "/api/routes/:id",
            get(|Path(id): Path<String>| async move {
                assert_eq!(id, "c1");
                Json(json!({ "coordinates": [
                    { "name": "Seongsan", "time": "08:00", "latitude": 33.458, "longitude": 126.942 }
                ] }))
            }),
        );
    let base = serve(router).await;
    let (client, _) = client(&base, Some("t1"));

    let date = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let day = Day::with_spots(date, vec![Spot::new("Seongsan", "Jeju").with_time("08:00")]);
    let course = Course::new("Jeju", Itinerary::new(vec![day]));

    let saved = client.save_course(&course).await.unwrap();
    assert_eq!(saved.id.as_deref(), Some("new-id"));

    let replaced = client.replace_course("c1", &course).await.unwrap();
    assert_eq!(replaced.days, course.days);

    client.rename_course("c1", "Renamed").await.unwrap();
    client.delete_course("c1").await.unwrap();

    let route = client.route("c1").await.unwrap();
    assert_eq!(route.coordinates[0].name, "Seongsan");
}

#[tokio::test]
async fn course_lookup_by_id() {
    let counters = Arc::new(Counters::default());
    let router = Router::new().route("/api/courses/user", get(courses_fresh_only));
    let base = serve(app(router, &counters)).await;
    let (client, _) = client(&base, Some("fresh"));

    assert_eq!(client.course("c1").await.unwrap().name, "Jeju");
    assert!(matches!(client.course("zz").await, Err(ApiError::NotFound)));
}

async fn create_article(State(c): Shared, headers: HeaderMap, mut multipart: Multipart) -> Response {
    c.hits.fetch_add(1, Ordering::SeqCst);
    if bearer(&headers) != Some("fresh") {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let mut article = None;
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.unwrap();
        match name.as_str() {
            "article" => {
                assert_eq!(content_type.as_deref(), Some("application/json"));
                article = Some(serde_json::from_slice::<Value>(&data).unwrap());
            }
            "files" => {
                assert_eq!(content_type.as_deref(), Some("image/png"));
                assert_eq!(&data[..], b"png-bytes");
                files.push(format!("/uploads/{}", file_name.unwrap()));
            }
            other => panic!("unexpected part {other}"),
        }
    }

    let article = article.unwrap();
    Json(json!({
        "id": 10,
        "title": article["title"],
        "content": article["content"],
        "fileUrls": files,
    }))
    .into_response()
}

#[tokio::test]
async fn multipart_article_survives_retry() {
    let counters = Arc::new(Counters::default());
    let router = Router::new()
        .route("/api/articles", post(create_article))
        .route("/api/token", post(refresh_ok));
    let base = serve(app(router, &counters)).await;
    let (client, _) = client(&base, Some("stale"));

    let draft = ArticleDraft {
        title: "Busan".into(),
        content: "Two days by the sea".into(),
    };
    let files = [Attachment::new("beach.png", b"png-bytes".to_vec()).with_mime("image/png")];

    let article = client.create_article(&draft, &files).await.unwrap();
    assert_eq!(article.id, 10);
    assert_eq!(article.title, "Busan");
    assert_eq!(article.file_urls, ["/uploads/beach.png"]);
    assert_eq!(counters.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn invalid_attachment_mime_is_rejected() {
    let base = serve(Router::new()).await;
    let (client, _) = client(&base, None);
    let files = [Attachment::new("x.bin", vec![1]).with_mime("bad\nmime")];
    let draft = ArticleDraft {
        title: "t".into(),
        content: "c".into(),
    };
    let err = client.create_article(&draft, &files).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidHeader(_)));
}

#[tokio::test]
async fn article_page_and_interactions() {
    let router = Router::new()
        .route(
            "/api/articles/5",
            get(|| async {
                Json(json!({ "id": 5, "title": "Busan", "content": "...", "likecheck": false, "likeCount": 2 }))
            }),
        )
        .route(
            "/api/articles/5/comments",
            get(|| async {
                Json(json!([
                    { "id": 1, "articleId": 5, "content": "nice", "nickname": "a", "userid": 2, "minecheck": false },
                    { "id": 2, "articleId": 5, "content": "thanks", "nickname": "b", "userid": 1, "minecheck": true }
                ]))
            })
            .post(|Json(body): Json<Value>| async move {
                Json(json!({ "id": 3, "articleId": 5, "content": body["content"], "userid": 1, "minecheck": true }))
            }),
        )
        .route(
            "/api/articles/5/view",
            post(|| async { Json(json!({ "id": 5, "title": "Busan", "viewCount": 8 })) }),
        )
        .route(
            "/api/articles/5/like",
            post(|| async { Json(json!({ "likecheck": true, "likeCount": 3 })) }),
        );
    let base = serve(router).await;
    let (client, _) = client(&base, Some("t1"));

    let page = client.load_article_page(5).await.unwrap();
    assert_eq!(page.article.title, "Busan");
    assert_eq!(page.comments.len(), 2);
    assert!(page.comments[1].minecheck);

    assert_eq!(client.record_view(5).await.unwrap().view_count, 8);

    let like = client.toggle_like(5).await.unwrap();
    assert_eq!(
        like,
        LikeStatus {
            likecheck: true,
            like_count: 3
        }
    );

    let comment = client.add_comment(5, "hello").await.unwrap();
    assert_eq!(comment.content, "hello");
}

#[tokio::test]
async fn comment_edit_and_delete() {
    let router = Router::new().route(
        "/api/articles/5/comments/3",
        axum::routing::put(|Json(body): Json<Value>| async move {
            Json(json!({ "id": 3, "articleId": 5, "content": body["content"], "userid": 1, "minecheck": true }))
        })
        .delete(|| async { StatusCode::NO_CONTENT }),
    );
    let base = serve(router).await;
    let (client, _) = client(&base, Some("t1"));

    let edited = client.edit_comment(5, 3, "edited").await.unwrap();
    assert_eq!(edited.content, "edited");
    client.delete_comment(5, 3).await.unwrap();
}
