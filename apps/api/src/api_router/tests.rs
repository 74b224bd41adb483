use std::sync::Arc;

use axum::Router;
use axum::body::{self, Body};
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use chrono::Utc;
use lectern_application::OperatorAllowList;
use lectern_domain::{ContentDocument, ContentKind, MemberRef};
use lectern_infrastructure::{
    InMemoryContentRepository, InMemoryRoleRepository, InMemoryUserRepository,
    TracingPathRevalidator,
};
use serde_json::{Value, json};
use tower::util::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use super::build_router;
use crate::state::{AppState, Repositories};

const BOOTSTRAP_TOKEN: &str = "bootstrap-secret";
const OPERATOR_EMAIL: &str = "editor@example.com";

async fn test_router() -> Router {
    let content = Arc::new(InMemoryContentRepository::new());
    let author = MemberRef {
        id: "author-1".to_owned(),
        email: "author@example.com".to_owned(),
        name: Some("Author".to_owned()),
        image: None,
    };
    let seeded = content
        .insert_document(
            ContentDocument::draft(
                "blog-1",
                ContentKind::Blog,
                "hello-world",
                "Hello world",
                author.clone(),
                Utc::now(),
            )
            .published(),
        )
        .await;
    assert!(seeded.is_ok());
    let seeded = content
        .insert_document(ContentDocument::draft(
            "blog-2",
            ContentKind::Blog,
            "work-in-progress",
            "Work in progress",
            author,
            Utc::now(),
        ))
        .await;
    assert!(seeded.is_ok());

    let state = AppState::new(
        Repositories {
            content,
            roles: Arc::new(InMemoryRoleRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            revalidator: Arc::new(TracingPathRevalidator),
        },
        OperatorAllowList::new([OPERATOR_EMAIL]),
        BOOTSTRAP_TOKEN.to_owned(),
    );

    let Ok(router) = build_router(
        state,
        "http://localhost:3000",
        SessionManagerLayer::new(MemoryStore::default()).with_secure(false),
    ) else {
        panic!("router should build");
    };
    router
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    let Ok(response) = router.clone().oneshot(request).await else {
        panic!("router is infallible");
    };
    response
}

async fn json_body(response: Response) -> Value {
    let Ok(bytes) = body::to_bytes(response.into_body(), 1_048_576).await else {
        panic!("body should be readable");
    };
    serde_json::from_slice(&bytes).unwrap_or_default()
}

fn request(method: &str, uri: &str, cookie: Option<&str>, payload: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    let body = match payload {
        Some(payload) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(payload.to_string())
        }
        None => Body::empty(),
    };
    let Ok(request) = builder.body(body) else {
        panic!("request should build");
    };
    request
}

async fn sign_in(router: &Router, email: &str) -> String {
    let response = send(
        router,
        request(
            "POST",
            "/auth/bootstrap",
            None,
            Some(json!({ "token": BOOTSTRAP_TOKEN, "email": email })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let Some(cookie) = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
    else {
        panic!("bootstrap should set a session cookie");
    };
    cookie.to_owned()
}

#[tokio::test]
async fn health_reports_ok() {
    let router = test_router().await;

    let response = send(&router, request("GET", "/health", None, None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn anonymous_reader_sees_published_blog_but_not_draft() {
    let router = test_router().await;

    let published = send(
        &router,
        request("GET", "/api/content/blogs/slug/hello-world", None, None),
    )
    .await;
    let draft = send(
        &router,
        request("GET", "/api/content/blog/blog-2", None, None),
    )
    .await;

    assert_eq!(published.status(), StatusCode::OK);
    assert_eq!(json_body(published).await["title"], "Hello world");
    assert_eq!(draft.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_content_kind_is_bad_request() {
    let router = test_router().await;

    let response = send(&router, request("GET", "/api/content/podcasts/top", None, None)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn anonymous_like_is_rejected_with_tagged_error() {
    let router = test_router().await;

    let response = send(
        &router,
        request("POST", "/api/content/blog/blog-1/like", None, None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["type"], "error");
    assert_eq!(body["status"], 401);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn anonymous_view_counts_and_hides_viewer_lists() {
    let router = test_router().await;

    let response = send(
        &router,
        request("POST", "/api/content/blog/slug/hello-world/view", None, None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["type"], "success");
    assert_eq!(body["data"]["views"], 1);
    assert!(body["data"].get("viewed_by_ip").is_none());
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let router = test_router().await;

    let response = send(&router, request("GET", "/auth/me", None, None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bootstrap_rejects_wrong_token() {
    let router = test_router().await;

    let response = send(
        &router,
        request(
            "POST",
            "/auth/bootstrap",
            None,
            Some(json!({ "token": "wrong", "email": OPERATOR_EMAIL })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signed_in_operator_likes_once() {
    let router = test_router().await;
    let cookie = sign_in(&router, OPERATOR_EMAIL).await;

    let me = send(&router, request("GET", "/auth/me", Some(&cookie), None)).await;
    assert_eq!(me.status(), StatusCode::OK);
    let me = json_body(me).await;
    assert_eq!(me["email"], OPERATOR_EMAIL);
    assert!(
        me["roles"]
            .as_array()
            .is_some_and(|roles| roles.iter().any(|role| role == "operator"))
    );

    let first = send(
        &router,
        request(
            "POST",
            "/api/content/blog/blog-1/like?revalidate=/blog/hello-world",
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(json_body(first).await["data"], true);

    let second = send(
        &router,
        request("POST", "/api/content/blog/blog-1/like", Some(&cookie), None),
    )
    .await;
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(second).await["type"], "error");

    let blog = send(
        &router,
        request("GET", "/api/content/blog/blog-1", Some(&cookie), None),
    )
    .await;
    assert_eq!(json_body(blog).await["likes"], 1);
}

#[tokio::test]
async fn default_member_cannot_list_roles() {
    let router = test_router().await;
    let cookie = sign_in(&router, "reader@example.com").await;

    let roles = send(&router, request("GET", "/api/roles", Some(&cookie), None)).await;
    let like = send(
        &router,
        request("POST", "/api/content/blog/blog-1/like", Some(&cookie), None),
    )
    .await;

    assert_eq!(roles.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(like.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let router = test_router().await;
    let cookie = sign_in(&router, OPERATOR_EMAIL).await;

    let logout = send(&router, request("POST", "/auth/logout", Some(&cookie), None)).await;
    let me = send(&router, request("GET", "/auth/me", Some(&cookie), None)).await;

    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn content_search_hides_drafts_from_anonymous_readers() {
    let router = test_router().await;
    let cookie = sign_in(&router, OPERATOR_EMAIL).await;

    let published = send(
        &router,
        request("GET", "/api/content/blogs/search?q=HELLO", None, None),
    )
    .await;
    let anonymous_draft = send(
        &router,
        request("GET", "/api/content/blog/search?q=progress", None, None),
    )
    .await;
    let operator_draft = send(
        &router,
        request("GET", "/api/content/blog/search?q=progress", Some(&cookie), None),
    )
    .await;
    let blank = send(&router, request("GET", "/api/content/blog/search", None, None)).await;

    assert_eq!(published.status(), StatusCode::OK);
    let published = json_body(published).await;
    assert_eq!(published["total"], 1);
    assert_eq!(published["items"][0]["slug"], "hello-world");
    assert_eq!(json_body(anonymous_draft).await["total"], 0);
    assert_eq!(json_body(operator_draft).await["total"], 1);
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(blank).await["message"], "Query is required");
}

#[tokio::test]
async fn user_search_and_filter_need_user_view() {
    let router = test_router().await;
    let reader = sign_in(&router, "reader@example.com").await;
    let operator = sign_in(&router, OPERATOR_EMAIL).await;

    let found = send(
        &router,
        request("GET", "/api/users/search?q=READER", Some(&operator), None),
    )
    .await;
    let filtered = send(
        &router,
        request(
            "GET",
            "/api/users/filter?email=reader%40example.com",
            Some(&operator),
            None,
        ),
    )
    .await;
    let bad_status = send(
        &router,
        request("GET", "/api/users/filter?status=sleeping", Some(&operator), None),
    )
    .await;
    let denied = send(
        &router,
        request("GET", "/api/users/search?q=editor", Some(&reader), None),
    )
    .await;

    assert_eq!(found.status(), StatusCode::OK);
    let found = json_body(found).await;
    assert_eq!(found["total"], 1);
    assert_eq!(found["items"][0]["email"], "reader@example.com");
    let filtered = json_body(filtered).await;
    assert_eq!(filtered["total"], 1);
    assert_eq!(filtered["items"][0]["email"], "reader@example.com");
    assert_eq!(bad_status.status(), StatusCode::BAD_REQUEST);
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
}
