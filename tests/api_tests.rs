//! Router-level tests for rejections that happen before any store access.
//! The pool is lazy and never connects.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use microblog_backend::{app, auth::jwt, config::settings::Settings, AppState};

fn test_settings() -> Settings {
    Settings {
        port: 0,
        addr: ([127, 0, 0, 1], 0).into(),
        database_url: "postgres://postgres@localhost/unused".to_string(),
        database_max_connections: 1,
        jwt_secret: "api-test-secret".to_string(),
        jwt_ttl_minutes: 60,
        cors_origins: Vec::new(),
    }
}

fn test_app() -> Router {
    let settings = test_settings();
    let pool = PgPoolOptions::new()
        .connect_lazy(&settings.database_url)
        .expect("lazy pool");

    app(AppState { pool, settings })
}

fn token_for(user_id: Uuid) -> String {
    jwt::issue_session(user_id, "tester@x.com", &test_settings()).unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
    builder.body(body).unwrap()
}

async fn send(req: Request<Body>) -> (StatusCode, Value) {
    let response = test_app().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_check_answers_ok() {
    let response = test_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let post_id = Uuid::new_v4();
    let cases = [
        ("GET", "/api/auth/profile".to_string()),
        ("GET", "/api/notifications".to_string()),
        ("GET", "/api/conversations".to_string()),
        ("DELETE", format!("/api/posts/{post_id}")),
        ("POST", format!("/api/posts/{post_id}/like")),
    ];

    for (method, uri) in cases {
        let (status, body) = send(request(method, &uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Unauthorized");
    }
}

#[tokio::test]
async fn forged_token_is_unauthorized() {
    let forged = jwt::issue_session(
        Uuid::new_v4(),
        "mallory@x.com",
        &Settings {
            jwt_secret: "someone-elses-secret".to_string(),
            ..test_settings()
        },
    )
    .unwrap();

    let (status, _) = send(request("GET", "/api/notifications", Some(&forged), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn following_yourself_is_rejected() {
    let me = Uuid::new_v4();
    let token = token_for(me);

    let (status, body) = send(request(
        "POST",
        &format!("/api/users/{me}/follow"),
        Some(&token),
        None,
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You cannot follow yourself");
}

#[tokio::test]
async fn messaging_yourself_is_rejected() {
    let me = Uuid::new_v4();
    let token = token_for(me);

    let (status, _) = send(request(
        "POST",
        "/api/conversations",
        Some(&token),
        Some(json!({ "other_user_id": me })),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signup_validates_before_touching_the_store() {
    let (status, body) = send(request(
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "email": "not-an-email",
            "username": "alice",
            "password": "password123",
            "name": "Alice"
        })),
    ))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn empty_post_is_rejected() {
    let token = token_for(Uuid::new_v4());

    let (status, body) = send(request(
        "POST",
        "/api/posts",
        Some(&token),
        Some(json!({ "content": "   " })),
    ))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Post must have content or an image");
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let token = token_for(Uuid::new_v4());

    let (status, _) = send(request(
        "POST",
        &format!("/api/conversations/{}/messages", Uuid::new_v4()),
        Some(&token),
        Some(json!({ "content": "" })),
    ))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn padded_username_is_measured_after_trimming() {
    let (status, body) = send(request(
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "email": "alice@x.com",
            "username": "  ab  ",
            "password": "password123",
            "name": "Alice"
        })),
    ))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn malformed_json_body_uses_the_envelope() {
    let token = token_for(Uuid::new_v4());
    let req = Request::post("/api/posts")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn wrongly_typed_json_field_is_unprocessable() {
    let token = token_for(Uuid::new_v4());

    let (status, body) = send(request(
        "POST",
        "/api/posts",
        Some(&token),
        Some(json!({ "content": 42 })),
    ))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn bad_query_and_path_values_use_the_envelope() {
    for uri in ["/api/posts?page=abc", "/api/posts/not-a-uuid"] {
        let (status, body) = send(request("GET", uri, None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false, "{uri}");
        assert!(body["data"].is_null(), "{uri}");
    }
}
