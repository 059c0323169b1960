//! Integration tests for the full client stack over real HTTP.
//!
//! A small axum app stands in for the blog API. It issues the refresh
//! credential as an HTTP-only cookie and only accepts the *refreshed*
//! access token on protected routes, so a passing test proves the cookie
//! travelled and the 401 retry happened.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use quill::prelude::*;
use serde_json::{Value, json};

// =========================================================================
// Stub API
// =========================================================================

#[derive(Default)]
struct Api {
    refreshes: AtomicUsize,
    revoked: AtomicBool,
}

type Shared = State<Arc<Api>>;

fn auth_response(token: &str) -> Response {
    (
        [(header::SET_COOKIE, "refreshToken=r1; HttpOnly; Path=/api/auth")],
        Json(json!({
            "success": true,
            "data": {
                "user": { "id": 7, "username": "ada", "role": "admin", "displayName": "Ada" },
                "accessToken": token,
                "expiresIn": 900
            }
        })),
    )
        .into_response()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn login(State(api): Shared, Json(body): Json<Value>) -> Response {
    if body["password"] != "secret" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Invalid credentials" })),
        )
            .into_response();
    }
    api.revoked.store(false, Ordering::SeqCst);
    auth_response("t1")
}

async fn refresh(State(api): Shared, headers: HeaderMap) -> Response {
    let has_cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|c| c.contains("refreshToken=r1"));
    if !has_cookie || api.revoked.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Refresh token required" })),
        )
            .into_response();
    }
    api.refreshes.fetch_add(1, Ordering::SeqCst);
    auth_response("t2")
}

async fn logout(State(api): Shared) -> Response {
    api.revoked.store(true, Ordering::SeqCst);
    (
        [(header::SET_COOKIE, "refreshToken=; Max-Age=0; Path=/api/auth")],
        Json(json!({ "success": true })),
    )
        .into_response()
}

/// Only the refreshed token is accepted here.
async fn my_posts(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some("t2") => Json(json!({ "success": true, "data": [] })).into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "jwt expired" }))).into_response(),
    }
}

async fn profile(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some(_) => Json(json!({
            "success": true,
            "data": { "user": { "id": 7, "username": "ada", "role": "admin", "bio": "Analyst" } }
        }))
        .into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn spawn_api() -> (String, Arc<Api>) {
    let api = Arc::new(Api::default());
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/profile", get(profile))
        .route("/api/posts/mine", get(my_posts))
        .with_state(Arc::clone(&api));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server should run");
    });
    (format!("http://{addr}/api"), api)
}

fn client(api_url: &str) -> QuillClient {
    QuillClient::builder()
        .api_url(api_url)
        .build()
        .expect("valid url")
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_bootstrap_without_cookie_is_signed_out() {
    let (url, api) = spawn_api().await;
    let client = client(&url);

    assert!(!client.session().bootstrap().await);

    assert!(!client.session().is_loading());
    assert!(client.session().user().is_none());
    assert_eq!(api.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_login_wrong_password_surfaces_server_message() {
    let (url, _api) = spawn_api().await;
    let client = client(&url);

    let err = client.session().login("ada", "guess").await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_401_is_recovered_through_refresh_cookie() {
    let (url, api) = spawn_api().await;
    let client = client(&url);
    let session = client.session();

    let user = session.login("ada@example.com", "secret").await.unwrap();
    assert!(user.is_admin());

    let res = session
        .authenticated_fetch(ApiRequest::get("/posts/mine"))
        .await
        .unwrap();

    assert_eq!(res.status, 200);
    assert_eq!(api.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(session.get_valid_token().await.as_deref(), Some("t2"));
}

#[tokio::test]
async fn test_second_client_bootstraps_only_with_its_own_cookie() {
    let (url, _api) = spawn_api().await;
    let first = client(&url);
    first.session().login("ada", "secret").await.unwrap();

    let second = client(&url);

    assert!(!second.session().bootstrap().await);
    assert!(first.session().refresh_access_token().await.is_some());
}

#[tokio::test]
async fn test_logout_revokes_refresh() {
    let (url, _api) = spawn_api().await;
    let client = client(&url);
    let session = client.session();
    session.login("ada", "secret").await.unwrap();

    session.logout().await;

    assert!(session.user().is_none());
    assert_eq!(session.refresh_access_token().await, None);
    assert_eq!(
        session.guard(Access::Authenticated),
        GuardDecision::Pending,
        "bootstrap never ran in this test"
    );
}

#[tokio::test]
async fn test_fetch_profile_updates_snapshot() {
    let (url, _api) = spawn_api().await;
    let client = client(&url);
    let session = client.session();
    session.login("ada", "secret").await.unwrap();

    let user = session.fetch_profile().await.unwrap();

    assert_eq!(user.extra["bio"], "Analyst");
    assert_eq!(session.snapshot().user, Some(user));
}

#[tokio::test]
async fn test_unreachable_api_is_network_error() {
    let client = client("http://127.0.0.1:9/api");

    let err = client.session().login("ada", "secret").await.unwrap_err();

    assert!(matches!(err, SessionError::Network(_)));
    assert_eq!(err.to_string(), "Network error");
}
