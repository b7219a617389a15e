//! Integration tests for the auth session against a mock API

use avatarmart_core::{MemoryTokenStore, RegisterRequest, Role, StoredTokens, TokenStore};
use avatarmart_frontend::{AuthOutcome, AuthSession};
use avatarmart_http::{ErrorKind, MarketClient};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json(role: &str) -> serde_json::Value {
    json!({
        "id": 1,
        "email": "a@b.com",
        "nickname": "alice",
        "role": role,
        "locale": "en",
        "credit_balance": 30
    })
}

fn login_json() -> serde_json::Value {
    json!({
        "access_token": "T1",
        "refresh_token": "T2",
        "token_type": "bearer",
        "user": user_json("buyer")
    })
}

fn session_with(base_url: &str, store: Arc<MemoryTokenStore>) -> AuthSession {
    let client = MarketClient::builder()
        .base_url(base_url)
        .token_store(store)
        .build()
        .unwrap();
    AuthSession::new(client)
}

#[tokio::test]
async fn test_login_stores_tokens_and_user() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "a@b.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let session = session_with(&mock_server.uri(), store.clone());

    let outcome = session.login("a@b.com", "pw").await;

    assert_eq!(outcome, AuthOutcome::Success);
    assert_eq!(store.access_token().as_deref(), Some("T1"));
    assert_eq!(store.refresh_token().as_deref(), Some("T2"));
    assert!(session.is_logged_in());
    assert!(session.is_buyer());
    assert!(!session.is_seller());
    assert_eq!(session.credit_balance(), 30);
}

#[tokio::test]
async fn test_login_failure_reports_server_detail() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Incorrect email or password"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let session = session_with(&mock_server.uri(), store.clone());

    let outcome = session.login("a@b.com", "wrong").await;

    assert_eq!(outcome.error(), Some("Incorrect email or password"));
    assert!(!session.is_logged_in());
    assert_eq!(store.snapshot(), StoredTokens::default());
}

#[tokio::test]
async fn test_login_without_server_falls_back_to_generic_message() {
    let session = session_with("http://127.0.0.1:9", Arc::new(MemoryTokenStore::new()));

    let outcome = session.login("a@b.com", "pw").await;

    assert_eq!(outcome.error(), Some("Login failed"));
    assert!(!session.is_logged_in());
}

#[tokio::test]
async fn test_logout_makes_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_json()))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let session = session_with(&mock_server.uri(), store.clone());
    assert!(session.login("a@b.com", "pw").await.is_success());
    let before = mock_server.received_requests().await.unwrap().len();

    session.logout();

    assert_eq!(mock_server.received_requests().await.unwrap().len(), before);
    assert!(session.user().is_none());
    assert_eq!(store.snapshot(), StoredTokens::default());
    assert!(!session.is_logged_in());
}

#[tokio::test]
async fn test_register_then_logs_in() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({
            "email": "a@b.com",
            "password": "pw",
            "nickname": "alice",
            "role": "buyer",
            "locale": "en"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("buyer")))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session_with(&mock_server.uri(), Arc::new(MemoryTokenStore::new()));
    let registration = RegisterRequest::new("a@b.com", "pw").nickname("alice");

    let outcome = session.register(&registration).await;

    assert!(outcome.is_success());
    assert!(session.is_logged_in());
}

#[tokio::test]
async fn test_register_surfaces_follow_up_login_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("influencer")))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Incorrect email or password"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session_with(&mock_server.uri(), Arc::new(MemoryTokenStore::new()));
    let registration = RegisterRequest::new("a@b.com", "pw").role(Role::Influencer);

    let outcome = session.register(&registration).await;

    assert_eq!(outcome.error(), Some("Incorrect email or password"));
    assert!(!session.is_logged_in());
}

#[tokio::test]
async fn test_register_rejected_skips_login() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Email already registered"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_json()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let session = session_with(&mock_server.uri(), Arc::new(MemoryTokenStore::new()));

    let outcome = session
        .register(&RegisterRequest::new("a@b.com", "pw"))
        .await;

    assert_eq!(outcome.error(), Some("Email already registered"));
}

#[tokio::test]
async fn test_fetch_current_user_clears_session_on_401() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token"})))
        .mount(&mock_server)
        .await;

    // No refresh token, so the 401 reaches the session untouched
    let store = Arc::new(MemoryTokenStore::with_tokens(Some("T1"), None));
    let session = session_with(&mock_server.uri(), store.clone());

    let err = session.fetch_current_user().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(session.user().is_none());
    assert_eq!(store.snapshot(), StoredTokens::default());
}

#[tokio::test]
async fn test_fetch_current_user_keeps_session_on_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("buyer")))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(Some("T1"), Some("T2")));
    let session = session_with(&mock_server.uri(), store.clone());

    session.fetch_current_user().await.unwrap();
    assert!(session.is_logged_in());

    let err = session.fetch_current_user().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Server);
    assert!(session.is_logged_in());
    assert_eq!(store.access_token().as_deref(), Some("T1"));
    assert_eq!(store.refresh_token().as_deref(), Some("T2"));
}

#[tokio::test]
async fn test_initialize_without_tokens_makes_no_request() {
    let mock_server = MockServer::start().await;
    let session = session_with(&mock_server.uri(), Arc::new(MemoryTokenStore::new()));

    assert!(!session.is_initialized());
    session.initialize().await;

    assert!(session.is_initialized());
    assert!(!session.is_logged_in());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_initialize_restores_user() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("influencer")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(Some("T1"), Some("T2")));
    let session = session_with(&mock_server.uri(), store);

    session.initialize().await;

    assert!(session.is_initialized());
    assert!(session.is_seller());
}

#[tokio::test]
async fn test_upgrade_forbidden_leaves_user_unchanged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/upgrade-to-seller"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detail": "Only administrators can approve influencer upgrades."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(Some("T1"), Some("T2")));
    let session = session_with(&mock_server.uri(), store);
    session.set_user(serde_json::from_value(user_json("buyer")).unwrap());

    let err = session.upgrade_to_seller().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(
        err.detail(),
        Some("Only administrators can approve influencer upgrades.")
    );
    assert!(session.is_buyer());
}

#[tokio::test]
async fn test_upgrade_replaces_user() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/upgrade-to-seller"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("influencer")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(Some("T1"), Some("T2")));
    let session = session_with(&mock_server.uri(), store);
    session.set_user(serde_json::from_value(user_json("buyer")).unwrap());

    session.upgrade_to_seller().await.unwrap();

    assert!(session.is_seller());
    assert_eq!(session.user_role(), Some(Role::Influencer));
}

#[tokio::test]
async fn test_failed_refresh_elsewhere_logs_session_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_json()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/my/generations"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid refresh token"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let session = session_with(&mock_server.uri(), store.clone());
    assert!(session.login("a@b.com", "pw").await.is_success());

    let err = session.client().my_generations().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(store.snapshot(), StoredTokens::default());
    assert!(session.user().is_none());
    assert!(!session.is_logged_in());
    assert!(!session.is_buyer());
    assert_eq!(session.user_role(), None);
    assert_eq!(session.credit_balance(), 0);
}

#[tokio::test]
async fn test_fetch_current_user_drops_user_when_refresh_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refresh_token": "R1"})))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(Some("T1"), Some("R1")));
    let session = session_with(&mock_server.uri(), store.clone());
    session.set_user(serde_json::from_value(user_json("buyer")).unwrap());

    let err = session.fetch_current_user().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.status(), Some(503));
    assert!(session.user().is_none());
    assert_eq!(store.snapshot(), StoredTokens::default());

    // The stale record must be gone, not just hidden behind the missing token
    store.set_tokens("T3", "R3").unwrap();
    assert!(session.user().is_none());
}
