//! End-to-end tests for the API client against a mock server: the login
//! exchange, its effect on the session store, and bearer-token injection
//! on data calls.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use digitrack_core::api::{ApiClient, ApiError};
use digitrack_core::auth::SessionStore;
use digitrack_core::models::{Role, User};

fn user_json() -> serde_json::Value {
    json!({
        "_id": "665f1c2ab1d2c3d4e5f60718",
        "email": "asha@mrf.example",
        "full_name": "Asha Nair",
        "role": "operator",
        "mrf_id": "MRF-KL-014",
        "is_active": true,
        "created_at": "2026-01-12T06:30:00Z",
        "updated_at": "2026-01-12T06:30:00Z"
    })
}

fn test_user() -> User {
    serde_json::from_value(user_json()).expect("valid test user")
}

fn client_for(server: &MockServer, dir: &tempfile::TempDir) -> (ApiClient, Arc<SessionStore>) {
    let session = Arc::new(SessionStore::new(dir.path().to_path_buf()));
    let client = ApiClient::new(server.uri(), Arc::clone(&session)).expect("client builds");
    (client, session)
}

#[tokio::test]
async fn login_success_stores_and_returns_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, session) = client_for(&server, &dir);

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_string_contains("username=asha%40mrf.example"))
        .and(body_string_contains("password=goodpw"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-live-1",
            "token_type": "bearer",
            "user": user_json()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.login("asha@mrf.example", "goodpw").await.unwrap();
    assert_eq!(result.token, "tok-live-1");
    assert_eq!(result.user.role, Role::Operator);

    // Store holds the same session...
    let stored = session.current().expect("session stored");
    assert_eq!(stored.token, "tok-live-1");
    assert_eq!(stored.user.email, "asha@mrf.example");

    // ...and it is already durable: a fresh store over the same directory
    // rehydrates it.
    let fresh = SessionStore::new(dir.path().to_path_buf());
    assert_eq!(fresh.initialize().expect("persisted").token, "tok-live-1");
}

#[tokio::test]
async fn login_rejection_maps_to_invalid_credentials_and_leaves_store_alone() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, session) = client_for(&server, &dir);

    // An earlier session must survive a failed re-login attempt
    session.set_session("tok-old".into(), test_user()).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Incorrect email or password"})),
        )
        .mount(&server)
        .await;

    let err = client.login("asha@mrf.example", "badpw").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials));
    assert_eq!(session.token().as_deref(), Some("tok-old"));
}

#[tokio::test]
async fn login_server_error_is_not_invalid_credentials() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, session) = client_for(&server, &dir);

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client.login("asha@mrf.example", "goodpw").await.unwrap_err();
    assert!(matches!(err, ApiError::ServerError(_)));
    assert!(session.current().is_none());
}

#[tokio::test]
async fn data_calls_carry_the_current_token() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, session) = client_for(&server, &dir);

    session.set_session("tok-abc".into(), test_user()).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/waste/categories"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.fetch_categories().await.unwrap();
}

#[tokio::test]
async fn token_is_read_fresh_on_every_call() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, session) = client_for(&server, &dir);

    Mock::given(method("GET"))
        .and(path("/api/v1/waste/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    // First call: logged in as tok-1. Second: after a logout/login cycle.
    session.set_session("tok-1".into(), test_user()).unwrap();
    client.fetch_categories().await.unwrap();

    session.clear_session().unwrap();
    session.set_session("tok-2".into(), test_user()).unwrap();
    client.fetch_categories().await.unwrap();

    let requests = server.received_requests().await.expect("recording enabled");
    let auth_headers: Vec<_> = requests
        .iter()
        .map(|r| {
            r.headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .collect();
    assert_eq!(
        auth_headers,
        vec![Some("Bearer tok-1".to_string()), Some("Bearer tok-2".to_string())]
    );
}

#[tokio::test]
async fn cleared_session_sends_no_authorization_header() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, session) = client_for(&server, &dir);

    session.set_session("tok-abc".into(), test_user()).unwrap();
    session.clear_session().unwrap();

    // The server still answers; the client must simply not authenticate.
    Mock::given(method("GET"))
        .and(path("/api/v1/waste/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    client.fetch_categories().await.unwrap();

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn expired_token_surfaces_as_unauthorized() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, session) = client_for(&server, &dir);

    session.set_session("tok-stale".into(), test_user()).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/waste/intake"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Could not validate credentials"})),
        )
        .mount(&server)
        .await;

    let err = client.fetch_intakes("MRF-KL-014", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn forbidden_detail_is_surfaced() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, session) = client_for(&server, &dir);

    session.set_session("tok-abc".into(), test_user()).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"detail": "The user doesn't have enough privileges"})),
        )
        .mount(&server)
        .await;

    let err = client.fetch_users(None).await.unwrap_err();
    match err {
        ApiError::AccessDenied(detail) => {
            assert_eq!(detail, "The user doesn't have enough privileges")
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[tokio::test]
async fn register_posts_json_and_parses_user() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, _session) = client_for(&server, &dir);

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .and(body_string_contains("\"email\":\"ravi@mrf.example\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "665f1c2ab1d2c3d4e5f60900",
            "email": "ravi@mrf.example",
            "full_name": "Ravi Menon",
            "role": "manager",
            "created_at": "2026-02-01T08:00:00Z",
            "updated_at": "2026-02-01T08:00:00Z"
        })))
        .mount(&server)
        .await;

    let created = client
        .register(&digitrack_core::models::UserCreate {
            email: "ravi@mrf.example".into(),
            full_name: "Ravi Menon".into(),
            role: Role::Manager,
            mrf_id: None,
            password: "s3cret".into(),
        })
        .await
        .unwrap();
    assert_eq!(created.role, Role::Manager);
}

#[tokio::test]
async fn register_conflict_surfaces_detail() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, _session) = client_for(&server, &dir);

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Email already registered"})),
        )
        .mount(&server)
        .await;

    let err = client
        .register(&digitrack_core::models::UserCreate {
            email: "asha@mrf.example".into(),
            full_name: "Asha Nair".into(),
            role: Role::Operator,
            mrf_id: None,
            password: "s3cret".into(),
        })
        .await
        .unwrap_err();
    match err {
        ApiError::Validation(detail) => assert_eq!(detail, "Email already registered"),
        other => panic!("unexpected variant: {other:?}"),
    }
}
