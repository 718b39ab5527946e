//! Integration tests for the session manager against a mocked backend.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header};
use lookout_auth::SessionManager;
use lookout_core::{LookoutError, NewAccount};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mint_token(sub: &str, expires_in_secs: i64) -> String {
    let claims = json!({
        "sub": sub,
        "exp": Utc::now().timestamp() + expires_in_secs,
    });
    jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(b"backend"))
        .unwrap()
}

fn manager_for(server: &MockServer) -> SessionManager {
    SessionManager::new(Url::parse(&server.uri()).unwrap())
}

async fn mount_sign_in(server: &MockServer, access_token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access_token,
            "refresh_token": "refresh-1",
            "token_type": "bearer",
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn sign_in_sends_form_credentials_and_populates_session() {
    let server = MockServer::start().await;
    let token = mint_token("user-1", 900);

    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .and(body_string_contains("username=user%40example.com"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "refresh_token": "refresh-1",
            "token_type": "bearer",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = manager_for(&server);
    auth.sign_in("user@example.com", "hunter2").await.unwrap();

    assert!(auth.is_signed_in().await);
    assert_eq!(auth.subject().await.as_deref(), Some("user-1"));
    assert!(auth.last_error().await.is_none());
}

#[tokio::test]
async fn fresh_token_is_returned_without_network_calls() {
    let server = MockServer::start().await;
    let token = mint_token("user-1", 900);
    mount_sign_in(&server, &token).await;

    // Zero refresh traffic allowed.
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let auth = manager_for(&server);
    auth.sign_in("user@example.com", "hunter2").await.unwrap();

    assert_eq!(auth.access_token().await.unwrap(), token);
    assert_eq!(auth.access_token().await.unwrap(), token);
}

#[tokio::test]
async fn expired_token_triggers_exactly_one_refresh() {
    let server = MockServer::start().await;
    let expired = mint_token("user-1", -60);
    let renewed = mint_token("user-1", 900);
    mount_sign_in(&server, &expired).await;

    Mock::given(method("POST"))
        .and(path("/auth/token/refresh"))
        .and(body_json(json!({ "refresh_token": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": renewed,
            "token_type": "bearer",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = manager_for(&server);
    auth.sign_in("user@example.com", "hunter2").await.unwrap();

    assert_eq!(auth.access_token().await.unwrap(), renewed);
    // Second call hits the cache; expect(1) above would trip otherwise.
    assert_eq!(auth.access_token().await.unwrap(), renewed);
}

#[tokio::test]
async fn concurrent_callers_share_a_single_refresh() {
    let server = MockServer::start().await;
    let expired = mint_token("user-1", -60);
    let renewed = mint_token("user-1", 900);
    mount_sign_in(&server, &expired).await;

    Mock::given(method("POST"))
        .and(path("/auth/token/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_millis(50))
                .set_body_json(json!({ "access_token": renewed, "token_type": "bearer" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let auth = manager_for(&server);
    auth.sign_in("user@example.com", "hunter2").await.unwrap();

    let (a, b, c, d) = tokio::join!(
        auth.access_token(),
        auth.access_token(),
        auth.access_token(),
        auth.access_token(),
    );
    for token in [a.unwrap(), b.unwrap(), c.unwrap(), d.unwrap()] {
        assert_eq!(token, renewed);
    }
}

#[tokio::test]
async fn rejected_refresh_is_terminal_for_the_session() {
    let server = MockServer::start().await;
    let expired = mint_token("user-1", -60);
    mount_sign_in(&server, &expired).await;

    Mock::given(method("POST"))
        .and(path("/auth/token/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Invalid refresh token",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = manager_for(&server);
    auth.sign_in("user@example.com", "hunter2").await.unwrap();

    let err = auth.access_token().await.unwrap_err();
    assert!(matches!(err, LookoutError::RefreshFailed(_)));
    assert!(auth.last_error().await.is_some());

    // Sticky: the second call fails fast without another wire call.
    let err = auth.access_token().await.unwrap_err();
    assert!(matches!(err, LookoutError::RefreshFailed(_)));
    assert!(err.requires_sign_in());
}

#[tokio::test]
async fn refresh_transport_failure_fails_closed() {
    let server = MockServer::start().await;
    let expired = mint_token("user-1", -60);
    mount_sign_in(&server, &expired).await;
    let auth = manager_for(&server);
    auth.sign_in("user@example.com", "hunter2").await.unwrap();

    // Take the backend away before the refresh happens.
    drop(server);

    let err = auth.access_token().await.unwrap_err();
    assert!(matches!(err, LookoutError::RefreshFailed(_)));
    assert!(auth.last_error().await.is_some());
}

#[tokio::test]
async fn wrong_credentials_surface_as_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Incorrect email or password",
        })))
        .mount(&server)
        .await;

    let auth = manager_for(&server);
    let err = auth.sign_in("user@example.com", "wrong").await.unwrap_err();
    match err {
        LookoutError::InvalidCredentials(detail) => {
            assert_eq!(detail, "Incorrect email or password")
        }
        other => panic!("expected InvalidCredentials, got {other:?}"),
    }
    assert!(!auth.is_signed_in().await);
}

#[tokio::test]
async fn provider_exchange_mints_a_session() {
    let server = MockServer::start().await;
    let token = mint_token("user-9", 900);

    Mock::given(method("POST"))
        .and(path("/auth/oauth/github"))
        .and(body_json(json!({ "token": "gh-token" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "refresh_token": "refresh-9",
            "token_type": "bearer",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = manager_for(&server);
    auth.sign_in_with_provider("github", "gh-token").await.unwrap();
    assert_eq!(auth.subject().await.as_deref(), Some("user-9"));
}

#[tokio::test]
async fn provider_exchange_rejection_surfaces_as_exchange_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/oauth/google"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Invalid OAuth token",
        })))
        .mount(&server)
        .await;

    let auth = manager_for(&server);
    let err = auth.sign_in_with_provider("google", "bad").await.unwrap_err();
    assert!(matches!(err, LookoutError::ExchangeFailed(_)));
}

#[tokio::test]
async fn register_returns_the_created_account() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({
            "email": "new@example.com",
            "password": "hunter2",
            "full_name": "New User",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "email": "new@example.com",
            "is_active": true,
        })))
        .mount(&server)
        .await;

    let auth = manager_for(&server);
    let account = auth
        .register(&NewAccount {
            email: "new@example.com".into(),
            password: "hunter2".into(),
            full_name: "New User".into(),
        })
        .await
        .unwrap();
    assert_eq!(account.email, "new@example.com");
    assert!(account.is_active);
}

#[tokio::test]
async fn duplicate_registration_is_rejected_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Email already registered",
        })))
        .mount(&server)
        .await;

    let auth = manager_for(&server);
    let err = auth
        .register(&NewAccount {
            email: "dupe@example.com".into(),
            password: "hunter2".into(),
            full_name: "Dupe".into(),
        })
        .await
        .unwrap_err();
    match err {
        LookoutError::Registration(detail) => assert_eq!(detail, "Email already registered"),
        other => panic!("expected Registration, got {other:?}"),
    }
}

#[tokio::test]
async fn sign_out_is_idempotent() {
    let server = MockServer::start().await;
    let token = mint_token("user-1", 900);
    mount_sign_in(&server, &token).await;

    let auth = manager_for(&server);
    auth.sign_in("user@example.com", "hunter2").await.unwrap();
    assert!(auth.is_signed_in().await);

    auth.sign_out().await;
    auth.sign_out().await;
    assert!(!auth.is_signed_in().await);
    assert!(matches!(auth.access_token().await, Err(LookoutError::NotSignedIn)));
}
