//! Login, restore and logout against a mocked backend

use auth::session::{SessionManager, TOKEN_KEY, USER_KEY};
use common::{BackendClient, ClientConfig, ClientError, FileStore, KeyValueStore, MemoryStore};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn manager(server: &MockServer, store: Arc<dyn KeyValueStore>) -> SessionManager {
    let config = ClientConfig::default().with_base_url(server.uri());
    let client = BackendClient::new(&config).expect("client");
    SessionManager::new(client, store)
}

#[tokio::test]
async fn test_otp_login_persists_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .and(body_json(
            json!({"phone_number": "9876543210", "login_method": "otp"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "OTP sent"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/verify-otp"))
        .and(body_json(json!({"phone_number": "9876543210", "otp": "123456"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "user": {"id": 11, "name": "Ravi", "phone": "9876543210"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let sessions = manager(&server, store.clone());
    let handle = sessions.handle();

    sessions.request_otp("9876543210").await.unwrap();
    assert!(!handle.is_authenticated().await);

    let session = sessions.verify_otp("9876543210", "123456").await.unwrap();
    assert_eq!(session.token, "tok-1");
    assert_eq!(session.user.id, "11");
    assert_eq!(handle.token().await.as_deref(), Some("tok-1"));

    assert_eq!(store.get(TOKEN_KEY).await.unwrap().as_deref(), Some("tok-1"));
    assert!(store.get(USER_KEY).await.unwrap().unwrap().contains("Ravi"));
}

#[tokio::test]
async fn test_restore_and_logout() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    store.set(TOKEN_KEY, "tok-2").await.unwrap();
    store
        .set(USER_KEY, r#"{"id":"u-2","name":"Asha"}"#)
        .await
        .unwrap();

    let sessions = manager(&server, store.clone());
    let restored = sessions.restore().await.unwrap().expect("session");
    assert_eq!(restored.user.display_name(), "Asha");
    assert!(sessions.handle().is_authenticated().await);

    sessions.logout().await.unwrap();
    assert!(!sessions.handle().is_authenticated().await);
    assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
    assert_eq!(store.get(USER_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_restore_without_user_is_signed_out() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    store.set(TOKEN_KEY, "orphan").await.unwrap();

    let sessions = manager(&server, store);
    assert!(sessions.restore().await.unwrap().is_none());
    assert!(matches!(
        sessions.handle().require_token().await,
        Err(ClientError::Unauthenticated)
    ));
}

#[tokio::test]
async fn test_password_login_surfaces_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let sessions = manager(&server, store.clone());

    let err = sessions
        .login_with_password("9876543210", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Invalid credentials");
    assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_invalid_input_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let sessions = manager(&server, Arc::new(MemoryStore::new()));

    let err = sessions.request_otp("").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    let err = sessions.verify_otp("9876543210", "").await.unwrap_err();
    assert_eq!(err.user_message(), "Please enter the OTP");

    let err = sessions
        .login_with_password("9876543210", "")
        .await
        .unwrap_err();
    assert_eq!(
        err.user_message(),
        "Please enter both phone number and password"
    );
}

#[tokio::test]
async fn test_spaced_phone_number_reaches_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .and(body_json(
            json!({"phone_number": "+91 98765 43210", "login_method": "otp"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "OTP sent"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/verify-otp"))
        .and(body_json(json!({"phone_number": "+91 98765 43210", "otp": "12 34"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-3",
            "user": {"id": 12, "name": "Meena"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sessions = manager(&server, Arc::new(MemoryStore::new()));

    sessions.request_otp(" +91 98765 43210 ").await.unwrap();
    let session = sessions.verify_otp("+91 98765 43210", "12 34").await.unwrap();
    assert_eq!(session.token, "tok-3");
}

#[tokio::test]
async fn test_corrupt_session_file_is_signed_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/verify-otp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-4",
            "user": {"id": 13, "name": "Kiran"}
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");
    tokio::fs::write(&file, "{not json").await.unwrap();

    let sessions = manager(&server, Arc::new(FileStore::new(file.clone())));
    assert!(sessions.restore().await.unwrap().is_none());
    assert!(!sessions.handle().is_authenticated().await);
    sessions.logout().await.unwrap();

    tokio::fs::write(&file, "{not json").await.unwrap();
    sessions.verify_otp("9876543210", "123456").await.unwrap();

    let reopened = manager(&server, Arc::new(FileStore::new(file)));
    let restored = reopened.restore().await.unwrap().expect("session");
    assert_eq!(restored.token, "tok-4");
    assert_eq!(restored.user.display_name(), "Kiran");
}
