//! Firebase REST gateways against a mock server.

use std::time::Duration;

use futures_util::StreamExt;
use parle_core::credentials::{CredentialStore, StoredCredentials, now_millis_u64};
use parle_core::error::{AuthFailureKind, GatewayError};
use parle_core::gateway::firebase::{FirebaseBackend, FirebaseSettings};
use parle_core::gateway::{AuthGateway, QueryMode, VocabularyStore};
use parle_core::model::{Flashcard, Session};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOCUMENTS: &str = "/v1/projects/demo/databases/(default)/documents";

fn settings(server: &MockServer) -> FirebaseSettings {
    let mut settings = FirebaseSettings::new("test-key", "demo").with_base_url(&server.uri());
    settings.live_poll_interval = Duration::from_millis(20);
    settings
}

fn backend(server: &MockServer) -> FirebaseBackend {
    FirebaseBackend::new(settings(server)).unwrap()
}

fn sign_in_body(uid: &str, email: &str) -> Value {
    json!({
        "localId": uid,
        "email": email,
        "idToken": format!("id-{uid}"),
        "refreshToken": format!("refresh-{uid}"),
        "expiresIn": "3600"
    })
}

fn word_doc(owner: &str, french: &str, english: &str) -> Value {
    json!({
        "document": {
            "name": format!("projects/demo/databases/(default)/documents/user_vocabulary/{french}"),
            "fields": {
                "userId": { "stringValue": owner },
                "frenchWord": { "stringValue": french },
                "englishTranslation": { "stringValue": english }
            }
        },
        "readTime": "2024-05-01T10:00:00Z"
    })
}

async fn mount_login(server: &MockServer, uid: &str, email: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({ "email": email, "returnSecureToken": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(sign_in_body(uid, email)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_returns_session() {
    let server = MockServer::start().await;
    mount_login(&server, "uid-1", "marie@example.com").await;

    let backend = backend(&server);
    let outcome = backend.login("marie@example.com", "secret1").await.unwrap();

    assert_eq!(outcome.session, Session::new("uid-1", "marie@example.com"));
    assert_eq!(outcome.profile_warning, None);
    assert_eq!(backend.current_session(), Some(outcome.session));
}

#[tokio::test]
async fn test_login_maps_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "INVALID_LOGIN_CREDENTIALS" }
        })))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let err = backend.login("marie@example.com", "wrong").await.unwrap_err();

    match err {
        GatewayError::Auth(failure) => {
            assert_eq!(failure.kind, AuthFailureKind::InvalidCredentials);
        }
        other => panic!("expected auth failure, got {other:?}"),
    }
    assert_eq!(backend.current_session(), None);
}

#[tokio::test]
async fn test_register_writes_profile_with_server_timestamp() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(sign_in_body("uid-2", "jean@example.com")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:commit")))
        .and(header("authorization", "Bearer id-uid-2"))
        .and(body_partial_json(json!({
            "writes": [{
                "update": {
                    "name": "projects/demo/databases/(default)/documents/users/uid-2/users/uid-2",
                    "fields": {
                        "username": { "stringValue": "jean" },
                        "selectedBackground": { "stringValue": "default" }
                    }
                },
                "updateTransforms": [{ "fieldPath": "createdAt", "setToServerValue": "REQUEST_TIME" }]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "writeResults": [{}] })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = backend(&server)
        .register("jean@example.com", "secret1")
        .await
        .unwrap();

    assert_eq!(outcome.session.user_id, "uid-2");
    assert_eq!(outcome.profile_warning, None);
}

#[tokio::test]
async fn test_register_profile_failure_is_a_warning() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(sign_in_body("uid-3", "paul@example.com")),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:commit")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let outcome = backend.register("paul@example.com", "secret1").await.unwrap();

    assert!(outcome.profile_warning.is_some());
    assert_eq!(backend.current_session().map(|s| s.user_id), Some("uid-3".to_string()));
}

#[tokio::test]
async fn test_register_existing_email() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "EMAIL_EXISTS" }
        })))
        .mount(&server)
        .await;

    let err = backend(&server)
        .register("taken@example.com", "secret1")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "An account already exists for this email");
}

#[tokio::test]
async fn test_federated_new_user_writes_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithIdp"))
        .and(body_partial_json(json!({
            "postBody": "id_token=google-token&providerId=google.com",
            "returnSecureToken": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-g",
            "idToken": "id-uid-g",
            "refreshToken": "refresh-uid-g",
            "expiresIn": "3600",
            "isNewUser": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:commit")))
        .and(body_string_contains("no-email-uid-g@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = backend(&server)
        .sign_in_federated("google-token")
        .await
        .unwrap();
    assert_eq!(outcome.session.user_id, "uid-g");
    assert_eq!(outcome.profile_warning, None);
}

#[tokio::test]
async fn test_federated_returning_user_skips_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithIdp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-g",
            "email": "g@example.com",
            "idToken": "id-uid-g",
            "refreshToken": "refresh-uid-g",
            "expiresIn": "3600"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:commit")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = backend(&server)
        .sign_in_federated("google-token")
        .await
        .unwrap();
    assert_eq!(outcome.session.email, "g@example.com");
}

#[tokio::test]
async fn test_snapshot_query_decodes_and_filters() {
    let server = MockServer::start().await;
    mount_login(&server, "uid-1", "marie@example.com").await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:runQuery")))
        .and(header("authorization", "Bearer id-uid-1"))
        .and(body_partial_json(json!({
            "structuredQuery": {
                "from": [{ "collectionId": "user_vocabulary" }],
                "where": { "fieldFilter": {
                    "field": { "fieldPath": "userId" },
                    "op": "EQUAL",
                    "value": { "stringValue": "uid-1" }
                }}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            word_doc("uid-1", "bonjour", "hello"),
            { "document": { "name": "x", "fields": { "englishTranslation": { "stringValue": "orphan" } } } },
            word_doc("uid-1", "merci", "thank you")
        ])))
        .mount(&server)
        .await;

    let backend = backend(&server);
    backend.login("marie@example.com", "secret1").await.unwrap();

    let mut words = backend.query_words("uid-1", QueryMode::Snapshot);
    let list = words.next().await.unwrap().unwrap();
    assert_eq!(
        list,
        vec![
            Flashcard::new("uid-1", "bonjour", "hello"),
            Flashcard::new("uid-1", "merci", "thank you"),
        ]
    );
    assert!(words.next().await.is_none());
}

#[tokio::test]
async fn test_live_query_emits_only_changes() {
    let server = MockServer::start().await;
    mount_login(&server, "uid-1", "marie@example.com").await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:runQuery")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([word_doc("uid-1", "un", "one")])),
        )
        .up_to_n_times(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}:runQuery")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            word_doc("uid-1", "un", "one"),
            word_doc("uid-1", "deux", "two")
        ])))
        .mount(&server)
        .await;

    let backend = backend(&server);
    backend.login("marie@example.com", "secret1").await.unwrap();

    let mut words = backend.query_words("uid-1", QueryMode::Live);
    let first = words.next().await.unwrap().unwrap();
    assert_eq!(first.len(), 1);

    let second = tokio::time::timeout(Duration::from_secs(5), words.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(second.len(), 2);
}

#[tokio::test]
async fn test_add_word_posts_document() {
    let server = MockServer::start().await;
    mount_login(&server, "uid-1", "marie@example.com").await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}/user_vocabulary")))
        .and(header("authorization", "Bearer id-uid-1"))
        .and(body_partial_json(json!({
            "fields": {
                "userId": { "stringValue": "uid-1" },
                "frenchWord": { "stringValue": "fromage" },
                "englishTranslation": { "stringValue": "cheese" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "doc" })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server);
    backend.login("marie@example.com", "secret1").await.unwrap();
    backend.add_word("uid-1", "fromage", "cheese").await.unwrap();
}

#[tokio::test]
async fn test_store_calls_require_session() {
    let server = MockServer::start().await;
    let backend = backend(&server);

    let err = backend.add_word("uid-1", "pain", "bread").await.unwrap_err();
    assert_eq!(err, GatewayError::NotSignedIn);
}

#[tokio::test]
async fn test_store_error_is_reported() {
    let server = MockServer::start().await;
    mount_login(&server, "uid-1", "marie@example.com").await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}/user_vocabulary")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "Missing or insufficient permissions." }
        })))
        .mount(&server)
        .await;

    let backend = backend(&server);
    backend.login("marie@example.com", "secret1").await.unwrap();
    let err = backend.add_word("uid-1", "pain", "bread").await.unwrap_err();

    assert!(matches!(&err, GatewayError::Store(msg) if msg.contains("insufficient permissions")));
}

#[tokio::test]
async fn test_cached_session_is_restored_and_refreshed() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    let store = CredentialStore::new(home.path().join("credentials.json"));
    store
        .save(&StoredCredentials {
            user_id: "uid-1".to_string(),
            email: "marie@example.com".to_string(),
            id_token: "stale".to_string(),
            refresh_token: "refresh-1".to_string(),
            expires_at: now_millis_u64().saturating_sub(1000),
        })
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_token": "fresh",
            "refresh_token": "refresh-2",
            "expires_in": "3600",
            "user_id": "uid-1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCUMENTS}/user_vocabulary")))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings(&server);
    settings.credentials = Some(store.clone());
    let backend = FirebaseBackend::new(settings).unwrap();

    assert_eq!(
        backend.current_session(),
        Some(Session::new("uid-1", "marie@example.com"))
    );
    backend.add_word("uid-1", "pain", "bread").await.unwrap();

    let cached = store.load().unwrap().unwrap();
    assert_eq!(cached.id_token, "fresh");
    assert_eq!(cached.refresh_token, "refresh-2");

    backend.sign_out().await;
    assert_eq!(backend.current_session(), None);
    assert_eq!(store.load().unwrap(), None);
}
