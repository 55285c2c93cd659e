use serde_json::json;
use stage_core::{
    ApiError, Collaborators, DestinationApi, DestinationPatch, EditSession, HttpDestinationApi,
    MemoryNotifier, RecordingNavigator, SessionState, Severity,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn orders_db_json(name: &str) -> serde_json::Value {
    json!({
        "id": "d1",
        "type": "postgresql",
        "name": name,
        "description": "",
        "config": {"host": "db.local", "port": "5432"},
        "schema": "schema123",
        "vaults": []
    })
}

fn client(server: &MockServer) -> HttpDestinationApi {
    HttpDestinationApi::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_destination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/destinations/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_db_json("Orders DB")))
        .mount(&server)
        .await;

    let dest = client(&server).fetch("d1").await.unwrap();
    assert_eq!(dest.name, "Orders DB");
    assert_eq!(dest.kind, "postgresql");
    assert_eq!(dest.config["port"], "5432");
    assert_eq!(dest.schema.as_deref(), Some("schema123"));
}

#[tokio::test]
async fn test_fetch_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/destinations/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server).fetch("gone").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref id) if id == "gone"));
}

#[tokio::test]
async fn test_update_sends_patch_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/destinations/d1"))
        .and(body_json(json!({
            "name": "Orders DB Renamed",
            "description": "",
            "config": {"host": "db.local", "port": "5432"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_db_json("Orders DB Renamed")))
        .expect(1)
        .mount(&server)
        .await;

    let patch = DestinationPatch {
        name: "Orders DB Renamed".to_string(),
        description: String::new(),
        config: [("host", "db.local"), ("port", "5432")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    };
    let updated = client(&server).update("d1", &patch).await.unwrap();
    assert_eq!(updated.name, "Orders DB Renamed");
}

#[tokio::test]
async fn test_update_conflict_message() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/destinations/d1"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "conflict"})))
        .mount(&server)
        .await;

    let patch = DestinationPatch {
        name: "x".to_string(),
        description: String::new(),
        config: Default::default(),
    };
    let err = client(&server).update("d1", &patch).await.unwrap_err();
    assert_eq!(err.to_string(), "conflict");
    assert_eq!(err.code_str(), "conflict");
}

#[tokio::test]
async fn test_session_against_http_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/destinations/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_db_json("Orders DB")))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/destinations/d1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = Arc::new(MemoryNotifier::new());
    let navigator = Arc::new(RecordingNavigator::new());
    let mut session = EditSession::open(
        "d1",
        Collaborators::new(
            Arc::new(client(&server)),
            notifier.clone(),
            navigator.clone(),
        ),
    )
    .await;
    assert_eq!(session.state(), SessionState::Ready);

    session.submit().await.unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].severity, Severity::Danger);
    assert_eq!(sent[0].body, "Failed to edit Orders DB: database unavailable");
    assert_eq!(navigator.visited(), vec!["/destination".to_string()]);
}
