use pretty_assertions::assert_eq;
use stage_core::{
    Collaborators, ConfigMap, Destination, EditSession, FormField, MemoryDestinationApi,
    MemoryNotifier, PropertyField, RecordingNavigator, SessionState, Severity, SubmitOutcome,
};
use std::sync::Arc;

struct Fixture {
    api: Arc<MemoryDestinationApi>,
    notifier: Arc<MemoryNotifier>,
    navigator: Arc<RecordingNavigator>,
}

impl Fixture {
    fn orders_db() -> Self {
        let api = MemoryDestinationApi::with_destination(Destination {
            id: "d1".to_string(),
            kind: "postgresql".to_string(),
            name: "Orders DB".to_string(),
            description: String::new(),
            config: config(&[("host", "db.local"), ("port", "5432")]),
            schema: None,
            vaults: Vec::new(),
        });
        Self {
            api: Arc::new(api),
            notifier: Arc::new(MemoryNotifier::new()),
            navigator: Arc::new(RecordingNavigator::new()),
        }
    }

    async fn open(&self) -> EditSession {
        EditSession::open(
            "d1",
            Collaborators::new(
                self.api.clone(),
                self.notifier.clone(),
                self.navigator.clone(),
            ),
        )
        .await
    }
}

fn config(pairs: &[(&str, &str)]) -> ConfigMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_load_seeds_store_and_form() {
    let fx = Fixture::orders_db();
    let session = fx.open().await;

    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.form().value(FormField::Name), "Orders DB");

    let rows: Vec<_> = session
        .properties()
        .entries()
        .map(|e| (e.key.to_string(), e.value.to_string()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("host".to_string(), "db.local".to_string()),
            ("port".to_string(), "5432".to_string()),
        ]
    );
    assert_eq!(
        session.properties().to_mapping(),
        config(&[("host", "db.local"), ("port", "5432")])
    );
}

#[tokio::test]
async fn test_load_failure_is_terminal() {
    let fx = Fixture::orders_db();
    let mut session = EditSession::open(
        "missing",
        Collaborators::new(fx.api.clone(), fx.notifier.clone(), fx.navigator.clone()),
    )
    .await;

    assert_eq!(session.state(), SessionState::LoadError);
    assert_eq!(session.load_error(), Some("Destination not found: missing"));
    assert!(session.add_property().is_err());
    assert!(session.submit().await.is_err());
    assert!(fx.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_empty_name_never_persists() {
    let fx = Fixture::orders_db();
    let mut session = fx.open().await;
    session.set_field(FormField::Name, "").unwrap();

    let outcome = session.submit().await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.form().errors().len(), 1);
    assert_eq!(
        session.form().error(FormField::Name),
        Some("Destination name is required.")
    );
    assert!(fx.api.updates().is_empty());
    assert!(fx.notifier.sent().is_empty());
    assert!(fx.navigator.visited().is_empty());

    // Editing the field clears the error and allows a retry
    session.set_field(FormField::Name, "Orders DB").unwrap();
    assert_eq!(session.form().error(FormField::Name), None);
    assert!(matches!(
        session.submit().await.unwrap(),
        SubmitOutcome::Saved(_)
    ));
}

#[tokio::test]
async fn test_successful_submit_notifies_then_navigates() {
    let fx = Fixture::orders_db();
    let mut session = fx.open().await;
    session.set_field(FormField::Name, "Orders DB Renamed").unwrap();

    let outcome = session.submit().await.unwrap();

    let SubmitOutcome::Saved(saved) = outcome else {
        panic!("expected saved outcome");
    };
    assert_eq!(saved.name, "Orders DB Renamed");
    assert_eq!(session.state(), SessionState::Done);

    let sent = fx.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].severity, Severity::Success);
    assert!(sent[0].body.contains("Orders DB Renamed"));
    assert_eq!(fx.navigator.visited(), vec!["/destination".to_string()]);

    let updates = fx.api.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, "d1");
    assert_eq!(
        updates[0].1.config,
        config(&[("host", "db.local"), ("port", "5432")])
    );
}

#[tokio::test]
async fn test_failed_submit_still_navigates() {
    let fx = Fixture::orders_db();
    fx.api.fail_next_update("conflict");
    let mut session = fx.open().await;

    let outcome = session.submit().await.unwrap();

    assert_eq!(
        outcome,
        SubmitOutcome::Failed {
            message: "conflict".to_string()
        }
    );
    let sent = fx.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].severity, Severity::Danger);
    assert!(sent[0].body.contains("conflict"));
    assert_eq!(fx.navigator.visited(), vec!["/destination".to_string()]);
    assert_eq!(session.state(), SessionState::Done);
}

#[tokio::test]
async fn test_property_edits_reach_payload() {
    let fx = Fixture::orders_db();
    let mut session = fx.open().await;

    let host = session.properties().identities_for_key("host")[0];
    session.remove_property(host).unwrap();
    let id = session.add_property().unwrap();
    session.update_property(id, PropertyField::Key, "schema").unwrap();
    session.update_property(id, PropertyField::Value, "inventory").unwrap();
    session.set_field(FormField::Description, "replica").unwrap();

    session.submit().await.unwrap();

    let (_, patch) = fx.api.updates().remove(0);
    assert_eq!(patch.description, "replica");
    assert_eq!(patch.config, config(&[("port", "5432"), ("schema", "inventory")]));
    assert_eq!(
        fx.api.get("d1").unwrap().config,
        config(&[("port", "5432"), ("schema", "inventory")])
    );
}
