//! Adapter behaviour against the in-process store, driven by generated records.

use bson::Bson;
use simulator_actions::{
    to_payload, Action, DocumentActions, EditingGrade, MemoryStore, StoreConnector,
};
use simulator_generator::{Locale, Model, RecordGenerator};

const ADDRESS: &str = "memory://adapter";
const DB: &str = "montogre";

fn driver_payload(seed: u64) -> bson::Document {
    let mut generator = RecordGenerator::with_seed(Locale::PtBr, seed);
    let record = generator.next_record(Model::Driver).unwrap();
    to_payload(&record).unwrap()
}

#[tokio::test]
async fn test_generated_driver_roundtrip() {
    let store = MemoryStore::new();
    let payload = driver_payload(1);
    let actions = DocumentActions::new(&store, ADDRESS, DB, "DriverCollection", payload.clone());

    let id = actions.create().await.unwrap();
    let stored = store.get(DB, "DriverCollection", &id).unwrap();

    for (key, value) in &payload {
        assert_eq!(stored.get(key), Some(value), "field {key}");
    }
}

#[tokio::test]
async fn test_update_overwrites_with_new_payload_values() {
    let store = MemoryStore::new();
    let original = driver_payload(1);
    let id = store.insert(DB, "DriverCollection", original.clone());

    let replacement = driver_payload(2);
    let actions = DocumentActions::new(&store, ADDRESS, DB, "DriverCollection", replacement.clone());
    let outcome = actions
        .perform(Action::Update, EditingGrade::Percent(100))
        .await
        .unwrap();

    assert_eq!(outcome.fields_updated, original.len());
    let stored = store.get(DB, "DriverCollection", &id).unwrap();
    for (key, value) in &replacement {
        assert_eq!(stored.get(key), Some(value), "field {key}");
    }
}

#[tokio::test]
async fn test_identifier_is_never_rewritten() {
    let store = MemoryStore::new();
    let id = store.insert(DB, "DriverCollection", driver_payload(3));

    let mut payload = driver_payload(4);
    payload.insert("_id", Bson::String("forged".to_string()));
    let actions = DocumentActions::new(&store, ADDRESS, DB, "DriverCollection", payload);
    actions.update(EditingGrade::Percent(100)).await.unwrap();

    assert!(store.get(DB, "DriverCollection", &id).is_some());
}

#[tokio::test]
async fn test_repeated_deletes_drain_then_self_seed() {
    let store = MemoryStore::new();
    for seed in 0..3 {
        store.insert(DB, "DriverCollection", driver_payload(seed));
    }
    let actions = DocumentActions::new(&store, ADDRESS, DB, "DriverCollection", driver_payload(9));

    for _ in 0..3 {
        let outcome = actions
            .perform(Action::Delete, EditingGrade::default())
            .await
            .unwrap();
        assert!(!outcome.created_target);
    }
    assert_eq!(store.count(DB, "DriverCollection"), 0);

    let outcome = actions
        .perform(Action::Delete, EditingGrade::default())
        .await
        .unwrap();
    assert!(outcome.created_target);
    assert_eq!(store.count(DB, "DriverCollection"), 0);
    assert_eq!(store.deleted_ids(DB, "DriverCollection").len(), 4);
}

#[tokio::test]
async fn test_collections_are_isolated() {
    let store = MemoryStore::new();
    let drivers = DocumentActions::new(&store, ADDRESS, DB, "DriverCollection", driver_payload(1));
    let other_db = DocumentActions::new(&store, ADDRESS, "other", "DriverCollection", driver_payload(1));

    drivers.create().await.unwrap();
    assert_eq!(other_db.fetch_any_identifier().await.unwrap(), None);
    assert_eq!(store.count(DB, "DriverCollection"), 1);
    assert_eq!(store.count("other", "DriverCollection"), 0);
}

#[tokio::test]
async fn test_failure_still_releases_connection() {
    let store = MemoryStore::new();
    let connector: &dyn StoreConnector = &store;
    let actions = DocumentActions::new(connector, ADDRESS, DB, "DriverCollection", driver_payload(1));

    actions.create().await.unwrap();
    store.set_available(false);
    assert!(actions.update(EditingGrade::default()).await.is_err());
    assert_eq!(store.open_connections(), 0);
}
