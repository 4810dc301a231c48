//! A bounded run against the in-memory store, with log capture.

use simulator_actions::{Action, EditingGrade, MemoryStore};
use simulator_generator::{Locale, Model, RecordGenerator};
use simulator_runner::{simulate, ModelSource, SimulationConfig};
use std::collections::HashSet;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn config(actions: Vec<Action>, iterations: u64) -> SimulationConfig {
    SimulationConfig {
        store_address: "memory://e2e".to_string(),
        database: "montogre".to_string(),
        collection: None,
        pacing: None,
        actions,
        editing_grade: EditingGrade::default(),
        iterations: Some(iterations),
    }
}

fn capture_logs() -> (Capture, tracing::subscriber::DefaultGuard) {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    (capture, tracing::subscriber::set_default(subscriber))
}

#[tokio::test]
async fn test_driver_create_run_writes_and_logs_each_document() {
    let (capture, _guard) = capture_logs();

    let store = MemoryStore::new();
    let mut source =
        ModelSource::with_generator(Model::Driver, RecordGenerator::with_seed(Locale::PtBr, 11));
    let (_tx, mut cancel) = watch::channel(false);

    let report = simulate(&store, &mut source, &config(vec![Action::Create], 5), &mut cancel)
        .await
        .unwrap();

    assert_eq!(report.iterations, 5);
    assert_eq!(report.created, 5);
    assert_eq!(store.count("montogre", "DriverCollection"), 5);

    let ids: HashSet<String> = store
        .inserted_ids("montogre", "DriverCollection")
        .iter()
        .map(|id| id.to_string())
        .collect();
    assert_eq!(ids.len(), 5);

    let logged: Vec<String> = capture
        .lines()
        .into_iter()
        .filter(|line| line.contains("ADD DOCUMENT [DriverCollection - ObjectID: "))
        .collect();
    assert_eq!(logged.len(), 5);
    for id in &ids {
        assert!(logged.iter().any(|line| line.contains(id.as_str())), "no log line for {id}");
    }
    assert!(logged.iter().all(|line| line.contains(" INFO simulator:")));
}

#[tokio::test]
async fn test_mixed_run_keeps_collection_consistent() {
    let store = MemoryStore::new();
    let mut source =
        ModelSource::with_generator(Model::Delivery, RecordGenerator::with_seed(Locale::EnUs, 5));
    let (_tx, mut cancel) = watch::channel(false);

    let report = simulate(&store, &mut source, &config(vec![], 30), &mut cancel)
        .await
        .unwrap();

    assert_eq!(report.iterations, 30);
    let inserted = store.inserted_ids("montogre", "DeliveryCollection").len();
    let deleted = store.deleted_ids("montogre", "DeliveryCollection").len();
    assert_eq!(store.count("montogre", "DeliveryCollection"), inserted - deleted);
    assert_eq!(inserted as u64, report.created + report.fallback_creates);
    assert_eq!(deleted as u64, report.deleted);
}

#[tokio::test]
async fn test_custom_grade_updates_are_starred() {
    let (capture, _guard) = capture_logs();
    let store = MemoryStore::new();
    let (_tx, mut cancel) = watch::channel(false);

    let mut source =
        ModelSource::with_generator(Model::Vehicle, RecordGenerator::with_seed(Locale::PtBr, 3));
    simulate(&store, &mut source, &config(vec![Action::Update], 3), &mut cancel)
        .await
        .unwrap();

    let mut custom = config(vec![Action::Update], 4);
    custom.editing_grade = EditingGrade::Count(2);
    simulate(&store, &mut source, &custom, &mut cancel)
        .await
        .unwrap();

    let lines = capture.lines();
    let plain = lines
        .iter()
        .filter(|line| line.contains("UPDATE DOCUMENT [VehicleCollection - ObjectID: "))
        .count();
    let starred = lines
        .iter()
        .filter(|line| line.contains("UPDATE* DOCUMENT [VehicleCollection - ObjectID: "))
        .count();
    assert_eq!(plain, 3);
    assert_eq!(starred, 4);
}
