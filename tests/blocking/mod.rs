use crate::common::{ana, event_transitions, Event, Venue};
use bizcore::blocking::{BlockingRepository, BlockingRuntime, BlockingWorkflowEngine};
use bizcore::config::DatabaseConfig;
use bizcore::database::DatabaseMigrations;
use bizcore::models::{IntervalGranularity, RunningNumberCounter, RunningNumberGenerator};
use bizcore::repository::SearchCriteria;
use std::sync::Arc;

fn sqlite_config(dir: &tempfile::TempDir) -> DatabaseConfig {
    DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("blocking.db").display()),
        dialect: "sqlite".to_string(),
        ..DatabaseConfig::default()
    }
}

#[test]
fn test_blocking_repository_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = Arc::new(BlockingRuntime::new().unwrap());
    let db = runtime.connect(&sqlite_config(&dir)).unwrap();
    runtime
        .block_on(DatabaseMigrations::create_entity_table::<Venue>(&db))
        .unwrap();

    let venues = BlockingRepository::<Venue>::new(Arc::clone(&runtime), db);
    let mut venue = Venue::new("HALL-1", "Main Hall", 300);
    let id = venues.insert(&mut venue, &ana()).unwrap();

    let loaded = venues.get_by_business_code("hall-1").unwrap().expect("venue");
    assert_eq!(loaded.audit.id, Some(id));
    assert_eq!(venues.count(&SearchCriteria::new()).unwrap(), 1);
    assert!(venues.duplicate_code_check(None, "HALL-1").unwrap());

    assert!(venues.soft_delete(id, &ana()).unwrap());
    assert!(venues.get_by_id(id).unwrap().is_none());
}

#[test]
fn test_blocking_workflow_engine() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = Arc::new(BlockingRuntime::with_worker_threads(1).unwrap());
    let db = runtime.connect(&sqlite_config(&dir)).unwrap();
    runtime.block_on(DatabaseMigrations::run_core(&db)).unwrap();
    runtime
        .block_on(DatabaseMigrations::create_entity_table::<Venue>(&db))
        .unwrap();
    runtime
        .block_on(DatabaseMigrations::create_entity_table::<Event>(&db))
        .unwrap();

    let generators = BlockingRepository::<RunningNumberGenerator>::new(Arc::clone(&runtime), db.clone());
    let mut generator = RunningNumberGenerator::new("Event", "EV", IntervalGranularity::Year);
    let generator_id = generators.insert(&mut generator, &ana()).unwrap();
    let counters = BlockingRepository::<RunningNumberCounter>::new(Arc::clone(&runtime), db.clone());
    let mut counter = RunningNumberCounter::current(generator_id).with_interval(Some(2026), None, None);
    counters.insert(&mut counter, &ana()).unwrap();

    let engine =
        BlockingWorkflowEngine::<Event>::new(Arc::clone(&runtime), db, Arc::new(event_transitions()));
    let mut event = Event::named("Launch");
    let outcome = engine
        .save_and_transit(&mut event, &ana(), None, "REGISTER", None)
        .unwrap();

    assert_eq!(outcome.object_code.as_deref(), Some("EV2600000001"));
    assert_eq!(event.workflow_status, "PENDING");
    assert_eq!(engine.history(outcome.entity_id).unwrap().len(), 1);
}
