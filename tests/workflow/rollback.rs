use crate::common::{ana, event_transitions, seed_generator, Event, TestDatabase, DIALECTS};
use bizcore::error::BizError;
use bizcore::models::{AppendOnlyRecord, IntervalGranularity, RunningNumberCounter, WorkflowHistory};
use bizcore::repository::{GenericRepository, SearchCriteria};
use bizcore::running_number::InMemoryReservationProvider;
use bizcore::workflow::WorkflowTransitionEngine;
use bizcore::query_builder::Dialect;
use sqlx::Row;
use std::sync::Arc;

async fn history_row_count(test_db: &TestDatabase, dialect: Dialect) -> i64 {
    let sql = format!(
        "SELECT COUNT(*) FROM {}",
        dialect.table_name(&WorkflowHistory::TABLE)
    );
    let row = sqlx::query(&sql)
        .fetch_one(test_db.db.pool())
        .await
        .unwrap();
    row.try_get::<i64, _>(0).unwrap()
}

#[tokio::test]
async fn test_history_failure_rolls_back_entity_change() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        seed_generator(
            &test_db.db,
            "Event",
            "EV",
            IntervalGranularity::Month,
            (Some(2025), Some(3), None),
            0,
        )
        .await;
        let engine =
            WorkflowTransitionEngine::<Event>::new(test_db.db.clone(), Arc::new(event_transitions()));

        let mut event = Event::named("Launch");
        engine
            .save_and_transit(&mut event, &ana(), None, "REGISTER", None)
            .await
            .unwrap();
        let id = event.audit.id.unwrap();
        let before = event.clone();

        let drop_history = format!(
            "DROP TABLE {}",
            dialect.table_name(&WorkflowHistory::TABLE)
        );
        sqlx::query(&drop_history)
            .execute(test_db.db.pool())
            .await
            .unwrap();

        let err = engine
            .save_and_transit(&mut event, &ana(), Some(8), "ASSIGN", None)
            .await
            .unwrap_err();
        assert!(matches!(err, BizError::Database(_)), "{dialect}: {err:?}");

        // Neither the caller's value nor the stored row moved
        assert_eq!(event, before);
        let stored = engine.repository().get_by_id(id).await.unwrap().expect("event");
        assert_eq!(stored.workflow_status, "PENDING");
        assert_eq!(stored.assignment.assigned_user_id, None);

        // A new entity loses its allocation too
        let mut other = Event::named("Webinar");
        engine
            .save_and_transit(&mut other, &ana(), None, "REGISTER", None)
            .await
            .unwrap_err();
        assert!(other.audit.id.is_none());
        assert!(other.audit.object_code.is_none());
        assert_eq!(
            engine.repository().count(&SearchCriteria::new()).await.unwrap(),
            1
        );
        let counters = GenericRepository::<RunningNumberCounter>::new(test_db.db.clone());
        let counter = counters.get_all().await.unwrap().remove(0);
        assert_eq!(counter.current_number, 1);
    }
}

#[tokio::test]
async fn test_insert_failure_keeps_reservation_unclaimed() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let reservations = Arc::new(InMemoryReservationProvider::new());
        let engine =
            WorkflowTransitionEngine::<Event>::new(test_db.db.clone(), Arc::new(event_transitions()))
                .with_reservations(reservations.clone());

        let mut existing = Event::named("Original");
        existing.audit.object_code = Some("EV-TAKEN".to_string());
        engine
            .save_and_transit(&mut existing, &ana(), None, "REGISTER", None)
            .await
            .unwrap();

        reservations.reserve(7, "Event", "ev-taken");
        let mut event = Event::named("Clash");
        let err = engine
            .save_and_transit(&mut event, &ana(), None, "REGISTER", None)
            .await
            .unwrap_err();
        assert!(
            matches!(err, BizError::DuplicateCode { ref code, .. } if code == "ev-taken"),
            "{dialect}: {err:?}"
        );

        assert!(event.audit.id.is_none());
        assert!(event.audit.object_code.is_none());
        assert!(reservations.claims().is_empty());
        assert_eq!(reservations.pending_count(), 1);
        assert_eq!(
            engine.repository().count(&SearchCriteria::new()).await.unwrap(),
            1
        );
        // Only the original registration left a history row
        assert_eq!(history_row_count(&test_db, dialect).await, 1, "{dialect}");
    }
}

#[tokio::test]
async fn test_history_failure_keeps_reservation_unclaimed() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let reservations = Arc::new(InMemoryReservationProvider::new());
        let engine =
            WorkflowTransitionEngine::<Event>::new(test_db.db.clone(), Arc::new(event_transitions()))
                .with_reservations(reservations.clone());

        let drop_history = format!(
            "DROP TABLE {}",
            dialect.table_name(&WorkflowHistory::TABLE)
        );
        sqlx::query(&drop_history)
            .execute(test_db.db.pool())
            .await
            .unwrap();

        reservations.reserve(7, "Event", "EV-RESERVED");
        let mut event = Event::named("Launch");
        let err = engine
            .save_and_transit(&mut event, &ana(), None, "REGISTER", None)
            .await
            .unwrap_err();
        assert!(matches!(err, BizError::Database(_)), "{dialect}: {err:?}");

        // The claim comes after the history row, so it never ran
        assert!(event.audit.object_code.is_none());
        assert!(reservations.claims().is_empty(), "{dialect}");
        assert_eq!(reservations.pending_count(), 1);
        assert_eq!(
            engine.repository().count(&SearchCriteria::new()).await.unwrap(),
            0
        );
    }
}
