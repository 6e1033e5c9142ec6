use crate::common::{ana, ben, event_transitions, seed_generator, Event, TestDatabase, DIALECTS};
use bizcore::error::BizError;
use bizcore::models::IntervalGranularity;
use bizcore::repository::{GenericRepository, SearchCriteria};
use bizcore::running_number::InMemoryReservationProvider;
use bizcore::workflow::{SessionUser, WorkflowTransitionEngine};
use std::sync::Arc;

async fn engine_for(test_db: &TestDatabase) -> WorkflowTransitionEngine<Event> {
    seed_generator(
        &test_db.db,
        "Event",
        "EV",
        IntervalGranularity::Month,
        (Some(2025), Some(3), None),
        0,
    )
    .await;
    WorkflowTransitionEngine::new(test_db.db.clone(), Arc::new(event_transitions()))
}

#[tokio::test]
async fn test_register_creates_entity_code_and_history() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let engine = engine_for(&test_db).await;

        let mut event = Event::named("Launch");
        let outcome = engine
            .save_and_transit(&mut event, &ana(), None, "REGISTER", Some("first draft"))
            .await
            .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.from_status(), "");
        assert_eq!(outcome.to_status(), "PENDING");
        assert_eq!(outcome.object_code.as_deref(), Some("EV2503000001"), "{dialect}");
        assert_eq!(event.audit.id, Some(outcome.entity_id));
        assert_eq!(event.workflow_status, "PENDING");
        assert_eq!(event.audit.created_by, Some(7));

        let stored = engine
            .repository()
            .get_by_id(outcome.entity_id)
            .await
            .unwrap()
            .expect("event");
        assert_eq!(stored.workflow_status, "PENDING");
        assert_eq!(stored.audit.object_code.as_deref(), Some("EV2503000001"));

        let history = engine.history(outcome.entity_id).await.unwrap();
        assert_eq!(history.len(), 1);
        let row = &history[0];
        assert_eq!(row.from_status, "");
        assert_eq!(row.to_status, "PENDING");
        assert_eq!(row.action_code, "REGISTER");
        assert_eq!(row.user_id, 7);
        assert_eq!(row.org_unit_id, Some(3));
        assert_eq!(row.remark.as_deref(), Some("first draft"));
        assert_eq!(row.object_type, "Event");
        assert_eq!(Some(row.clone()), Some(outcome.history));
    }
}

#[tokio::test]
async fn test_existing_entity_transitions_and_assignment() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let engine = engine_for(&test_db).await;

        let mut event = Event::named("Launch");
        engine
            .save_and_transit(&mut event, &ana(), None, "REGISTER", None)
            .await
            .unwrap();
        let id = event.audit.id.unwrap();

        let assign = engine
            .save_and_transit(&mut event, &ana(), Some(8), "ASSIGN", Some("yours"))
            .await
            .unwrap();
        assert!(!assign.created);
        assert_eq!(assign.from_status(), "PENDING");
        assert_eq!(event.assignment.assigned_user_id, Some(8), "{dialect}");
        assert!(event.assignment.assigned_at.is_some());
        assert_eq!(event.audit.modified_by, Some(7));

        engine
            .save_and_transit(&mut event, &ana(), None, "SELF_PICKUP", None)
            .await
            .unwrap();
        assert_eq!(event.assignment.assigned_user_id, Some(7));

        engine
            .save_and_transit(&mut event, &ben(), None, "APPROVE", None)
            .await
            .unwrap();

        let stored = engine.repository().get_by_id(id).await.unwrap().expect("event");
        assert_eq!(stored.workflow_status, "APPROVED");
        assert_eq!(stored.assignment.assigned_user_id, Some(7));
        assert_eq!(stored.audit.modified_by, Some(8));
        assert_eq!(stored.audit.object_code.as_deref(), Some("EV2503000001"));

        let history = engine.history(id).await.unwrap();
        let actions: Vec<&str> = history.iter().map(|h| h.action_code.as_str()).collect();
        assert_eq!(actions, vec!["REGISTER", "ASSIGN", "SELF_PICKUP", "APPROVE"]);
        assert_eq!(history[1].target_user_id, Some(8));
        assert_eq!(history[3].from_status, "ASSIGNED");
        assert_eq!(history[3].user_id, 8);
    }
}

#[tokio::test]
async fn test_rejected_transitions_write_nothing() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let engine = engine_for(&test_db).await;
        let events = GenericRepository::<Event>::new(test_db.db.clone());

        let mut event = Event::named("Launch");
        let err = engine
            .save_and_transit(&mut event, &ana(), None, "APPROVE", None)
            .await
            .unwrap_err();
        assert!(matches!(err, BizError::InvalidTransition { .. }), "{dialect}");

        let err = engine
            .save_and_transit(&mut event, &ana(), None, "ARCHIVE", None)
            .await
            .unwrap_err();
        assert!(matches!(err, BizError::MissingTransition { .. }));
        assert!(err.is_configuration());

        let err = engine
            .save_and_transit(&mut event, &SessionUser::anonymous(), None, "REGISTER", None)
            .await
            .unwrap_err();
        assert!(matches!(err, BizError::Validation(_)));

        let err = engine
            .save_and_transit(&mut event, &ana(), None, "ASSIGN", None)
            .await
            .unwrap_err();
        assert!(matches!(err, BizError::Validation(_)));

        assert_eq!(event, Event::named("Launch"));
        assert_eq!(events.count(&SearchCriteria::new()).await.unwrap(), 0);

        // The counter was not consumed by any of the above
        engine
            .save_and_transit(&mut event, &ana(), None, "REGISTER", None)
            .await
            .unwrap();
        assert_eq!(event.audit.object_code.as_deref(), Some("EV2503000001"));
    }
}

#[tokio::test]
async fn test_deleted_entity_cannot_transition() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let engine = engine_for(&test_db).await;

        let mut event = Event::named("Launch");
        engine
            .save_and_transit(&mut event, &ana(), None, "REGISTER", None)
            .await
            .unwrap();
        let id = event.audit.id.unwrap();
        engine.repository().soft_delete(id, &ana()).await.unwrap();

        let err = engine
            .save_and_transit(&mut event, &ana(), None, "APPROVE", None)
            .await
            .unwrap_err();
        assert!(matches!(err, BizError::NoRowsAffected(_)), "{dialect}");
        assert!(err.is_not_found());
        assert_eq!(event.workflow_status, "PENDING");
        assert_eq!(engine.history(id).await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_explicit_code_skips_allocation() {
    let test_db = TestDatabase::new(bizcore::Dialect::Sqlite).await;
    let engine = engine_for(&test_db).await;

    let mut manual = Event::named("Gala");
    manual.audit.object_code = Some("GALA-2025".to_string());
    engine
        .save_and_transit(&mut manual, &ana(), None, "REGISTER", None)
        .await
        .unwrap();
    assert_eq!(manual.audit.object_code.as_deref(), Some("GALA-2025"));

    let mut allocated = Event::named("Launch");
    engine
        .save_and_transit(&mut allocated, &ana(), None, "REGISTER", None)
        .await
        .unwrap();
    assert_eq!(allocated.audit.object_code.as_deref(), Some("EV2503000001"));
}

#[tokio::test]
async fn test_reserved_code_is_used_and_claimed() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let reservations = Arc::new(InMemoryReservationProvider::new());
        let engine = engine_for(&test_db)
            .await
            .with_reservations(reservations.clone());

        reservations.reserve(7, "Event", "EV-PAPER-1");
        reservations.reserve(8, "Event", "EV-PAPER-2");

        let mut event = Event::named("Launch");
        let outcome = engine
            .save_and_transit(&mut event, &ana(), None, "REGISTER", None)
            .await
            .unwrap();
        assert_eq!(outcome.object_code.as_deref(), Some("EV-PAPER-1"), "{dialect}");

        let claims = reservations.claims();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].object_id, outcome.entity_id);
        assert_eq!(reservations.pending_count(), 1);

        // No reservation left for Ana: back to the allocator
        let mut second = Event::named("Follow-up");
        engine
            .save_and_transit(&mut second, &ana(), None, "REGISTER", None)
            .await
            .unwrap();
        assert_eq!(second.audit.object_code.as_deref(), Some("EV2503000001"));
    }
}
