use crate::common::{ana, ben, Event, TestDatabase, Venue, DIALECTS};
use bizcore::error::BizError;
use bizcore::repository::GenericRepository;
use bizcore::workflow::SessionUser;

#[tokio::test]
async fn test_insert_stamps_and_reads_back() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let venues = GenericRepository::<Venue>::new(test_db.db.clone());

        let mut venue = Venue::new("HALL-1", "Main Hall", 300).in_city("Oslo");
        let id = venues.insert(&mut venue, &ana()).await.unwrap();
        assert_eq!(venue.audit.id, Some(id));
        assert_eq!(venue.audit.created_by, Some(7));
        assert!(venue.audit.created_at.is_some());

        let loaded = venues.get_by_id(id).await.unwrap().expect("venue");
        assert_eq!(loaded.capacity, 300);
        assert_eq!(loaded.city.as_deref(), Some("Oslo"));
        assert_eq!(loaded.audit.object_code.as_deref(), Some("HALL-1"));
        assert_eq!(loaded.audit.created_at, venue.audit.created_at);
        assert!(!loaded.audit.is_deleted);

        let by_code = venues.get_by_business_code("hall-1").await.unwrap();
        assert_eq!(by_code.map(|v| v.audit.id), Some(Some(id)), "{dialect}");
    }
}

#[tokio::test]
async fn test_soft_deleted_rows_are_invisible() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let venues = GenericRepository::<Venue>::new(test_db.db.clone());

        let mut venue = Venue::new("HALL-2", "Side Hall", 80);
        let id = venues.insert(&mut venue, &ana()).await.unwrap();

        assert!(venues.soft_delete(id, &ben()).await.unwrap());
        assert!(venues.get_by_id(id).await.unwrap().is_none());
        assert!(venues.get_by_business_code("HALL-2").await.unwrap().is_none());
        assert!(venues.get_all().await.unwrap().is_empty());

        // Already deleted: nothing to do
        assert!(!venues.soft_delete(id, &ben()).await.unwrap());

        // The row is still there until removed physically
        assert!(venues.hard_delete(id).await.unwrap());
        assert!(!venues.hard_delete(id).await.unwrap());
    }
}

#[tokio::test]
async fn test_update_stamps_modifier() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let venues = GenericRepository::<Venue>::new(test_db.db.clone());

        let mut venue = Venue::new("HALL-3", "Annex", 40);
        let id = venues.insert(&mut venue, &ana()).await.unwrap();
        let created_at = venue.audit.created_at;

        venue.capacity = 55;
        assert!(venues.update(&mut venue, &ben()).await.unwrap());
        assert_eq!(venue.audit.modified_by, Some(8));

        let loaded = venues.get_by_id(id).await.unwrap().expect("venue");
        assert_eq!(loaded.capacity, 55);
        assert_eq!(loaded.audit.created_by, Some(7));
        assert_eq!(loaded.audit.created_at, created_at);
        assert_eq!(loaded.audit.modified_by, Some(8));

        venues.soft_delete(id, &ana()).await.unwrap();
        venue.capacity = 60;
        assert!(!venues.update(&mut venue, &ana()).await.unwrap());
    }
}

#[tokio::test]
async fn test_writes_need_a_resolvable_user() {
    let test_db = TestDatabase::new(bizcore::Dialect::Sqlite).await;
    let venues = GenericRepository::<Venue>::new(test_db.db.clone());

    let mut venue = Venue::new("HALL-4", "Loft", 20);
    let err = venues
        .insert(&mut venue, &SessionUser::anonymous())
        .await
        .unwrap_err();
    assert!(matches!(err, BizError::Validation(_)));
    assert!(venue.audit.id.is_none());
    assert!(venues.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_codes_are_case_insensitive() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let venues = GenericRepository::<Venue>::new(test_db.db.clone());

        let mut first = Venue::new("HALL-1", "Main Hall", 300);
        let first_id = venues.insert(&mut first, &ana()).await.unwrap();

        assert!(venues.duplicate_code_check(None, "hall-1").await.unwrap());
        assert!(!venues
            .duplicate_code_check(Some(first_id), "HALL-1")
            .await
            .unwrap());
        assert!(!venues.duplicate_code_check(None, "  ").await.unwrap());

        let mut clash = Venue::new("Hall-1", "Copy", 10);
        let err = venues.insert(&mut clash, &ana()).await.unwrap_err();
        assert_eq!(
            err,
            BizError::DuplicateCode {
                entity_type: "Venue".to_string(),
                code: "Hall-1".to_string()
            },
            "{dialect}"
        );
        assert!(err.is_constraint_violation());
        assert!(clash.audit.id.is_none());

        // A deleted row releases its code
        venues.soft_delete(first_id, &ana()).await.unwrap();
        assert!(!venues.duplicate_code_check(None, "HALL-1").await.unwrap());
        venues.insert(&mut clash, &ana()).await.unwrap();
    }
}

#[tokio::test]
async fn test_non_ascii_codes_and_names_match_themselves() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let venues = GenericRepository::<Venue>::new(test_db.db.clone());

        let mut venue = Venue::new("café-1", "Tromsø Hall", 120);
        let id = venues.insert(&mut venue, &ana()).await.unwrap();

        let exact = venues.get_by_business_code("café-1").await.unwrap();
        assert_eq!(exact.map(|v| v.audit.id), Some(Some(id)), "{dialect}");
        let ascii_case = venues.get_by_business_code("CAFé-1").await.unwrap();
        assert_eq!(ascii_case.map(|v| v.audit.id), Some(Some(id)), "{dialect}");

        assert!(venues.duplicate_code_check(None, "café-1").await.unwrap(), "{dialect}");
        assert!(venues.duplicate_code_check(None, "CAFé-1").await.unwrap());

        let mut clash = Venue::new("CAFé-1", "Copy", 10);
        let err = venues.insert(&mut clash, &ana()).await.unwrap_err();
        assert!(matches!(err, BizError::DuplicateCode { .. }), "{dialect}: {err:?}");

        assert_eq!(venues.quick_search_count("Tromsø Hall").await.unwrap(), 1, "{dialect}");
        assert_eq!(venues.quick_search_count("tromsø").await.unwrap(), 1);
        assert_eq!(venues.quick_search_count("code:café-1").await.unwrap(), 1);
    }
}

#[tokio::test]
async fn test_association_is_left_joined() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let venues = GenericRepository::<Venue>::new(test_db.db.clone());
        let events = GenericRepository::<Event>::new(test_db.db.clone());

        let mut venue = Venue::new("HALL-1", "Main Hall", 300);
        let venue_id = venues.insert(&mut venue, &ana()).await.unwrap();

        let mut event = Event::named("Launch").at_venue(venue_id);
        let event_id = events.insert(&mut event, &ana()).await.unwrap();
        let mut unplaced = Event::named("Webinar");
        events.insert(&mut unplaced, &ana()).await.unwrap();

        let loaded = events.get_by_id(event_id).await.unwrap().expect("event");
        assert_eq!(loaded.venue_name.as_deref(), Some("Main Hall"), "{dialect}");
        assert_eq!(loaded.venue_id, Some(venue_id));
        assert_eq!(events.get_all().await.unwrap().len(), 2);

        // A deleted association no longer loads, the event still does
        venues.soft_delete(venue_id, &ana()).await.unwrap();
        let loaded = events.get_by_id(event_id).await.unwrap().expect("event");
        assert_eq!(loaded.venue_name, None);
    }
}
