use crate::common::{ana, seed_generator, TestDatabase, DIALECTS};
use bizcore::error::BizError;
use bizcore::models::{IntervalGranularity, RunningNumberCounter};
use bizcore::repository::{GenericRepository, SearchCriteria};
use bizcore::running_number::RunningNumberAllocator;
use chrono::NaiveDate;

#[tokio::test]
async fn test_invoice_code_for_month_interval() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        seed_generator(
            &test_db.db,
            "Invoice",
            "INV",
            IntervalGranularity::Month,
            (Some(2025), Some(3), None),
            6,
        )
        .await;

        let allocator = RunningNumberAllocator::new(test_db.db.clone());
        let code = allocator.allocate_with_pool("Invoice").await.unwrap();
        assert_eq!(code, "INV2503000007", "{dialect}");
        let next = allocator.allocate_with_pool("Invoice").await.unwrap();
        assert_eq!(next, "INV2503000008");
    }
}

#[tokio::test]
async fn test_empty_stamp_uses_allocation_date() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        seed_generator(
            &test_db.db,
            "Receipt",
            "R-",
            IntervalGranularity::Day,
            (None, None, None),
            0,
        )
        .await;

        let allocator = RunningNumberAllocator::new(test_db.db.clone());
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let mut tx = test_db.db.begin().await.unwrap();
        let code = allocator.allocate_on(&mut tx, "Receipt", date).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(code, "R-2402290001", "{dialect}");
    }
}

#[tokio::test]
async fn test_missing_counter_is_a_configuration_error() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let allocator = RunningNumberAllocator::new(test_db.db.clone());

        let err = tokio_test::assert_err!(allocator.allocate_with_pool("Unknown").await);
        assert_eq!(
            err,
            BizError::MissingCounter {
                object_class: "Unknown".to_string()
            }
        );
        assert!(err.is_configuration());
    }
}

#[tokio::test]
async fn test_exhausted_counter_rolls_back() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let (_, counter) = seed_generator(
            &test_db.db,
            "Ticket",
            "T",
            IntervalGranularity::Day,
            (Some(2025), Some(1), Some(2)),
            9_999,
        )
        .await;

        let allocator = RunningNumberAllocator::new(test_db.db.clone());
        let err = tokio_test::assert_err!(allocator.allocate_with_pool("Ticket").await);
        assert!(matches!(err, BizError::CounterExhausted { width: 4, .. }), "{dialect}");

        let counters = GenericRepository::<RunningNumberCounter>::new(test_db.db.clone());
        let stored = counters
            .get_by_id(counter.audit.id.unwrap())
            .await
            .unwrap()
            .expect("counter");
        assert_eq!(stored.current_number, 9_999);
    }
}

#[tokio::test]
async fn test_open_interval_restarts_the_sequence() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let (_, old_counter) = seed_generator(
            &test_db.db,
            "Invoice",
            "INV",
            IntervalGranularity::Month,
            (Some(2025), Some(3), None),
            41,
        )
        .await;
        let allocator = RunningNumberAllocator::new(test_db.db.clone());

        let date = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let mut tx = test_db.db.begin().await.unwrap();
        let opened = allocator
            .open_interval(&mut tx, "Invoice", date, &ana())
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(opened.interval_year, Some(2025));
        assert_eq!(opened.interval_month, Some(4));
        assert_eq!(opened.interval_day, None);
        assert_eq!(opened.current_number, 0);

        let code = allocator.allocate_with_pool("Invoice").await.unwrap();
        assert_eq!(code, "INV2504000001", "{dialect}");

        let counters = GenericRepository::<RunningNumberCounter>::new(test_db.db.clone());
        let current = counters
            .count(&SearchCriteria::new().where_eq("IsCurrent", true))
            .await
            .unwrap();
        assert_eq!(current, 1);
        let retired = counters
            .get_by_id(old_counter.audit.id.unwrap())
            .await
            .unwrap()
            .expect("retired counter");
        assert!(!retired.is_current);
        assert_eq!(retired.current_number, 41);
    }
}
