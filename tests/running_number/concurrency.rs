use crate::common::{seed_generator, TestDatabase, DIALECTS};
use bizcore::models::IntervalGranularity;
use bizcore::running_number::RunningNumberAllocator;
use std::collections::HashSet;

const ALLOCATIONS: usize = 20;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_allocations_are_distinct_and_gap_free() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        seed_generator(
            &test_db.db,
            "Order",
            "ORD",
            IntervalGranularity::None,
            (None, None, None),
            0,
        )
        .await;
        let allocator = RunningNumberAllocator::new(test_db.db.clone());

        let handles: Vec<_> = (0..ALLOCATIONS)
            .map(|_| {
                let allocator = allocator.clone();
                tokio::spawn(async move { allocator.allocate_with_pool("Order").await })
            })
            .collect();
        let codes: Vec<String> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.expect("task").expect("allocation"))
            .collect();

        let unique: HashSet<&String> = codes.iter().collect();
        assert_eq!(unique.len(), ALLOCATIONS, "{dialect}");

        let mut numbers: Vec<i64> = codes
            .iter()
            .map(|code| code.trim_start_matches("ORD").parse().unwrap())
            .collect();
        numbers.sort_unstable();
        let expected: Vec<i64> = (1..=ALLOCATIONS as i64).collect();
        assert_eq!(numbers, expected);
        assert!(codes.iter().all(|code| code.len() == "ORD".len() + 8));
    }
}
