use crate::common::{ana, TestDatabase, Venue, DIALECTS};
use bizcore::error::BizError;
use bizcore::query_builder::{Pagination, SqlValue};
use bizcore::repository::{GenericRepository, SearchCriteria};

async fn seed_venues(repository: &GenericRepository<Venue>, count: i64) -> Vec<i64> {
    let mut ids = Vec::new();
    for i in 1..=count {
        let mut venue = Venue::new(&format!("VENUE-{i:02}"), &format!("Venue {i:02}"), i * 10);
        if i % 3 == 0 {
            venue = venue.in_city("Bergen");
        }
        ids.push(repository.insert(&mut venue, &ana()).await.unwrap());
    }
    ids
}

#[tokio::test]
async fn test_search_page_windows() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let venues = GenericRepository::<Venue>::new(test_db.db.clone());
        seed_venues(&venues, 12).await;

        let page = venues
            .search_page(&SearchCriteria::new().order_asc("Capacity").paginate(2, 5))
            .await
            .unwrap();
        let capacities: Vec<i64> = page.items.iter().map(|v| v.capacity).collect();
        assert_eq!(capacities, vec![60, 70, 80, 90, 100], "{dialect}");
        assert_eq!(page.total, 12);
        assert_eq!(page.page_count, 3);
        assert_eq!(page.page_number, 2);

        let last = venues
            .search_page(&SearchCriteria::new().order_desc("Capacity").paginate(3, 5))
            .await
            .unwrap();
        let capacities: Vec<i64> = last.items.iter().map(|v| v.capacity).collect();
        assert_eq!(capacities, vec![20, 10]);

        let beyond = venues
            .search(&SearchCriteria::new().paginate(4, 5))
            .await
            .unwrap();
        assert!(beyond.is_empty());

        let all = venues.search_page(&SearchCriteria::new()).await.unwrap();
        assert_eq!(all.items.len(), 12);
        assert_eq!(all.page_count, 1);
    }
}

#[tokio::test]
async fn test_criteria_operators() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let venues = GenericRepository::<Venue>::new(test_db.db.clone());
        let ids = seed_venues(&venues, 9).await;

        let in_bergen = SearchCriteria::new().where_eq("City", "Bergen");
        assert_eq!(venues.count(&in_bergen).await.unwrap(), 3, "{dialect}");

        let without_city = SearchCriteria::new().where_null("City");
        assert_eq!(venues.count(&without_city).await.unwrap(), 6);

        let between = SearchCriteria::new().where_between("Capacity", 20, 40);
        assert_eq!(venues.count(&between).await.unwrap(), 3);

        let picked = SearchCriteria::new()
            .where_in("Id", vec![SqlValue::Int(ids[0]), SqlValue::Int(ids[4])])
            .order_asc("Id");
        let found: Vec<i64> = venues
            .search(&picked)
            .await
            .unwrap()
            .iter()
            .filter_map(|v| v.audit.id)
            .collect();
        assert_eq!(found, vec![ids[0], ids[4]]);

        let nothing = SearchCriteria::new().where_in("Id", Vec::new());
        assert_eq!(venues.count(&nothing).await.unwrap(), 0);
        let everything = SearchCriteria::new().where_not_in("Id", Vec::new());
        assert_eq!(venues.count(&everything).await.unwrap(), 9);

        let either = SearchCriteria::new().where_any(vec![
            bizcore::query_builder::Condition::eq("Capacity", 10),
            bizcore::query_builder::Condition::eq("Capacity", 90),
        ]);
        assert_eq!(venues.count(&either).await.unwrap(), 2);
    }
}

#[tokio::test]
async fn test_contains_treats_wildcards_literally() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let venues = GenericRepository::<Venue>::new(test_db.db.clone());

        for (code, name) in [("A", "100% Arena"), ("B", "1000 Seats"), ("C", "under_score")] {
            venues
                .insert(&mut Venue::new(code, name, 1), &ana())
                .await
                .unwrap();
        }

        let percent = SearchCriteria::new().where_contains("ObjectName", "100%");
        assert_eq!(venues.count(&percent).await.unwrap(), 1, "{dialect}");
        let underscore = SearchCriteria::new().where_contains("ObjectName", "r_s");
        assert_eq!(venues.count(&underscore).await.unwrap(), 1);
        let case = SearchCriteria::new().where_contains("ObjectName", "ARENA");
        assert_eq!(venues.count(&case).await.unwrap(), 1);
    }
}

#[tokio::test]
async fn test_quick_search() {
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        let venues = GenericRepository::<Venue>::new(test_db.db.clone());
        let ids = seed_venues(&venues, 12).await;

        let by_code = venues
            .quick_search("code:venue-03", Pagination::unpaged())
            .await
            .unwrap();
        assert_eq!(by_code.len(), 1, "{dialect}");
        assert_eq!(by_code[0].audit.id, Some(ids[2]));

        let by_id = venues
            .quick_search(&format!("id:{}", ids[5]), Pagination::unpaged())
            .await
            .unwrap();
        assert_eq!(by_id[0].capacity, 60);

        // "Venue 1" is a substring of Venue 10, 11 and 12 only
        assert_eq!(venues.quick_search_count("venue 1").await.unwrap(), 3);
        let second_page = venues
            .quick_search("venue 1", Pagination::new(2, 2))
            .await
            .unwrap();
        let capacities: Vec<i64> = second_page.iter().map(|v| v.capacity).collect();
        assert_eq!(capacities, vec![120]);

        assert_eq!(venues.quick_search_count("").await.unwrap(), 12);
        assert!(matches!(
            venues.quick_search_count("id:abc").await,
            Err(BizError::Validation(_))
        ));
    }
}

#[tokio::test]
async fn test_invalid_column_reference_is_rejected() {
    let test_db = TestDatabase::new(bizcore::Dialect::Postgres).await;
    let venues = GenericRepository::<Venue>::new(test_db.db.clone());

    let criteria = SearchCriteria::new().where_eq("Capacity; DROP TABLE venue", 1);
    assert!(matches!(
        venues.search(&criteria).await,
        Err(BizError::Validation(_))
    ));
    assert!(venues.get_all().await.unwrap().is_empty());
}
