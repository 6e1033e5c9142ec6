//! The same operations produce the same observable results in both dialects.

use crate::common::{ana, ben, TestDatabase, Venue, DIALECTS};
use bizcore::repository::{GenericRepository, SearchCriteria};

#[derive(Debug, PartialEq)]
struct Observed {
    ids: Vec<i64>,
    live_count: i64,
    page_codes: Vec<String>,
    page_count: i64,
    quick_count: i64,
}

async fn run_scenario(test_db: &TestDatabase) -> Observed {
    let venues = GenericRepository::<Venue>::new(test_db.db.clone());
    let mut ids = Vec::new();
    for (i, city) in ["Oslo", "Bergen", "Oslo", "Tromsø", "Oslo", "Bergen", "Oslo"]
        .iter()
        .enumerate()
    {
        let mut venue = Venue::new(&format!("V{i}"), &format!("Hall {i}"), 100 - i as i64)
            .in_city(city);
        ids.push(venues.insert(&mut venue, &ana()).await.unwrap());
    }
    venues.soft_delete(ids[2], &ben()).await.unwrap();

    let live_count = venues.count(&SearchCriteria::new()).await.unwrap();
    let page = venues
        .search_page(
            &SearchCriteria::new()
                .where_eq("City", "Oslo")
                .order_asc("Capacity")
                .paginate(1, 2),
        )
        .await
        .unwrap();
    let page_codes = page
        .items
        .iter()
        .filter_map(|v| v.audit.object_code.clone())
        .collect();
    let quick_count = venues.quick_search_count("hall").await.unwrap();

    Observed {
        ids,
        live_count,
        page_codes,
        page_count: page.page_count,
        quick_count,
    }
}

#[tokio::test]
async fn test_dialects_agree() {
    let mut observations = Vec::new();
    for dialect in DIALECTS {
        let test_db = TestDatabase::new(dialect).await;
        observations.push(run_scenario(&test_db).await);
    }

    assert_eq!(observations[0], observations[1]);
    let observed = &observations[0];
    assert_eq!(observed.ids, vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(observed.live_count, 6);
    // Oslo, live: V0 (100), V4 (96), V6 (94); ascending capacity
    assert_eq!(observed.page_codes, vec!["V6".to_string(), "V4".to_string()]);
    assert_eq!(observed.page_count, 2);
    assert_eq!(observed.quick_count, 6);
}
