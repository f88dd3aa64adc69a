use chrono::{Days, NaiveDate, Utc};
use cruise_feed::{
    CabinPrice, CategoryPrices, CruiseId, CruiseStore, IngestedCruiseRecord, LineId,
};
use cruise_feed_store::SqliteCruiseStore;

fn record(cruise_id: &str, line: u32, sail_date: NaiveDate) -> IngestedCruiseRecord {
    IngestedCruiseRecord {
        cruise_id: CruiseId::new(cruise_id),
        line_id: LineId::new(line),
        ship_id: Some(12),
        name: Some("7 Night Western Caribbean".into()),
        sail_date,
        nights: Some(7),
        currency: Some("USD".into()),
        cheapest: CategoryPrices {
            inside: Some(429.0),
            balcony: Some(899.0),
            ..Default::default()
        },
        cabin_prices: vec![CabinPrice {
            rate_code: "BESTFARE".into(),
            cabin_code: "4D".into(),
            price: 1299.0,
            taxes: Some(150.0),
        }],
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[tokio::test]
async fn upsert_then_read_back_roundtrips() {
    let store = SqliteCruiseStore::open_in_memory().unwrap();
    let original = record("2109407", 3, date(2025, 9, 14));

    store.upsert(&original).await.unwrap();

    let loaded = store.cruise(&CruiseId::new("2109407")).unwrap().unwrap();
    assert_eq!(loaded, original);
}

#[tokio::test]
async fn upsert_replaces_by_cruise_id() {
    let store = SqliteCruiseStore::open_in_memory().unwrap();
    store
        .upsert(&record("2109407", 3, date(2025, 9, 14)))
        .await
        .unwrap();

    let mut updated = record("2109407", 3, date(2025, 9, 14));
    updated.cheapest.inside = Some(399.0);
    store.upsert(&updated).await.unwrap();

    assert_eq!(store.cruise_count().unwrap(), 1);
    let loaded = store.cruise(&CruiseId::new("2109407")).unwrap().unwrap();
    assert_eq!(loaded.cheapest.inside, Some(399.0));
}

#[tokio::test]
async fn upserting_twice_is_idempotent() {
    let store = SqliteCruiseStore::open_in_memory().unwrap();
    let original = record("2109407", 3, date(2025, 9, 14));

    store.upsert(&original).await.unwrap();
    store.upsert(&original).await.unwrap();

    assert_eq!(store.cruise_count().unwrap(), 1);
    let loaded = store.cruise(&CruiseId::new("2109407")).unwrap().unwrap();
    assert_eq!(loaded, original);
}

#[tokio::test]
async fn enumerates_sailings_for_one_line_only() {
    let store = SqliteCruiseStore::open_in_memory().unwrap();
    store
        .upsert(&record("1001", 3, date(2025, 9, 14)))
        .await
        .unwrap();
    store
        .upsert(&record("1002", 3, date(2025, 11, 2)))
        .await
        .unwrap();
    store
        .upsert(&record("2001", 8, date(2025, 9, 20)))
        .await
        .unwrap();

    let sailings = store.sailings_for_line(LineId::new(3)).await.unwrap();

    assert_eq!(sailings.len(), 2);
    assert_eq!(sailings[0].cruise_id, CruiseId::new("1001"));
    assert_eq!(sailings[0].year, 2025);
    assert_eq!(sailings[0].month, 9);
    assert_eq!(sailings[0].ship_id, Some(12));
    assert_eq!(sailings[1].month, 11);
}

#[tokio::test]
async fn window_enumeration_excludes_past_and_far_future() {
    let store = SqliteCruiseStore::open_in_memory().unwrap();
    let today = Utc::now().date_naive();

    let in_window = today.checked_add_days(Days::new(10)).unwrap();
    let past = today.checked_sub_days(Days::new(5)).unwrap();
    let far_future = today.checked_add_days(Days::new(120)).unwrap();

    store.upsert(&record("1001", 3, in_window)).await.unwrap();
    store.upsert(&record("1002", 3, past)).await.unwrap();
    store.upsert(&record("1003", 3, far_future)).await.unwrap();

    let sailings = store.sailings_in_window(30).await.unwrap();

    assert_eq!(sailings.len(), 1);
    assert_eq!(sailings[0].cruise_id, CruiseId::new("1001"));
}

#[tokio::test]
async fn line_sync_bookkeeping_roundtrips() {
    let store = SqliteCruiseStore::open_in_memory().unwrap();

    assert!(store.line_sync_statuses().unwrap().is_empty());

    store.record_line_sync(LineId::new(3)).await.unwrap();
    store.record_line_sync(LineId::new(8)).await.unwrap();
    store.record_line_sync(LineId::new(3)).await.unwrap();

    let statuses = store.line_sync_statuses().unwrap();
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].line_id, LineId::new(3));
    assert!(statuses[0].last_synced_at.is_some());
    assert_eq!(statuses[1].line_id, LineId::new(8));
}
