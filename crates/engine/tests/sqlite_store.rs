use std::sync::Arc;

use chrono::NaiveTime;
use sea_orm::Database;

use engine::{Event, EventLedger, KvStore, SqliteStore, Wallet};
use migration::MigratorTrait;

async fn sqlite_store() -> Arc<dyn KvStore> {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Arc::new(SqliteStore::new(db))
}

#[tokio::test]
async fn set_get_remove_round_trip() {
    let store = sqlite_store().await;

    assert_eq!(store.get("missing").await.unwrap(), None);
    store.set("a", "1").await.unwrap();
    store.set("a", "2").await.unwrap();
    assert_eq!(store.get("a").await.unwrap().as_deref(), Some("2"));

    store.remove("a").await.unwrap();
    assert_eq!(store.get("a").await.unwrap(), None);
    // Removing an absent key is fine.
    store.remove("a").await.unwrap();
}

#[tokio::test]
async fn multi_get_preserves_request_order() {
    let store = sqlite_store().await;

    store.set("b", "two").await.unwrap();
    store.set("a", "one").await.unwrap();

    let request = vec!["b".to_string(), "missing".to_string(), "a".to_string()];
    let pairs = store.multi_get(&request).await.unwrap();
    assert_eq!(
        pairs,
        vec![
            ("b".to_string(), Some("two".to_string())),
            ("missing".to_string(), None),
            ("a".to_string(), Some("one".to_string())),
        ]
    );

    store.multi_remove(&request).await.unwrap();
    assert!(store.keys().await.unwrap().is_empty());
    // Empty batches short-circuit without touching the database.
    assert!(store.multi_get(&[]).await.unwrap().is_empty());
    store.multi_remove(&[]).await.unwrap();
}

#[tokio::test]
async fn ledger_and_wallet_work_through_sqlite() {
    let store = sqlite_store().await;
    let ledger = EventLedger::new(store.clone());
    let wallet = Wallet::new(store);

    let event = Event {
        tag: Some("Food".to_string()),
        amount: Some(30000),
        ..Event::default()
    };
    ledger
        .append_at(
            "2025-10-30",
            event,
            NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
        )
        .await
        .unwrap();
    wallet.top_up(100000).await.unwrap();

    let groups = ledger.events_for_day("2025-10-30").await.unwrap();
    assert_eq!(groups[0].events.len(), 1);
    assert_eq!(
        groups[0].events[0].date_time_pay.as_deref(),
        Some("30/10/2025 07:30")
    );
    assert_eq!(wallet.remaining_balance("2025-10").await.unwrap(), 70000);
}
