//! Weekly scheduler gate and the reminder fan-out it triggers.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use apiworker::domain::models::{key, metadata};
use apiworker::domain::ports::{KeyStore, TaskBroker};
use apiworker::services::handlers::reminder_weekly::ReminderWeekly;
use apiworker::services::handlers::Handler;
use apiworker::services::WeeklyScheduler;

use common::{MemoryBroker, MemoryStore};

#[tokio::test]
async fn monday_midnight_emits_once_and_stamps_the_window() {
    let store = Arc::new(MemoryStore::new());
    let broker = Arc::new(MemoryBroker::new());
    let scheduler = WeeklyScheduler::new(
        broker.clone() as Arc<dyn TaskBroker>,
        store.clone() as Arc<dyn KeyStore>,
    );

    // 2024-04-01 is a Monday.
    let monday = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

    scheduler.ensure_at(monday).await.unwrap();
    assert_eq!(broker.created_tasks().len(), 1);
    assert_eq!(
        store.simple_value(key::WEEKLY_STAMP).as_deref(),
        Some("01.04.2024")
    );

    // One minute later the minute gate closes the window.
    let later = Utc.with_ymd_and_hms(2024, 4, 1, 0, 1, 0).unwrap();
    scheduler.ensure_at(later).await.unwrap();
    assert_eq!(broker.created_tasks().len(), 1);

    // Within the same minute the stamp equality gate holds instead.
    let same_minute = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 30).unwrap();
    scheduler.ensure_at(same_minute).await.unwrap();
    assert_eq!(broker.created_tasks().len(), 1);
}

#[tokio::test]
async fn the_gate_stays_closed_off_monday() {
    let store = Arc::new(MemoryStore::new());
    let broker = Arc::new(MemoryBroker::new());
    let scheduler = WeeklyScheduler::new(
        broker.clone() as Arc<dyn TaskBroker>,
        store.clone() as Arc<dyn KeyStore>,
    );

    let tuesday = Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap();
    scheduler.ensure_at(tuesday).await.unwrap();

    assert!(broker.created_tasks().is_empty());
    assert!(store.simple_value(key::WEEKLY_STAMP).is_none());
}

#[tokio::test]
async fn next_week_reopens_the_gate() {
    let store = Arc::new(MemoryStore::new());
    let broker = Arc::new(MemoryBroker::new());
    let scheduler = WeeklyScheduler::new(
        broker.clone() as Arc<dyn TaskBroker>,
        store.clone() as Arc<dyn KeyStore>,
    );

    let monday = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
    scheduler.ensure_at(monday).await.unwrap();

    let next_monday = Utc.with_ymd_and_hms(2024, 4, 8, 0, 0, 0).unwrap();
    scheduler.ensure_at(next_monday).await.unwrap();

    assert_eq!(broker.created_tasks().len(), 2);
    assert_eq!(
        store.simple_value(key::WEEKLY_STAMP).as_deref(),
        Some("08.04.2024")
    );
}

#[tokio::test]
async fn the_emitted_task_reaches_the_weekly_fanout() {
    let store = Arc::new(MemoryStore::new());
    let broker = Arc::new(MemoryBroker::new());
    let scheduler = WeeklyScheduler::new(
        broker.clone() as Arc<dyn TaskBroker>,
        store.clone() as Arc<dyn KeyStore>,
    );

    store.seed_simple(&key::user("1"), r#"{"obj":{}}"#);
    store.seed_simple(&key::user("2"), r#"{"obj":{}}"#);

    let monday = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
    scheduler.ensure_at(monday).await.unwrap();

    let weekly = broker.search().await.unwrap().unwrap();
    let fanout = ReminderWeekly::new(
        store.clone() as Arc<dyn KeyStore>,
        broker.clone() as Arc<dyn TaskBroker>,
        Duration::from_secs(5),
    );
    assert!(fanout.filter(&weekly));
    fanout.ensure(&weekly).await.unwrap();

    let per_user: Vec<_> = broker
        .created_tasks()
        .into_iter()
        .filter(|t| {
            t.matches(&[
                (metadata::TASK_ACTION, "create"),
                (metadata::TASK_AUDIENCE, "user"),
                (metadata::TASK_RESOURCE, "reminder"),
            ])
        })
        .collect();

    assert_eq!(per_user.len(), 2);
    let mut uids: Vec<_> = per_user
        .iter()
        .filter_map(|t| t.get(metadata::USER_ID))
        .collect();
    uids.sort_unstable();
    assert_eq!(uids, vec!["1", "2"]);
}
