//! PostgreSQL integration tests
//!
//! These tests share one PostgreSQL container and truncate the tables before
//! each test, so they are serialized.
//!
//! ```bash
//! cargo test -p health-store --test postgres_integration
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use health_store::{
    AssessmentRecord, AssessmentRepository, Device, DeviceId, DeviceKind, DeviceQuery,
    DeviceRegistry, DeviceUpdate, FamilyHistoryEntry, HealthProfile, MetricQuery, MetricSample,
    MetricStore, MetricStoreExt, MetricType, NotificationRepository, NotificationSetting,
    PostgresHealthStore, ProfileRepository, StoreError, UserId,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_health_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresHealthStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query(
        "TRUNCATE TABLE health_metrics, devices, mental_health_assessments, \
         notification_settings, health_profiles",
    )
    .execute(&pool)
    .await
    .unwrap();

    PostgresHealthStore::new(pool)
}

async fn insert_device(store: &PostgresHealthStore, user_id: UserId, kind: DeviceKind) -> Device {
    store
        .insert_device(Device::connected(
            user_id,
            kind,
            serde_json::json!({ "platform": "test" }),
        ))
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
async fn device_insert_update_and_query() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    let fitbit = insert_device(&store, user_id, DeviceKind::Fitbit).await;
    insert_device(&store, user_id, DeviceKind::AppleWatch).await;

    let fetched = store.get_device(fitbit.id).await.unwrap().unwrap();
    assert_eq!(fetched.kind, DeviceKind::Fitbit);
    assert_eq!(fetched.name, "Fitbit");
    assert!(fetched.is_connected);

    let updated = store
        .update_device(fitbit.id, DeviceUpdate::connected(false))
        .await
        .unwrap();
    assert!(!updated.is_connected);

    let connected = store
        .query_devices(DeviceQuery::for_user(user_id).connected(true))
        .await
        .unwrap();
    assert_eq!(connected.len(), 1);
    assert_eq!(connected[0].kind, DeviceKind::AppleWatch);
}

#[tokio::test]
#[serial]
async fn update_missing_device_is_not_found() {
    let store = get_test_store().await;
    let result = store
        .update_device(DeviceId::new(), DeviceUpdate::synced_at(Utc::now()))
        .await;
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
}

#[tokio::test]
#[serial]
async fn samples_query_with_filters_order_and_limit() {
    let store = get_test_store().await;
    let user_id = UserId::new();
    let device = insert_device(&store, user_id, DeviceKind::Garmin).await;
    let now = Utc::now();

    for (metric, value, age) in [
        (MetricType::HeartRate, 70.0, 30),
        (MetricType::HeartRate, 72.0, 20),
        (MetricType::BloodOxygen, 97.5, 10),
    ] {
        let sample = MetricSample::new(user_id, device.id, metric, value, "unit")
            .at(now - Duration::seconds(age))
            .with_metadata(serde_json::json!({ "confidence": 0.9 }));
        store.insert_sample(sample).await.unwrap();
    }

    let heart = store
        .query_samples(MetricQuery::for_user(user_id).metric_type(MetricType::HeartRate))
        .await
        .unwrap();
    assert_eq!(heart.len(), 2);
    assert_eq!(heart[0].value, 70.0);
    assert_eq!(heart[0].confidence(), Some(0.9));

    let newest = store
        .query_samples(MetricQuery::for_user(user_id).newest_first().limit(1))
        .await
        .unwrap();
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0].metric_type, MetricType::BloodOxygen);

    let latest = store.latest_by_type(user_id).await.unwrap();
    assert_eq!(latest[&MetricType::HeartRate].value, 72.0);
}

#[tokio::test]
#[serial]
async fn oversized_limit_returns_every_sample() {
    let store = get_test_store().await;
    let user_id = UserId::new();
    let device = insert_device(&store, user_id, DeviceKind::Fitbit).await;

    for value in [70.0, 71.0] {
        let sample = MetricSample::new(user_id, device.id, MetricType::HeartRate, value, "bpm");
        store.insert_sample(sample).await.unwrap();
    }

    let samples = store
        .query_samples(MetricQuery::for_user(user_id).limit(usize::MAX))
        .await
        .unwrap();
    assert_eq!(samples.len(), 2);
}

#[tokio::test]
#[serial]
async fn assessments_are_returned_newest_first() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    let mut older = AssessmentRecord::new(user_id, serde_json::json!({ "wellbeing": 50.0 }));
    older.completed_at = Utc::now() - Duration::days(7);
    store.insert_assessment(older).await.unwrap();
    store
        .insert_assessment(AssessmentRecord::new(
            user_id,
            serde_json::json!({ "wellbeing": 75.0 }),
        ))
        .await
        .unwrap();

    let records = store.assessments_for_user(user_id).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].score("wellbeing"), Some(75.0));

    let latest = store.latest_assessment(user_id).await.unwrap().unwrap();
    assert_eq!(latest.score("wellbeing"), Some(75.0));
}

#[tokio::test]
#[serial]
async fn notification_history_is_appended() {
    let store = get_test_store().await;
    let now = Utc::now();

    let mut setting = NotificationSetting::new(UserId::new(), Some("+15550100".to_string()));
    setting.next_notification = Some(now - Duration::minutes(5));
    let id = store.insert_setting(setting).await.unwrap();

    let due = store.due_settings(now).await.unwrap();
    assert_eq!(due.len(), 1);

    store
        .record_notification(id, now, now + Duration::days(7), "first".to_string())
        .await
        .unwrap();
    assert!(store.due_settings(now).await.unwrap().is_empty());

    let later = now + Duration::days(8);
    let due = store.due_settings(later).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].notification_history.len(), 1);
    assert_eq!(due[0].notification_history[0].message, "first");
}

#[tokio::test]
#[serial]
async fn profile_upsert_round_trip() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    let mut profile = HealthProfile {
        user_id,
        age: 34,
        weight: 68.5,
        height: 170.0,
        diagnoses: vec!["Asthma".to_string()],
        family_history: vec![FamilyHistoryEntry {
            condition: "Diabetes".to_string(),
            relation: "Mother".to_string(),
        }],
    };
    store.upsert_profile(profile.clone()).await.unwrap();

    profile.weight = 67.0;
    store.upsert_profile(profile.clone()).await.unwrap();

    let stored = store.get_profile(user_id).await.unwrap().unwrap();
    assert_eq!(stored, profile);
}
