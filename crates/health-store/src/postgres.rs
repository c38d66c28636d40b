use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    AssessmentRecord, Device, DeviceId, DeviceKind, DeviceQuery, DeviceUpdate, FamilyHistoryEntry,
    HealthProfile, MetricQuery, MetricSample, MetricType, NotificationEntry, NotificationSetting,
    RecordId, Result, SortOrder, StoreError, UserId,
    store::{
        AssessmentRepository, DeviceRegistry, MetricStore, NotificationRepository,
        ProfileRepository,
    },
};

/// PostgreSQL-backed health store.
#[derive(Clone)]
pub struct PostgresHealthStore {
    pool: PgPool,
}

impl PostgresHealthStore {
    /// Creates a new PostgreSQL health store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and returns a store over a fresh pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        tracing::info!("connected to postgres health store");
        Ok(Self::new(pool))
    }

    /// Runs the database migrations.
    #[tracing::instrument(skip(self))]
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_sample(row: PgRow) -> Result<MetricSample> {
        let metric_type: String = row.try_get("metric_type")?;
        Ok(MetricSample {
            id: RecordId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            device_id: DeviceId::from_uuid(row.try_get::<Uuid, _>("device_id")?),
            metric_type: metric_type
                .parse::<MetricType>()
                .map_err(|e| StoreError::InvalidRecord(e.to_string()))?,
            value: row.try_get("value")?,
            unit: row.try_get("unit")?,
            timestamp: row.try_get("timestamp")?,
            metadata: row.try_get("metadata")?,
        })
    }

    fn row_to_device(row: PgRow) -> Result<Device> {
        let kind: String = row.try_get("device_type")?;
        Ok(Device {
            id: DeviceId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            kind: kind
                .parse::<DeviceKind>()
                .map_err(|e| StoreError::InvalidRecord(e.to_string()))?,
            name: row.try_get("device_name")?,
            external_id: row.try_get("external_id")?,
            is_connected: row.try_get("is_connected")?,
            last_sync: row.try_get("last_sync")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_assessment(row: PgRow) -> Result<AssessmentRecord> {
        Ok(AssessmentRecord {
            id: RecordId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            scores: row.try_get("scores")?,
            completed_at: row.try_get("completed_at")?,
        })
    }

    fn row_to_setting(row: PgRow) -> Result<NotificationSetting> {
        let history: serde_json::Value = row.try_get("notification_history")?;
        let notification_history: Vec<NotificationEntry> = serde_json::from_value(history)?;
        Ok(NotificationSetting {
            id: RecordId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            phone_number: row.try_get("phone_number")?,
            assessment_reminders: row.try_get("assessment_reminders")?,
            reminder_day: row.try_get("reminder_day")?,
            reminder_time: row.try_get("reminder_time")?,
            next_notification: row.try_get("next_notification")?,
            last_notification: row.try_get("last_notification")?,
            notification_history,
        })
    }

    fn row_to_profile(row: PgRow) -> Result<HealthProfile> {
        let age: i32 = row.try_get("age")?;
        let family_history: serde_json::Value = row.try_get("family_history")?;
        let family_history: Vec<FamilyHistoryEntry> = serde_json::from_value(family_history)?;
        Ok(HealthProfile {
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            age: u32::try_from(age)
                .map_err(|_| StoreError::InvalidRecord(format!("negative age {age}")))?,
            weight: row.try_get("weight")?,
            height: row.try_get("height")?,
            diagnoses: row.try_get("diagnoses")?,
            family_history,
        })
    }
}

#[async_trait]
impl MetricStore for PostgresHealthStore {
    async fn insert_sample(&self, sample: MetricSample) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO health_metrics (id, user_id, device_id, metric_type, value, unit, timestamp, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(sample.id.as_uuid())
        .bind(sample.user_id.as_uuid())
        .bind(sample.device_id.as_uuid())
        .bind(sample.metric_type.as_str())
        .bind(sample.value)
        .bind(&sample.unit)
        .bind(sample.timestamp)
        .bind(&sample.metadata)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn query_samples(&self, query: MetricQuery) -> Result<Vec<MetricSample>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, user_id, device_id, metric_type, value, unit, timestamp, metadata \
             FROM health_metrics WHERE TRUE",
        );

        if let Some(user_id) = query.user_id {
            builder.push(" AND user_id = ").push_bind(user_id.as_uuid());
        }
        if let Some(device_id) = query.device_id {
            builder.push(" AND device_id = ").push_bind(device_id.as_uuid());
        }
        if let Some(metric_type) = query.metric_type {
            builder.push(" AND metric_type = ").push_bind(metric_type.as_str());
        }
        if let Some(from) = query.from_timestamp {
            builder.push(" AND timestamp >= ").push_bind(from);
        }
        if let Some(to) = query.to_timestamp {
            builder.push(" AND timestamp <= ").push_bind(to);
        }

        match query.order {
            SortOrder::Ascending => builder.push(" ORDER BY timestamp ASC"),
            SortOrder::Descending => builder.push(" ORDER BY timestamp DESC"),
        };

        if let Some(limit) = query.limit {
            builder
                .push(" LIMIT ")
                .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_sample).collect()
    }
}

#[async_trait]
impl DeviceRegistry for PostgresHealthStore {
    async fn insert_device(&self, device: Device) -> Result<Device> {
        sqlx::query(
            r#"
            INSERT INTO devices (id, user_id, device_type, device_name, external_id, is_connected, last_sync, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(device.id.as_uuid())
        .bind(device.user_id.as_uuid())
        .bind(device.kind.as_str())
        .bind(&device.name)
        .bind(&device.external_id)
        .bind(device.is_connected)
        .bind(device.last_sync)
        .bind(&device.metadata)
        .bind(device.created_at)
        .execute(&self.pool)
        .await?;

        Ok(device)
    }

    async fn update_device(&self, id: DeviceId, update: DeviceUpdate) -> Result<Device> {
        let row = sqlx::query(
            r#"
            UPDATE devices
            SET is_connected = COALESCE($2, is_connected),
                last_sync = COALESCE($3, last_sync)
            WHERE id = $1
            RETURNING id, user_id, device_type, device_name, external_id, is_connected, last_sync, metadata, created_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(update.is_connected)
        .bind(update.last_sync)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_device(row),
            None => Err(StoreError::not_found("Device", id)),
        }
    }

    async fn get_device(&self, id: DeviceId) -> Result<Option<Device>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, device_type, device_name, external_id, is_connected, last_sync, metadata, created_at
            FROM devices
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_device).transpose()
    }

    async fn query_devices(&self, query: DeviceQuery) -> Result<Vec<Device>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, device_type, device_name, external_id, is_connected, last_sync, metadata, created_at
            FROM devices
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::boolean IS NULL OR is_connected = $2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(query.user_id.map(|id| id.as_uuid()))
        .bind(query.connected)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_device).collect()
    }
}

#[async_trait]
impl AssessmentRepository for PostgresHealthStore {
    async fn insert_assessment(&self, record: AssessmentRecord) -> Result<RecordId> {
        sqlx::query(
            r#"
            INSERT INTO mental_health_assessments (id, user_id, scores, completed_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.as_uuid())
        .bind(&record.scores)
        .bind(record.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(record.id)
    }

    async fn assessments_for_user(&self, user_id: UserId) -> Result<Vec<AssessmentRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, scores, completed_at
            FROM mental_health_assessments
            WHERE user_id = $1
            ORDER BY completed_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_assessment).collect()
    }
}

#[async_trait]
impl NotificationRepository for PostgresHealthStore {
    async fn insert_setting(&self, setting: NotificationSetting) -> Result<RecordId> {
        let history = serde_json::to_value(&setting.notification_history)?;

        sqlx::query(
            r#"
            INSERT INTO notification_settings
                (id, user_id, phone_number, assessment_reminders, reminder_day, reminder_time,
                 next_notification, last_notification, notification_history)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(setting.id.as_uuid())
        .bind(setting.user_id.as_uuid())
        .bind(&setting.phone_number)
        .bind(setting.assessment_reminders)
        .bind(&setting.reminder_day)
        .bind(&setting.reminder_time)
        .bind(setting.next_notification)
        .bind(setting.last_notification)
        .bind(history)
        .execute(&self.pool)
        .await?;

        Ok(setting.id)
    }

    async fn due_settings(&self, now: DateTime<Utc>) -> Result<Vec<NotificationSetting>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, phone_number, assessment_reminders, reminder_day, reminder_time,
                   next_notification, last_notification, notification_history
            FROM notification_settings
            WHERE assessment_reminders AND next_notification <= $1
            ORDER BY next_notification ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_setting).collect()
    }

    async fn record_notification(
        &self,
        id: RecordId,
        sent_at: DateTime<Utc>,
        next_notification: DateTime<Utc>,
        message: String,
    ) -> Result<()> {
        let entry = serde_json::to_value([NotificationEntry { sent_at, message }])?;

        let result = sqlx::query(
            r#"
            UPDATE notification_settings
            SET last_notification = $2,
                next_notification = $3,
                notification_history = notification_history || $4::jsonb
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(sent_at)
        .bind(next_notification)
        .bind(entry)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Notification setting", id));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for PostgresHealthStore {
    async fn upsert_profile(&self, profile: HealthProfile) -> Result<()> {
        profile.validate()?;
        let age = i32::try_from(profile.age)
            .map_err(|_| StoreError::InvalidRecord(format!("age out of range: {}", profile.age)))?;
        let family_history = serde_json::to_value(&profile.family_history)?;

        sqlx::query(
            r#"
            INSERT INTO health_profiles (user_id, age, weight, height, diagnoses, family_history)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE
            SET age = EXCLUDED.age,
                weight = EXCLUDED.weight,
                height = EXCLUDED.height,
                diagnoses = EXCLUDED.diagnoses,
                family_history = EXCLUDED.family_history
            "#,
        )
        .bind(profile.user_id.as_uuid())
        .bind(age)
        .bind(profile.weight)
        .bind(profile.height)
        .bind(&profile.diagnoses)
        .bind(family_history)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_profile(&self, user_id: UserId) -> Result<Option<HealthProfile>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, age, weight, height, diagnoses, family_history
            FROM health_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_profile).transpose()
    }
}
