use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    AssessmentRecord, Device, DeviceId, DeviceQuery, DeviceUpdate, HealthProfile, MetricQuery,
    MetricSample, MetricType, NotificationSetting, RecordId, Result, UserId,
};

/// Append-only storage for vital-sign samples.
///
/// Implementations must accept unsynchronized concurrent appends from many
/// monitoring loops.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Appends a single sample.
    async fn insert_sample(&self, sample: MetricSample) -> Result<()>;

    /// Retrieves samples matching a query, ordered by timestamp.
    async fn query_samples(&self, query: MetricQuery) -> Result<Vec<MetricSample>>;
}

/// Extension trait providing dashboard views over a metric store.
#[async_trait]
pub trait MetricStoreExt: MetricStore {
    /// Returns the most recent sample of each metric type for a user.
    async fn latest_by_type(&self, user_id: UserId) -> Result<BTreeMap<MetricType, MetricSample>> {
        let samples = self
            .query_samples(MetricQuery::for_user(user_id).newest_first())
            .await?;

        let mut latest = BTreeMap::new();
        for sample in samples {
            latest.entry(sample.metric_type).or_insert(sample);
        }
        Ok(latest)
    }

    /// Returns a user's samples grouped by metric type, oldest first.
    async fn series_by_type(
        &self,
        user_id: UserId,
    ) -> Result<BTreeMap<MetricType, Vec<MetricSample>>> {
        let samples = self.query_samples(MetricQuery::for_user(user_id)).await?;

        let mut series: BTreeMap<MetricType, Vec<MetricSample>> = BTreeMap::new();
        for sample in samples {
            series.entry(sample.metric_type).or_default().push(sample);
        }
        Ok(series)
    }
}

// Blanket implementation for all MetricStore implementations
impl<T: MetricStore + ?Sized> MetricStoreExt for T {}

/// Registry of the devices users have connected.
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    async fn insert_device(&self, device: Device) -> Result<Device>;

    /// Applies a partial update and returns the updated device.
    ///
    /// Fails with `NotFound` if the device does not exist.
    async fn update_device(&self, id: DeviceId, update: DeviceUpdate) -> Result<Device>;

    async fn get_device(&self, id: DeviceId) -> Result<Option<Device>>;

    /// Lists devices matching the filter, oldest first.
    async fn query_devices(&self, query: DeviceQuery) -> Result<Vec<Device>>;
}

/// Storage for completed assessments.
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    async fn insert_assessment(&self, record: AssessmentRecord) -> Result<RecordId>;

    /// Returns a user's assessments, newest first.
    async fn assessments_for_user(&self, user_id: UserId) -> Result<Vec<AssessmentRecord>>;

    async fn latest_assessment(&self, user_id: UserId) -> Result<Option<AssessmentRecord>> {
        Ok(self.assessments_for_user(user_id).await?.into_iter().next())
    }
}

/// Storage for reminder settings and their history.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert_setting(&self, setting: NotificationSetting) -> Result<RecordId>;

    /// Returns enabled settings whose next notification is at or before `now`.
    async fn due_settings(&self, now: DateTime<Utc>) -> Result<Vec<NotificationSetting>>;

    /// Records a sent reminder: sets last/next notification and appends to history.
    async fn record_notification(
        &self,
        id: RecordId,
        sent_at: DateTime<Utc>,
        next_notification: DateTime<Utc>,
        message: String,
    ) -> Result<()>;
}

/// Storage for onboarding health profiles, one per user.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn upsert_profile(&self, profile: HealthProfile) -> Result<()>;

    async fn get_profile(&self, user_id: UserId) -> Result<Option<HealthProfile>>;
}

/// Every repository the services need, behind one bound.
pub trait HealthStore:
    MetricStore + DeviceRegistry + AssessmentRepository + NotificationRepository + ProfileRepository
{
}

impl<T> HealthStore for T where
    T: MetricStore
        + DeviceRegistry
        + AssessmentRepository
        + NotificationRepository
        + ProfileRepository
{
}
