use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    AssessmentRecord, Device, DeviceId, DeviceQuery, DeviceUpdate, HealthProfile, MetricQuery,
    MetricSample, NotificationEntry, NotificationSetting, RecordId, Result, SortOrder, StoreError,
    UserId,
    store::{
        AssessmentRepository, DeviceRegistry, MetricStore, NotificationRepository,
        ProfileRepository,
    },
};

/// In-memory health store for tests and local runs.
///
/// Provides the same interface as the PostgreSQL implementation. Cloning
/// shares the underlying collections.
#[derive(Clone, Default)]
pub struct InMemoryHealthStore {
    samples: Arc<RwLock<Vec<MetricSample>>>,
    devices: Arc<RwLock<Vec<Device>>>,
    assessments: Arc<RwLock<Vec<AssessmentRecord>>>,
    settings: Arc<RwLock<HashMap<RecordId, NotificationSetting>>>,
    profiles: Arc<RwLock<HashMap<UserId, HealthProfile>>>,
    fail_on_insert: Arc<AtomicBool>,
}

impl InMemoryHealthStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent insert fail with `StoreError::Unavailable`.
    pub fn set_fail_on_insert(&self, fail: bool) {
        self.fail_on_insert.store(fail, Ordering::SeqCst);
    }

    /// Returns the total number of samples stored.
    pub async fn sample_count(&self) -> usize {
        self.samples.read().await.len()
    }

    /// Returns the total number of assessments stored.
    pub async fn assessment_count(&self) -> usize {
        self.assessments.read().await.len()
    }

    /// Returns a copy of a notification setting.
    pub async fn setting(&self, id: RecordId) -> Option<NotificationSetting> {
        self.settings.read().await.get(&id).cloned()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_on_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("insert rejected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MetricStore for InMemoryHealthStore {
    async fn insert_sample(&self, sample: MetricSample) -> Result<()> {
        self.check_writable()?;
        self.samples.write().await.push(sample);
        Ok(())
    }

    async fn query_samples(&self, query: MetricQuery) -> Result<Vec<MetricSample>> {
        let store = self.samples.read().await;
        let mut samples: Vec<_> = store.iter().filter(|s| query.matches(s)).cloned().collect();

        // Stable sort keeps insertion order for equal timestamps
        samples.sort_by_key(|s| s.timestamp);
        if query.order == SortOrder::Descending {
            samples.reverse();
        }

        if let Some(limit) = query.limit {
            samples.truncate(limit);
        }
        Ok(samples)
    }
}

#[async_trait]
impl DeviceRegistry for InMemoryHealthStore {
    async fn insert_device(&self, device: Device) -> Result<Device> {
        self.check_writable()?;
        self.devices.write().await.push(device.clone());
        Ok(device)
    }

    async fn update_device(&self, id: DeviceId, update: DeviceUpdate) -> Result<Device> {
        let mut devices = self.devices.write().await;
        let device = devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::not_found("Device", id))?;
        update.apply(device);
        Ok(device.clone())
    }

    async fn get_device(&self, id: DeviceId) -> Result<Option<Device>> {
        let devices = self.devices.read().await;
        Ok(devices.iter().find(|d| d.id == id).cloned())
    }

    async fn query_devices(&self, query: DeviceQuery) -> Result<Vec<Device>> {
        let devices = self.devices.read().await;
        Ok(devices.iter().filter(|d| query.matches(d)).cloned().collect())
    }
}

#[async_trait]
impl AssessmentRepository for InMemoryHealthStore {
    async fn insert_assessment(&self, record: AssessmentRecord) -> Result<RecordId> {
        self.check_writable()?;
        let id = record.id;
        self.assessments.write().await.push(record);
        Ok(id)
    }

    async fn assessments_for_user(&self, user_id: UserId) -> Result<Vec<AssessmentRecord>> {
        let store = self.assessments.read().await;
        let mut records: Vec<_> = store
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.completed_at);
        records.reverse();
        Ok(records)
    }
}

#[async_trait]
impl NotificationRepository for InMemoryHealthStore {
    async fn insert_setting(&self, setting: NotificationSetting) -> Result<RecordId> {
        self.check_writable()?;
        let id = setting.id;
        self.settings.write().await.insert(id, setting);
        Ok(id)
    }

    async fn due_settings(&self, now: DateTime<Utc>) -> Result<Vec<NotificationSetting>> {
        let settings = self.settings.read().await;
        let mut due: Vec<_> = settings.values().filter(|s| s.is_due(now)).cloned().collect();
        due.sort_by_key(|s| s.next_notification);
        Ok(due)
    }

    async fn record_notification(
        &self,
        id: RecordId,
        sent_at: DateTime<Utc>,
        next_notification: DateTime<Utc>,
        message: String,
    ) -> Result<()> {
        let mut settings = self.settings.write().await;
        let setting = settings
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Notification setting", id))?;
        setting.last_notification = Some(sent_at);
        setting.next_notification = Some(next_notification);
        setting
            .notification_history
            .push(NotificationEntry { sent_at, message });
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryHealthStore {
    async fn upsert_profile(&self, profile: HealthProfile) -> Result<()> {
        profile.validate()?;
        self.check_writable()?;
        self.profiles.write().await.insert(profile.user_id, profile);
        Ok(())
    }

    async fn get_profile(&self, user_id: UserId) -> Result<Option<HealthProfile>> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }
}
