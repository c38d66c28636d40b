//! Records persisted by the health store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DeviceId, DeviceKind, MetricType, RecordId, Result, StoreError, UserId};

/// A single vital-sign reading. Samples are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub id: RecordId,
    pub user_id: UserId,
    pub device_id: DeviceId,
    pub metric_type: MetricType,
    pub value: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl MetricSample {
    /// Creates a sample stamped with the current time.
    pub fn new(
        user_id: UserId,
        device_id: DeviceId,
        metric_type: MetricType,
        value: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            user_id,
            device_id,
            metric_type,
            value,
            unit: unit.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    /// Overrides the sample timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attaches metadata such as sensor confidence.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Reads the sensor confidence from metadata, if present.
    pub fn confidence(&self) -> Option<f64> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("confidence"))
            .and_then(serde_json::Value::as_f64)
    }
}

/// A wearable registered to a user. Devices are never hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub user_id: UserId,
    #[serde(rename = "device_type")]
    pub kind: DeviceKind,
    #[serde(rename = "device_name")]
    pub name: String,
    /// Vendor-side identifier, `<device_type>_<unix millis>`.
    pub external_id: String,
    pub is_connected: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Device {
    /// Creates a freshly connected device record.
    pub fn connected(user_id: UserId, kind: DeviceKind, metadata: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: DeviceId::new(),
            user_id,
            kind,
            name: kind.display_name().to_string(),
            external_id: format!("{}_{}", kind.as_str(), now.timestamp_millis()),
            is_connected: true,
            last_sync: None,
            metadata,
            created_at: now,
        }
    }
}

/// Partial update applied to a device.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceUpdate {
    pub is_connected: Option<bool>,
    pub last_sync: Option<DateTime<Utc>>,
}

impl DeviceUpdate {
    pub fn connected(is_connected: bool) -> Self {
        Self {
            is_connected: Some(is_connected),
            ..Default::default()
        }
    }

    pub fn synced_at(timestamp: DateTime<Utc>) -> Self {
        Self {
            last_sync: Some(timestamp),
            ..Default::default()
        }
    }

    pub fn apply(&self, device: &mut Device) {
        if let Some(is_connected) = self.is_connected {
            device.is_connected = is_connected;
        }
        if let Some(last_sync) = self.last_sync {
            device.last_sync = Some(last_sync);
        }
    }
}

/// A completed mental-health assessment.
///
/// Scores are kept as the JSON object the assessment engine produced so the
/// store does not depend on the engine's types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: RecordId,
    pub user_id: UserId,
    pub scores: serde_json::Value,
    pub completed_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn new(user_id: UserId, scores: serde_json::Value) -> Self {
        Self {
            id: RecordId::new(),
            user_id,
            scores,
            completed_at: Utc::now(),
        }
    }

    /// Reads one numeric score by category name.
    pub fn score(&self, category: &str) -> Option<f64> {
        self.scores.get(category).and_then(serde_json::Value::as_f64)
    }
}

/// One reminder that was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEntry {
    pub sent_at: DateTime<Utc>,
    pub message: String,
}

/// Per-user reminder preferences and schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSetting {
    pub id: RecordId,
    pub user_id: UserId,
    pub phone_number: Option<String>,
    pub assessment_reminders: bool,
    /// Upper-case weekday name, e.g. `MONDAY`.
    pub reminder_day: String,
    /// `HH:MM`, 24-hour clock, UTC.
    pub reminder_time: String,
    pub next_notification: Option<DateTime<Utc>>,
    pub last_notification: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notification_history: Vec<NotificationEntry>,
}

impl NotificationSetting {
    /// Creates enabled reminder settings with the default Monday 10:00 slot.
    pub fn new(user_id: UserId, phone_number: Option<String>) -> Self {
        Self {
            id: RecordId::new(),
            user_id,
            phone_number,
            assessment_reminders: true,
            reminder_day: "MONDAY".to_string(),
            reminder_time: "10:00".to_string(),
            next_notification: None,
            last_notification: None,
            notification_history: Vec::new(),
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.assessment_reminders && self.next_notification.is_some_and(|next| next <= now)
    }
}

/// A relative's condition recorded in the health profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyHistoryEntry {
    pub condition: String,
    pub relation: String,
}

/// Baseline health information collected during onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthProfile {
    pub user_id: UserId,
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    #[serde(default)]
    pub diagnoses: Vec<String>,
    #[serde(default)]
    pub family_history: Vec<FamilyHistoryEntry>,
}

impl HealthProfile {
    /// Age, weight and height must all be at least 1.
    pub fn validate(&self) -> Result<()> {
        if self.age < 1 || self.weight < 1.0 || self.height < 1.0 {
            return Err(StoreError::InvalidRecord(
                "Please enter valid values".to_string(),
            ));
        }
        Ok(())
    }
}
