use chrono::{DateTime, Utc};

use crate::{Device, DeviceId, MetricSample, MetricType, UserId};

/// Ordering of query results by timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Builder for metric sample queries.
///
/// Allows filtering samples by user, device, metric type and time range,
/// ordered by timestamp.
#[derive(Debug, Clone, Default)]
pub struct MetricQuery {
    /// Filter by owning user.
    pub user_id: Option<UserId>,

    /// Filter by producing device.
    pub device_id: Option<DeviceId>,

    /// Filter by metric type.
    pub metric_type: Option<MetricType>,

    /// Filter by samples at or after this timestamp.
    pub from_timestamp: Option<DateTime<Utc>>,

    /// Filter by samples at or before this timestamp.
    pub to_timestamp: Option<DateTime<Utc>>,

    /// Timestamp ordering.
    pub order: SortOrder,

    /// Maximum number of samples to return.
    pub limit: Option<usize>,
}

impl MetricQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for one user's samples.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn device(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    pub fn metric_type(mut self, metric_type: MetricType) -> Self {
        self.metric_type = Some(metric_type);
        self
    }

    pub fn from_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.from_timestamp = Some(timestamp);
        self
    }

    pub fn to_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.to_timestamp = Some(timestamp);
        self
    }

    /// Returns newest samples first.
    pub fn newest_first(mut self) -> Self {
        self.order = SortOrder::Descending;
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if the sample passes every filter.
    pub fn matches(&self, sample: &MetricSample) -> bool {
        if let Some(user_id) = self.user_id
            && sample.user_id != user_id
        {
            return false;
        }
        if let Some(device_id) = self.device_id
            && sample.device_id != device_id
        {
            return false;
        }
        if let Some(metric_type) = self.metric_type
            && sample.metric_type != metric_type
        {
            return false;
        }
        if let Some(from) = self.from_timestamp
            && sample.timestamp < from
        {
            return false;
        }
        if let Some(to) = self.to_timestamp
            && sample.timestamp > to
        {
            return false;
        }
        true
    }
}

/// Filter for listing devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceQuery {
    pub user_id: Option<UserId>,
    pub connected: Option<bool>,
}

impl DeviceQuery {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            connected: None,
        }
    }

    pub fn connected(mut self, connected: bool) -> Self {
        self.connected = Some(connected);
        self
    }

    pub fn matches(&self, device: &Device) -> bool {
        self.user_id.is_none_or(|id| device.user_id == id)
            && self.connected.is_none_or(|c| device.is_connected == c)
    }
}
