//! Closed sets of device and metric kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseKindError {}

/// Wearable platforms a user can connect.
///
/// Every variant shares the same connection contract; they differ only in
/// how they are presented and how their samples are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Fitbit,
    AppleWatch,
    GoogleFit,
    SamsungHealth,
    Garmin,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 5] = [
        DeviceKind::Fitbit,
        DeviceKind::AppleWatch,
        DeviceKind::GoogleFit,
        DeviceKind::SamsungHealth,
        DeviceKind::Garmin,
    ];

    /// Wire name, as stored in the `device_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Fitbit => "fitbit",
            DeviceKind::AppleWatch => "apple_watch",
            DeviceKind::GoogleFit => "google_fit",
            DeviceKind::SamsungHealth => "samsung_health",
            DeviceKind::Garmin => "garmin",
        }
    }

    /// Human readable platform name.
    pub fn display_name(&self) -> &'static str {
        match self {
            DeviceKind::Fitbit => "Fitbit",
            DeviceKind::AppleWatch => "Apple Watch",
            DeviceKind::GoogleFit => "Google Fit",
            DeviceKind::SamsungHealth => "Samsung Health",
            DeviceKind::Garmin => "Garmin",
        }
    }

    /// Source label attached to every sample this platform produces.
    pub fn payload_label(&self) -> &'static str {
        match self {
            DeviceKind::Fitbit => "fitbit_device",
            DeviceKind::AppleWatch => "apple_watch_device",
            DeviceKind::GoogleFit => "google_fit_device",
            DeviceKind::SamsungHealth => "samsung_health_device",
            DeviceKind::Garmin => "garmin_device",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseKindError {
                kind: "device type",
                value: s.to_string(),
            })
    }
}

/// Vital-sign and activity measurements a sample can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    HeartRate,
    Steps,
    BloodOxygen,
    Temperature,
    Sleep,
    Stress,
}

impl MetricType {
    pub const ALL: [MetricType; 6] = [
        MetricType::HeartRate,
        MetricType::Steps,
        MetricType::BloodOxygen,
        MetricType::Temperature,
        MetricType::Sleep,
        MetricType::Stress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::HeartRate => "heart_rate",
            MetricType::Steps => "steps",
            MetricType::BloodOxygen => "blood_oxygen",
            MetricType::Temperature => "temperature",
            MetricType::Sleep => "sleep",
            MetricType::Stress => "stress",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricType::ALL
            .into_iter()
            .find(|metric| metric.as_str() == s)
            .ok_or_else(|| ParseKindError {
                kind: "metric type",
                value: s.to_string(),
            })
    }
}
