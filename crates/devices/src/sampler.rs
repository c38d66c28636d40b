//! Mock vital-sign synthesis.

use chrono::{DateTime, Utc};
use common::MetricType;
use health_store::{Device, MetricSample};
use rand::Rng;
use serde_json::json;

struct Vital {
    metric_type: MetricType,
    unit: &'static str,
    low: f64,
    high: f64,
    confidence: f64,
}

const VITALS: [Vital; 3] = [
    Vital {
        metric_type: MetricType::HeartRate,
        unit: "bpm",
        low: 65.0,
        high: 85.0,
        confidence: 0.95,
    },
    Vital {
        metric_type: MetricType::BloodOxygen,
        unit: "%",
        low: 95.0,
        high: 100.0,
        confidence: 0.92,
    },
    Vital {
        metric_type: MetricType::Temperature,
        unit: "°F",
        low: 97.0,
        high: 99.0,
        confidence: 0.98,
    },
];

/// One heart rate, blood oxygen and temperature sample for `device`, stamped `at`.
pub fn generate_samples(device: &Device, at: DateTime<Utc>) -> Vec<MetricSample> {
    generate_samples_with(&mut rand::thread_rng(), device, at)
}

/// Like [`generate_samples`] but drawing from the given generator.
pub fn generate_samples_with<R: Rng + ?Sized>(
    rng: &mut R,
    device: &Device,
    at: DateTime<Utc>,
) -> Vec<MetricSample> {
    VITALS
        .iter()
        .map(|vital| {
            let value = rng.gen_range(vital.low..vital.high);
            MetricSample::new(
                device.user_id,
                device.id,
                vital.metric_type,
                value,
                vital.unit,
            )
            .at(at)
            .with_metadata(json!({
                "confidence": vital.confidence,
                "source": device.kind.payload_label(),
            }))
        })
        .collect()
}
