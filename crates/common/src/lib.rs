//! Identifiers and closed enumerations shared by every vitals crate.

pub mod kinds;
pub mod types;

pub use kinds::{DeviceKind, MetricType, ParseKindError};
pub use types::{DeviceId, RecordId, UserId};
