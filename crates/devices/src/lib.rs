//! Wearable device connections.
//!
//! [`DeviceManager`] connects mock wearables, records them in the device
//! registry and runs one monitoring loop per device. Each loop periodically
//! synthesizes vital-sign samples (see [`sampler`]) and appends them to the
//! metric store.

pub mod error;
pub mod manager;
pub mod monitor;
pub mod sampler;

pub use error::{DeviceError, Result};
pub use manager::{DeviceManager, MonitorConfig};
pub use sampler::{generate_samples, generate_samples_with};
