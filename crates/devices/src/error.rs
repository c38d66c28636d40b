//! Device error types.

use common::DeviceId;
use health_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Device not found: {0}")]
    NotFound(DeviceId),

    /// Monitoring requires a connected device.
    #[error("Device is not connected: {0}")]
    NotConnected(DeviceId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
