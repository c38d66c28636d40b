use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::{DeviceId, DeviceKind, UserId};
use health_store::{Device, DeviceQuery, DeviceRegistry, DeviceUpdate, MetricStore};
use tokio::sync::Mutex;

use crate::error::{DeviceError, Result};
use crate::monitor::MonitorHandle;

/// Timing of device handshakes and monitoring loops.
#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    /// Delay between monitoring ticks.
    pub interval: Duration,
    /// Simulated vendor handshake before a device is recorded as connected.
    pub handshake_delay: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            handshake_delay: Duration::from_millis(1500),
        }
    }
}

/// Connects devices and owns their monitoring loops.
///
/// At most one loop runs per device. The registry lock is only held to
/// insert or remove a handle, never while a loop is being joined.
pub struct DeviceManager<S> {
    store: Arc<S>,
    config: MonitorConfig,
    monitors: Mutex<HashMap<DeviceId, MonitorHandle>>,
}

impl<S> DeviceManager<S>
where
    S: MetricStore + DeviceRegistry + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, MonitorConfig::default())
    }

    /// A zero monitoring interval falls back to the default interval.
    pub fn with_config(store: Arc<S>, mut config: MonitorConfig) -> Self {
        if config.interval.is_zero() {
            config.interval = MonitorConfig::default().interval;
            tracing::warn!(
                interval = ?config.interval,
                "Monitoring interval must be non-zero, using the default"
            );
        }
        Self {
            store,
            config,
            monitors: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> MonitorConfig {
        self.config
    }

    /// Performs the handshake and registers a connected device for `user_id`.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, kind = %kind))]
    pub async fn connect(&self, user_id: UserId, kind: DeviceKind) -> Result<Device> {
        self.handshake().await;

        let metadata = serde_json::json!({
            "initialized_at": Utc::now(),
            "platform": std::env::consts::OS,
        });
        let device = self
            .store
            .insert_device(Device::connected(user_id, kind, metadata))
            .await?;

        metrics::counter!("devices_connected_total", "kind" => kind.as_str()).increment(1);
        tracing::info!(device_id = %device.id, "{} connected successfully", kind.display_name());
        Ok(device)
    }

    /// Repeats the handshake for a known device and marks it connected.
    #[tracing::instrument(skip(self), fields(device_id = %device_id))]
    pub async fn reconnect(&self, device_id: DeviceId) -> Result<Device> {
        let device = self.device(device_id).await?;
        self.handshake().await;

        let device = self
            .store
            .update_device(device.id, DeviceUpdate::connected(true))
            .await?;
        tracing::info!("{} reconnected", device.kind.display_name());
        Ok(device)
    }

    /// Stops any monitoring loop and marks the device disconnected.
    ///
    /// The registry stays locked until the device is stored as disconnected,
    /// so a concurrent `start_monitoring` cannot spawn a loop in between.
    /// Disconnecting an already disconnected device succeeds.
    #[tracing::instrument(skip(self), fields(device_id = %device_id))]
    pub async fn disconnect(&self, device_id: DeviceId) -> Result<Device> {
        let (device, handle) = {
            let mut monitors = self.monitors.lock().await;
            self.device(device_id).await?;
            let handle = monitors.remove(&device_id);
            let device = self
                .store
                .update_device(device_id, DeviceUpdate::connected(false))
                .await?;
            (device, handle)
        };

        if let Some(handle) = handle {
            handle.stop().await;
        }
        tracing::info!("Device disconnected");
        Ok(device)
    }

    /// Starts the monitoring loop of a connected device.
    ///
    /// The connection check and the spawn happen under the registry lock.
    /// Returns `false` without spawning anything if a loop is already active.
    #[tracing::instrument(skip(self), fields(device_id = %device_id))]
    pub async fn start_monitoring(&self, device_id: DeviceId) -> Result<bool> {
        let mut monitors = self.monitors.lock().await;
        let device = self.device(device_id).await?;
        if !device.is_connected {
            return Err(DeviceError::NotConnected(device_id));
        }

        match monitors.entry(device_id) {
            Entry::Occupied(mut entry) => {
                if !entry.get().is_finished() {
                    tracing::debug!("Monitoring already active");
                    return Ok(false);
                }
                entry.insert(MonitorHandle::spawn(
                    self.store.clone(),
                    device,
                    self.config.interval,
                ));
            }
            Entry::Vacant(entry) => {
                entry.insert(MonitorHandle::spawn(
                    self.store.clone(),
                    device,
                    self.config.interval,
                ));
            }
        }
        Ok(true)
    }

    /// Stops the monitoring loop of a device and waits for it to exit.
    ///
    /// Returns `false` if no loop was running.
    #[tracing::instrument(skip(self), fields(device_id = %device_id))]
    pub async fn stop_monitoring(&self, device_id: DeviceId) -> bool {
        let handle = self.monitors.lock().await.remove(&device_id);
        match handle {
            Some(handle) => {
                handle.stop().await;
                true
            }
            None => false,
        }
    }

    pub async fn is_monitoring(&self, device_id: DeviceId) -> bool {
        self.monitors
            .lock()
            .await
            .get(&device_id)
            .is_some_and(|h| !h.is_finished())
    }

    /// Devices with an active monitoring loop.
    pub async fn active_monitors(&self) -> Vec<DeviceId> {
        self.monitors
            .lock()
            .await
            .iter()
            .filter(|(_, h)| !h.is_finished())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Lists a user's devices, optionally filtered by connection state.
    pub async fn devices_for_user(
        &self,
        user_id: UserId,
        connected: Option<bool>,
    ) -> Result<Vec<Device>> {
        let mut query = DeviceQuery::for_user(user_id);
        if let Some(connected) = connected {
            query = query.connected(connected);
        }
        Ok(self.store.query_devices(query).await?)
    }

    /// Stops every monitoring loop.
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(&self) {
        let handles: Vec<_> = self.monitors.lock().await.drain().collect();
        tracing::info!(loops = handles.len(), "Stopping monitoring loops");
        for (_, handle) in handles {
            handle.stop().await;
        }
    }

    async fn device(&self, device_id: DeviceId) -> Result<Device> {
        self.store
            .get_device(device_id)
            .await?
            .ok_or(DeviceError::NotFound(device_id))
    }

    async fn handshake(&self) {
        if !self.config.handshake_delay.is_zero() {
            tokio::time::sleep(self.config.handshake_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_store::InMemoryHealthStore;

    fn manager() -> (Arc<InMemoryHealthStore>, DeviceManager<InMemoryHealthStore>) {
        let store = Arc::new(InMemoryHealthStore::new());
        (store.clone(), DeviceManager::new(store))
    }

    #[tokio::test(start_paused = true)]
    async fn connect_waits_for_handshake() {
        let (_, manager) = manager();
        let started = tokio::time::Instant::now();

        let device = manager.connect(UserId::new(), DeviceKind::Fitbit).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert!(device.is_connected);
        assert_eq!(device.name, "Fitbit");
        assert!(device.external_id.starts_with("fitbit_"));
        assert!(device.metadata.get("initialized_at").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_device_is_not_found() {
        let (_, manager) = manager();
        let id = DeviceId::new();

        assert!(matches!(
            manager.disconnect(id).await,
            Err(DeviceError::NotFound(_))
        ));
        assert!(matches!(
            manager.start_monitoring(id).await,
            Err(DeviceError::NotFound(_))
        ));
        assert!(!manager.stop_monitoring(id).await);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_a_noop() {
        let (_, manager) = manager();
        let device = manager.connect(UserId::new(), DeviceKind::Garmin).await.unwrap();

        assert!(manager.start_monitoring(device.id).await.unwrap());
        assert!(!manager.start_monitoring(device.id).await.unwrap());
        assert_eq!(manager.active_monitors().await, vec![device.id]);

        manager.shutdown().await;
        assert!(manager.active_monitors().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_falls_back_to_default() {
        let store = Arc::new(InMemoryHealthStore::new());
        let manager = DeviceManager::with_config(
            store.clone(),
            MonitorConfig {
                interval: Duration::ZERO,
                handshake_delay: Duration::ZERO,
            },
        );
        assert_eq!(manager.config().interval, Duration::from_secs(5));

        let device = manager.connect(UserId::new(), DeviceKind::Fitbit).await.unwrap();
        assert!(manager.start_monitoring(device.id).await.unwrap());
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert!(manager.is_monitoring(device.id).await);
        assert_eq!(store.sample_count().await, 3);
        manager.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_restores_connection() {
        let (_, manager) = manager();
        let device = manager.connect(UserId::new(), DeviceKind::AppleWatch).await.unwrap();
        manager.disconnect(device.id).await.unwrap();

        assert!(matches!(
            manager.start_monitoring(device.id).await,
            Err(DeviceError::NotConnected(_))
        ));

        let device = manager.reconnect(device.id).await.unwrap();
        assert!(device.is_connected);
        assert!(manager.start_monitoring(device.id).await.unwrap());
        manager.shutdown().await;
    }
}
