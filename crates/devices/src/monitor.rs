//! Per-device monitoring loops.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use health_store::{Device, DeviceRegistry, DeviceUpdate, MetricStore};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::sampler::generate_samples;

/// A running monitoring loop.
pub(crate) struct MonitorHandle {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Spawns a loop for `device` whose first tick fires one `period` from now.
    pub(crate) fn spawn<S>(store: Arc<S>, device: Device, period: Duration) -> Self
    where
        S: MetricStore + DeviceRegistry + 'static,
    {
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run(store, device, period, stop_rx));
        Self { stop_tx, task }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the next tick and waits for the loop to exit.
    ///
    /// A tick that is already writing samples completes first.
    pub(crate) async fn stop(self) {
        // The loop may already have exited; nothing to signal then.
        let _ = self.stop_tx.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Monitoring loop terminated abnormally");
        }
    }
}

async fn run<S>(store: Arc<S>, device: Device, period: Duration, mut stop_rx: oneshot::Receiver<()>)
where
    S: MetricStore + DeviceRegistry,
{
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    metrics::gauge!("monitoring_loops_active").increment(1.0);
    tracing::info!(device_id = %device.id, kind = %device.kind, "Monitoring started");

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {}
        }
        record_tick(store.as_ref(), &device).await;
    }

    metrics::gauge!("monitoring_loops_active").decrement(1.0);
    tracing::info!(device_id = %device.id, "Monitoring stopped");
}

/// Writes one batch of samples for `device` and returns how many were stored.
///
/// Failed writes are logged and counted; they never abort the loop.
pub(crate) async fn record_tick<S>(store: &S, device: &Device) -> usize
where
    S: MetricStore + DeviceRegistry + ?Sized,
{
    let now = Utc::now();
    let mut written = 0;

    for sample in generate_samples(device, now) {
        let metric_type = sample.metric_type;
        match store.insert_sample(sample).await {
            Ok(()) => {
                written += 1;
                metrics::counter!("metric_samples_written_total").increment(1);
            }
            Err(e) => {
                metrics::counter!("metric_sample_write_failures_total").increment(1);
                tracing::warn!(
                    device_id = %device.id,
                    metric_type = %metric_type,
                    error = %e,
                    "Failed to store sample"
                );
            }
        }
    }

    if written > 0 {
        if let Err(e) = store.update_device(device.id, DeviceUpdate::synced_at(now)).await {
            tracing::warn!(device_id = %device.id, error = %e, "Failed to update last sync");
        }
    }

    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{DeviceKind, UserId};
    use health_store::InMemoryHealthStore;

    async fn registered_device(store: &InMemoryHealthStore) -> Device {
        store
            .insert_device(Device::connected(
                UserId::new(),
                DeviceKind::Fitbit,
                serde_json::json!({}),
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn tick_writes_three_samples_and_syncs() {
        let store = InMemoryHealthStore::new();
        let device = registered_device(&store).await;

        assert_eq!(record_tick(&store, &device).await, 3);
        assert_eq!(store.sample_count().await, 3);

        let synced = store.get_device(device.id).await.unwrap().unwrap();
        assert!(synced.last_sync.is_some());
    }

    #[tokio::test]
    async fn failed_tick_leaves_last_sync_untouched() {
        let store = InMemoryHealthStore::new();
        let device = registered_device(&store).await;
        store.set_fail_on_insert(true);

        assert_eq!(record_tick(&store, &device).await, 0);

        let unchanged = store.get_device(device.id).await.unwrap().unwrap();
        assert!(unchanged.last_sync.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn loop_ticks_once_per_period() {
        let store = Arc::new(InMemoryHealthStore::new());
        let device = registered_device(&store).await;

        let handle = MonitorHandle::spawn(store.clone(), device, Duration::from_secs(5));
        time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(store.sample_count().await, 0);

        time::sleep(Duration::from_millis(5_200)).await;
        assert_eq!(store.sample_count().await, 6);

        handle.stop().await;
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.sample_count().await, 6);
    }
}
