use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use health_store::{AssessmentRepository, NotificationRepository, NotificationSetting};
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::error::Result;
use crate::message::compose_message;
use crate::schedule::{first_notification, next_after};
use crate::sender::ReminderSender;

/// Shortest delay between two periodic reminder runs.
pub const MIN_RUN_PERIOD: Duration = Duration::from_secs(1);

/// Outcome of one reminder run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderRunSummary {
    /// Settings whose next notification had come due.
    pub due: usize,
    pub sent: usize,
    /// Due settings without a phone number.
    pub skipped: usize,
    pub failed: usize,
}

/// Sends due assessment reminders and reschedules them.
pub struct ReminderJob<S, N: ?Sized> {
    store: Arc<S>,
    sender: Arc<N>,
    app_url: String,
}

impl<S, N> ReminderJob<S, N>
where
    S: NotificationRepository + AssessmentRepository + 'static,
    N: ReminderSender + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, sender: Arc<N>, app_url: impl Into<String>) -> Self {
        Self {
            store,
            sender,
            app_url: app_url.into(),
        }
    }

    /// Schedules the first reminder of `setting` and stores it.
    #[tracing::instrument(skip(self, setting), fields(user_id = %setting.user_id))]
    pub async fn enroll(
        &self,
        mut setting: NotificationSetting,
        now: DateTime<Utc>,
    ) -> Result<NotificationSetting> {
        if setting.assessment_reminders {
            setting.next_notification = Some(first_notification(
                &setting.reminder_day,
                &setting.reminder_time,
                now,
            )?);
        }
        self.store.insert_setting(setting.clone()).await?;
        tracing::info!(next = ?setting.next_notification, "Reminder settings saved");
        Ok(setting)
    }

    /// Sends every reminder due at `now`.
    ///
    /// A failure for one user is logged and counted; the others are still sent.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, now: DateTime<Utc>) -> Result<ReminderRunSummary> {
        let due = self.store.due_settings(now).await?;
        let mut summary = ReminderRunSummary {
            due: due.len(),
            ..Default::default()
        };

        for setting in due {
            let Some(phone_number) = setting.phone_number.as_deref() else {
                summary.skipped += 1;
                continue;
            };

            match self.remind(&setting, phone_number, now).await {
                Ok(()) => {
                    summary.sent += 1;
                    metrics::counter!("reminders_sent_total").increment(1);
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(setting_id = %setting.id, error = %e, "Reminder failed");
                }
            }
        }

        tracing::info!(
            due = summary.due,
            sent = summary.sent,
            skipped = summary.skipped,
            failed = summary.failed,
            "Reminder run finished"
        );
        Ok(summary)
    }

    async fn remind(
        &self,
        setting: &NotificationSetting,
        phone_number: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let last = self.store.latest_assessment(setting.user_id).await?;
        let message = compose_message(&self.app_url, last.as_ref());

        self.sender.send(phone_number, &message).await?;
        self.store
            .record_notification(setting.id, now, next_after(now), message)
            .await?;
        Ok(())
    }

    /// Runs the job every `period` until the returned handle is stopped.
    ///
    /// Periods shorter than [`MIN_RUN_PERIOD`] are raised to it.
    pub fn spawn_periodic(self: Arc<Self>, period: Duration) -> PeriodicHandle {
        if period < MIN_RUN_PERIOD {
            tracing::warn!(?period, minimum = ?MIN_RUN_PERIOD, "Reminder period too short");
        }
        let period = period.max(MIN_RUN_PERIOD);
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {}
                }
                if let Err(e) = self.run(Utc::now()).await {
                    tracing::error!(error = %e, "Reminder run failed");
                }
            }
        });
        PeriodicHandle { stop_tx, task }
    }
}

/// A background reminder loop.
pub struct PeriodicHandle {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PeriodicHandle {
    /// True once the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Reminder loop terminated abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use common::UserId;
    use health_store::InMemoryHealthStore;

    use crate::sender::InMemorySender;

    #[tokio::test]
    async fn enroll_schedules_first_reminder() {
        let store = Arc::new(InMemoryHealthStore::new());
        let job = ReminderJob::new(store.clone(), Arc::new(InMemorySender::new()), "http://app");
        let now = Utc::now();

        let setting = job
            .enroll(NotificationSetting::new(UserId::new(), Some("+15550100".into())), now)
            .await
            .unwrap();

        let next = setting.next_notification.unwrap();
        assert!(next > now && next <= now + ChronoDuration::days(7));
        assert_eq!(store.setting(setting.id).await.unwrap(), setting);
    }

    #[tokio::test]
    async fn disabled_settings_are_not_scheduled() {
        let store = Arc::new(InMemoryHealthStore::new());
        let job = ReminderJob::new(store, Arc::new(InMemorySender::new()), "http://app");
        let mut setting = NotificationSetting::new(UserId::new(), None);
        setting.assessment_reminders = false;

        let saved = job.enroll(setting, Utc::now()).await.unwrap();
        assert!(saved.next_notification.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_loop_runs_immediately_and_stops() {
        let store = Arc::new(InMemoryHealthStore::new());
        let sender = Arc::new(InMemorySender::new());
        let mut setting = NotificationSetting::new(UserId::new(), Some("+15550100".into()));
        setting.next_notification = Some(Utc::now() - ChronoDuration::minutes(1));
        store.insert_setting(setting).await.unwrap();

        let job = Arc::new(ReminderJob::new(store, sender.clone(), "http://app"));
        let handle = job.spawn_periodic(Duration::from_secs(3600));
        time::sleep(Duration::from_secs(1)).await;
        handle.stop().await;

        assert_eq!(sender.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_is_raised_to_minimum() {
        let store = Arc::new(InMemoryHealthStore::new());
        let sender = Arc::new(InMemorySender::new());
        let mut setting = NotificationSetting::new(UserId::new(), Some("+15550100".into()));
        setting.next_notification = Some(Utc::now() - ChronoDuration::minutes(1));
        store.insert_setting(setting).await.unwrap();

        let job = Arc::new(ReminderJob::new(store, sender.clone(), "http://app"));
        let handle = job.spawn_periodic(Duration::ZERO);
        time::sleep(Duration::from_millis(2_500)).await;

        assert!(!handle.is_finished());
        assert_eq!(sender.sent().len(), 1);
        handle.stop().await;
    }
}
