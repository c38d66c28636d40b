//! Outgoing reminder delivery.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{ReminderError, Result};

/// Delivers a reminder text to a phone number.
#[async_trait]
pub trait ReminderSender: Send + Sync {
    async fn send(&self, phone_number: &str, message: &str) -> Result<()>;
}

/// Writes reminders to the log instead of an SMS provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSender;

#[async_trait]
impl ReminderSender for LoggingSender {
    async fn send(&self, phone_number: &str, message: &str) -> Result<()> {
        tracing::info!(phone_number, message, "Sending reminder");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReminder {
    pub phone_number: String,
    pub message: String,
}

#[derive(Debug, Default)]
struct InMemorySenderState {
    sent: Vec<SentReminder>,
    fail_for: Vec<String>,
}

/// Records reminders in memory, for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemorySender {
    state: Arc<Mutex<InMemorySenderState>>,
}

impl InMemorySender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every send to `phone_number` fail.
    pub fn fail_for(&self, phone_number: impl Into<String>) {
        self.lock().fail_for.push(phone_number.into());
    }

    pub fn sent(&self) -> Vec<SentReminder> {
        self.lock().sent.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemorySenderState> {
        // A poisoned lock only means a test panicked mid-send.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ReminderSender for InMemorySender {
    async fn send(&self, phone_number: &str, message: &str) -> Result<()> {
        let mut state = self.lock();
        if state.fail_for.iter().any(|p| p == phone_number) {
            return Err(ReminderError::Send(format!("carrier rejected {phone_number}")));
        }
        state.sent.push(SentReminder {
            phone_number: phone_number.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}
