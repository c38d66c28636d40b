//! Assessment reminders.
//!
//! [`ReminderJob`] finds users whose next reminder is due, texts them a
//! check-in message through a [`ReminderSender`] and pushes their schedule
//! one week forward.

pub mod error;
pub mod job;
pub mod message;
pub mod schedule;
pub mod sender;

pub use error::{ReminderError, Result};
pub use job::{MIN_RUN_PERIOD, PeriodicHandle, ReminderJob, ReminderRunSummary};
pub use message::compose_message;
pub use schedule::{REMINDER_PERIOD, first_notification, next_after};
pub use sender::{InMemorySender, LoggingSender, ReminderSender, SentReminder};
