use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};

use crate::error::{ReminderError, Result};

/// Days between consecutive reminders.
pub const REMINDER_PERIOD: i64 = 7;

/// When the reminder after one sent at `sent_at` is due.
pub fn next_after(sent_at: DateTime<Utc>) -> DateTime<Utc> {
    sent_at + Duration::days(REMINDER_PERIOD)
}

/// First slot strictly after `now` on `day` (e.g. `MONDAY`) at `time` (`HH:MM`, UTC).
pub fn first_notification(day: &str, time: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let weekday: Weekday = day
        .trim()
        .parse()
        .map_err(|_| ReminderError::InvalidSchedule(format!("unknown day '{day}'")))?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|_| ReminderError::InvalidSchedule(format!("invalid time '{time}'")))?;

    let today = now.date_naive();
    let days_ahead = (7 + weekday.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
    let candidate = (today + Duration::days(i64::from(days_ahead)))
        .and_time(time)
        .and_utc();

    if candidate > now {
        Ok(candidate)
    } else {
        Ok(candidate + Duration::days(REMINDER_PERIOD))
    }
}
