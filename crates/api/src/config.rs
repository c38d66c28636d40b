//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset runs on the in-memory store
/// - `MONITOR_INTERVAL_SECS`: seconds between monitoring ticks (default: `5`, must be non-zero)
/// - `HANDSHAKE_DELAY_MS`: simulated device handshake (default: `1500`)
/// - `INSIGHT_LOOKUP_URL`: search endpoint for symptom insights
/// - `INSIGHT_TIMEOUT_SECS`: insight lookup timeout (default: `8`)
/// - `APP_URL`: frontend base URL used in reminder texts
/// - `REMINDER_INTERVAL_SECS`: seconds between reminder runs (default: `3600`, must be non-zero)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub monitor_interval: Duration,
    pub handshake_delay: Duration,
    pub insight_lookup_url: String,
    pub insight_timeout: Duration,
    pub app_url: String,
    pub reminder_interval: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: parse_env("PORT").unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            monitor_interval: period_env("MONITOR_INTERVAL_SECS", Duration::from_secs)
                .unwrap_or(defaults.monitor_interval),
            handshake_delay: parse_env("HANDSHAKE_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.handshake_delay),
            insight_lookup_url: std::env::var("INSIGHT_LOOKUP_URL")
                .unwrap_or(defaults.insight_lookup_url),
            insight_timeout: period_env("INSIGHT_TIMEOUT_SECS", Duration::from_secs)
                .unwrap_or(defaults.insight_timeout),
            app_url: std::env::var("APP_URL").unwrap_or(defaults.app_url),
            reminder_interval: period_env("REMINDER_INTERVAL_SECS", Duration::from_secs)
                .unwrap_or(defaults.reminder_interval),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Reads a non-zero duration; zero and unparsable values count as unset.
fn period_env(key: &str, unit: fn(u64) -> Duration) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|raw| parse_period(&raw, unit))
}

fn parse_period(raw: &str, unit: fn(u64) -> Duration) -> Option<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|v| *v > 0)
        .map(unit)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            monitor_interval: Duration::from_secs(5),
            handshake_delay: Duration::from_millis(1500),
            insight_lookup_url: "https://www.google.com/search".to_string(),
            insight_timeout: Duration::from_secs(8),
            app_url: "http://localhost:5173".to_string(),
            reminder_interval: Duration::from_secs(3600),
        }
    }
}
