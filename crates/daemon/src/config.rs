// Daemon configuration (environment variables, read once at startup)

use shopfloor_core::application::sync_poller::constants::{
    DEFAULT_POLL_INTERVAL, DEFAULT_STOP_TIMEOUT,
};
use shopfloor_core::error::{AppError, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATA_DIR: &str = "~/.shopfloor";

pub const ENV_DATA_DIR: &str = "SHOPFLOOR_DATA_DIR";
pub const ENV_POLL_INTERVAL_SECS: &str = "SHOPFLOOR_POLL_INTERVAL_SECS";
pub const ENV_LOG_FORMAT: &str = "SHOPFLOOR_LOG_FORMAT";
pub const ENV_LOG_DIR: &str = "SHOPFLOOR_LOG_DIR";
pub const ENV_SHUTDOWN_TIMEOUT_SECS: &str = "SHOPFLOOR_SHUTDOWN_TIMEOUT_SECS";

/// Console log format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Development: pretty formatting with colors
    Pretty,
    /// Production: JSON structured logging
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
    pub log_format: LogFormat,
    pub log_dir: Option<PathBuf>,
    pub shutdown_timeout: Duration,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup (the process environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = lookup(ENV_DATA_DIR).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

        let poll_interval = match lookup(ENV_POLL_INTERVAL_SECS) {
            Some(raw) => Duration::from_secs(parse_secs(ENV_POLL_INTERVAL_SECS, &raw)?),
            None => DEFAULT_POLL_INTERVAL,
        };
        if poll_interval.is_zero() {
            return Err(AppError::Config(format!(
                "{} must be at least 1 second",
                ENV_POLL_INTERVAL_SECS
            )));
        }

        let shutdown_timeout = match lookup(ENV_SHUTDOWN_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(parse_secs(ENV_SHUTDOWN_TIMEOUT_SECS, &raw)?),
            None => DEFAULT_STOP_TIMEOUT,
        };

        Ok(Self {
            data_dir: expand(&data_dir),
            poll_interval,
            log_format: lookup(ENV_LOG_FORMAT)
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(LogFormat::Pretty),
            log_dir: lookup(ENV_LOG_DIR)
                .filter(|s| !s.trim().is_empty())
                .map(|s| expand(&s)),
            shutdown_timeout,
        })
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.trim().parse().map_err(|_| {
        AppError::Config(format!(
            "{} must be a whole number of seconds, got '{}'",
            key, raw
        ))
    })
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
