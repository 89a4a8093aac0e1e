// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid cycle time: {0} (must be a positive number of minutes, at most one year)")]
    InvalidCycleTime(f64),

    #[error("Invalid part count: {0} (a job needs at least one part)")]
    InvalidPartCount(u32),

    #[error("Invalid start time: {0} (must be between 0 and 9999-12-31)")]
    InvalidStartTime(i64),

    #[error("Schedule time out of range: {0}")]
    TimeOutOfRange(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
