// Part Domain Model

use super::error::{DomainError, Result};
use super::job::{cycle_time_to_ms, JobId};
use super::machine::MachineId;
use serde::{Deserialize, Serialize};

/// Part ID (`part-<uuid>`)
pub type PartId = String;

/// Latest accepted start time: 9999-12-31T23:59:59.999Z
pub const MAX_START_TIME: i64 = 253_402_300_799_999;

/// Part Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
}

impl std::fmt::Display for PartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartStatus::Scheduled => write!(f, "scheduled"),
            PartStatus::InProgress => write!(f, "in-progress"),
            PartStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Part Entity - one schedulable unit of a Job
///
/// A part does not store its own duration; it always runs for its job's cycle time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(rename = "id")]
    pub part_id: PartId,
    pub job_id: JobId,
    /// 1-based, contiguous within the job
    pub part_number: u32,
    pub machine_id: Option<MachineId>,
    pub start_time: i64, // epoch ms
    #[serde(default = "default_estimate")]
    pub estimate: bool,
    #[serde(default)]
    pub status: PartStatus,
}

fn default_estimate() -> bool {
    true
}

impl Part {
    /// Create a new scheduled, estimated part
    pub fn new(
        part_id: impl Into<String>,
        job_id: impl Into<String>,
        part_number: u32,
        machine_id: impl Into<String>,
        start_time: i64,
    ) -> Self {
        Self {
            part_id: part_id.into(),
            job_id: job_id.into(),
            part_number,
            machine_id: Some(machine_id.into()),
            start_time,
            estimate: true,
            status: PartStatus::Scheduled,
        }
    }

    /// End of the half-open interval `[start_time, end)` for the given cycle time (minutes)
    pub fn end_time(&self, cycle_time: f64) -> i64 {
        self.start_time.saturating_add(cycle_time_to_ms(cycle_time))
    }

    pub fn is_on(&self, machine_id: &str) -> bool {
        self.machine_id.as_deref() == Some(machine_id)
    }

    /// Mark progress reported by the shop floor (no longer an estimate)
    pub fn confirm(&mut self, status: PartStatus) {
        self.status = status;
        self.estimate = false;
    }
}

pub fn validate_start_time(start_time: i64) -> Result<()> {
    if !(0..=MAX_START_TIME).contains(&start_time) {
        return Err(DomainError::InvalidStartTime(start_time));
    }
    Ok(())
}

/// Open-interval overlap test on `[a_start, a_end)` and `[b_start, b_end)`
pub fn intervals_overlap(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> bool {
    a_start < b_end && b_start < a_end
}
