// Job Domain Model

use serde::{Deserialize, Serialize};

/// Job ID (`job-<uuid>`)
pub type JobId = String;

/// Palette used to give each job a stable display color
const JOB_COLORS: [&str; 16] = [
    "#ef4444", "#f97316", "#fbbf24", "#84cc16", "#22c55e", "#10b981", "#14b8a6", "#06b6d4",
    "#0ea5e9", "#3b82f6", "#6366f1", "#8b5cf6", "#a855f7", "#d946ef", "#ec4899", "#f43f5e",
];

/// Milliseconds in one minute of cycle time
pub const MS_PER_MINUTE: f64 = 60_000.0;

/// Longest accepted cycle time: one year per part
pub const MAX_CYCLE_TIME_MINUTES: f64 = 365.0 * 24.0 * 60.0;

/// Job Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Scheduled,
    #[default]
    Active,
    Locked,
    Error,
    Completed,
    Paused,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Scheduled => write!(f, "scheduled"),
            JobStatus::Active => write!(f, "active"),
            JobStatus::Locked => write!(f, "locked"),
            JobStatus::Error => write!(f, "error"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Paused => write!(f, "paused"),
        }
    }
}

/// Priority level used by the backlog ordering policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLevel {
    Critical,
    High,
    #[default]
    Normal,
    Low,
}

impl PriorityLevel {
    /// Base score of the level (1-100 scale)
    pub fn base_score(self) -> u32 {
        match self {
            PriorityLevel::Critical => 90,
            PriorityLevel::High => 75,
            PriorityLevel::Normal => 50,
            PriorityLevel::Low => 25,
        }
    }
}

impl std::fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriorityLevel::Critical => write!(f, "critical"),
            PriorityLevel::High => write!(f, "high"),
            PriorityLevel::Normal => write!(f, "normal"),
            PriorityLevel::Low => write!(f, "low"),
        }
    }
}

/// Score bonus for rush orders
pub const RUSH_ORDER_BONUS: u32 = 20;

/// Highest effective priority score
pub const MAX_PRIORITY_SCORE: u32 = 100;

/// Job Entity
///
/// A unit of production work split into `total_parts` identical parts,
/// each taking `cycle_time` minutes on any machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "id")]
    pub job_id: JobId,
    pub name: String,
    pub total_parts: u32,
    /// Minutes per part
    pub cycle_time: f64,
    pub color: String,
    pub created_at: i64, // epoch ms
    #[serde(default)]
    pub status: JobStatus,

    #[serde(default)]
    pub priority_level: PriorityLevel,
    #[serde(default)]
    pub rush_order: bool,
}

impl Job {
    /// Create a new Job
    ///
    /// # Arguments
    ///
    /// * `job_id` - Unique job ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `name` - Display name
    /// * `total_parts` - Number of parts the job is split into
    /// * `cycle_time` - Minutes per part
    pub fn new(
        job_id: impl Into<String>,
        created_at: i64,
        name: impl Into<String>,
        total_parts: u32,
        cycle_time: f64,
    ) -> Self {
        let job_id = job_id.into();
        let color = color_for(&job_id).to_string();
        Self {
            job_id,
            name: name.into(),
            total_parts,
            cycle_time,
            color,
            created_at,
            status: JobStatus::default(),
            priority_level: PriorityLevel::default(),
            rush_order: false,
        }
    }

    /// Validate the scheduling-relevant fields
    pub fn validate(&self) -> crate::domain::error::Result<()> {
        validate_cycle_time(self.cycle_time)?;
        if self.total_parts == 0 {
            return Err(crate::domain::error::DomainError::InvalidPartCount(0));
        }
        Ok(())
    }

    /// Duration of one part in milliseconds
    pub fn cycle_time_ms(&self) -> i64 {
        cycle_time_to_ms(self.cycle_time)
    }

    pub fn is_locked(&self) -> bool {
        self.status == JobStatus::Locked
    }

    /// Effective priority score: level score, rush bonus, capped at 100
    pub fn effective_priority_score(&self) -> u32 {
        let mut score = self.priority_level.base_score();
        if self.rush_order {
            score += RUSH_ORDER_BONUS;
        }
        score.min(MAX_PRIORITY_SCORE)
    }
}

/// Convert a cycle time in minutes to whole milliseconds (truncating)
pub fn cycle_time_to_ms(cycle_time_minutes: f64) -> i64 {
    (cycle_time_minutes * MS_PER_MINUTE) as i64
}

pub fn validate_cycle_time(cycle_time: f64) -> crate::domain::error::Result<()> {
    if !cycle_time.is_finite() || cycle_time <= 0.0 || cycle_time > MAX_CYCLE_TIME_MINUTES {
        return Err(crate::domain::error::DomainError::InvalidCycleTime(cycle_time));
    }
    Ok(())
}

/// Deterministic color pick from the job id
fn color_for(job_id: &str) -> &'static str {
    let seed = job_id.chars().map(|c| c as u32).sum::<u32>();
    JOB_COLORS[(seed as usize) % JOB_COLORS.len()]
}
