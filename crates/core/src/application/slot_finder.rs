//! Slot Finder ("intelligent scheduling")
//!
//! Greedy search for the earliest gap that fits a whole job, or at least one
//! of its parts, across every machine. It never moves existing parts and does
//! not balance load between machines.
//!
//! Machines are scanned in ascending id order, which is also the final
//! tie-break between equally good candidates.

use crate::application::schedule::ScheduleRepository;
use crate::domain::job::validate_cycle_time;
use crate::domain::{cycle_time_to_ms, DomainError, Job, JobStatus, MachineId, Schedule};
use crate::error::Result;
use crate::port::{MachineDirectory, TimeProvider, ToolCompatibility};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How much of the job a candidate gap can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SlotFit {
    /// The whole job fits (ranked first)
    FullOrder,
    /// Only a single part fits
    SinglePart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCandidate {
    pub machine_id: MachineId,
    pub start_time: i64,
    pub fit: SlotFit,
}

/// Placement mode for new jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleMode {
    /// Keep the requested machine and start time
    #[default]
    Manual,
    FindNextSlot,
    /// Currently the same greedy search as `FindNextSlot`
    Optimize,
}

/// Intake request for a new job
#[derive(Debug, Clone)]
pub struct NewJobRequest {
    pub name: String,
    pub machine_id: MachineId,
    pub total_parts: u32,
    pub cycle_time: f64,
    pub start_time: i64,
    pub status: JobStatus,
    pub mode: ScheduleMode,
    pub required_tools: Vec<String>,
}

/// Walk one machine's timeline from `window_start` and return its best gap.
///
/// Always yields a candidate: if no gap between parts is large enough, the
/// open-ended tail after the last part holds the whole job.
pub fn scan_machine(
    schedule: &Schedule,
    machine_id: &str,
    window_start: i64,
    full_duration: i64,
    single_duration: i64,
) -> SlotCandidate {
    let mut cursor = window_start;

    for part in schedule.machine_parts(machine_id) {
        let Some((start, end)) = schedule.interval_of(part) else {
            continue;
        };

        let gap = start.saturating_sub(cursor);
        let fit = if gap >= full_duration {
            Some(SlotFit::FullOrder)
        } else if gap >= single_duration {
            Some(SlotFit::SinglePart)
        } else {
            None
        };

        if let Some(fit) = fit {
            return SlotCandidate {
                machine_id: machine_id.to_string(),
                start_time: cursor,
                fit,
            };
        }
        cursor = cursor.max(end);
    }

    SlotCandidate {
        machine_id: machine_id.to_string(),
        start_time: cursor,
        fit: SlotFit::FullOrder,
    }
}

/// Best candidate: full-order fits first, then earliest start, then machine id
pub fn best_candidate(candidates: Vec<SlotCandidate>) -> Option<SlotCandidate> {
    candidates
        .into_iter()
        .min_by(|a, b| {
            a.fit
                .cmp(&b.fit)
                .then(a.start_time.cmp(&b.start_time))
                .then_with(|| a.machine_id.cmp(&b.machine_id))
        })
}

pub struct SlotFinder {
    repo: Arc<ScheduleRepository>,
    machines: Arc<dyn MachineDirectory>,
    tools: Arc<dyn ToolCompatibility>,
    time_provider: Arc<dyn TimeProvider>,
}

impl SlotFinder {
    pub fn new(
        repo: Arc<ScheduleRepository>,
        machines: Arc<dyn MachineDirectory>,
        tools: Arc<dyn ToolCompatibility>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            repo,
            machines,
            tools,
            time_provider,
        }
    }

    /// Find the earliest slot for `total_parts` parts of `cycle_time` minutes, starting now.
    ///
    /// With non-empty `required_tools`, machines missing any tool are skipped,
    /// and so are machines whose tool lookup fails. Returns None when no
    /// machine qualifies.
    pub async fn find_next_available_slot(
        &self,
        total_parts: u32,
        cycle_time: f64,
        required_tools: &[String],
    ) -> Result<Option<SlotCandidate>> {
        validate_cycle_time(cycle_time)?;
        if total_parts == 0 {
            return Err(DomainError::InvalidPartCount(0).into());
        }

        let mut machine_ids: Vec<MachineId> = self
            .machines
            .list_machines()
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();
        machine_ids.sort();
        machine_ids.dedup();

        let mut eligible = Vec::with_capacity(machine_ids.len());
        for machine_id in machine_ids {
            if required_tools.is_empty() {
                eligible.push(machine_id);
                continue;
            }
            match self.tools.has_required_tools(&machine_id, required_tools).await {
                Ok(true) => eligible.push(machine_id),
                Ok(false) => debug!(machine_id = %machine_id, "Machine lacks required tools"),
                Err(e) => warn!(
                    machine_id = %machine_id,
                    error = %e,
                    "Tool lookup failed, skipping machine"
                ),
            }
        }

        let now = self.time_provider.now_millis();
        let single_duration = cycle_time_to_ms(cycle_time);
        let full_duration = cycle_time_to_ms(total_parts as f64 * cycle_time);

        let best = self
            .repo
            .read(|schedule| {
                let candidates = eligible
                    .iter()
                    .map(|id| scan_machine(schedule, id, now, full_duration, single_duration))
                    .collect();
                best_candidate(candidates)
            })
            .await;

        if let Some(slot) = &best {
            debug!(
                machine_id = %slot.machine_id,
                start_time = slot.start_time,
                fit = ?slot.fit,
                "Found slot"
            );
        }
        Ok(best)
    }

    /// Create a job according to `request.mode`.
    ///
    /// In the searching modes a found slot overrides the requested machine and
    /// start time; if nothing qualifies, the manual placement is kept.
    pub async fn place_new_job(&self, request: NewJobRequest) -> Result<Job> {
        let (machine_id, start_time) = match request.mode {
            ScheduleMode::Manual => (request.machine_id, request.start_time),
            ScheduleMode::FindNextSlot | ScheduleMode::Optimize => {
                match self
                    .find_next_available_slot(
                        request.total_parts,
                        request.cycle_time,
                        &request.required_tools,
                    )
                    .await?
                {
                    Some(slot) => {
                        info!(
                            name = %request.name,
                            machine_id = %slot.machine_id,
                            start_time = slot.start_time,
                            "Placing job in next available slot"
                        );
                        (slot.machine_id, slot.start_time)
                    }
                    None => {
                        warn!(name = %request.name, "No slot found, keeping manual placement");
                        (request.machine_id, request.start_time)
                    }
                }
            }
        };

        self.repo
            .create_job_with_parts(
                &request.name,
                &machine_id,
                request.total_parts,
                request.cycle_time,
                start_time,
                request.status,
            )
            .await
    }
}
