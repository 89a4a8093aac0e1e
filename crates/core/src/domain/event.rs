// Schedule Events - published after each committed mutation

use super::job::{Job, JobId};
use super::machine::MachineId;
use super::part::{Part, PartId};

/// Outbound notification for UI/ERP listeners
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleEvent {
    DataLoaded { job_count: usize, part_count: usize },
    JobAdded(Job),
    JobUpdated(Job),
    JobDeleted(JobId),
    JobCreatedWithParts(Job),
    JobPriorityUpdated(Job),
    PartAdded(Part),
    PartUpdated(Part),
    PartDeleted(PartId),
    PartMoved {
        part: Part,
        old_machine_id: Option<MachineId>,
        old_start_time: i64,
    },
    PartDuplicated { new_part: Part, original: Part },
    /// Persisting a mutation failed; the mutation was not applied
    PersistFailed { reason: String },
}

impl ScheduleEvent {
    /// Stable event name (matches the notification topics listeners subscribe to)
    pub fn name(&self) -> &'static str {
        match self {
            ScheduleEvent::DataLoaded { .. } => "scheduler_data_loaded",
            ScheduleEvent::JobAdded(_) => "job_added",
            ScheduleEvent::JobUpdated(_) => "job_updated",
            ScheduleEvent::JobDeleted(_) => "job_deleted",
            ScheduleEvent::JobCreatedWithParts(_) => "job_created_with_parts",
            ScheduleEvent::JobPriorityUpdated(_) => "job_priority_updated",
            ScheduleEvent::PartAdded(_) => "part_added",
            ScheduleEvent::PartUpdated(_) => "part_updated",
            ScheduleEvent::PartDeleted(_) => "part_deleted",
            ScheduleEvent::PartMoved { .. } => "part_moved",
            ScheduleEvent::PartDuplicated { .. } => "part_duplicated",
            ScheduleEvent::PersistFailed { .. } => "error",
        }
    }
}
