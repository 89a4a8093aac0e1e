// Domain Layer - Pure business logic and entities

pub mod calendar;
pub mod error;
pub mod event;
pub mod job;
pub mod machine;
pub mod part;
pub mod schedule;

// Re-exports
pub use error::DomainError;
pub use event::ScheduleEvent;
pub use job::{cycle_time_to_ms, Job, JobId, JobStatus, PriorityLevel, MAX_CYCLE_TIME_MINUTES};
pub use machine::{Machine, MachineId};
pub use part::{intervals_overlap, validate_start_time, Part, PartId, PartStatus, MAX_START_TIME};
pub use schedule::Schedule;
