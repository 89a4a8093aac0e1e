// Application Layer - Use Cases and Business Logic

pub mod conflict;
pub mod schedule;
pub mod slot_finder;
pub mod sync_poller;
pub mod utilization;

// Re-exports
pub use conflict::{find_conflicts, find_overlaps, resolve_conflicts, Overlap};
pub use schedule::{MoveDecision, MoveOutcome, ScheduleRepository};
pub use slot_finder::{NewJobRequest, ScheduleMode, SlotCandidate, SlotFinder, SlotFit};
pub use sync_poller::{shutdown_channel, PollerHandle, ShutdownSender, ShutdownToken, SyncPoller};
