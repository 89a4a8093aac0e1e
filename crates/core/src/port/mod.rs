// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod machine_directory;
pub mod order_status;
pub mod schedule_store;
pub mod time_provider;

// Re-exports
pub use id_provider::IdProvider;
pub use machine_directory::{MachineDirectory, ToolCompatibility};
pub use order_status::{OrderStatusSource, ProductionStatus};
pub use schedule_store::ScheduleStore;
pub use time_provider::TimeProvider;
