// Shopfloor Infrastructure - JSON File Adapters
// Implements: ScheduleStore, MachineDirectory, ToolCompatibility, OrderStatusSource

mod files;
mod machines;
mod order_status;
mod store;

pub use machines::{JsonMachineDirectory, MACHINE_DATABASE_FILE};
pub use order_status::{JsonOrderStatusFeed, ORDER_STATUS_FILE};
pub use store::{JsonScheduleStore, JOBS_FILE, PARTS_FILE};
