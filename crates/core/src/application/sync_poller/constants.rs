// Sync poller constants
use std::time::Duration;

/// Default interval between order-status polls (30s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default bounded wait when joining the poller on shutdown (5s)
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);
