// JSON Order Status Feed
//
// The ERP bridge writes a snapshot of production progress keyed by job id.
// The file is re-read on every lookup so the poller always sees the latest
// snapshot.

use crate::files::read_json_map;
use async_trait::async_trait;
use shopfloor_core::error::Result;
use shopfloor_core::port::{OrderStatusSource, ProductionStatus};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ORDER_STATUS_FILE: &str = "order_status.json";

pub struct JsonOrderStatusFeed {
    path: PathBuf,
}

impl JsonOrderStatusFeed {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl OrderStatusSource for JsonOrderStatusFeed {
    async fn production_status(&self, job_id: &str) -> Result<Option<ProductionStatus>> {
        let Some(mut snapshot) = read_json_map::<ProductionStatus>(&self.path).await? else {
            debug!(path = %self.path.display(), "No order status snapshot");
            return Ok(None);
        };
        Ok(snapshot.remove(job_id))
    }
}
