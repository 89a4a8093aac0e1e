// Order Status Port (ERP/MES collaborator)
// The collaborator owns the job-id <-> external-order-id mapping.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Production progress reported for one external order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionStatus {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub state: String,
    #[serde(rename = "finishedGoodWorkpieceCount", default)]
    pub finished_count: u32,
    #[serde(rename = "finishedErrorWorkpieceCount", default)]
    pub error_count: u32,
    #[serde(rename = "readyJobWorkpieceCount", default)]
    pub in_progress_count: u32,
}

/// Source of externally observed production progress
#[async_trait]
pub trait OrderStatusSource: Send + Sync {
    /// Progress for `job_id`, or `None` if the job is not linked to an external order
    async fn production_status(&self, job_id: &str) -> Result<Option<ProductionStatus>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mutable status table; jobs in `failing` return errors
    #[derive(Default)]
    pub struct MockOrderStatusSource {
        statuses: Mutex<HashMap<String, ProductionStatus>>,
        failing: Mutex<HashSet<String>>,
        call_count: AtomicUsize,
    }

    impl MockOrderStatusSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_progress(&self, job_id: &str, finished: u32, in_progress: u32) {
            self.statuses.lock().unwrap().insert(
                job_id.to_string(),
                ProductionStatus {
                    order_id: format!("order-{}", job_id),
                    state: "Running".to_string(),
                    finished_count: finished,
                    error_count: 0,
                    in_progress_count: in_progress,
                },
            );
        }

        pub fn fail_for(&self, job_id: &str) {
            self.failing.lock().unwrap().insert(job_id.to_string());
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OrderStatusSource for MockOrderStatusSource {
        async fn production_status(&self, job_id: &str) -> Result<Option<ProductionStatus>> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.failing.lock().unwrap().contains(job_id) {
                return Err(AppError::Collaborator(format!("ERP unreachable for {}", job_id)));
            }
            Ok(self.statuses.lock().unwrap().get(job_id).cloned())
        }
    }
}
