// Sync Poller - reflects shop-floor progress onto scheduled parts

pub mod constants;
mod shutdown;

pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::schedule::ScheduleRepository;
use crate::domain::{Part, PartId, PartStatus};
use crate::error::Result;
use crate::port::{OrderStatusSource, ProductionStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Periodically asks the order-status collaborator for progress and writes
/// part statuses back through the repository
pub struct SyncPoller {
    repo: Arc<ScheduleRepository>,
    source: Arc<dyn OrderStatusSource>,
    interval: Duration,
}

impl SyncPoller {
    pub fn new(
        repo: Arc<ScheduleRepository>,
        source: Arc<dyn OrderStatusSource>,
        interval: Duration,
    ) -> Self {
        Self {
            repo,
            source,
            interval,
        }
    }

    /// Run the poll loop until shutdown is signalled
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!(interval_secs = self.interval.as_secs(), "Sync poller started");
        loop {
            if shutdown.is_shutdown() {
                info!("Sync poller shutting down");
                break;
            }

            let updated = self.poll_once().await;
            if updated > 0 {
                info!(updated, "Applied production progress");
            }

            tokio::select! {
                _ = sleep(self.interval) => {},
                _ = shutdown.wait() => {
                    info!("Sync poller interrupted during sleep");
                    break;
                }
            }
        }
        info!("Sync poller stopped");
        Ok(())
    }

    /// One pass over every job. Returns the number of parts written.
    ///
    /// Failures are logged per job and never abort the pass.
    pub async fn poll_once(&self) -> usize {
        let mut updated = 0;

        for job in self.repo.get_all_jobs().await {
            let status = match self.source.production_status(&job.job_id).await {
                Ok(Some(status)) => status,
                Ok(None) => continue,
                Err(e) => {
                    warn!(job_id = %job.job_id, error = %e, "Failed to fetch production status");
                    continue;
                }
            };
            debug!(
                job_id = %job.job_id,
                order_id = %status.order_id,
                state = %status.state,
                finished = status.finished_count,
                in_progress = status.in_progress_count,
                "Production status"
            );

            let parts = self.repo.get_job_parts(&job.job_id).await;
            for (part_id, target) in progressed_parts(&parts, &status) {
                match self.repo.set_part_status(&part_id, target).await {
                    Ok(true) => updated += 1,
                    Ok(false) => {}
                    Err(e) => {
                        error!(job_id = %job.job_id, error = %e, "Failed to write part progress");
                        break;
                    }
                }
            }
        }
        updated
    }

    /// Spawn the poll loop on the runtime
    pub fn spawn(self) -> PollerHandle {
        let (shutdown, token) = shutdown_channel();
        let handle = tokio::spawn(async move { self.run(token).await });
        PollerHandle { shutdown, handle }
    }
}

/// Parts whose status changes given the reported counts.
///
/// Parts are matched by position in part-number order: the first
/// `finished_count` are completed, the next `in_progress_count` are in progress.
fn progressed_parts(parts: &[Part], status: &ProductionStatus) -> Vec<(PartId, PartStatus)> {
    let finished = status.finished_count as usize;
    let in_progress_end = finished + status.in_progress_count as usize;

    parts
        .iter()
        .enumerate()
        .filter_map(|(index, part)| {
            let target = if index < finished {
                PartStatus::Completed
            } else if index < in_progress_end {
                PartStatus::InProgress
            } else {
                return None;
            };
            (part.status != target).then(|| (part.part_id.clone(), target))
        })
        .collect()
}

/// Handle to a spawned poller
pub struct PollerHandle {
    shutdown: ShutdownSender,
    handle: JoinHandle<Result<()>>,
}

impl PollerHandle {
    /// Signal shutdown and wait up to `timeout` for the loop to finish.
    ///
    /// Returns true if the task finished in time. A loop still running after
    /// `timeout` is aborted.
    pub async fn stop(mut self, timeout: Duration) -> bool {
        self.shutdown.shutdown();
        match tokio::time::timeout(timeout, &mut self.handle).await {
            Ok(Ok(Ok(()))) => true,
            Ok(Ok(Err(e))) => {
                error!(error = %e, "Sync poller exited with error");
                true
            }
            Ok(Err(join_err)) => {
                error!(error = ?join_err, "Sync poller task failed");
                true
            }
            Err(_) => {
                self.handle.abort();
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Sync poller did not stop in time, aborted"
                );
                false
            }
        }
    }
}
