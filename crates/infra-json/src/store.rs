// JSON ScheduleStore Implementation
//
// Two flat dumps in the data directory, both rewritten in full on every save:
//   scheduler_jobs.json   job id  -> Job record
//   scheduler_parts.json  part id -> Part record

use crate::files::{commit_tmp, discard_tmp, read_json_map, write_tmp};
use async_trait::async_trait;
use shopfloor_core::domain::{Job, Part, Schedule};
use shopfloor_core::error::Result;
use shopfloor_core::port::ScheduleStore;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const JOBS_FILE: &str = "scheduler_jobs.json";
pub const PARTS_FILE: &str = "scheduler_parts.json";

pub struct JsonScheduleStore {
    jobs_path: PathBuf,
    parts_path: PathBuf,
}

impl JsonScheduleStore {
    /// Store rooted at `data_dir` (created on first save)
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            jobs_path: data_dir.join(JOBS_FILE),
            parts_path: data_dir.join(PARTS_FILE),
        }
    }

    pub fn jobs_path(&self) -> &Path {
        &self.jobs_path
    }

    pub fn parts_path(&self) -> &Path {
        &self.parts_path
    }
}

#[async_trait]
impl ScheduleStore for JsonScheduleStore {
    async fn load(&self) -> Result<Schedule> {
        let jobs = read_json_map::<Job>(&self.jobs_path)
            .await?
            .unwrap_or_default()
            .into_values()
            .map(|job| (job.job_id.clone(), job))
            .collect();
        let parts = read_json_map::<Part>(&self.parts_path)
            .await?
            .unwrap_or_default()
            .into_values()
            .map(|part| (part.part_id.clone(), part))
            .collect();

        let schedule = Schedule::new(jobs, parts);
        info!(
            path = %self.jobs_path.display(),
            jobs = schedule.jobs.len(),
            parts = schedule.parts.len(),
            "Loaded schedule from disk"
        );
        Ok(schedule)
    }

    /// Write both temp files first; only when both are on disk are they
    /// renamed over the originals.
    async fn save(&self, schedule: &Schedule) -> Result<()> {
        let jobs_tmp = write_tmp(&self.jobs_path, &schedule.jobs).await?;
        let parts_tmp = match write_tmp(&self.parts_path, &schedule.parts).await {
            Ok(tmp) => tmp,
            Err(e) => {
                discard_tmp(&jobs_tmp).await;
                return Err(e);
            }
        };

        if let Err(e) = commit_tmp(&jobs_tmp, &self.jobs_path).await {
            discard_tmp(&jobs_tmp).await;
            discard_tmp(&parts_tmp).await;
            return Err(e);
        }
        if let Err(e) = commit_tmp(&parts_tmp, &self.parts_path).await {
            discard_tmp(&parts_tmp).await;
            return Err(e);
        }

        debug!(
            jobs = schedule.jobs.len(),
            parts = schedule.parts.len(),
            "Saved schedule"
        );
        Ok(())
    }
}
