// Schedule snapshot: the full set of Jobs and Parts, keyed by identifier

use super::job::{Job, JobId};
use super::part::{Part, PartId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// In-memory schedule state owned by the repository.
///
/// Both maps are ordered by identifier so that every scan (and every
/// persisted dump) has a stable iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub jobs: BTreeMap<JobId, Job>,
    pub parts: BTreeMap<PartId, Part>,
}

impl Schedule {
    pub fn new(jobs: BTreeMap<JobId, Job>, parts: BTreeMap<PartId, Part>) -> Self {
        Self { jobs, parts }
    }

    pub fn job(&self, job_id: &str) -> Option<&Job> {
        self.jobs.get(job_id)
    }

    pub fn part(&self, part_id: &str) -> Option<&Part> {
        self.parts.get(part_id)
    }

    /// Parts of a job, sorted by part number
    pub fn job_parts(&self, job_id: &str) -> Vec<&Part> {
        let mut parts: Vec<&Part> = self.parts.values().filter(|p| p.job_id == job_id).collect();
        parts.sort_by_key(|p| p.part_number);
        parts
    }

    /// Parts on a machine, sorted by start time
    pub fn machine_parts(&self, machine_id: &str) -> Vec<&Part> {
        let mut parts: Vec<&Part> = self.parts.values().filter(|p| p.is_on(machine_id)).collect();
        parts.sort_by_key(|p| p.start_time);
        parts
    }

    /// Interval `[start, end)` of a part, or None if its job is missing
    pub fn interval_of(&self, part: &Part) -> Option<(i64, i64)> {
        self.job(&part.job_id)
            .map(|job| (part.start_time, part.end_time(job.cycle_time)))
    }

    /// Check that every job's part numbers are exactly `1..=total_parts`
    pub fn numbering_is_contiguous(&self, job_id: &str) -> bool {
        let Some(job) = self.job(job_id) else {
            return false;
        };
        let numbers: Vec<u32> = self.job_parts(job_id).iter().map(|p| p.part_number).collect();
        numbers.len() == job.total_parts as usize
            && numbers.iter().enumerate().all(|(i, n)| *n == i as u32 + 1)
    }
}
