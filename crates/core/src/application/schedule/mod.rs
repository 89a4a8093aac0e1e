// Schedule Repository - sole owner and mutator of Jobs and Parts
//
// Every mutation runs inside `transact`: it is applied to a draft copy of the
// schedule, the draft is saved through the store, and only then swapped in and
// announced. A failed save leaves the in-memory schedule untouched.

mod placement;
mod queries;

pub use placement::{MoveDecision, MoveOutcome};

use crate::domain::{validate_start_time, Job, Part, PartStatus, Schedule, ScheduleEvent};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, ScheduleStore, TimeProvider};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info};

/// Buffered events per subscriber before the slowest one starts lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct ScheduleRepository {
    state: RwLock<Schedule>,
    store: Arc<dyn ScheduleStore>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    events: broadcast::Sender<ScheduleEvent>,
}

impl ScheduleRepository {
    /// Create an empty repository; call [`reload`](Self::reload) to load persisted state
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(Schedule::default()),
            store,
            id_provider,
            time_provider,
            events,
        }
    }

    /// Create a repository and load whatever the store holds
    pub async fn open(
        store: Arc<dyn ScheduleStore>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Result<Self> {
        let repo = Self::new(store, id_provider, time_provider);
        repo.reload().await?;
        Ok(repo)
    }

    /// Replace the in-memory schedule wholesale with the persisted one
    pub async fn reload(&self) -> Result<()> {
        let loaded = self.store.load().await?;
        let (job_count, part_count) = (loaded.jobs.len(), loaded.parts.len());

        *self.state.write().await = loaded;

        info!(job_count, part_count, "Schedule loaded");
        self.publish(ScheduleEvent::DataLoaded {
            job_count,
            part_count,
        });
        Ok(())
    }

    /// Subscribe to events published after each committed mutation
    pub fn subscribe(&self) -> broadcast::Receiver<ScheduleEvent> {
        self.events.subscribe()
    }

    /// Run a read-only query against the current schedule
    pub async fn read<R>(&self, query: impl FnOnce(&Schedule) -> R) -> R {
        let state = self.state.read().await;
        query(&state)
    }

    pub async fn snapshot(&self) -> Schedule {
        self.state.read().await.clone()
    }

    pub(crate) fn now_millis(&self) -> i64 {
        self.time_provider.now_millis()
    }

    pub(crate) fn next_id(&self, prefix: &str) -> String {
        self.id_provider.generate_id(prefix)
    }

    fn publish(&self, event: ScheduleEvent) {
        debug!(event = event.name(), "Publishing schedule event");
        // No receivers is fine: events are fire-and-forget
        let _ = self.events.send(event);
    }

    /// Apply `mutate` to a draft, persist it, then commit and publish.
    ///
    /// `mutate` records the events describing what it changed. If it records
    /// none, nothing changed: the store is not touched and the draft is dropped.
    pub(crate) async fn transact<T, F>(&self, operation: &'static str, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut Schedule, &mut Vec<ScheduleEvent>) -> T,
    {
        let mut state = self.state.write().await;
        let mut draft = state.clone();
        let mut events = Vec::new();

        let outcome = mutate(&mut draft, &mut events);
        if events.is_empty() {
            return Ok(outcome);
        }

        if let Err(e) = self.store.save(&draft).await {
            error!(operation, error = %e, "Failed to persist schedule, mutation discarded");
            drop(state);
            self.publish(ScheduleEvent::PersistFailed {
                reason: e.to_string(),
            });
            return Err(AppError::Persistence(format!("{}: {}", operation, e)));
        }

        *state = draft;
        drop(state);

        for event in events {
            self.publish(event);
        }
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub async fn get_job(&self, job_id: &str) -> Option<Job> {
        self.read(|s| s.job(job_id).cloned()).await
    }

    pub async fn get_part(&self, part_id: &str) -> Option<Part> {
        self.read(|s| s.part(part_id).cloned()).await
    }

    pub async fn get_all_jobs(&self) -> Vec<Job> {
        self.read(|s| s.jobs.values().cloned().collect()).await
    }

    pub async fn get_all_parts(&self) -> Vec<Part> {
        self.read(|s| s.parts.values().cloned().collect()).await
    }

    /// Parts of a job, sorted by part number
    pub async fn get_job_parts(&self, job_id: &str) -> Vec<Part> {
        self.read(|s| s.job_parts(job_id).into_iter().cloned().collect())
            .await
    }

    // ------------------------------------------------------------------
    // Upserts
    // ------------------------------------------------------------------

    /// Insert or replace a job
    pub async fn add_job(&self, job: Job) -> Result<()> {
        job.validate()?;
        self.transact("add_job", |draft, events| {
            draft.jobs.insert(job.job_id.clone(), job.clone());
            events.push(ScheduleEvent::JobAdded(job));
        })
        .await
    }

    /// Insert or replace a job
    pub async fn update_job(&self, job: Job) -> Result<()> {
        job.validate()?;
        self.transact("update_job", |draft, events| {
            draft.jobs.insert(job.job_id.clone(), job.clone());
            events.push(ScheduleEvent::JobUpdated(job));
        })
        .await
    }

    /// Insert or replace a part.
    ///
    /// The owning job's `total_parts` is not adjusted; callers adding parts
    /// manually keep the count in step through [`update_job`](Self::update_job).
    pub async fn add_part(&self, part: Part) -> Result<()> {
        validate_start_time(part.start_time)?;
        self.transact("add_part", |draft, events| {
            draft.parts.insert(part.part_id.clone(), part.clone());
            events.push(ScheduleEvent::PartAdded(part));
        })
        .await
    }

    /// Insert or replace a part (status/estimate write-back, manual edits)
    pub async fn update_part(&self, part: Part) -> Result<()> {
        validate_start_time(part.start_time)?;
        self.transact("update_part", |draft, events| {
            draft.parts.insert(part.part_id.clone(), part.clone());
            events.push(ScheduleEvent::PartUpdated(part));
        })
        .await
    }

    /// Record shop-floor progress on a part and clear its `estimate` flag.
    ///
    /// Touches only the status fields, so a concurrent move or renumbering is
    /// never overwritten. Returns false if the part does not exist or already
    /// carries this confirmed status.
    pub async fn set_part_status(&self, part_id: &str, status: PartStatus) -> Result<bool> {
        self.transact("set_part_status", |draft, events| {
            let Some(part) = draft.parts.get_mut(part_id) else {
                return false;
            };
            if part.status == status && !part.estimate {
                return false;
            }
            part.confirm(status);
            events.push(ScheduleEvent::PartUpdated(part.clone()));
            true
        })
        .await
    }

    // ------------------------------------------------------------------
    // Deletes
    // ------------------------------------------------------------------

    /// Delete a job and all of its parts. Returns false if the job does not exist.
    pub async fn delete_job(&self, job_id: &str) -> Result<bool> {
        self.transact("delete_job", |draft, events| {
            if draft.jobs.remove(job_id).is_none() {
                return false;
            }
            draft.parts.retain(|_, p| p.job_id != job_id);
            events.push(ScheduleEvent::JobDeleted(job_id.to_string()));
            true
        })
        .await
    }

    /// Delete a part, close the gap in its job's numbering and shrink the job.
    ///
    /// Deleting the last part of a job deletes the job too. Returns false if
    /// the part does not exist.
    pub async fn delete_part(&self, part_id: &str) -> Result<bool> {
        self.transact("delete_part", |draft, events| {
            let Some(removed) = draft.parts.remove(part_id) else {
                return false;
            };

            for part in draft.parts.values_mut() {
                if part.job_id == removed.job_id && part.part_number > removed.part_number {
                    part.part_number -= 1;
                }
            }
            events.push(ScheduleEvent::PartDeleted(removed.part_id.clone()));

            if let Some(job) = draft.jobs.get_mut(&removed.job_id) {
                job.total_parts = job.total_parts.saturating_sub(1);
                if job.total_parts == 0 {
                    draft.jobs.remove(&removed.job_id);
                    info!(job_id = %removed.job_id, "Last part deleted, removing job");
                    events.push(ScheduleEvent::JobDeleted(removed.job_id.clone()));
                } else {
                    events.push(ScheduleEvent::JobUpdated(job.clone()));
                }
            }
            true
        })
        .await
    }
}
