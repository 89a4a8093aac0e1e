// Placement use cases: bulk job creation, moves with cascading conflict
// resolution, duplication, lock checks and priorities

use super::ScheduleRepository;
use crate::application::conflict::{find_conflicts, resolve_conflicts};
use crate::domain::calendar::{snap_to_grid, Granularity, SnapDirection};
use crate::domain::{
    cycle_time_to_ms, validate_start_time, DomainError, Job, JobStatus, Part, PriorityLevel,
    Schedule, ScheduleEvent, MAX_START_TIME,
};
use crate::error::Result;
use chrono::TimeZone;
use tracing::{info, warn};

/// Whether a part may be moved by the scheduling engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDecision {
    Allowed,
    PartNotFound,
    JobLocked,
}

/// Result of a lock-checked move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// The part or its job disappeared
    NotMoved,
    /// The part already sits on the target slot
    Unchanged,
    Refused(MoveDecision),
}

fn move_decision(schedule: &Schedule, part_id: &str) -> MoveDecision {
    let Some(part) = schedule.part(part_id) else {
        return MoveDecision::PartNotFound;
    };
    match schedule.job(&part.job_id) {
        Some(job) if job.is_locked() => MoveDecision::JobLocked,
        _ => MoveDecision::Allowed,
    }
}

/// Start of part `n` (1-based) of a back-to-back run, if it is a valid start time
fn back_to_back_start(start_time: i64, n: u32, cycle_ms: i64) -> Result<i64> {
    (n as i64 - 1)
        .checked_mul(cycle_ms)
        .and_then(|offset| start_time.checked_add(offset))
        .filter(|start| *start <= MAX_START_TIME)
        .ok_or_else(|| {
            DomainError::TimeOutOfRange(format!("part {} of a run starting at {}", n, start_time))
                .into()
        })
}

/// Place a part and push whatever it lands on. Returns false if the part or its job is missing.
fn apply_move(
    draft: &mut Schedule,
    events: &mut Vec<ScheduleEvent>,
    part_id: &str,
    machine_id: &str,
    start_time: i64,
) -> bool {
    let Some(cycle_time) = draft
        .part(part_id)
        .and_then(|p| draft.job(&p.job_id))
        .map(|job| job.cycle_time)
    else {
        return false;
    };

    let conflicts = find_conflicts(draft, part_id, machine_id, start_time, cycle_time);

    let Some(part) = draft.parts.get_mut(part_id) else {
        return false;
    };
    let old_machine_id = part.machine_id.replace(machine_id.to_string());
    let old_start_time = std::mem::replace(&mut part.start_time, start_time);
    let moved = part.clone();

    if !conflicts.is_empty() {
        info!(
            part_id = %part_id,
            machine_id = %machine_id,
            conflicts = conflicts.len(),
            "Resolving conflicts by cascading"
        );
        let moved_end = start_time.saturating_add(cycle_time_to_ms(cycle_time));
        resolve_conflicts(draft, &conflicts, moved_end);
    }

    events.push(ScheduleEvent::PartMoved {
        part: moved,
        old_machine_id,
        old_start_time,
    });
    events.extend(
        conflicts
            .iter()
            .filter_map(|id| draft.part(id).cloned())
            .map(ScheduleEvent::PartUpdated),
    );
    true
}

impl ScheduleRepository {
    /// Create a job and place all of its parts back-to-back on one machine.
    ///
    /// Part `n` starts at `start_time + (n - 1) * cycle_time`. Existing parts
    /// on the machine are not checked. Every part must start before the year 10000.
    pub async fn create_job_with_parts(
        &self,
        name: &str,
        machine_id: &str,
        total_parts: u32,
        cycle_time: f64,
        start_time: i64,
        status: JobStatus,
    ) -> Result<Job> {
        validate_start_time(start_time)?;

        let job_id = self.next_id("job");
        let mut job = Job::new(job_id, self.now_millis(), name, total_parts, cycle_time);
        job.status = status;
        job.validate()?;

        let cycle_ms = job.cycle_time_ms();
        back_to_back_start(start_time, total_parts, cycle_ms)?;
        let parts: Vec<Part> = (1..=total_parts)
            .map(|n| {
                Part::new(
                    self.next_id("part"),
                    job.job_id.clone(),
                    n,
                    machine_id,
                    start_time + (n as i64 - 1) * cycle_ms,
                )
            })
            .collect();

        info!(
            job_id = %job.job_id,
            machine_id = %machine_id,
            total_parts,
            cycle_time,
            "Creating job with parts"
        );

        self.transact("create_job_with_parts", |draft, events| {
            draft.jobs.insert(job.job_id.clone(), job.clone());
            for part in parts {
                draft.parts.insert(part.part_id.clone(), part);
            }
            events.push(ScheduleEvent::JobCreatedWithParts(job.clone()));
            job
        })
        .await
    }

    /// Move a part to `machine_id` at `start_time`, cascading any parts it lands on.
    ///
    /// Runs one resolution pass only. Returns false if the part or its job is missing.
    pub async fn move_part(
        &self,
        part_id: &str,
        machine_id: &str,
        start_time: i64,
    ) -> Result<bool> {
        validate_start_time(start_time)?;
        self.transact("move_part", |draft, events| {
            apply_move(draft, events, part_id, machine_id, start_time)
        })
        .await
    }

    pub async fn can_move_part(&self, part_id: &str) -> MoveDecision {
        self.read(|s| move_decision(s, part_id)).await
    }

    /// Like [`move_part`](Self::move_part), but refuses parts of locked jobs unless `force`
    pub async fn move_part_with_lock_check(
        &self,
        part_id: &str,
        machine_id: &str,
        start_time: i64,
        force: bool,
    ) -> Result<MoveOutcome> {
        validate_start_time(start_time)?;
        self.transact("move_part", |draft, events| {
            let decision = move_decision(draft, part_id);
            let forced = force && decision == MoveDecision::JobLocked;
            if decision != MoveDecision::Allowed && !forced {
                warn!(part_id = %part_id, decision = ?decision, "Move refused");
                return MoveOutcome::Refused(decision);
            }
            if apply_move(draft, events, part_id, machine_id, start_time) {
                MoveOutcome::Moved
            } else {
                MoveOutcome::NotMoved
            }
        })
        .await
    }

    /// Snap a part's start onto the `granularity` grid of its local day in `tz`.
    ///
    /// Subject to the same lock check as an interactive move. The part stays on
    /// its machine and whatever it lands on is cascaded. A part without a
    /// machine is not moved.
    pub async fn snap_part_to_granularity<Tz: TimeZone>(
        &self,
        part_id: &str,
        granularity: Granularity,
        tz: &Tz,
    ) -> Result<MoveOutcome> {
        self.transact("snap_part_to_granularity", |draft, events| -> Result<MoveOutcome> {
            let decision = move_decision(draft, part_id);
            if decision != MoveDecision::Allowed {
                warn!(part_id = %part_id, decision = ?decision, "Snap refused");
                return Ok(MoveOutcome::Refused(decision));
            }
            let Some(part) = draft.part(part_id) else {
                return Ok(MoveOutcome::NotMoved);
            };
            let Some(machine_id) = part.machine_id.clone() else {
                return Ok(MoveOutcome::NotMoved);
            };
            let current = part.start_time;

            let snapped = snap_to_grid(current, granularity, SnapDirection::Round, tz)?;
            if snapped == current {
                return Ok(MoveOutcome::Unchanged);
            }
            validate_start_time(snapped)?;

            if apply_move(draft, events, part_id, &machine_id, snapped) {
                Ok(MoveOutcome::Moved)
            } else {
                Ok(MoveOutcome::NotMoved)
            }
        })
        .await?
    }

    /// Append a copy of a part right after the original.
    ///
    /// The copy gets the next free part number, starts one cycle after the
    /// original, and the job grows by one part. Returns None if the part or
    /// its job is missing.
    pub async fn duplicate_part(&self, part_id: &str) -> Result<Option<Part>> {
        let new_id = self.next_id("part");
        self.transact("duplicate_part", |draft, events| -> Result<Option<Part>> {
            let Some(original) = draft.part(part_id).cloned() else {
                return Ok(None);
            };
            let Some(cycle_ms) = draft.job(&original.job_id).map(Job::cycle_time_ms) else {
                return Ok(None);
            };
            let start_time = original.start_time.saturating_add(cycle_ms);
            validate_start_time(start_time)?;

            let next_number = draft
                .job_parts(&original.job_id)
                .last()
                .map_or(0, |p| p.part_number)
                + 1;

            let Some(job) = draft.jobs.get_mut(&original.job_id) else {
                return Ok(None);
            };
            job.total_parts += 1;
            let job = job.clone();

            let copy = Part {
                part_id: new_id,
                part_number: next_number,
                start_time,
                ..original.clone()
            };
            draft.parts.insert(copy.part_id.clone(), copy.clone());

            events.push(ScheduleEvent::PartDuplicated {
                new_part: copy.clone(),
                original,
            });
            events.push(ScheduleEvent::JobUpdated(job));
            Ok(Some(copy))
        })
        .await?
    }

    /// Set a job's priority level and rush flag. Returns None if the job is missing.
    pub async fn set_job_priority(
        &self,
        job_id: &str,
        priority_level: PriorityLevel,
        rush_order: bool,
    ) -> Result<Option<Job>> {
        self.transact("set_job_priority", |draft, events| {
            let job = draft.jobs.get_mut(job_id)?;
            job.priority_level = priority_level;
            job.rush_order = rush_order;
            let job = job.clone();
            events.push(ScheduleEvent::JobPriorityUpdated(job.clone()));
            Some(job)
        })
        .await
    }

    /// Jobs ordered by effective priority score, highest first.
    ///
    /// Equal scores go to the older job, then the smaller id.
    pub async fn jobs_by_priority(&self, level: Option<PriorityLevel>) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .read(|s| {
                s.jobs
                    .values()
                    .filter(|j| level.map_or(true, |l| j.priority_level == l))
                    .cloned()
                    .collect()
            })
            .await;
        jobs.sort_by(|a, b| {
            b.effective_priority_score()
                .cmp(&a.effective_priority_score())
                .then(a.created_at.cmp(&b.created_at))
                .then_with(|| a.job_id.cmp(&b.job_id))
        });
        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::application::conflict::find_overlaps;
    use crate::application::schedule::{MoveDecision, MoveOutcome};
    use crate::domain::calendar::Granularity;
    use crate::domain::{
        DomainError, JobStatus, Part, PriorityLevel, ScheduleEvent, MAX_CYCLE_TIME_MINUTES,
        MAX_START_TIME,
    };
    use crate::error::AppError;
    use chrono::Utc;
    use tokio_test::assert_err;

    #[tokio::test]
    async fn test_create_job_places_parts_back_to_back() {
        let (repo, store) = repository();
        let job = repo
            .create_job_with_parts("Widget", "M1", 3, 60.0, T0, JobStatus::Active)
            .await
            .unwrap();

        let parts = repo.get_job_parts(&job.job_id).await;
        let starts: Vec<i64> = parts.iter().map(|p| p.start_time).collect();
        assert_eq!(starts, vec![T0, T0 + 3_600_000, T0 + 7_200_000]);
        assert!(parts.iter().all(|p| p.is_on("M1") && p.estimate));
        assert_eq!(job.total_parts, 3);
        assert_eq!(job.created_at, T0);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_create_job_rejects_bad_input() {
        let (repo, store) = repository();

        assert_err!(repo.create_job_with_parts("X", "M1", 0, 60.0, T0, JobStatus::Active).await);
        assert_err!(repo.create_job_with_parts("X", "M1", 2, -1.0, T0, JobStatus::Active).await);
        assert_err!(
            repo.create_job_with_parts("X", "M1", 2, f64::NAN, T0, JobStatus::Active)
                .await
        );
        assert_err!(repo.create_job_with_parts("X", "M1", 2, 5.0, -5, JobStatus::Active).await);
        assert_eq!(store.save_count(), 0);
        assert!(repo.get_all_jobs().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_job_rejects_runs_past_the_calendar() {
        let (repo, store) = repository();

        assert_err!(repo.create_job_with_parts("Huge", "M1", 2, 1e15, T0, JobStatus::Active).await);

        let yearly = MAX_CYCLE_TIME_MINUTES;
        let long_run = repo
            .create_job_with_parts("Long", "M1", 100_000, yearly, T0, JobStatus::Active)
            .await;
        assert!(matches!(long_run, Err(AppError::Domain(DomainError::TimeOutOfRange(_)))));

        let late = repo
            .create_job_with_parts("Late", "M1", 2, 60.0, MAX_START_TIME, JobStatus::Active)
            .await;
        assert_err!(late);

        assert_eq!(store.save_count(), 0);
        assert!(repo.get_all_parts().await.is_empty());
    }

    #[tokio::test]
    async fn test_move_into_middle_pushes_first_part() {
        let (repo, _) = repository();
        let job = repo
            .create_job_with_parts("Widget", "M1", 3, 60.0, T0, JobStatus::Active)
            .await
            .unwrap();
        let parts = repo.get_job_parts(&job.job_id).await;
        let mut events = repo.subscribe();

        assert!(repo.move_part(&parts[1].part_id, "M1", T0 + 1_800_000).await.unwrap());

        let get = |i: usize| parts[i].part_id.clone();
        assert_eq!(repo.get_part(&get(1)).await.unwrap().start_time, T0 + 1_800_000);
        assert_eq!(repo.get_part(&get(0)).await.unwrap().start_time, T0 + 5_400_000);
        assert_eq!(repo.get_part(&get(2)).await.unwrap().start_time, T0 + 7_200_000);

        assert_eq!(events.recv().await.unwrap().name(), "part_moved");
        match events.recv().await.unwrap() {
            ScheduleEvent::PartUpdated(pushed) => {
                assert_eq!(pushed.part_id, get(0));
                assert_eq!(pushed.start_time, T0 + 5_400_000);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(events.try_recv().is_err(), "only the pushed part is announced");
    }

    #[tokio::test]
    async fn test_move_leaves_no_overlaps_when_chain_fits() {
        let (repo, _) = repository();
        let job = repo
            .create_job_with_parts("Widget", "M1", 3, 60.0, T0, JobStatus::Active)
            .await
            .unwrap();
        let parts = repo.get_job_parts(&job.job_id).await;

        // part 1 onto the second half of part 3: part 3 is pushed to the tail
        assert!(repo.move_part(&parts[0].part_id, "M1", T0 + 2 * HOUR + HOUR / 2).await.unwrap());

        assert_eq!(
            repo.get_part(&parts[2].part_id).await.unwrap().start_time,
            T0 + 3 * HOUR + HOUR / 2
        );
        assert!(repo.read(find_overlaps).await.is_empty());
    }

    #[tokio::test]
    async fn test_single_pass_can_leave_residual_conflict() {
        let (repo, _) = repository();
        let short = repo
            .create_job_with_parts("Short", "M1", 1, 60.0, T0, JobStatus::Active)
            .await
            .unwrap();
        let long = repo
            .create_job_with_parts("Long", "M1", 1, 60.0, T0 + 2 * HOUR, JobStatus::Active)
            .await
            .unwrap();
        let mover = repo
            .create_job_with_parts("Mover", "M2", 1, 60.0, T0, JobStatus::Active)
            .await
            .unwrap();
        let s1 = repo.get_job_parts(&short.job_id).await.remove(0);
        let l1 = repo.get_job_parts(&long.job_id).await.remove(0);
        let m1 = repo.get_job_parts(&mover.job_id).await.remove(0);

        assert!(repo.move_part(&m1.part_id, "M1", T0 + HOUR / 2).await.unwrap());

        // s1 is pushed to [1.5h, 2.5h) which now overlaps l1 at [2h, 3h)
        assert_eq!(repo.get_part(&s1.part_id).await.unwrap().start_time, T0 + HOUR + HOUR / 2);
        assert_eq!(repo.get_part(&l1.part_id).await.unwrap().start_time, T0 + 2 * HOUR);

        let overlaps = repo.read(find_overlaps).await;
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].first, s1.part_id);
        assert_eq!(overlaps[0].second, l1.part_id);
    }

    #[tokio::test]
    async fn test_move_publishes_old_placement() {
        let (repo, _) = repository();
        let job = repo
            .create_job_with_parts("Widget", "M1", 1, 60.0, T0, JobStatus::Active)
            .await
            .unwrap();
        let part = repo.get_job_parts(&job.job_id).await.remove(0);
        let mut events = repo.subscribe();

        repo.move_part(&part.part_id, "M2", T0 + HOUR).await.unwrap();

        match events.recv().await.unwrap() {
            ScheduleEvent::PartMoved {
                part: moved,
                old_machine_id,
                old_start_time,
            } => {
                assert!(moved.is_on("M2"));
                assert_eq!(old_machine_id.as_deref(), Some("M1"));
                assert_eq!(old_start_time, T0);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_move_missing_part_returns_false() {
        let (repo, store) = repository();
        assert!(!repo.move_part("part-404", "M1", T0).await.unwrap());
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_move_part_without_job_returns_false() {
        let (repo, store) = repository();
        repo.add_part(Part::new("part-orphan", "job-gone", 1, "M1", T0))
            .await
            .unwrap();
        let saves = store.save_count();

        assert!(!repo.move_part("part-orphan", "M2", T0 + HOUR).await.unwrap());

        assert_eq!(store.save_count(), saves);
        let part = repo.get_part("part-orphan").await.unwrap();
        assert!(part.is_on("M1"));
        assert_eq!(part.start_time, T0);
    }

    #[tokio::test]
    async fn test_move_rejects_start_past_the_calendar() {
        let (repo, _) = repository();
        let job = repo
            .create_job_with_parts("Widget", "M1", 1, 60.0, T0, JobStatus::Active)
            .await
            .unwrap();
        let part = repo.get_job_parts(&job.job_id).await.remove(0);

        assert_err!(repo.move_part(&part.part_id, "M1", i64::MAX - 1).await);
        assert_eq!(repo.get_part(&part.part_id).await.unwrap().start_time, T0);
    }

    #[tokio::test]
    async fn test_duplicate_part_appends_after_original() {
        let (repo, _) = repository();
        let job = repo
            .create_job_with_parts("Widget", "M1", 3, 60.0, T0, JobStatus::Active)
            .await
            .unwrap();
        let parts = repo.get_job_parts(&job.job_id).await;

        let copy = repo.duplicate_part(&parts[0].part_id).await.unwrap().unwrap();

        assert_eq!(copy.part_number, 4);
        assert_eq!(copy.start_time, T0 + HOUR);
        assert_eq!(copy.machine_id.as_deref(), Some("M1"));
        assert_ne!(copy.part_id, parts[0].part_id);
        assert_eq!(repo.get_job(&job.job_id).await.unwrap().total_parts, 4);
        assert!(repo.read(|s| s.numbering_is_contiguous(&job.job_id)).await);

        assert!(repo.duplicate_part("part-404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_refuses_copy_past_the_calendar() {
        let (repo, store) = repository();
        let start = MAX_START_TIME - HOUR / 2;
        let job = repo
            .create_job_with_parts("Last", "M1", 1, 60.0, start, JobStatus::Active)
            .await
            .unwrap();
        let part = repo.get_job_parts(&job.job_id).await.remove(0);

        assert_err!(repo.duplicate_part(&part.part_id).await);

        assert_eq!(store.save_count(), 1);
        assert_eq!(repo.get_job(&job.job_id).await.unwrap().total_parts, 1);
        assert_eq!(repo.get_job_parts(&job.job_id).await.len(), 1);
    }

    // T0 is 2023-11-14T22:13:20Z
    const T0_QUARTER: i64 = T0 + 100_000;

    #[tokio::test]
    async fn test_snap_moves_part_onto_grid_once() {
        let (repo, store) = repository();
        let job = repo
            .create_job_with_parts("Widget", "M1", 1, 60.0, T0, JobStatus::Active)
            .await
            .unwrap();
        let part = repo.get_job_parts(&job.job_id).await.remove(0);
        let quarter = Granularity::FifteenMinutes;

        let outcome = repo.snap_part_to_granularity(&part.part_id, quarter, &Utc).await;
        assert_eq!(outcome.unwrap(), MoveOutcome::Moved);
        let snapped = repo.get_part(&part.part_id).await.unwrap();
        assert_eq!(snapped.start_time, T0_QUARTER);
        assert!(snapped.is_on("M1"));

        let saves = store.save_count();
        let again = repo.snap_part_to_granularity(&part.part_id, quarter, &Utc).await;
        assert_eq!(again.unwrap(), MoveOutcome::Unchanged);
        assert_eq!(store.save_count(), saves);
    }

    #[tokio::test]
    async fn test_snap_cascades_like_a_move() {
        let (repo, _) = repository();
        let first = repo
            .create_job_with_parts("First", "M1", 1, 60.0, T0, JobStatus::Active)
            .await
            .unwrap();
        let second = repo
            .create_job_with_parts("Second", "M1", 1, 60.0, T0 + HOUR, JobStatus::Active)
            .await
            .unwrap();
        let p1 = repo.get_job_parts(&first.job_id).await.remove(0);
        let p2 = repo.get_job_parts(&second.job_id).await.remove(0);

        let outcome = repo
            .snap_part_to_granularity(&p1.part_id, Granularity::FifteenMinutes, &Utc)
            .await
            .unwrap();

        assert_eq!(outcome, MoveOutcome::Moved);
        assert_eq!(
            repo.get_part(&p2.part_id).await.unwrap().start_time,
            T0_QUARTER + HOUR
        );
        assert!(repo.read(find_overlaps).await.is_empty());
    }

    #[tokio::test]
    async fn test_snap_respects_locks() {
        let (repo, store) = repository();
        let job = repo
            .create_job_with_parts("Fixture", "M1", 1, 60.0, T0, JobStatus::Locked)
            .await
            .unwrap();
        let part = repo.get_job_parts(&job.job_id).await.remove(0);
        let hourly = Granularity::OneHour;

        let locked = repo.snap_part_to_granularity(&part.part_id, hourly, &Utc).await;
        assert_eq!(locked.unwrap(), MoveOutcome::Refused(MoveDecision::JobLocked));
        assert_eq!(repo.get_part(&part.part_id).await.unwrap().start_time, T0);

        let missing = repo.snap_part_to_granularity("part-404", hourly, &Utc).await;
        assert_eq!(missing.unwrap(), MoveOutcome::Refused(MoveDecision::PartNotFound));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_locked_jobs_refuse_moves_unless_forced() {
        let (repo, _) = repository();
        let job = repo
            .create_job_with_parts("Fixture", "M1", 1, 60.0, T0, JobStatus::Locked)
            .await
            .unwrap();
        let part = repo.get_job_parts(&job.job_id).await.remove(0);

        assert_eq!(repo.can_move_part(&part.part_id).await, MoveDecision::JobLocked);
        assert_eq!(repo.can_move_part("part-404").await, MoveDecision::PartNotFound);

        let refused = repo
            .move_part_with_lock_check(&part.part_id, "M2", T0, false)
            .await
            .unwrap();
        assert_eq!(refused, MoveOutcome::Refused(MoveDecision::JobLocked));
        assert!(repo.get_part(&part.part_id).await.unwrap().is_on("M1"));

        let forced = repo
            .move_part_with_lock_check(&part.part_id, "M2", T0, true)
            .await
            .unwrap();
        assert_eq!(forced, MoveOutcome::Moved);
        assert!(repo.get_part(&part.part_id).await.unwrap().is_on("M2"));

        let missing = repo
            .move_part_with_lock_check("part-404", "M2", T0, true)
            .await
            .unwrap();
        assert_eq!(missing, MoveOutcome::Refused(MoveDecision::PartNotFound));
    }

    #[tokio::test]
    async fn test_jobs_by_priority_orders_by_effective_score() {
        let (repo, _) = repository();
        let normal = repo
            .create_job_with_parts("Normal", "M1", 1, 10.0, T0, JobStatus::Active)
            .await
            .unwrap();
        let high = repo
            .create_job_with_parts("High", "M1", 1, 10.0, T0, JobStatus::Active)
            .await
            .unwrap();
        let rush = repo
            .create_job_with_parts("Rush", "M1", 1, 10.0, T0, JobStatus::Active)
            .await
            .unwrap();

        repo.set_job_priority(&high.job_id, PriorityLevel::High, false)
            .await
            .unwrap();
        let updated = repo
            .set_job_priority(&rush.job_id, PriorityLevel::Normal, true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.effective_priority_score(), 70);

        let ordered: Vec<String> = repo
            .jobs_by_priority(None)
            .await
            .into_iter()
            .map(|j| j.job_id)
            .collect();
        assert_eq!(ordered, vec![high.job_id.clone(), rush.job_id.clone(), normal.job_id.clone()]);

        let only_normal = repo.jobs_by_priority(Some(PriorityLevel::Normal)).await;
        assert_eq!(only_normal.len(), 2);
        assert_eq!(only_normal[0].job_id, rush.job_id);

        assert!(repo
            .set_job_priority("job-404", PriorityLevel::Low, false)
            .await
            .unwrap()
            .is_none());
    }
}
