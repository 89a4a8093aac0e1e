//! Conflict Detector & Resolver
//!
//! Two parts on the same machine conflict iff their half-open intervals
//! `[start, start + cycle_time)` overlap. A part's duration always comes from
//! its own job's cycle time.
//!
//! Resolution is a single cascading pass: the displaced parts are pushed,
//! in their original order, back-to-back right after the new occupant. They
//! stay on the same machine and detection is not re-run afterwards, so a
//! pushed part can land on a part that was not in the original conflict set.
//! [`find_overlaps`] reports such residual conflicts.

use crate::domain::{cycle_time_to_ms, intervals_overlap, PartId, Schedule};
use tracing::debug;

/// A pair of overlapping parts on one machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    pub machine_id: String,
    pub first: PartId,
    pub second: PartId,
}

/// Find the parts on `machine_id` overlapping a candidate placement.
///
/// `excluding_part_id` is the part being placed (never conflicts with itself).
/// Parts whose job is missing are skipped. The result is sorted by ascending
/// `start_time`; ties keep identifier order.
pub fn find_conflicts(
    schedule: &Schedule,
    excluding_part_id: &str,
    machine_id: &str,
    candidate_start: i64,
    candidate_cycle_time: f64,
) -> Vec<PartId> {
    let candidate_end = candidate_start.saturating_add(cycle_time_to_ms(candidate_cycle_time));

    let mut conflicts: Vec<(i64, PartId)> = schedule
        .parts
        .values()
        .filter(|p| p.part_id != excluding_part_id && p.is_on(machine_id))
        .filter_map(|p| {
            let (start, end) = schedule.interval_of(p)?;
            intervals_overlap(candidate_start, candidate_end, start, end)
                .then(|| (start, p.part_id.clone()))
        })
        .collect();

    conflicts.sort_by_key(|(start, _)| *start);
    conflicts.into_iter().map(|(_, id)| id).collect()
}

/// Push each conflicting part to start right after the previous occupant.
///
/// `conflicts` must be in the order produced by [`find_conflicts`]. The first
/// one starts at `moved_part_end_time`; each following one starts where the
/// previous one ends. Parts whose job is missing are left untouched.
pub fn resolve_conflicts(
    schedule: &mut Schedule,
    conflicts: &[PartId],
    moved_part_end_time: i64,
) {
    let mut next_start = moved_part_end_time;

    for part_id in conflicts {
        let Some(cycle_ms) = schedule
            .part(part_id)
            .and_then(|p| schedule.job(&p.job_id))
            .map(|job| job.cycle_time_ms())
        else {
            continue;
        };

        if let Some(part) = schedule.parts.get_mut(part_id) {
            debug!(
                part_id = %part_id,
                from = part.start_time,
                to = next_start,
                "Cascading conflicting part"
            );
            part.start_time = next_start;
            next_start = next_start.saturating_add(cycle_ms);
        }
    }
}

/// Every pair of overlapping parts, grouped per machine.
///
/// Used to audit a schedule after edits; a consistent schedule returns an empty list.
pub fn find_overlaps(schedule: &Schedule) -> Vec<Overlap> {
    let mut machine_ids: Vec<&str> = schedule
        .parts
        .values()
        .filter_map(|p| p.machine_id.as_deref())
        .collect();
    machine_ids.sort_unstable();
    machine_ids.dedup();

    let mut overlaps = Vec::new();
    for machine_id in machine_ids {
        let timeline: Vec<(i64, i64, &PartId)> = schedule
            .machine_parts(machine_id)
            .into_iter()
            .filter_map(|p| schedule.interval_of(p).map(|(s, e)| (s, e, &p.part_id)))
            .collect();

        for (i, (a_start, a_end, a_id)) in timeline.iter().enumerate() {
            for (b_start, b_end, b_id) in &timeline[i + 1..] {
                // sorted by start: nothing further right can overlap
                if *b_start >= *a_end {
                    break;
                }
                if intervals_overlap(*a_start, *a_end, *b_start, *b_end) {
                    overlaps.push(Overlap {
                        machine_id: machine_id.to_string(),
                        first: (*a_id).clone(),
                        second: (*b_id).clone(),
                    });
                }
            }
        }
    }
    overlaps
}
