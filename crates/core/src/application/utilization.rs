// Utilization Calculator and day-window queries (pure, read-only)

use crate::domain::calendar::{MS_PER_DAY, MS_PER_WEEK};
use crate::domain::{Part, Schedule};

/// Minutes in the 7-day utilization window
pub const MINUTES_PER_WEEK: f64 = 7.0 * 24.0 * 60.0;

/// Percentage of a machine's week spent on scheduled parts.
///
/// Only parts that *start* inside `[week_start, week_start + 7d)` count, each
/// for its job's full cycle time; nothing is prorated. The result is not
/// clamped, so an over-booked machine can exceed 100.
pub fn utilization(schedule: &Schedule, machine_id: &str, week_start: i64) -> f64 {
    let week_end = week_start.saturating_add(MS_PER_WEEK);

    let booked_minutes: f64 = schedule
        .parts
        .values()
        .filter(|p| p.is_on(machine_id))
        .filter(|p| p.start_time >= week_start && p.start_time < week_end)
        .filter_map(|p| schedule.job(&p.job_id))
        .map(|job| job.cycle_time)
        .sum();

    booked_minutes / MINUTES_PER_WEEK * 100.0
}

/// Parts on a machine whose interval touches the day `[day_start, day_start + 24h)`.
///
/// A part qualifies if it starts inside the day, ends inside the day, or
/// spans the whole day. Sorted by start time.
pub fn parts_for_day<'a>(
    schedule: &'a Schedule,
    machine_id: &str,
    day_start: i64,
) -> Vec<&'a Part> {
    let day_end = day_start.saturating_add(MS_PER_DAY);

    schedule
        .machine_parts(machine_id)
        .into_iter()
        .filter(|p| {
            let Some((start, end)) = schedule.interval_of(p) else {
                return false;
            };
            let starts_inside = start >= day_start && start < day_end;
            let ends_inside = end > day_start && end <= day_end;
            let spans_day = start < day_start && end > day_end;
            starts_inside || ends_inside || spans_day
        })
        .collect()
}
