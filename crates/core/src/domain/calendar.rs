//! Calendar helpers for turning shop-floor dates into epoch milliseconds.
//!
//! All helpers take the time zone explicitly so callers decide between the
//! shop's local time and UTC.
//!
//! The scheduling grid is measured from local midnight, so a 1 hour grid in
//! a zone offset by 30 minutes still lands on local full hours.

use super::error::{DomainError, Result};
use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, TimeZone};

pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
pub const MS_PER_WEEK: i64 = 7 * MS_PER_DAY;

/// Step of the scheduling grid parts snap to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    #[default]
    OneHour,
}

impl Granularity {
    pub fn minutes(self) -> i64 {
        match self {
            Granularity::FiveMinutes => 5,
            Granularity::FifteenMinutes => 15,
            Granularity::ThirtyMinutes => 30,
            Granularity::OneHour => 60,
        }
    }

    pub fn step_millis(self) -> i64 {
        self.minutes() * 60 * 1000
    }
}

/// Which grid line a timestamp between two lines goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapDirection {
    Floor,
    Ceil,
    /// Nearest line; exact halves go to the later one
    #[default]
    Round,
}

/// Convert a `YYYY-MM-DD` date plus hour/minute in `tz` to epoch ms.
///
/// Ambiguous local times (DST fall-back) resolve to the earlier instant;
/// non-existent ones (DST spring-forward) are rejected.
pub fn local_start_millis<Tz: TimeZone>(
    date: &str,
    hour: u32,
    minute: u32,
    tz: &Tz,
) -> Result<i64> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| DomainError::InvalidDate(format!("{}: {}", date, e)))?;
    day_time_millis(day, hour, minute, tz)
}

fn day_time_millis<Tz: TimeZone>(
    day: NaiveDate,
    hour: u32,
    minute: u32,
    tz: &Tz,
) -> Result<i64> {
    let naive = day
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| DomainError::InvalidDate(format!("{} {:02}:{:02}", day, hour, minute)))?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.timestamp_millis()),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.timestamp_millis()),
        LocalResult::None => Err(DomainError::InvalidDate(format!(
            "{} {:02}:{:02} does not exist in this time zone",
            day, hour, minute
        ))),
    }
}

/// Monday 00:00 of the week containing `now_millis`, in `tz`
pub fn week_start_millis<Tz: TimeZone>(now_millis: i64, tz: &Tz) -> Result<i64> {
    let now = local_date_time(now_millis, tz)?;
    let monday = now.date_naive() - Duration::days(now.weekday().num_days_from_monday() as i64);
    day_time_millis(monday, 0, 0, tz)
}

/// Local midnight of the day containing `timestamp`, in `tz`
pub fn day_start_millis<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Result<i64> {
    let local = local_date_time(timestamp, tz)?;
    day_time_millis(local.date_naive(), 0, 0, tz)
}

/// Move `timestamp` onto the `granularity` grid of its local day.
pub fn snap_to_grid<Tz: TimeZone>(
    timestamp: i64,
    granularity: Granularity,
    direction: SnapDirection,
    tz: &Tz,
) -> Result<i64> {
    let day_start = day_start_millis(timestamp, tz)?;
    let step = granularity.step_millis();
    let offset = timestamp - day_start;

    let floor = offset.div_euclid(step) * step;
    let remainder = offset - floor;
    let snapped = match direction {
        SnapDirection::Floor => floor,
        SnapDirection::Ceil if remainder > 0 => floor + step,
        SnapDirection::Ceil => floor,
        SnapDirection::Round if remainder * 2 >= step => floor + step,
        SnapDirection::Round => floor,
    };

    day_start
        .checked_add(snapped)
        .ok_or_else(|| DomainError::TimeOutOfRange(format!("{} snapped to grid", timestamp)))
}

fn local_date_time<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Result<DateTime<Tz>> {
    tz.timestamp_millis_opt(timestamp)
        .single()
        .ok_or_else(|| DomainError::InvalidDate(format!("timestamp {}", timestamp)))
}
