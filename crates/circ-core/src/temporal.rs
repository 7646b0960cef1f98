//! # Local Time Helpers
//!
//! Due dates are stored as UTC instants but decided in the library's local
//! time: "the end of the day" and "which day is this" only make sense in a
//! zone. The zone is a `FixedOffset` supplied by the caller (tenant
//! configuration); nothing here reads the process time zone.
//!
//! End of day is `23:59:59.999` local time.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

use crate::error::CirculationError;

/// `23:59:59.999`.
pub fn end_of_day_time() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

/// The UTC instant of `time` on local `date` in `zone`.
pub fn at_local_time(date: NaiveDate, time: NaiveTime, zone: &FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(time);
    let utc = local - Duration::seconds(i64::from(zone.local_minus_utc()));
    Utc.from_utc_datetime(&utc)
}

/// `23:59:59.999` on local `date`, as a UTC instant.
pub fn at_end_of_day(date: NaiveDate, zone: &FixedOffset) -> DateTime<Utc> {
    at_local_time(date, end_of_day_time(), zone)
}

/// Midnight at the start of local `date`, as a UTC instant.
pub fn at_start_of_day(date: NaiveDate, zone: &FixedOffset) -> DateTime<Utc> {
    at_local_time(date, NaiveTime::MIN, zone)
}

/// The local calendar date of an instant.
pub fn local_date(instant: &DateTime<Utc>, zone: &FixedOffset) -> NaiveDate {
    instant.with_timezone(zone).date_naive()
}

/// The local wall-clock time of an instant.
pub fn local_time(instant: &DateTime<Utc>, zone: &FixedOffset) -> NaiveTime {
    instant.with_timezone(zone).time()
}

/// Parse a UTC offset: `Z`, `UTC`, or a signed `HH:MM` / `HHMM` offset as
/// chrono's `FixedOffset` parser reads it.
///
/// # Errors
///
/// Returns [`CirculationError::Configuration`] for anything else, or for an
/// offset of 24 hours or more.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, CirculationError> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }
    trimmed
        .parse::<FixedOffset>()
        .map_err(|e| CirculationError::Configuration(format!("invalid UTC offset {s:?}: {e}")))
}
