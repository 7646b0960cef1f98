//! # Closed-Library Due-Date Strategies
//!
//! A loan policy names what happens when a computed due date falls while the
//! service point is closed. Each variant maps a requested instant and the
//! surrounding calendar to an adjusted instant, or fails with
//! [`CirculationError::CalendarUnavailable`] when the day it needs is closed.
//!
//! ## Variants
//!
//! | Variant | Requested day open | Requested day closed |
//! |---|---|---|
//! | `KeepCurrentDate` | unchanged | unchanged |
//! | `MoveToEndOfPreviousOpenDay` | end of requested day | end of previous day |
//! | `MoveToEndOfNextOpenDay` | end of requested day | end of next day |
//! | `EndOfNextOpenDay` | end of requested day | end of next day |
//! | `EndOfPreviousDayTruncate` | end of previous day | end of previous day |
//! | `EndOfCurrentServicePointHours` | unchanged inside hours, else last closing after the loan start | last closing after the loan start |
//! | `BeginningOfNextOpenServicePointHours` | unchanged inside hours, else next opening | next day's opening |
//!
//! "Previous" and "next" are the nearest open days the calendar knows of on
//! either side; a closed placeholder stands in when there is none, and a
//! strategy that needs it fails.
//!
//! `EndOfCurrentServicePointHours` never moves a due date to a closing at or
//! before the loan start. When no interval between the loan start and the
//! requested instant closes, the end of the first interval still open at or
//! opening after the loan start is used.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use circ_core::temporal::{at_end_of_day, at_local_time, local_date, local_time};
use circ_core::CirculationError;

use crate::opening_day::{AdjacentOpeningDays, OpeningDay};

/// How a due date on a closed day is adjusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClosedLibraryStrategy {
    /// Due dates on closed days stand.
    #[default]
    #[serde(alias = "KEEP_CURRENT_DATE_TIME")]
    KeepCurrentDate,
    #[serde(rename = "END_OF_THE_PREVIOUS_OPEN_DAY")]
    MoveToEndOfPreviousOpenDay,
    #[serde(rename = "END_OF_THE_NEXT_OPEN_DAY")]
    MoveToEndOfNextOpenDay,
    /// Used to truncate due dates for callers other than the loan policy,
    /// e.g. patron expiration.
    EndOfNextOpenDay,
    EndOfPreviousDayTruncate,
    #[serde(rename = "END_OF_THE_CURRENT_SERVICE_POINT_HOURS")]
    EndOfCurrentServicePointHours,
    #[serde(rename = "BEGINNING_OF_THE_NEXT_OPEN_SERVICE_POINT_HOURS")]
    BeginningOfNextOpenServicePointHours,
}

impl ClosedLibraryStrategy {
    /// Whether this strategy consults the calendar at all. Callers skip the
    /// calendar lookup when it does not.
    pub fn needs_calendar(&self) -> bool {
        !matches!(self, Self::KeepCurrentDate)
    }

    /// Adjust `requested` against the calendar around it. `loan_start` is
    /// when the loan period began (loan date or renewal time).
    ///
    /// `days.requested_day` must describe the local date of `requested` in
    /// `zone`.
    ///
    /// # Errors
    ///
    /// [`CirculationError::CalendarUnavailable`] when the adjacent day the
    /// strategy moves to is closed.
    pub fn calculate(
        &self,
        requested: DateTime<Utc>,
        loan_start: DateTime<Utc>,
        days: &AdjacentOpeningDays,
        zone: &FixedOffset,
    ) -> Result<DateTime<Utc>, CirculationError> {
        let requested_date = local_date(&requested, zone);
        let absent = || CirculationError::CalendarUnavailable {
            date: requested_date,
        };

        let adjusted = match self {
            Self::KeepCurrentDate => Ok(requested),
            Self::MoveToEndOfPreviousOpenDay => {
                if days.requested_day.open {
                    Ok(at_end_of_day(requested_date, zone))
                } else {
                    end_of_open_day(&days.previous_day, zone).ok_or_else(absent)
                }
            }
            Self::MoveToEndOfNextOpenDay | Self::EndOfNextOpenDay => {
                if days.requested_day.open {
                    Ok(at_end_of_day(requested_date, zone))
                } else {
                    end_of_open_day(&days.next_day, zone).ok_or_else(absent)
                }
            }
            Self::EndOfPreviousDayTruncate => {
                end_of_open_day(&days.previous_day, zone).ok_or_else(absent)
            }
            Self::EndOfCurrentServicePointHours => {
                if days.requested_day.is_open_at(local_time(&requested, zone)) {
                    Ok(requested)
                } else {
                    end_of_current_hours(requested, loan_start, days, zone).ok_or_else(absent)
                }
            }
            Self::BeginningOfNextOpenServicePointHours => {
                let time = local_time(&requested, zone);
                let day = &days.requested_day;
                if day.is_open_at(time) {
                    Ok(requested)
                } else if let Some(opening) = day
                    .open
                    .then(|| day.earliest_opening_after(time))
                    .flatten()
                {
                    Ok(at_local_time(day.date, opening, zone))
                } else {
                    days.next_day.opening_instant(zone).ok_or_else(absent)
                }
            }
        };

        match &adjusted {
            Ok(due) if *due != requested => {
                tracing::debug!(strategy = ?self, %requested, adjusted = %due, "closed-library adjustment");
            }
            Err(_) => {
                tracing::debug!(strategy = ?self, %requested, "no open calendar day for closed-library adjustment");
            }
            _ => {}
        }
        adjusted
    }
}

fn end_of_open_day(day: &OpeningDay, zone: &FixedOffset) -> Option<DateTime<Utc>> {
    day.open.then(|| at_end_of_day(day.date, zone))
}

/// Latest closing in `(loan_start, requested]`, else the earliest closing
/// after `loan_start`.
fn end_of_current_hours(
    requested: DateTime<Utc>,
    loan_start: DateTime<Utc>,
    days: &AdjacentOpeningDays,
    zone: &FixedOffset,
) -> Option<DateTime<Utc>> {
    let closings: Vec<DateTime<Utc>> = [&days.previous_day, &days.requested_day, &days.next_day]
        .into_iter()
        .flat_map(|day| {
            let end_of_day = at_end_of_day(day.date, zone);
            day.open_intervals(zone)
                .into_iter()
                .map(move |(_, end)| end.min(end_of_day))
        })
        .filter(|closing| *closing > loan_start)
        .collect();

    closings
        .iter()
        .filter(|closing| **closing <= requested)
        .max()
        .or_else(|| closings.iter().min())
        .copied()
}
