//! # Opening Days
//!
//! One `OpeningDay` per calendar date of a service point. A date with no
//! calendar record is represented as a closed day; strategies never see a
//! "missing" day, only a closed one.
//!
//! An open day is either open all day or open during its `opening_hours`.
//! An open day that lists no hours is treated as open all day.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use circ_core::temporal::{at_local_time, at_start_of_day};

/// One opening interval, local wall-clock time, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHour {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl OpeningHour {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

/// Open/closed state of one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningDay {
    pub date: NaiveDate,
    pub open: bool,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub opening_hours: Vec<OpeningHour>,
}

impl OpeningDay {
    /// A date on which the service point is closed (or has no calendar).
    pub fn closed(date: NaiveDate) -> Self {
        Self {
            date,
            open: false,
            all_day: false,
            opening_hours: Vec::new(),
        }
    }

    /// A date on which the service point is open around the clock.
    pub fn open_all_day(date: NaiveDate) -> Self {
        Self {
            date,
            open: true,
            all_day: true,
            opening_hours: Vec::new(),
        }
    }

    /// A date with explicit opening hours. Hours are kept sorted by start.
    pub fn open_during(date: NaiveDate, mut hours: Vec<OpeningHour>) -> Self {
        hours.sort_by_key(|h| h.start);
        Self {
            date,
            open: true,
            all_day: false,
            opening_hours: hours,
        }
    }

    fn is_open_whole_day(&self) -> bool {
        self.open && (self.all_day || self.opening_hours.is_empty())
    }

    /// Whether the service point is open at local `time` on this date.
    pub fn is_open_at(&self, time: NaiveTime) -> bool {
        if !self.open {
            return false;
        }
        self.is_open_whole_day() || self.opening_hours.iter().any(|h| h.contains(time))
    }

    /// Earliest opening time after `time`.
    pub fn earliest_opening_after(&self, time: NaiveTime) -> Option<NaiveTime> {
        self.opening_hours
            .iter()
            .filter(|h| h.start > time)
            .map(|h| h.start)
            .min()
    }

    /// First opening instant of this date. `None` when closed.
    pub fn opening_instant(&self, zone: &FixedOffset) -> Option<DateTime<Utc>> {
        if !self.open {
            return None;
        }
        if self.is_open_whole_day() {
            return Some(at_start_of_day(self.date, zone));
        }
        self.opening_hours
            .iter()
            .map(|h| h.start)
            .min()
            .map(|start| at_local_time(self.date, start, zone))
    }

    /// Open intervals of this date as half-open UTC ranges.
    ///
    /// A whole open day spans local midnight to the next local midnight.
    pub fn open_intervals(&self, zone: &FixedOffset) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        if !self.open {
            return Vec::new();
        }
        if self.is_open_whole_day() {
            let start = at_start_of_day(self.date, zone);
            return vec![(start, start + Duration::days(1))];
        }
        self.opening_hours
            .iter()
            .map(|h| (at_local_time(self.date, h.start, zone), at_local_time(self.date, h.end, zone)))
            .collect()
    }
}

/// The calendar around a requested date: the nearest open days before and
/// after it, and the requested day itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjacentOpeningDays {
    pub previous_day: OpeningDay,
    pub requested_day: OpeningDay,
    pub next_day: OpeningDay,
}

impl AdjacentOpeningDays {
    pub fn new(previous_day: OpeningDay, requested_day: OpeningDay, next_day: OpeningDay) -> Self {
        Self {
            previous_day,
            requested_day,
            next_day,
        }
    }

    /// Three closed days around `date`: what a service point without any
    /// calendar looks like.
    pub fn all_closed(date: NaiveDate) -> Self {
        let previous = date.pred_opt().unwrap_or(date);
        let next = date.succ_opt().unwrap_or(date);
        Self::new(
            OpeningDay::closed(previous),
            OpeningDay::closed(date),
            OpeningDay::closed(next),
        )
    }

    pub fn requested_date(&self) -> NaiveDate {
        self.requested_day.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn split_day() -> OpeningDay {
        OpeningDay::open_during(
            date(4),
            vec![
                OpeningHour::new(time(14, 0), time(18, 0)),
                OpeningHour::new(time(9, 0), time(12, 0)),
            ],
        )
    }

    #[test]
    fn test_closed_day_is_never_open() {
        let day = OpeningDay::closed(date(4));
        assert!(!day.is_open_at(time(12, 0)));
        assert!(day.opening_instant(&utc()).is_none());
        assert!(day.open_intervals(&utc()).is_empty());
    }

    #[test]
    fn test_hours_are_sorted() {
        let day = split_day();
        assert_eq!(day.opening_hours[0].start, time(9, 0));
    }

    #[test]
    fn test_open_at_within_hours() {
        let day = split_day();
        assert!(day.is_open_at(time(9, 0)));
        assert!(day.is_open_at(time(12, 0)));
        assert!(!day.is_open_at(time(13, 0)));
        assert!(day.is_open_at(time(17, 59)));
        assert!(!day.is_open_at(time(20, 0)));
    }

    #[test]
    fn test_opening_lookup() {
        let day = split_day();
        assert_eq!(day.earliest_opening_after(time(13, 0)), Some(time(14, 0)));
        assert_eq!(day.earliest_opening_after(time(19, 0)), None);
    }

    #[test]
    fn test_all_day_intervals_span_24_hours() {
        let day = OpeningDay::open_all_day(date(4));
        let intervals = day.open_intervals(&utc());
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].1 - intervals[0].0, Duration::days(1));
        assert!(day.is_open_at(time(3, 0)));
    }

    #[test]
    fn test_opening_instant_uses_first_interval() {
        let day = split_day();
        assert_eq!(
            day.opening_instant(&utc()),
            Some(Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_all_closed_triple() {
        let days = AdjacentOpeningDays::all_closed(date(4));
        assert_eq!(days.requested_date(), date(4));
        assert_eq!(days.previous_day.date, date(3));
        assert_eq!(days.next_day.date, date(5));
        assert!(!days.next_day.open);
    }

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let json = r#"{"date":"2024-03-04","open":true,"openingHours":[{"start":"09:00:00","end":"17:00:00"}]}"#;
        let day: OpeningDay = serde_json::from_str(json).unwrap();
        assert!(!day.all_day);
        assert_eq!(day.opening_hours.len(), 1);
        assert!(day.is_open_at(time(10, 0)));
    }
}
