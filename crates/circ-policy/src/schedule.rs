//! Fixed due-date schedules: date ranges, each mapped to one due date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use circ_core::ScheduleId;

/// One `[from, to] → due_date` entry. Both ends are inclusive local dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub due_date: DateTime<Utc>,
}

impl ScheduleRange {
    pub fn new(from: NaiveDate, to: NaiveDate, due_date: DateTime<Utc>) -> Self {
        Self { from, to, due_date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// A named, ordered set of non-overlapping ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedDueDateSchedule {
    pub id: ScheduleId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub schedules: Vec<ScheduleRange>,
}

impl FixedDueDateSchedule {
    pub fn new(id: impl Into<String>, schedules: Vec<ScheduleRange>) -> Self {
        Self {
            id: ScheduleId::new(id),
            name: String::new(),
            schedules,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    /// Due date of the range containing `date`.
    pub fn due_date_for(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.schedules
            .iter()
            .find(|range| range.contains(date))
            .map(|range| range.due_date)
    }

    /// Pull `due_date` back to the limit of the range containing `date`, if
    /// that limit is earlier. Dates outside every range leave it unchanged.
    pub fn truncate(&self, due_date: DateTime<Utc>, date: NaiveDate) -> DateTime<Utc> {
        match self.due_date_for(date) {
            Some(limit) if limit < due_date => limit,
            _ => due_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn january() -> FixedDueDateSchedule {
        FixedDueDateSchedule::new(
            "semester",
            vec![ScheduleRange::new(
                day(1, 1),
                day(1, 31),
                Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            )],
        )
    }

    #[test]
    fn test_date_inside_range() {
        assert_eq!(
            january().due_date_for(day(1, 15)),
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_range_ends_are_inclusive() {
        assert!(january().due_date_for(day(1, 1)).is_some());
        assert!(january().due_date_for(day(1, 31)).is_some());
    }

    #[test]
    fn test_date_outside_range() {
        assert_eq!(january().due_date_for(day(2, 5)), None);
    }

    #[test]
    fn test_truncate_only_shortens() {
        let s = january();
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        assert_eq!(s.truncate(late, day(1, 10)), Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(s.truncate(early, day(1, 10)), early);
        assert_eq!(s.truncate(late, day(3, 1)), late);
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{"id":"s1","schedules":[{"from":"2024-01-01","to":"2024-01-31","dueDate":"2024-02-01T00:00:00Z"}]}"#;
        let s: FixedDueDateSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(s.id.as_str(), "s1");
        assert!(!s.is_empty());
    }
}
