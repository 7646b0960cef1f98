//! # Overdue Period
//!
//! Whole minutes a loan is overdue at a given instant, as used for fine
//! assessment.
//!
//! 1. `base = minutes(now - due date)`, zero when the due date has not
//!    passed.
//! 2. When the fine policy does not count closed time, only minutes inside
//!    the checkout service point's open intervals count. Dates without a
//!    calendar record are closed.
//! 3. The loan policy's grace period is subtracted, floored at zero, unless
//!    the due date was shortened by a recall and the fine policy does not
//!    honour grace periods for recalls. Unknown grace units subtract nothing.

use chrono::{DateTime, Duration, FixedOffset, Utc};

use circ_calendar::OpeningDay;
use circ_core::Period;
use circ_policy::OverdueFinePolicy;

use crate::loan::Loan;

/// Inputs that stay fixed for one assessment.
#[derive(Debug, Clone, Copy)]
pub struct OverduePeriodCalculator<'a> {
    pub fine_policy: &'a OverdueFinePolicy,
    pub grace_period: Option<&'a Period>,
    pub zone: FixedOffset,
}

impl<'a> OverduePeriodCalculator<'a> {
    pub fn new(fine_policy: &'a OverdueFinePolicy, grace_period: Option<&'a Period>, zone: FixedOffset) -> Self {
        Self {
            fine_policy,
            grace_period,
            zone,
        }
    }

    /// Whether [`overdue_minutes`](Self::overdue_minutes) reads opening days.
    pub fn needs_calendar(&self) -> bool {
        !self.fine_policy.count_closed
    }

    /// Minutes overdue at `now`. `opening_days` covers the checkout service
    /// point between the due date and `now`; it is ignored when closed time
    /// counts.
    pub fn overdue_minutes(&self, loan: &Loan, now: DateTime<Utc>, opening_days: &[OpeningDay]) -> i64 {
        if now <= loan.due_date {
            return 0;
        }

        let overdue = if self.needs_calendar() {
            open_minutes_between(loan.due_date, now, opening_days, &self.zone)
        } else {
            (now - loan.due_date).num_minutes()
        };

        let ignore_grace = loan.due_date_changed_by_recall && !self.fine_policy.grace_period_recall;
        let grace = match self.grace_period {
            Some(grace) if !ignore_grace => {
                if !grace.interval.is_recognised() {
                    tracing::warn!(grace = %grace, loan = %loan.id, "grace period unit not recognised, counting as zero");
                }
                grace.to_minutes()
            }
            _ => 0,
        };

        (overdue - grace).max(0)
    }
}

/// Minutes of `[from, to]` that fall inside the open intervals of `days`.
fn open_minutes_between(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    days: &[OpeningDay],
    zone: &FixedOffset,
) -> i64 {
    let open = days
        .iter()
        .flat_map(|day| day.open_intervals(zone))
        .map(|(start, end)| {
            let start = start.max(from);
            let end = end.min(to);
            if end > start {
                end - start
            } else {
                Duration::zero()
            }
        })
        .fold(Duration::zero(), |total, d| total + d);
    open.num_minutes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use circ_calendar::OpeningHour;
    use circ_core::{ItemId, PolicyId, ServicePointId};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap()
    }

    fn loan_due(due: DateTime<Utc>) -> Loan {
        Loan::check_out(
            ItemId::new(),
            ServicePointId::new(),
            due - Duration::days(21),
            due,
            PolicyId::new("p"),
        )
    }

    fn minutes(fine: &OverdueFinePolicy, grace: Option<&Period>, loan: &Loan, days: &[OpeningDay]) -> i64 {
        OverduePeriodCalculator::new(fine, grace, utc()).overdue_minutes(loan, now(), days)
    }

    #[test]
    fn test_ten_minutes_no_grace() {
        let fine = OverdueFinePolicy::new("f");
        assert_eq!(minutes(&fine, None, &loan_due(now() - Duration::minutes(10)), &[]), 10);
    }

    #[test]
    fn test_grace_period_subtracted() {
        let fine = OverdueFinePolicy::new("f");
        let grace = Period::minutes(5);
        assert_eq!(minutes(&fine, Some(&grace), &loan_due(now() - Duration::minutes(10)), &[]), 5);
    }

    #[test]
    fn test_grace_covering_overdue_time_gives_zero() {
        let fine = OverdueFinePolicy::new("f");
        let grace = Period::minutes(10);
        assert_eq!(minutes(&fine, Some(&grace), &loan_due(now() - Duration::minutes(10)), &[]), 0);
        let grace = Period::hours(1);
        assert_eq!(minutes(&fine, Some(&grace), &loan_due(now() - Duration::minutes(10)), &[]), 0);
    }

    #[test]
    fn test_future_due_date_gives_zero() {
        let fine = OverdueFinePolicy::new("f");
        assert_eq!(minutes(&fine, None, &loan_due(now() + Duration::minutes(10)), &[]), 0);
    }

    #[test]
    fn test_unknown_grace_unit_counts_as_zero() {
        let fine = OverdueFinePolicy::new("f");
        let grace = Period::new(5, "Fortnights");
        assert_eq!(minutes(&fine, Some(&grace), &loan_due(now() - Duration::minutes(10)), &[]), 10);
    }

    #[test]
    fn test_recall_shortened_ignores_grace_when_policy_says_so() {
        let grace = Period::minutes(5);
        let loan = loan_due(now() - Duration::minutes(10)).recalled(now() - Duration::minutes(10));

        let honoured = OverdueFinePolicy::new("f");
        assert_eq!(minutes(&honoured, Some(&grace), &loan, &[]), 5);

        let ignored = OverdueFinePolicy::new("f").with_grace_period_recall(false);
        assert_eq!(minutes(&ignored, Some(&grace), &loan, &[]), 10);
    }

    #[test]
    fn test_closed_time_excluded() {
        // Due Saturday 12:00, now Monday 12:00. Sunday is closed, Monday
        // opens at 09:00, Saturday closes at 17:00.
        let fine = OverdueFinePolicy::new("f").with_count_closed(false);
        let day = |d: u32| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let t = |h: u32| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let days = vec![
            OpeningDay::open_during(day(2), vec![OpeningHour::new(t(9), t(17))]),
            OpeningDay::closed(day(3)),
            OpeningDay::open_during(day(4), vec![OpeningHour::new(t(9), t(17))]),
        ];
        let loan = loan_due(Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap());
        assert_eq!(minutes(&fine, None, &loan, &days), 5 * 60 + 3 * 60);
    }

    #[test]
    fn test_closed_time_without_calendar_counts_nothing() {
        let fine = OverdueFinePolicy::new("f").with_count_closed(false);
        assert_eq!(minutes(&fine, None, &loan_due(now() - Duration::hours(5)), &[]), 0);
    }

    #[test]
    fn test_all_day_open_counts_fully() {
        let fine = OverdueFinePolicy::new("f").with_count_closed(false);
        let days = vec![OpeningDay::open_all_day(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())];
        assert_eq!(minutes(&fine, None, &loan_due(now() - Duration::minutes(90)), &days), 90);
    }
}
