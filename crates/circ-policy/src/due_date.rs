//! # Due-Date Calculator
//!
//! Computation happens in two steps so that the calendar lookup, which is
//! asynchronous and owned by the caller, sits between them:
//!
//! 1. [`DueDateCalculator`] derives a [`DueDateCandidate`] from the policy
//!    profile (rolling period or fixed schedule).
//! 2. The caller fetches the `AdjacentOpeningDays` of
//!    [`DueDateCandidate::calendar_date`] when
//!    [`DueDateCandidate::needs_calendar`] says so, and
//!    [`DueDateCandidate::resolve`] applies the closed-library strategy.
//!
//! A checkout due date is never earlier than its loan date: resolution
//! rejects an adjustment that would move it there.
//!
//! ## Checkout
//!
//! | Profile | Candidate |
//! |---|---|
//! | Rolling | loan date + period (holds alternate checkout period when a hold is queued), capped by the limit schedule |
//! | Fixed | due date of the range containing the loan date |
//!
//! ## Renewal
//!
//! | Profile | Candidate |
//! |---|---|
//! | Rolling | renew-from anchor + renewal period (else loan period; holds alternate renewal period when a hold is queued), capped by the alternate or limit schedule at today's date |
//! | Fixed | due date of the alternate renewal schedule (else loan schedule) range containing today |
//!
//! All date arithmetic is local to the caller's zone.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use circ_calendar::{AdjacentOpeningDays, ClosedLibraryStrategy};
use circ_core::temporal::local_date;
use circ_core::{CirculationError, Period, ValidationError, ValidationErrorKey};

use crate::loan_policy::{LoanPolicy, LoanProfile, RenewFrom};
use crate::schedule::FixedDueDateSchedule;

/// Reason reported when a renewal's anchor is not a known option.
pub const RENEW_FROM_UNRESOLVABLE_REASON: &str = "cannot determine when to renew from";

/// Reason reported when a loan or renewal period cannot be used.
pub const UNRECOGNISED_PERIOD_REASON: &str = "the loan period in the loan policy is not recognised";

/// Reason reported when a checkout due date ends up before the loan date.
pub const DUE_DATE_BEFORE_LOAN_DATE_REASON: &str = "due date would be before the loan date";

/// Computes due-date candidates for one policy in one zone.
#[derive(Debug, Clone, Copy)]
pub struct DueDateCalculator<'a> {
    policy: &'a LoanPolicy,
    zone: FixedOffset,
}

impl<'a> DueDateCalculator<'a> {
    pub fn new(policy: &'a LoanPolicy, zone: FixedOffset) -> Self {
        Self { policy, zone }
    }

    /// Candidate due date for a new loan starting at `loan_date`.
    ///
    /// # Errors
    ///
    /// - `Validation(UnrecognisedPeriod)` for a zero or unknown period.
    /// - `ScheduleRangeMissing` when no fixed range contains the loan date.
    pub fn checkout_candidate(
        &self,
        loan_date: DateTime<Utc>,
        hold_at_head: bool,
    ) -> Result<DueDateCandidate, CirculationError> {
        let date = match &self.policy.profile {
            LoanProfile::Rolling { period, .. } => {
                let period = match (&self.policy.holds.alternate_checkout_loan_period, hold_at_head) {
                    (Some(alternate), true) => alternate,
                    _ => period,
                };
                let due = self.add_period(loan_date, period)?;
                self.cap(due, self.policy.loan_schedule(), loan_date)
            }
            LoanProfile::Fixed { .. } => {
                self.from_schedule(self.policy.loan_schedule(), loan_date)?
            }
        };
        tracing::debug!(policy = %self.policy.id, %loan_date, due = %date, "checkout due date candidate");
        Ok(self.candidate(date, loan_date, Some(loan_date)))
    }

    /// Candidate due date for renewing a loan currently due at
    /// `current_due_date`, with `now` as the system time.
    ///
    /// # Errors
    ///
    /// - `Validation(RenewFromUnresolvable)` for an unknown renew-from.
    /// - `Validation(UnrecognisedPeriod)` for a zero or unknown period.
    /// - `ScheduleRangeMissing` when no fixed range contains today.
    pub fn renewal_candidate(
        &self,
        current_due_date: DateTime<Utc>,
        now: DateTime<Utc>,
        hold_at_head: bool,
    ) -> Result<DueDateCandidate, CirculationError> {
        let renewal_schedule = self
            .policy
            .alternate_renewal_schedule()
            .or_else(|| self.policy.loan_schedule());

        let date = match &self.policy.profile {
            LoanProfile::Rolling { period, .. } => {
                let anchor = match &self.policy.renewals.renew_from {
                    RenewFrom::CurrentDueDate => current_due_date,
                    RenewFrom::SystemDate => now,
                    RenewFrom::Unrecognized(value) => {
                        return Err(ValidationError::new(
                            ValidationErrorKey::RenewFromUnresolvable,
                            RENEW_FROM_UNRESOLVABLE_REASON,
                        )
                        .with_parameter("renewFrom", value)
                        .into());
                    }
                };
                let alternate = self
                    .policy
                    .holds
                    .alternate_renewal_loan_period
                    .as_ref()
                    .filter(|_| hold_at_head);
                let period = alternate
                    .or(self.policy.renewals.period.as_ref())
                    .unwrap_or(period);
                let due = self.add_period(anchor, period)?;
                self.cap(due, renewal_schedule, now)
            }
            LoanProfile::Fixed { .. } => self.from_schedule(renewal_schedule, now)?,
        };
        tracing::debug!(policy = %self.policy.id, %current_due_date, due = %date, "renewal due date candidate");
        Ok(self.candidate(date, now, None))
    }

    fn candidate(
        &self,
        date: DateTime<Utc>,
        loan_start: DateTime<Utc>,
        not_before: Option<DateTime<Utc>>,
    ) -> DueDateCandidate {
        DueDateCandidate {
            date,
            loan_start,
            not_before,
            strategy: self.policy.closed_library_due_date_management,
            zone: self.zone,
        }
    }

    fn add_period(&self, from: DateTime<Utc>, period: &Period) -> Result<DateTime<Utc>, CirculationError> {
        let unrecognised = || -> CirculationError {
            ValidationError::new(ValidationErrorKey::UnrecognisedPeriod, UNRECOGNISED_PERIOD_REASON)
                .with_parameter("period", period)
                .into()
        };
        if !period.is_usable() {
            return Err(unrecognised());
        }
        period
            .add_to(from.with_timezone(&self.zone))
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(unrecognised)
    }

    fn cap(
        &self,
        due: DateTime<Utc>,
        schedule: Option<&FixedDueDateSchedule>,
        reference: DateTime<Utc>,
    ) -> DateTime<Utc> {
        match schedule {
            Some(s) => s.truncate(due, local_date(&reference, &self.zone)),
            None => due,
        }
    }

    fn from_schedule(
        &self,
        schedule: Option<&FixedDueDateSchedule>,
        reference: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, CirculationError> {
        let date = local_date(&reference, &self.zone);
        let missing = || CirculationError::ScheduleRangeMissing {
            schedule_id: schedule
                .map(|s| s.id.clone())
                .or_else(|| self.policy.loan_schedule_id().cloned()),
            date,
        };
        schedule
            .and_then(|s| s.due_date_for(date))
            .ok_or_else(missing)
    }
}

/// A due date before closed-library adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueDateCandidate {
    date: DateTime<Utc>,
    /// Loan date at checkout, system time at renewal.
    loan_start: DateTime<Utc>,
    /// Set for checkouts only.
    not_before: Option<DateTime<Utc>>,
    strategy: ClosedLibraryStrategy,
    zone: FixedOffset,
}

impl DueDateCandidate {
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn strategy(&self) -> ClosedLibraryStrategy {
        self.strategy
    }

    /// Whether [`resolve`](Self::resolve) consults the calendar.
    pub fn needs_calendar(&self) -> bool {
        self.strategy.needs_calendar()
    }

    /// Local date whose adjacent opening days the strategy needs.
    pub fn calendar_date(&self) -> NaiveDate {
        local_date(&self.date, &self.zone)
    }

    /// Apply the closed-library strategy. `None` means the service point has
    /// no calendar around the candidate date; every day counts as closed.
    ///
    /// # Errors
    ///
    /// - `CalendarUnavailable` when the strategy needs an open day that is
    ///   not there.
    /// - `Validation(DueDateBeforeLoanDate)` when a checkout due date would
    ///   land before the loan date.
    pub fn resolve(self, days: Option<&AdjacentOpeningDays>) -> Result<DateTime<Utc>, CirculationError> {
        let resolved = if !self.needs_calendar() {
            self.date
        } else {
            match days {
                Some(days) => self.strategy.calculate(self.date, self.loan_start, days, &self.zone)?,
                None => {
                    let closed = AdjacentOpeningDays::all_closed(self.calendar_date());
                    self.strategy.calculate(self.date, self.loan_start, &closed, &self.zone)?
                }
            }
        };
        match self.not_before {
            Some(loan_date) => ensure_not_before_loan_date(resolved, loan_date),
            None => Ok(resolved),
        }
    }
}

/// Reject a checkout due date earlier than `loan_date`.
///
/// # Errors
///
/// `Validation(DueDateBeforeLoanDate)` naming both instants.
pub fn ensure_not_before_loan_date(
    due_date: DateTime<Utc>,
    loan_date: DateTime<Utc>,
) -> Result<DateTime<Utc>, CirculationError> {
    if due_date >= loan_date {
        return Ok(due_date);
    }
    tracing::warn!(%due_date, %loan_date, "due date precedes loan date");
    Err(
        ValidationError::new(ValidationErrorKey::DueDateBeforeLoanDate, DUE_DATE_BEFORE_LOAN_DATE_REASON)
            .with_parameter("dueDate", due_date.to_rfc3339())
            .with_parameter("loanDate", loan_date.to_rfc3339())
            .into(),
    )
}

/// Pull a due date back to the patron's expiration.
///
/// A due date at or before `expiration` is returned unchanged. Otherwise the
/// expiration instant is used when the service point is open on that day,
/// and the end of the previous open day when it is not. `days` are the
/// adjacent opening days of the expiration's local date.
///
/// # Errors
///
/// `CalendarUnavailable` when the expiration day is closed and so is the
/// day before it.
pub fn truncate_to_patron_expiration(
    due_date: DateTime<Utc>,
    expiration: DateTime<Utc>,
    days: Option<&AdjacentOpeningDays>,
    zone: &FixedOffset,
) -> Result<DateTime<Utc>, CirculationError> {
    if due_date <= expiration {
        return Ok(due_date);
    }
    let expiration_date = local_date(&expiration, zone);
    let closed;
    let days = match days {
        Some(days) => days,
        None => {
            closed = AdjacentOpeningDays::all_closed(expiration_date);
            &closed
        }
    };
    if days.requested_day.open {
        tracing::debug!(%due_date, %expiration, "due date truncated to patron expiration");
        return Ok(expiration);
    }
    ClosedLibraryStrategy::EndOfPreviousDayTruncate.calculate(expiration, expiration, days, zone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan_policy::{HoldsPolicy, RenewalsPolicy};
    use crate::schedule::ScheduleRange;
    use circ_calendar::{OpeningDay, OpeningHour};
    use circ_core::ScheduleId;
    use chrono::{Duration, NaiveTime, TimeZone};
    use std::collections::BTreeMap;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn january_schedule(id: &str) -> FixedDueDateSchedule {
        FixedDueDateSchedule::new(
            id,
            vec![ScheduleRange::new(day(1, 1), day(1, 31), at(2024, 2, 1, 0, 0))],
        )
    }

    fn resolved(policy: LoanPolicy, schedules: &[FixedDueDateSchedule]) -> LoanPolicy {
        let map: BTreeMap<ScheduleId, FixedDueDateSchedule> =
            schedules.iter().map(|s| (s.id.clone(), s.clone())).collect();
        policy.with_schedules(&map)
    }

    // ── rolling checkout ────────────────────────────────────────────

    #[test]
    fn test_rolling_ten_days() {
        let policy = LoanPolicy::rolling("p", Period::days(10));
        let c = DueDateCalculator::new(&policy, utc())
            .checkout_candidate(at(2024, 1, 1, 10, 0), false)
            .unwrap();
        assert!(!c.needs_calendar());
        assert_eq!(c.resolve(None).unwrap(), at(2024, 1, 11, 10, 0));
    }

    #[test]
    fn test_rolling_months_use_calendar_months() {
        let policy = LoanPolicy::rolling("p", Period::months(1));
        let c = DueDateCalculator::new(&policy, utc())
            .checkout_candidate(at(2024, 1, 31, 10, 0), false)
            .unwrap();
        assert_eq!(c.date(), at(2024, 2, 29, 10, 0));
    }

    #[test]
    fn test_rolling_hours() {
        let policy = LoanPolicy::rolling("p", Period::hours(2));
        let c = DueDateCalculator::new(&policy, utc())
            .checkout_candidate(at(2024, 1, 1, 23, 0), false)
            .unwrap();
        assert_eq!(c.date(), at(2024, 1, 2, 1, 0));
    }

    #[test]
    fn test_rolling_result_not_before_loan_date() {
        let policy = LoanPolicy::rolling("p", Period::minutes(1));
        let loan_date = at(2024, 1, 1, 10, 0);
        let c = DueDateCalculator::new(&policy, utc()).checkout_candidate(loan_date, false).unwrap();
        assert!(c.date() >= loan_date);
    }

    #[test]
    fn test_unrecognised_period_fails() {
        let policy = LoanPolicy::rolling("p", Period::new(3, "Fortnights"));
        let err = DueDateCalculator::new(&policy, utc())
            .checkout_candidate(at(2024, 1, 1, 10, 0), false)
            .unwrap_err();
        assert_eq!(err.to_string(), UNRECOGNISED_PERIOD_REASON);
    }

    #[test]
    fn test_holds_alternate_checkout_period() {
        let policy = LoanPolicy::rolling("p", Period::weeks(3)).with_holds(HoldsPolicy {
            alternate_checkout_loan_period: Some(Period::days(7)),
            ..HoldsPolicy::default()
        });
        let calc = DueDateCalculator::new(&policy, utc());
        let start = at(2024, 1, 1, 10, 0);
        assert_eq!(calc.checkout_candidate(start, true).unwrap().date(), at(2024, 1, 8, 10, 0));
        assert_eq!(calc.checkout_candidate(start, false).unwrap().date(), at(2024, 1, 22, 10, 0));
    }

    #[test]
    fn test_rolling_capped_by_limit_schedule() {
        let policy = resolved(
            LoanPolicy::rolling("p", Period::weeks(3)).with_due_date_limit_schedule("limit"),
            &[january_schedule("limit")],
        );
        let c = DueDateCalculator::new(&policy, utc())
            .checkout_candidate(at(2024, 1, 20, 10, 0), false)
            .unwrap();
        assert_eq!(c.date(), at(2024, 2, 1, 0, 0));
    }

    // ── fixed checkout ──────────────────────────────────────────────

    #[test]
    fn test_fixed_range_lookup() {
        let policy = resolved(LoanPolicy::fixed("p", "term"), &[january_schedule("term")]);
        let c = DueDateCalculator::new(&policy, utc())
            .checkout_candidate(at(2024, 1, 15, 12, 0), false)
            .unwrap();
        assert_eq!(c.date(), at(2024, 2, 1, 0, 0));
    }

    #[test]
    fn test_fixed_range_missing() {
        let policy = resolved(LoanPolicy::fixed("p", "term"), &[january_schedule("term")]);
        let err = DueDateCalculator::new(&policy, utc())
            .checkout_candidate(at(2024, 2, 5, 12, 0), false)
            .unwrap_err();
        assert_eq!(
            err,
            CirculationError::ScheduleRangeMissing {
                schedule_id: Some(ScheduleId::new("term")),
                date: day(2, 5),
            }
        );
    }

    #[test]
    fn test_fixed_schedule_not_loaded() {
        let policy = LoanPolicy::fixed("p", "term");
        let err = DueDateCalculator::new(&policy, utc())
            .checkout_candidate(at(2024, 1, 15, 12, 0), false)
            .unwrap_err();
        assert!(matches!(err, CirculationError::ScheduleRangeMissing { .. }));
    }

    // ── renewal ─────────────────────────────────────────────────────

    #[test]
    fn test_renew_from_current_due_date() {
        let policy = LoanPolicy::rolling("p", Period::days(10));
        let due = at(2024, 1, 11, 10, 0);
        let c = DueDateCalculator::new(&policy, utc())
            .renewal_candidate(due, at(2024, 1, 5, 9, 0), false)
            .unwrap();
        assert_eq!(c.date(), due + Duration::days(10));
    }

    #[test]
    fn test_renew_from_system_date_with_renewal_period() {
        let policy = LoanPolicy::rolling("p", Period::days(10)).with_renewals(RenewalsPolicy {
            renew_from: RenewFrom::SystemDate,
            period: Some(Period::days(5)),
            ..RenewalsPolicy::default()
        });
        let now = at(2024, 1, 5, 9, 0);
        let c = DueDateCalculator::new(&policy, utc())
            .renewal_candidate(at(2024, 1, 11, 10, 0), now, false)
            .unwrap();
        assert_eq!(c.date(), at(2024, 1, 10, 9, 0));
    }

    #[test]
    fn test_renew_from_unrecognised() {
        let policy = LoanPolicy::rolling("p", Period::days(10))
            .with_renew_from(RenewFrom::Unrecognized("SOMETIME".into()));
        let err = DueDateCalculator::new(&policy, utc())
            .renewal_candidate(at(2024, 1, 11, 10, 0), at(2024, 1, 5, 9, 0), false)
            .unwrap_err();
        assert_eq!(err.to_string(), RENEW_FROM_UNRESOLVABLE_REASON);
    }

    #[test]
    fn test_renewal_uses_holds_alternate_period() {
        let policy = LoanPolicy::rolling("p", Period::days(10)).with_holds(HoldsPolicy {
            alternate_renewal_loan_period: Some(Period::days(2)),
            renew_items_with_request: true,
            ..HoldsPolicy::default()
        });
        let due = at(2024, 1, 11, 10, 0);
        let c = DueDateCalculator::new(&policy, utc())
            .renewal_candidate(due, at(2024, 1, 5, 9, 0), true)
            .unwrap();
        assert_eq!(c.date(), at(2024, 1, 13, 10, 0));
    }

    #[test]
    fn test_fixed_renewal_prefers_alternate_schedule() {
        let summer = FixedDueDateSchedule::new(
            "summer",
            vec![ScheduleRange::new(day(1, 1), day(1, 31), at(2024, 3, 1, 0, 0))],
        );
        let policy = resolved(
            LoanPolicy::fixed("p", "term").with_renewals(RenewalsPolicy {
                alternate_fixed_due_date_schedule_id: Some(ScheduleId::new("summer")),
                ..RenewalsPolicy::default()
            }),
            &[january_schedule("term"), summer],
        );
        let c = DueDateCalculator::new(&policy, utc())
            .renewal_candidate(at(2024, 1, 31, 0, 0), at(2024, 1, 20, 9, 0), false)
            .unwrap();
        assert_eq!(c.date(), at(2024, 3, 1, 0, 0));
    }

    // ── closed-library resolution ───────────────────────────────────

    #[test]
    fn test_candidate_moved_to_next_open_day() {
        let policy = LoanPolicy::rolling("p", Period::days(3))
            .with_closed_library_strategy(ClosedLibraryStrategy::EndOfNextOpenDay);
        let c = DueDateCalculator::new(&policy, utc())
            .checkout_candidate(at(2024, 3, 1, 10, 0), false)
            .unwrap();
        assert!(c.needs_calendar());
        assert_eq!(c.calendar_date(), day(3, 4));
        let days = AdjacentOpeningDays::new(
            OpeningDay::closed(day(3, 3)),
            OpeningDay::closed(day(3, 4)),
            OpeningDay::open_all_day(day(3, 5)),
        );
        let resolved = c.resolve(Some(&days)).unwrap();
        assert_eq!(resolved, at(2024, 3, 5, 23, 59) + Duration::milliseconds(59_999));
    }

    #[test]
    fn test_candidate_without_calendar_fails() {
        let policy = LoanPolicy::rolling("p", Period::days(3))
            .with_closed_library_strategy(ClosedLibraryStrategy::MoveToEndOfPreviousOpenDay);
        let c = DueDateCalculator::new(&policy, utc())
            .checkout_candidate(at(2024, 3, 1, 10, 0), false)
            .unwrap();
        assert!(matches!(c.resolve(None), Err(CirculationError::CalendarUnavailable { .. })));
    }

    #[test]
    fn test_checkout_moved_before_loan_date_is_rejected() {
        let policy = LoanPolicy::rolling("p", Period::hours(1))
            .with_closed_library_strategy(ClosedLibraryStrategy::MoveToEndOfPreviousOpenDay);
        // Saturday the 2nd is closed; the previous open day ended before the loan.
        let loan_date = at(2024, 3, 2, 10, 0);
        let days = AdjacentOpeningDays::new(
            OpeningDay::open_all_day(day(3, 1)),
            OpeningDay::closed(day(3, 2)),
            OpeningDay::open_all_day(day(3, 4)),
        );
        let calc = DueDateCalculator::new(&policy, utc());

        let err = calc.checkout_candidate(loan_date, false).unwrap().resolve(Some(&days)).unwrap_err();
        match err {
            CirculationError::Validation(e) => {
                assert_eq!(e.key, ValidationErrorKey::DueDateBeforeLoanDate);
                assert_eq!(e.reason, DUE_DATE_BEFORE_LOAN_DATE_REASON);
                assert_eq!(
                    e.parameters.get("loanDate").map(String::as_str),
                    Some("2024-03-02T10:00:00+00:00")
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Renewals are judged against the current due date instead.
        let renewed = calc
            .renewal_candidate(at(2024, 3, 2, 9, 0), loan_date, false)
            .unwrap()
            .resolve(Some(&days))
            .unwrap();
        assert_eq!(renewed, at(2024, 3, 1, 23, 59) + Duration::milliseconds(59_999));
    }

    #[test]
    fn test_service_hours_candidate_anchors_on_loan_date() {
        let policy = LoanPolicy::rolling("p", Period::hours(1))
            .with_closed_library_strategy(ClosedLibraryStrategy::EndOfCurrentServicePointHours);
        let nine_to_five = |m: u32, d: u32| {
            OpeningDay::open_during(
                day(m, d),
                vec![OpeningHour::new(
                    NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                )],
            )
        };
        let days = AdjacentOpeningDays::new(nine_to_five(3, 3), nine_to_five(3, 4), nine_to_five(3, 5));
        let loan_date = at(2024, 3, 4, 17, 30);

        let due = DueDateCalculator::new(&policy, utc())
            .checkout_candidate(loan_date, false)
            .unwrap()
            .resolve(Some(&days))
            .unwrap();
        assert_eq!(due, at(2024, 3, 5, 17, 0));
        assert!(due >= loan_date);
    }

    #[test]
    fn test_ensure_not_before_loan_date_accepts_equal_instant() {
        let loan_date = at(2024, 3, 4, 10, 0);
        assert_eq!(ensure_not_before_loan_date(loan_date, loan_date).unwrap(), loan_date);
        assert!(ensure_not_before_loan_date(loan_date - Duration::seconds(1), loan_date).is_err());
    }

    // ── patron expiration ───────────────────────────────────────────

    #[test]
    fn test_due_before_expiration_unchanged() {
        let due = at(2024, 3, 1, 10, 0);
        assert_eq!(
            truncate_to_patron_expiration(due, at(2024, 4, 1, 0, 0), None, &utc()).unwrap(),
            due
        );
    }

    #[test]
    fn test_truncated_to_open_expiration_day() {
        let expiration = at(2024, 3, 4, 15, 30);
        let days = AdjacentOpeningDays::new(
            OpeningDay::open_all_day(day(3, 3)),
            OpeningDay::open_all_day(day(3, 4)),
            OpeningDay::open_all_day(day(3, 5)),
        );
        let result =
            truncate_to_patron_expiration(at(2024, 3, 10, 10, 0), expiration, Some(&days), &utc()).unwrap();
        assert_eq!(result, expiration);
    }

    #[test]
    fn test_truncated_to_previous_day_when_expiration_closed() {
        let days = AdjacentOpeningDays::new(
            OpeningDay::open_all_day(day(3, 3)),
            OpeningDay::closed(day(3, 4)),
            OpeningDay::open_all_day(day(3, 5)),
        );
        let result =
            truncate_to_patron_expiration(at(2024, 3, 10, 10, 0), at(2024, 3, 4, 15, 30), Some(&days), &utc())
                .unwrap();
        assert_eq!(result, at(2024, 3, 3, 23, 59) + Duration::milliseconds(59_999));
    }
}
