//! # Renewal Validation
//!
//! Renewal is decided in two calls around the (asynchronous) calendar
//! lookup:
//!
//! 1. [`RenewalContext::validate`] runs every precondition and computes the
//!    due-date candidate. Checks never short-circuit one another; each one
//!    adds at most one [`ValidationError`].
//! 2. [`RenewalContext::complete`] resolves the candidate against the
//!    calendar, applies the "due date must move later" check, and either
//!    returns the renewed loan or rejects with every collected error.
//!
//! ## Checks
//!
//! | Check | Reason |
//! |---|---|
//! | policy not loanable | `item is not loanable` |
//! | policy not renewable | `loan is not renewable` |
//! | renewal count at limit | `loan at maximum renewal number` |
//! | recall at queue head | `items cannot be renewed when there is an active recall request` |
//! | hold at head, policy disallows | `Items with this loan policy cannot be renewed when there is an active, pending hold request` |
//! | hold at head, fixed profile with holds renewal period | `Item's loan policy has fixed profile but alternative renewal period for holds is specified` |
//! | hold at head, fixed profile with renewal period | `Item's loan policy has fixed profile but renewal period is specified` |
//! | declared lost, aged to lost, claimed returned | `item is <status>` |
//! | due date cannot be computed | reason of the failure |
//! | new due date not later | `renewal would not change the due date` |
//!
//! A non-loanable policy skips the renewable, limit and due-date checks; a
//! non-renewable policy skips the limit and due-date checks.
//!
//! ## Override
//!
//! [`RenewalMode::Override`] ignores collected errors and the date-change
//! check. It still needs a due date: the computed one, or the explicit date
//! supplied with the override when computation fails.

use chrono::{DateTime, FixedOffset, Utc};

use circ_calendar::AdjacentOpeningDays;
use circ_core::{CirculationError, ValidationError, ValidationErrorKey, ValidationErrors};
use circ_policy::{DueDateCalculator, DueDateCandidate, LoanPolicy};

use crate::loan::Loan;
use crate::request::{Request, RequestQueue};

pub const ITEM_NOT_LOANABLE_REASON: &str = "item is not loanable";
pub const LOAN_NOT_RENEWABLE_REASON: &str = "loan is not renewable";
pub const RENEWAL_LIMIT_REASON: &str = "loan at maximum renewal number";
pub const RECALL_REQUESTED_REASON: &str = "items cannot be renewed when there is an active recall request";
pub const HOLD_BLOCKS_RENEWAL_REASON: &str =
    "Items with this loan policy cannot be renewed when there is an active, pending hold request";
pub const FIXED_WITH_HOLDS_RENEWAL_PERIOD_REASON: &str =
    "Item's loan policy has fixed profile but alternative renewal period for holds is specified";
pub const FIXED_WITH_RENEWAL_PERIOD_REASON: &str =
    "Item's loan policy has fixed profile but renewal period is specified";
pub const OVERRIDE_DUE_DATE_REQUIRED_REASON: &str =
    "New due date is required when renewal cannot compute one";

/// How validation errors are treated when completing a renewal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalMode {
    Regular,
    Override {
        comment: String,
        /// Used when the policy cannot produce a due date.
        due_date: Option<DateTime<Utc>>,
    },
}

/// Outcome of [`RenewalContext::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenewalCheck {
    pub errors: ValidationErrors,
    /// `None` when the due date was not computed or could not be.
    pub candidate: Option<DueDateCandidate>,
}

impl RenewalCheck {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether completing needs the adjacent opening days of the candidate.
    pub fn needs_calendar(&self) -> bool {
        self.candidate.is_some_and(|c| c.needs_calendar())
    }
}

/// Everything renewal decides on: the loan, its governing policy and the
/// item's request queue.
#[derive(Debug, Clone, PartialEq)]
pub struct RenewalContext {
    pub loan: Loan,
    pub policy: LoanPolicy,
    pub request_queue: RequestQueue,
}

impl RenewalContext {
    pub fn new(loan: Loan, policy: LoanPolicy, request_queue: RequestQueue) -> Self {
        Self {
            loan,
            policy,
            request_queue,
        }
    }

    /// Run every precondition and compute the due-date candidate.
    pub fn validate(&self, now: DateTime<Utc>, zone: FixedOffset) -> RenewalCheck {
        let mut errors = ValidationErrors::new();
        let head = self.request_queue.head();
        let policy = &self.policy;

        let policy_allows_due_date = if !policy.loanable {
            errors.push(self.policy_error(ValidationErrorKey::ItemNotLoanable, ITEM_NOT_LOANABLE_REASON));
            false
        } else if !policy.renewable {
            errors.push(self.policy_error(ValidationErrorKey::LoanNotRenewable, LOAN_NOT_RENEWABLE_REASON));
            false
        } else {
            if let Some(limit) = policy.renewal_limit() {
                if self.loan.renewal_count >= limit {
                    errors.push(
                        self.policy_error(ValidationErrorKey::RenewalLimitReached, RENEWAL_LIMIT_REASON)
                            .with_parameter("renewalLimit", limit),
                    );
                }
            }
            true
        };

        if let Some(request) = head {
            self.check_request(request, &mut errors);
        }

        if self.loan.item_status.blocks_renewal() {
            errors.push(
                ValidationError::new(
                    ValidationErrorKey::ItemStatusDisallowsRenewal,
                    format!("item is {}", self.loan.item_status),
                )
                .with_parameter("itemStatus", self.loan.item_status),
            );
        }

        let candidate = if policy_allows_due_date {
            let hold_at_head = head.is_some_and(Request::is_hold);
            match DueDateCalculator::new(policy, zone).renewal_candidate(self.loan.due_date, now, hold_at_head) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    errors.push(e.into_validation_error());
                    None
                }
            }
        } else {
            None
        };

        if !errors.is_empty() {
            tracing::debug!(loan = %self.loan.id, errors = errors.len(), "renewal preconditions failed");
        }
        RenewalCheck { errors, candidate }
    }

    /// Finish a renewal validated by [`validate`](Self::validate).
    ///
    /// `days` are the adjacent opening days of the candidate's calendar date,
    /// when [`RenewalCheck::needs_calendar`] asked for them.
    ///
    /// # Errors
    ///
    /// - `RenewalRejected` with every collected error in regular mode.
    /// - `Validation(OverrideDueDateRequired)` when an override has neither a
    ///   computed nor an explicit due date.
    pub fn complete(
        self,
        check: RenewalCheck,
        days: Option<&AdjacentOpeningDays>,
        mode: RenewalMode,
    ) -> Result<Loan, CirculationError> {
        let RenewalCheck { mut errors, candidate } = check;
        let resolved = candidate.map(|c| c.resolve(days));

        match mode {
            RenewalMode::Regular => {
                let due_date = match resolved {
                    Some(Ok(date)) => {
                        if date <= self.loan.due_date {
                            errors.push(CirculationError::NoDueDateChange.into_validation_error());
                        }
                        Some(date)
                    }
                    Some(Err(e)) => {
                        errors.push(e.into_validation_error());
                        None
                    }
                    None => None,
                };
                match due_date {
                    Some(date) if errors.is_empty() => {
                        tracing::debug!(loan = %self.loan.id, due = %date, "loan renewed");
                        Ok(self.loan.renewed(date, self.policy.id))
                    }
                    _ => Err(CirculationError::RenewalRejected(errors)),
                }
            }
            RenewalMode::Override { comment, due_date } => {
                let date = match resolved {
                    Some(Ok(date)) => date,
                    _ => due_date.ok_or_else(|| {
                        ValidationError::new(
                            ValidationErrorKey::OverrideDueDateRequired,
                            OVERRIDE_DUE_DATE_REQUIRED_REASON,
                        )
                    })?,
                };
                if !errors.is_empty() {
                    tracing::info!(
                        loan = %self.loan.id,
                        overridden = errors.len(),
                        "renewal validation errors overridden"
                    );
                }
                Ok(self.loan.renewed_through_override(date, self.policy.id, comment))
            }
        }
    }

    fn check_request(&self, request: &Request, errors: &mut ValidationErrors) {
        if request.is_recall() {
            errors.push(
                ValidationError::new(ValidationErrorKey::RecallRequested, RECALL_REQUESTED_REASON)
                    .with_parameter("requestId", request.id.0),
            );
            return;
        }

        let policy = &self.policy;
        if !policy.allows_renewal_with_holds() {
            errors.push(self.policy_error(ValidationErrorKey::HoldBlocksRenewal, HOLD_BLOCKS_RENEWAL_REASON));
        } else if policy.is_fixed() {
            if policy.has_alternate_renewal_period_for_holds() {
                errors.push(self.policy_error(
                    ValidationErrorKey::FixedPolicyHasHoldsRenewalPeriod,
                    FIXED_WITH_HOLDS_RENEWAL_PERIOD_REASON,
                ));
            }
            if policy.has_renewal_period() {
                errors.push(self.policy_error(
                    ValidationErrorKey::FixedPolicyHasRenewalPeriod,
                    FIXED_WITH_RENEWAL_PERIOD_REASON,
                ));
            }
        }
    }

    fn policy_error(&self, key: ValidationErrorKey, reason: &str) -> ValidationError {
        ValidationError::new(key, reason)
            .with_parameter("loanPolicyId", &self.policy.id)
            .with_parameter("loanPolicyName", &self.policy.name)
    }
}

/// Validate and complete a renewal whose candidate needs no calendar, or
/// whose calendar the caller already holds.
///
/// # Errors
///
/// As [`RenewalContext::complete`].
pub fn renew(
    context: RenewalContext,
    now: DateTime<Utc>,
    zone: FixedOffset,
    days: Option<&AdjacentOpeningDays>,
    mode: RenewalMode,
) -> Result<Loan, CirculationError> {
    let check = context.validate(now, zone);
    context.complete(check, days, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::ItemStatus;
    use crate::request::RequestType;
    use chrono::{Duration, NaiveDate, TimeZone};
    use circ_calendar::{ClosedLibraryStrategy, OpeningDay};
    use circ_core::{ItemId, Period, PolicyId, ServicePointId};
    use circ_policy::{FixedDueDateSchedule, HoldsPolicy, RenewFrom, RenewalsPolicy, ScheduleRange};
    use std::collections::BTreeMap;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap()
    }

    fn loan() -> Loan {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        Loan::check_out(
            ItemId::new(),
            ServicePointId::new(),
            start,
            start + Duration::days(10),
            PolicyId::new("ten-day"),
        )
    }

    fn policy() -> LoanPolicy {
        LoanPolicy::rolling("ten-day", Period::days(10)).with_name("Ten day loan")
    }

    fn queue(request_type: RequestType) -> RequestQueue {
        RequestQueue::new(vec![Request::new(ItemId::new(), request_type, 1)])
    }

    fn run(ctx: RenewalContext) -> Result<Loan, CirculationError> {
        renew(ctx, now(), utc(), None, RenewalMode::Regular)
    }

    fn rejected(result: Result<Loan, CirculationError>) -> ValidationErrors {
        match result {
            Err(CirculationError::RenewalRejected(errors)) => errors,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    // ── success ─────────────────────────────────────────────────────

    #[test]
    fn test_rolling_renewal_from_current_due_date() {
        let original = loan();
        let renewed = run(RenewalContext::new(original.clone(), policy(), RequestQueue::empty())).unwrap();
        assert_eq!(renewed.due_date, original.due_date + Duration::days(10));
        assert_eq!(renewed.renewal_count, 1);
        assert_eq!(original.renewal_count, 0);
    }

    #[test]
    fn test_one_below_limit_succeeds() {
        let ctx = RenewalContext::new(loan().with_renewal_count(1), policy().with_renewal_limit(2), RequestQueue::empty());
        assert_eq!(run(ctx).unwrap().renewal_count, 2);
    }

    #[test]
    fn test_hold_allowed_with_alternate_period() {
        let policy = policy().with_holds(HoldsPolicy {
            renew_items_with_request: true,
            alternate_renewal_loan_period: Some(Period::days(3)),
            ..HoldsPolicy::default()
        });
        let original = loan();
        let renewed = run(RenewalContext::new(original.clone(), policy, queue(RequestType::Hold))).unwrap();
        assert_eq!(renewed.due_date, original.due_date + Duration::days(3));
    }

    // ── single failures ─────────────────────────────────────────────

    #[test]
    fn test_not_renewable_gives_exactly_one_error() {
        let errors = rejected(run(RenewalContext::new(loan(), policy().with_renewable(false), RequestQueue::empty())));
        assert_eq!(errors.len(), 1);
        assert!(errors.has_reason(LOAN_NOT_RENEWABLE_REASON));
    }

    #[test]
    fn test_at_limit() {
        let ctx = RenewalContext::new(loan().with_renewal_count(2), policy().with_renewal_limit(2), RequestQueue::empty());
        let errors = rejected(run(ctx));
        assert_eq!(errors.len(), 1);
        assert!(errors.has_reason(RENEWAL_LIMIT_REASON));
    }

    #[test]
    fn test_hold_blocks_when_policy_disallows() {
        let errors = rejected(run(RenewalContext::new(loan(), policy(), queue(RequestType::Hold))));
        assert!(errors.has_key(ValidationErrorKey::HoldBlocksRenewal));
    }

    #[test]
    fn test_closed_request_ignored() {
        let q = RequestQueue::new(vec![Request::new(ItemId::new(), RequestType::Recall, 1)
            .with_status(crate::request::RequestStatus::ClosedCancelled)]);
        assert!(run(RenewalContext::new(loan(), policy(), q)).is_ok());
    }

    #[test]
    fn test_claimed_returned_reports_status_name() {
        let ctx = RenewalContext::new(loan().with_item_status(ItemStatus::ClaimedReturned), policy(), RequestQueue::empty());
        let errors = rejected(run(ctx));
        assert!(errors.has_reason("item is Claimed returned"));
    }

    #[test]
    fn test_unrecognised_renew_from() {
        let ctx = RenewalContext::new(
            loan(),
            policy().with_renew_from(RenewFrom::Unrecognized("WHENEVER".into())),
            RequestQueue::empty(),
        );
        let errors = rejected(run(ctx));
        assert_eq!(errors.len(), 1);
        assert!(errors.has_reason("cannot determine when to renew from"));
    }

    #[test]
    fn test_due_date_not_moving_later() {
        // Renewing from the system date with a one-day period, while the loan
        // is due in five days.
        let policy = policy().with_renewals(RenewalsPolicy {
            renew_from: RenewFrom::SystemDate,
            period: Some(Period::days(1)),
            ..RenewalsPolicy::default()
        });
        let errors = rejected(run(RenewalContext::new(loan(), policy, RequestQueue::empty())));
        assert_eq!(errors.len(), 1);
        assert!(errors.has_reason("renewal would not change the due date"));
    }

    #[test]
    fn test_fixed_schedule_outside_range() {
        let d = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
        let term = FixedDueDateSchedule::new(
            "term",
            vec![ScheduleRange::new(
                d,
                NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            )],
        );
        let policy = LoanPolicy::fixed("fixed", "term")
            .with_schedules(&BTreeMap::from([(term.id.clone(), term)]));
        let errors = rejected(run(RenewalContext::new(loan(), policy, RequestQueue::empty())));
        assert!(errors.has_reason("renewal date falls outside of date ranges in the loan policy"));
    }

    // ── accumulation ────────────────────────────────────────────────

    #[test]
    fn test_errors_accumulate_without_short_circuit() {
        let ctx = RenewalContext::new(
            loan().with_item_status(ItemStatus::AgedToLost),
            policy().with_loanable(false),
            queue(RequestType::Recall),
        );
        let errors = rejected(run(ctx));
        assert_eq!(errors.len(), 3);
        assert!(errors.has_reason(ITEM_NOT_LOANABLE_REASON));
        assert!(errors.has_reason(RECALL_REQUESTED_REASON));
        assert!(errors.has_reason("item is Aged to lost"));
    }

    #[test]
    fn test_fixed_policy_conflicts_with_hold() {
        let policy = LoanPolicy::fixed("fixed", "term")
            .with_holds(HoldsPolicy {
                renew_items_with_request: true,
                alternate_renewal_loan_period: Some(Period::days(3)),
                ..HoldsPolicy::default()
            })
            .with_renewals(RenewalsPolicy {
                period: Some(Period::days(7)),
                ..RenewalsPolicy::default()
            });
        let check = RenewalContext::new(loan(), policy, queue(RequestType::Hold)).validate(now(), utc());
        assert!(check.errors.has_reason(FIXED_WITH_HOLDS_RENEWAL_PERIOD_REASON));
        assert!(check.errors.has_reason(FIXED_WITH_RENEWAL_PERIOD_REASON));
    }

    #[test]
    fn test_rejected_renewal_leaves_loan_unchanged() {
        let original = loan();
        let ctx = RenewalContext::new(original.clone(), policy().with_renewable(false), RequestQueue::empty());
        let _ = run(ctx.clone());
        assert_eq!(ctx.loan, original);
    }

    // ── calendar ────────────────────────────────────────────────────

    #[test]
    fn test_calendar_failure_rejects() {
        let policy = policy().with_closed_library_strategy(ClosedLibraryStrategy::EndOfNextOpenDay);
        let ctx = RenewalContext::new(loan(), policy, RequestQueue::empty());
        let check = ctx.validate(now(), utc());
        assert!(check.needs_calendar());
        let date = check.candidate.unwrap().calendar_date();
        let days = AdjacentOpeningDays::all_closed(date);
        let errors = rejected(ctx.complete(check, Some(&days), RenewalMode::Regular));
        assert!(errors.has_key(ValidationErrorKey::CalendarUnavailable));
    }

    #[test]
    fn test_calendar_moves_due_date() {
        let policy = policy().with_closed_library_strategy(ClosedLibraryStrategy::MoveToEndOfNextOpenDay);
        let ctx = RenewalContext::new(loan(), policy, RequestQueue::empty());
        let check = ctx.validate(now(), utc());
        let date = check.candidate.unwrap().calendar_date();
        let days = AdjacentOpeningDays::new(
            OpeningDay::open_all_day(date.pred_opt().unwrap()),
            OpeningDay::closed(date),
            OpeningDay::open_all_day(date.succ_opt().unwrap()),
        );
        let renewed = ctx.complete(check, Some(&days), RenewalMode::Regular).unwrap();
        assert_eq!(renewed.due_date.date_naive(), date.succ_opt().unwrap());
    }

    // ── override ────────────────────────────────────────────────────

    #[test]
    fn test_override_bypasses_errors() {
        let ctx = RenewalContext::new(loan(), policy().with_renewal_limit(0), RequestQueue::empty());
        let mode = RenewalMode::Override {
            comment: "approved by supervisor".into(),
            due_date: None,
        };
        let renewed = renew(ctx, now(), utc(), None, mode).unwrap();
        assert_eq!(renewed.action, Some(crate::loan::LoanAction::RenewedThroughOverride));
        assert_eq!(renewed.action_comment.as_deref(), Some("approved by supervisor"));
    }

    #[test]
    fn test_override_uses_explicit_date_when_computation_fails() {
        let explicit = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        let ctx = RenewalContext::new(loan(), policy().with_renewable(false), RequestQueue::empty());
        let mode = RenewalMode::Override {
            comment: "ok".into(),
            due_date: Some(explicit),
        };
        assert_eq!(renew(ctx, now(), utc(), None, mode).unwrap().due_date, explicit);
    }

    #[test]
    fn test_override_without_any_due_date_fails() {
        let ctx = RenewalContext::new(loan(), policy().with_loanable(false), RequestQueue::empty());
        let mode = RenewalMode::Override {
            comment: "ok".into(),
            due_date: None,
        };
        let err = renew(ctx, now(), utc(), None, mode).unwrap_err();
        assert_eq!(err.to_string(), OVERRIDE_DUE_DATE_REQUIRED_REASON);
    }
}
