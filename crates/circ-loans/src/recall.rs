//! Recall processing: shortening a loan when another patron recalls the item.
//!
//! The recalled due date is `now + recall return interval`, raised to
//! `loan date + minimum guaranteed loan period` when that is later. A recall
//! only ever brings a due date forward. An overdue loan keeps its due date
//! unless the policy allows recalls to extend overdue loans.

use chrono::{DateTime, FixedOffset, Utc};

use circ_core::{CirculationError, Period, ValidationError, ValidationErrorKey};
use circ_policy::LoanPolicy;

use crate::loan::Loan;

pub const RECALL_INTERVAL_UNRECOGNISED_REASON: &str =
    "the recall return interval in the loan policy is not recognised";
pub const MINIMUM_PERIOD_UNRECOGNISED_REASON: &str =
    "the minimum guaranteed loan period in the loan policy is not recognised";

/// Loan after a recall has been placed at `now`.
///
/// Returns the loan unchanged when the policy has no recall return interval
/// or when the recalled date would not shorten it.
///
/// # Errors
///
/// `Validation(UnrecognisedPeriod)` when either recall period uses an unknown
/// interval.
pub fn apply_recall(
    loan: &Loan,
    policy: &LoanPolicy,
    now: DateTime<Utc>,
    zone: FixedOffset,
) -> Result<Loan, CirculationError> {
    let recalls = &policy.recalls;
    let Some(interval) = &recalls.recall_return_interval else {
        return Ok(loan.clone());
    };

    let mut recalled = add(now, interval, zone, RECALL_INTERVAL_UNRECOGNISED_REASON)?;
    if let Some(minimum) = &recalls.minimum_guaranteed_loan_period {
        let guaranteed = add(loan.loan_date, minimum, zone, MINIMUM_PERIOD_UNRECOGNISED_REASON)?;
        if guaranteed > recalled {
            recalled = guaranteed;
        }
    }

    let changes = if loan.is_overdue(now) {
        recalls.allow_recalls_to_extend_overdue_loans
    } else {
        recalled < loan.due_date
    };

    if !changes {
        tracing::debug!(loan = %loan.id, due = %loan.due_date, "recall leaves due date unchanged");
        return Ok(loan.clone());
    }
    tracing::debug!(loan = %loan.id, from = %loan.due_date, to = %recalled, "due date changed by recall");
    Ok(loan.clone().recalled(recalled))
}

fn add(
    from: DateTime<Utc>,
    period: &Period,
    zone: FixedOffset,
    reason: &str,
) -> Result<DateTime<Utc>, CirculationError> {
    let unrecognised = || -> CirculationError {
        ValidationError::new(ValidationErrorKey::UnrecognisedPeriod, reason)
            .with_parameter("period", period)
            .into()
    };
    if !period.interval.is_recognised() {
        return Err(unrecognised());
    }
    period
        .add_to(from.with_timezone(&zone))
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(unrecognised)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use circ_core::{ItemId, PolicyId, ServicePointId};
    use circ_policy::RecallsPolicy;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    }

    fn loan() -> Loan {
        Loan::check_out(
            ItemId::new(),
            ServicePointId::new(),
            start(),
            start() + Duration::days(21),
            PolicyId::new("p"),
        )
    }

    fn policy(recalls: RecallsPolicy) -> LoanPolicy {
        LoanPolicy::rolling("p", Period::weeks(3)).with_recalls(recalls)
    }

    #[test]
    fn test_no_interval_leaves_loan() {
        let l = loan();
        let out = apply_recall(&l, &policy(RecallsPolicy::default()), start() + Duration::days(2), utc()).unwrap();
        assert_eq!(out, l);
    }

    #[test]
    fn test_recall_shortens_due_date() {
        let p = policy(RecallsPolicy {
            recall_return_interval: Some(Period::days(5)),
            ..RecallsPolicy::default()
        });
        let now = start() + Duration::days(2);
        let out = apply_recall(&loan(), &p, now, utc()).unwrap();
        assert_eq!(out.due_date, now + Duration::days(5));
        assert!(out.due_date_changed_by_recall);
    }

    #[test]
    fn test_minimum_guaranteed_period_raises_date() {
        let p = policy(RecallsPolicy {
            recall_return_interval: Some(Period::days(1)),
            minimum_guaranteed_loan_period: Some(Period::weeks(2)),
            ..RecallsPolicy::default()
        });
        let out = apply_recall(&loan(), &p, start() + Duration::days(2), utc()).unwrap();
        assert_eq!(out.due_date, start() + Duration::weeks(2));
    }

    #[test]
    fn test_recall_never_lengthens_open_loan() {
        let p = policy(RecallsPolicy {
            recall_return_interval: Some(Period::weeks(4)),
            ..RecallsPolicy::default()
        });
        let l = loan();
        let out = apply_recall(&l, &p, start() + Duration::days(2), utc()).unwrap();
        assert_eq!(out.due_date, l.due_date);
        assert!(!out.due_date_changed_by_recall);
    }

    #[test]
    fn test_overdue_loan_extension_requires_permission() {
        let interval = Some(Period::days(3));
        let now = start() + Duration::days(30);
        let l = loan();

        let kept = apply_recall(
            &l,
            &policy(RecallsPolicy {
                recall_return_interval: interval.clone(),
                ..RecallsPolicy::default()
            }),
            now,
            utc(),
        )
        .unwrap();
        assert_eq!(kept.due_date, l.due_date);

        let extended = apply_recall(
            &l,
            &policy(RecallsPolicy {
                recall_return_interval: interval,
                allow_recalls_to_extend_overdue_loans: true,
                ..RecallsPolicy::default()
            }),
            now,
            utc(),
        )
        .unwrap();
        assert_eq!(extended.due_date, now + Duration::days(3));
        assert!(extended.due_date_changed_by_recall);
    }

    #[test]
    fn test_unrecognised_interval() {
        let p = policy(RecallsPolicy {
            recall_return_interval: Some(Period::new(2, "Semesters")),
            ..RecallsPolicy::default()
        });
        let err = apply_recall(&loan(), &p, start(), utc()).unwrap_err();
        assert_eq!(err.to_string(), RECALL_INTERVAL_UNRECOGNISED_REASON);
    }
}
