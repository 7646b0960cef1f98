//! # Error Types — Circulation Error Taxonomy
//!
//! One error enum crosses every crate boundary in the workspace. Each
//! variant maps to a single, stable message so that tests and API consumers
//! can assert on the specific cause.
//!
//! ## Propagation
//!
//! - Rule, policy, schedule and calendar failures abort the operation at the
//!   point they occur.
//! - Renewal validation runs every check first and reports the whole set as
//!   [`CirculationError::RenewalRejected`].
//! - Repository failures surface as [`CirculationError::Lookup`].
//! - Nothing is retried here; retry belongs to the caller.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::PolicyType;
use crate::identity::{PolicyId, ScheduleId};
use crate::validation::{ValidationError, ValidationErrorKey, ValidationErrors};

/// Reason reported when a strategy needs a calendar day that is missing or
/// closed.
pub const CALENDAR_UNAVAILABLE_REASON: &str = "Calendar timetable is absent for requested date";

/// Reason reported when a renewal computes a due date that is not later
/// than the current one.
pub const DUE_DATE_UNCHANGED_REASON: &str = "renewal would not change the due date";

/// Top-level error type for the loan terms engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CirculationError {
    /// Neither a specific nor a fallback rule assigns the policy type.
    #[error("no applicable circulation rule assigns a {policy_type} policy for {criteria}")]
    NoApplicableRule {
        /// Policy type that was requested.
        policy_type: PolicyType,
        /// Rendering of the request criteria, for diagnostics.
        criteria: String,
    },

    /// A referenced policy does not exist in storage.
    #[error("{policy_type} policy {id} could not be found, please check circulation rules")]
    PolicyNotFound {
        policy_type: PolicyType,
        id: PolicyId,
    },

    /// The fixed due-date schedule has no range containing the date.
    #[error("no matching fixed due-date schedule range for {date}")]
    ScheduleRangeMissing {
        /// Schedule consulted; `None` when the policy's schedule is not loaded.
        schedule_id: Option<ScheduleId>,
        /// Local date that was looked up.
        date: NaiveDate,
    },

    /// A closed-library strategy needed an open calendar day that is missing
    /// or closed.
    #[error("Calendar timetable is absent for requested date")]
    CalendarUnavailable {
        /// Local date the strategy was asked about.
        date: NaiveDate,
    },

    /// Renewal validation produced one or more violations.
    #[error("renewal refused:\n{0}")]
    RenewalRejected(ValidationErrors),

    /// The recomputed due date is not later than the current due date.
    #[error("renewal would not change the due date")]
    NoDueDateChange,

    /// A single business-rule violation outside renewal validation.
    #[error("{0}")]
    Validation(ValidationError),

    /// The circulation rule text could not be parsed.
    #[error("circulation rules line {line}: {reason}")]
    RuleParse {
        /// 1-based line number.
        line: usize,
        reason: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A repository lookup failed (storage unreachable, timed out).
    #[error("lookup failed: {0}")]
    Lookup(String),
}

impl CirculationError {
    /// Express this error as a validation error so it can join an
    /// accumulated set.
    pub fn into_validation_error(self) -> ValidationError {
        match self {
            Self::Validation(e) => e,
            Self::ScheduleRangeMissing { schedule_id, date } => {
                let e = ValidationError::new(
                    ValidationErrorKey::ScheduleRangeMissing,
                    "renewal date falls outside of date ranges in the loan policy",
                )
                .with_parameter("date", date);
                match schedule_id {
                    Some(id) => e.with_parameter("scheduleId", id),
                    None => e,
                }
            }
            Self::CalendarUnavailable { date } => {
                ValidationError::new(ValidationErrorKey::CalendarUnavailable, CALENDAR_UNAVAILABLE_REASON)
                    .with_parameter("date", date)
            }
            Self::NoDueDateChange => {
                ValidationError::new(ValidationErrorKey::DueDateUnchanged, DUE_DATE_UNCHANGED_REASON)
            }
            other => ValidationError::new(ValidationErrorKey::Other, other.to_string()),
        }
    }
}

impl From<ValidationError> for CirculationError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}
