//! # Validation Errors
//!
//! Business-rule violations reported to API consumers. Each violation has a
//! machine key that callers can branch on, a human-readable reason that
//! stays stable across releases, and free-form parameters naming the
//! offending values (item status, renewal limit, policy id).
//!
//! Renewal validation collects every violation before deciding, so the
//! collection type, [`ValidationErrors`], preserves the order in which checks
//! reported.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable category of a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKey {
    ItemNotLoanable,
    LoanNotRenewable,
    RenewalLimitReached,
    RecallRequested,
    HoldBlocksRenewal,
    FixedPolicyHasHoldsRenewalPeriod,
    FixedPolicyHasRenewalPeriod,
    ItemStatusDisallowsRenewal,
    RenewFromUnresolvable,
    UnrecognisedPeriod,
    ScheduleRangeMissing,
    CalendarUnavailable,
    DueDateUnchanged,
    DueDateBeforeLoanDate,
    OverrideDueDateRequired,
    LoanClosed,
    Other,
}

/// A single business-rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub key: ValidationErrorKey,
    pub reason: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new(key: ValidationErrorKey, reason: impl Into<String>) -> Self {
        Self {
            key,
            reason: reason.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Attach a named parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.parameters.insert(name.into(), value.to_string());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Ordered collection of validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_inner(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Whether any error carries exactly this reason.
    pub fn has_reason(&self, reason: &str) -> bool {
        self.errors.iter().any(|e| e.reason == reason)
    }

    /// Whether any error has this key.
    pub fn has_key(&self, key: ValidationErrorKey) -> bool {
        self.errors.iter().any(|e| e.key == key)
    }

    pub fn reasons(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.reason.as_str())
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {e}")?;
        }
        Ok(())
    }
}
