//! # Identifier Newtypes
//!
//! Policy and schedule identifiers are free-form strings because circulation
//! rules reference them by the token written in the rule text. Records that
//! only ever come from storage (loans, items, service points, requests) use
//! UUIDs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of any circulation policy (loan, request, notice, overdue fine,
/// lost item).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PolicyId(pub String);

/// Identifier of a fixed due-date schedule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScheduleId(pub String);

/// Unique identifier for a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(pub Uuid);

/// Unique identifier for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

/// Unique identifier for a service point. Calendars are kept per service point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServicePointId(pub Uuid);

/// Unique identifier for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl PolicyId {
    /// Wrap a policy identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ScheduleId {
    /// Wrap a schedule identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl LoanId {
    /// Generate a new random loan identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl ItemId {
    /// Generate a new random item identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl ServicePointId {
    /// Generate a new random service point identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl RequestId {
    /// Generate a new random request identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ServicePointId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PolicyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "loan:{}", self.0)
    }
}

impl std::fmt::Display for ServicePointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "service-point:{}", self.0)
    }
}
