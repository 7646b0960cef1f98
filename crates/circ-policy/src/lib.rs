//! # circ-policy — Loan Policies and Due Dates
//!
//! - **Loan policy** (`loan_policy.rs`): `LoanPolicy` with its rolling or
//!   fixed `LoanProfile`, renewals, holds, recalls and grace period, plus
//!   the unknown-policy stand-in.
//! - **Schedules** (`schedule.rs`): `FixedDueDateSchedule`, date ranges
//!   mapped to due dates.
//! - **Overdue fine policy** (`overdue_fine.rs`): recall grace and
//!   closed-time switches.
//! - **Due dates** (`due_date.rs`): `DueDateCalculator` for checkout and
//!   renewal, closed-library resolution, and patron-expiration truncation.
//!
//! Nothing here performs I/O. Schedules and calendars arrive as values.

pub mod due_date;
pub mod loan_policy;
pub mod overdue_fine;
pub mod schedule;

pub use due_date::{ensure_not_before_loan_date, truncate_to_patron_expiration, DueDateCalculator, DueDateCandidate};
pub use loan_policy::{HoldsPolicy, LoanPolicy, LoanProfile, RecallsPolicy, RenewFrom, RenewalsPolicy};
pub use overdue_fine::OverdueFinePolicy;
pub use schedule::{FixedDueDateSchedule, ScheduleRange};
