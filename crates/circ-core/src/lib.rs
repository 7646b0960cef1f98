//! # circ-core — Foundational Types for the Loan Terms Engine
//!
//! Every other crate in the workspace depends on `circ-core`; it depends on
//! nothing internal. It holds the vocabulary shared by rule matching, policy
//! evaluation, calendar adjustment and renewal validation.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype identifiers.** `PolicyId`, `ScheduleId`, `LoanId`, `ItemId`,
//!    `ServicePointId`, `RequestId` cannot be confused with one another.
//!
//! 2. **One `Period` type.** Loan periods, grace periods, renewal periods and
//!    recall intervals all share `Period`, including its tolerant handling of
//!    unrecognised interval names.
//!
//! 3. **Fixed-offset local time.** Calendar-sensitive arithmetic happens in a
//!    caller-supplied `FixedOffset`; instants are stored as `DateTime<Utc>`.
//!
//! 4. **Stable failure messages.** Every `CirculationError` and every
//!    `ValidationError` carries a message that callers can assert on.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `circ-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod domain;
pub mod error;
pub mod identity;
pub mod period;
pub mod temporal;
pub mod validation;

pub use domain::PolicyType;
pub use error::CirculationError;
pub use identity::{ItemId, LoanId, PolicyId, RequestId, ScheduleId, ServicePointId};
pub use period::{Interval, Period};
pub use validation::{ValidationError, ValidationErrorKey, ValidationErrors};
