//! # circ-loans — Loans, Renewals, Recalls and Overdue Time
//!
//! - **Loan** (`loan.rs`): the loan value, item status and loan action.
//! - **Requests** (`request.rs`): hold, recall and page requests and the
//!   queue whose head renewal consults.
//! - **Renewal** (`renewal.rs`): the accumulating renewal validator and the
//!   regular and override completion paths.
//! - **Recall** (`recall.rs`): due-date shortening when an item is
//!   recalled.
//! - **Overdue** (`overdue.rs`): overdue minutes for fine assessment.
//!
//! Everything is synchronous and works on values; the calendar and policy
//! lookups these decisions need are made by the caller.

pub mod loan;
pub mod overdue;
pub mod recall;
pub mod renewal;
pub mod request;

pub use loan::{ItemStatus, Loan, LoanAction, LoanStatus};
pub use overdue::OverduePeriodCalculator;
pub use recall::apply_recall;
pub use renewal::{renew, RenewalCheck, RenewalContext, RenewalMode};
pub use request::{Request, RequestQueue, RequestStatus, RequestType};
