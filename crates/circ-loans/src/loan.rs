//! # Loans
//!
//! A `Loan` is a value: checkout creates it, renewal and recall processing
//! return new loans with the changed fields, and the previous value stays
//! valid for anyone still holding it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use circ_core::{CirculationError, ItemId, LoanId, PolicyId, ServicePointId, ValidationError, ValidationErrorKey};

/// Reason reported when renewal, recall or fine assessment meets a closed loan.
pub const LOAN_CLOSED_REASON: &str = "loan is closed";

// ─── Item Status ────────────────────────────────────────────────────

/// Circulation status of the loaned item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    #[serde(rename = "Available")]
    Available,
    #[serde(rename = "Checked out")]
    CheckedOut,
    #[serde(rename = "Declared lost")]
    DeclaredLost,
    #[serde(rename = "Aged to lost")]
    AgedToLost,
    #[serde(rename = "Claimed returned")]
    ClaimedReturned,
    #[serde(rename = "Lost and paid")]
    LostAndPaid,
    #[serde(rename = "In transit")]
    InTransit,
    #[serde(rename = "Awaiting pickup")]
    AwaitingPickup,
    #[serde(rename = "Awaiting delivery")]
    AwaitingDelivery,
    #[serde(rename = "Paged")]
    Paged,
    #[serde(rename = "Missing")]
    Missing,
    #[serde(rename = "Withdrawn")]
    Withdrawn,
}

impl ItemStatus {
    /// Name shown to staff and patrons.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::CheckedOut => "Checked out",
            Self::DeclaredLost => "Declared lost",
            Self::AgedToLost => "Aged to lost",
            Self::ClaimedReturned => "Claimed returned",
            Self::LostAndPaid => "Lost and paid",
            Self::InTransit => "In transit",
            Self::AwaitingPickup => "Awaiting pickup",
            Self::AwaitingDelivery => "Awaiting delivery",
            Self::Paged => "Paged",
            Self::Missing => "Missing",
            Self::Withdrawn => "Withdrawn",
        }
    }

    /// Statuses under which a loan cannot be renewed.
    pub fn blocks_renewal(&self) -> bool {
        matches!(self, Self::DeclaredLost | Self::AgedToLost | Self::ClaimedReturned)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Loan ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    Open,
    Closed,
}

/// Last action recorded against a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoanAction {
    CheckedOut,
    Renewed,
    RenewedThroughOverride,
    RecallRequested,
    CheckedIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: LoanId,
    pub item_id: ItemId,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub loan_policy_id: PolicyId,
    #[serde(default)]
    pub overdue_fine_policy_id: Option<PolicyId>,
    #[serde(default)]
    pub renewal_count: u32,
    #[serde(default)]
    pub due_date_changed_by_recall: bool,
    pub checkout_service_point_id: ServicePointId,
    pub item_status: ItemStatus,
    #[serde(default)]
    pub action: Option<LoanAction>,
    #[serde(default)]
    pub action_comment: Option<String>,
    pub status: LoanStatus,
}

impl Loan {
    /// A new open loan.
    pub fn check_out(
        item_id: ItemId,
        checkout_service_point_id: ServicePointId,
        loan_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
        loan_policy_id: PolicyId,
    ) -> Self {
        Self {
            id: LoanId::new(),
            item_id,
            loan_date,
            due_date,
            loan_policy_id,
            overdue_fine_policy_id: None,
            renewal_count: 0,
            due_date_changed_by_recall: false,
            checkout_service_point_id,
            item_status: ItemStatus::CheckedOut,
            action: Some(LoanAction::CheckedOut),
            action_comment: None,
            status: LoanStatus::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == LoanStatus::Open
    }

    /// # Errors
    ///
    /// `Validation(LoanClosed)` when the loan has been closed.
    pub fn ensure_open(&self) -> Result<(), CirculationError> {
        if self.is_open() {
            return Ok(());
        }
        Err(ValidationError::new(ValidationErrorKey::LoanClosed, LOAN_CLOSED_REASON)
            .with_parameter("loanId", self.id)
            .into())
    }

    /// Due date has passed at `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date < now
    }

    pub fn with_item_status(mut self, item_status: ItemStatus) -> Self {
        self.item_status = item_status;
        self
    }

    pub fn with_renewal_count(mut self, renewal_count: u32) -> Self {
        self.renewal_count = renewal_count;
        self
    }

    pub fn with_overdue_fine_policy(mut self, id: PolicyId) -> Self {
        self.overdue_fine_policy_id = Some(id);
        self
    }

    pub fn with_status(mut self, status: LoanStatus) -> Self {
        self.status = status;
        self
    }

    /// Renewed copy: new due date and policy, one more renewal.
    pub fn renewed(mut self, due_date: DateTime<Utc>, loan_policy_id: PolicyId) -> Self {
        self.due_date = due_date;
        self.loan_policy_id = loan_policy_id;
        self.renewal_count += 1;
        self.action = Some(LoanAction::Renewed);
        self.action_comment = None;
        self
    }

    /// Renewed copy recording an override and its comment.
    pub fn renewed_through_override(
        self,
        due_date: DateTime<Utc>,
        loan_policy_id: PolicyId,
        comment: impl Into<String>,
    ) -> Self {
        let mut loan = self.renewed(due_date, loan_policy_id);
        loan.action = Some(LoanAction::RenewedThroughOverride);
        loan.action_comment = Some(comment.into());
        loan
    }

    /// Copy with a due date moved by a recall.
    pub fn recalled(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = due_date;
        self.due_date_changed_by_recall = true;
        self.action = Some(LoanAction::RecallRequested);
        self
    }
}
