//! # Loan Policy
//!
//! Immutable description of how an item may be borrowed: its due-date
//! profile, renewal rules, holds and recalls handling, grace period and the
//! closed-library strategy. Updates go through `with_*` functions that
//! return a new value.
//!
//! Referenced fixed schedules are stored by id only. The caller resolves them
//! through the schedule repository and attaches the results with
//! [`LoanPolicy::with_schedules`] before computing due dates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use circ_calendar::ClosedLibraryStrategy;
use circ_core::{Period, PolicyId, ScheduleId};

use crate::schedule::FixedDueDateSchedule;

fn yes() -> bool {
    true
}

/// How the due date is derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanProfile {
    /// Due date = reference instant + period, optionally capped by a fixed
    /// schedule.
    Rolling {
        period: Period,
        #[serde(default, rename = "dueDateLimitScheduleId")]
        due_date_limit_schedule_id: Option<ScheduleId>,
    },
    /// Due date taken from the schedule range containing the reference date.
    Fixed {
        #[serde(rename = "fixedDueDateScheduleId")]
        fixed_due_date_schedule_id: ScheduleId,
    },
}

/// Anchor a renewal's due date is computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RenewFrom {
    #[default]
    CurrentDueDate,
    SystemDate,
    /// Stored value this engine does not know; renewal cannot proceed.
    Unrecognized(String),
}

impl From<String> for RenewFrom {
    fn from(s: String) -> Self {
        match s.as_str() {
            "CURRENT_DUE_DATE" => Self::CurrentDueDate,
            "SYSTEM_DATE" => Self::SystemDate,
            _ => Self::Unrecognized(s),
        }
    }
}

impl From<RenewFrom> for String {
    fn from(r: RenewFrom) -> Self {
        match r {
            RenewFrom::CurrentDueDate => "CURRENT_DUE_DATE".to_string(),
            RenewFrom::SystemDate => "SYSTEM_DATE".to_string(),
            RenewFrom::Unrecognized(s) => s,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalsPolicy {
    #[serde(default)]
    pub renew_from: RenewFrom,
    /// Rolling period for renewals; the loan period applies when absent.
    #[serde(default)]
    pub period: Option<Period>,
    /// Maximum number of renewals; unlimited when absent.
    #[serde(default)]
    pub number_allowed: Option<u32>,
    #[serde(default)]
    pub alternate_fixed_due_date_schedule_id: Option<ScheduleId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldsPolicy {
    #[serde(default)]
    pub alternate_checkout_loan_period: Option<Period>,
    #[serde(default)]
    pub alternate_renewal_loan_period: Option<Period>,
    #[serde(default)]
    pub renew_items_with_request: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecallsPolicy {
    #[serde(default)]
    pub recall_return_interval: Option<Period>,
    #[serde(default)]
    pub minimum_guaranteed_loan_period: Option<Period>,
    #[serde(default)]
    pub allow_recalls_to_extend_overdue_loans: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPolicy {
    pub id: PolicyId,
    #[serde(default)]
    pub name: String,
    #[serde(default = "yes")]
    pub loanable: bool,
    #[serde(default = "yes")]
    pub renewable: bool,
    pub profile: LoanProfile,
    #[serde(default)]
    pub closed_library_due_date_management: ClosedLibraryStrategy,
    #[serde(default)]
    pub renewals: RenewalsPolicy,
    #[serde(default)]
    pub holds: HoldsPolicy,
    #[serde(default)]
    pub recalls: RecallsPolicy,
    #[serde(default)]
    pub grace_period: Option<Period>,

    #[serde(skip)]
    loan_schedule: Option<FixedDueDateSchedule>,
    #[serde(skip)]
    alternate_renewal_schedule: Option<FixedDueDateSchedule>,
    #[serde(skip)]
    unknown: bool,
}

impl LoanPolicy {
    fn with_profile(id: impl Into<String>, profile: LoanProfile) -> Self {
        Self {
            id: PolicyId::new(id),
            name: String::new(),
            loanable: true,
            renewable: true,
            profile,
            closed_library_due_date_management: ClosedLibraryStrategy::default(),
            renewals: RenewalsPolicy::default(),
            holds: HoldsPolicy::default(),
            recalls: RecallsPolicy::default(),
            grace_period: None,
            loan_schedule: None,
            alternate_renewal_schedule: None,
            unknown: false,
        }
    }

    pub fn rolling(id: impl Into<String>, period: Period) -> Self {
        Self::with_profile(
            id,
            LoanProfile::Rolling {
                period,
                due_date_limit_schedule_id: None,
            },
        )
    }

    pub fn fixed(id: impl Into<String>, schedule_id: impl Into<String>) -> Self {
        Self::with_profile(
            id,
            LoanProfile::Fixed {
                fixed_due_date_schedule_id: ScheduleId::new(schedule_id),
            },
        )
    }

    /// Stand-in for a loan policy id that storage does not know. Items under
    /// it can be neither loaned nor renewed.
    pub fn unknown(id: PolicyId) -> Self {
        let name = format!("Unknown loan policy {id}");
        Self {
            id,
            name,
            loanable: false,
            renewable: false,
            unknown: true,
            ..Self::rolling("", Period::days(0))
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.unknown
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.profile, LoanProfile::Fixed { .. })
    }

    pub fn is_rolling(&self) -> bool {
        matches!(self.profile, LoanProfile::Rolling { .. })
    }

    pub fn renewal_limit(&self) -> Option<u32> {
        self.renewals.number_allowed
    }

    pub fn allows_renewal_with_holds(&self) -> bool {
        self.holds.renew_items_with_request
    }

    pub fn has_alternate_renewal_period_for_holds(&self) -> bool {
        self.holds.alternate_renewal_loan_period.is_some()
    }

    pub fn has_renewal_period(&self) -> bool {
        self.renewals.period.is_some()
    }

    /// Schedule the profile names: the fixed schedule, or the due-date limit
    /// of a rolling profile.
    pub fn loan_schedule_id(&self) -> Option<&ScheduleId> {
        match &self.profile {
            LoanProfile::Fixed {
                fixed_due_date_schedule_id,
            } => Some(fixed_due_date_schedule_id),
            LoanProfile::Rolling {
                due_date_limit_schedule_id,
                ..
            } => due_date_limit_schedule_id.as_ref(),
        }
    }

    pub fn alternate_renewal_schedule_id(&self) -> Option<&ScheduleId> {
        self.renewals.alternate_fixed_due_date_schedule_id.as_ref()
    }

    /// Every schedule id this policy references.
    pub fn schedule_ids(&self) -> Vec<ScheduleId> {
        let mut ids: Vec<ScheduleId> = self
            .loan_schedule_id()
            .into_iter()
            .chain(self.alternate_renewal_schedule_id())
            .cloned()
            .collect();
        ids.dedup();
        ids
    }

    pub fn loan_schedule(&self) -> Option<&FixedDueDateSchedule> {
        self.loan_schedule.as_ref()
    }

    pub fn alternate_renewal_schedule(&self) -> Option<&FixedDueDateSchedule> {
        self.alternate_renewal_schedule.as_ref()
    }

    /// Attach the referenced schedules found in `schedules`. Ids missing from
    /// the map stay unresolved.
    pub fn with_schedules(mut self, schedules: &BTreeMap<ScheduleId, FixedDueDateSchedule>) -> Self {
        self.loan_schedule = self.loan_schedule_id().and_then(|id| schedules.get(id)).cloned();
        self.alternate_renewal_schedule = self
            .alternate_renewal_schedule_id()
            .and_then(|id| schedules.get(id))
            .cloned();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_loanable(mut self, loanable: bool) -> Self {
        self.loanable = loanable;
        self
    }

    pub fn with_renewable(mut self, renewable: bool) -> Self {
        self.renewable = renewable;
        self
    }

    pub fn with_closed_library_strategy(mut self, strategy: ClosedLibraryStrategy) -> Self {
        self.closed_library_due_date_management = strategy;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Period) -> Self {
        self.grace_period = Some(grace_period);
        self
    }

    pub fn with_renewals(mut self, renewals: RenewalsPolicy) -> Self {
        self.renewals = renewals;
        self
    }

    pub fn with_renewal_limit(mut self, number_allowed: u32) -> Self {
        self.renewals.number_allowed = Some(number_allowed);
        self
    }

    pub fn with_renew_from(mut self, renew_from: RenewFrom) -> Self {
        self.renewals.renew_from = renew_from;
        self
    }

    pub fn with_holds(mut self, holds: HoldsPolicy) -> Self {
        self.holds = holds;
        self
    }

    pub fn with_recalls(mut self, recalls: RecallsPolicy) -> Self {
        self.recalls = recalls;
        self
    }

    pub fn with_due_date_limit_schedule(mut self, schedule_id: impl Into<String>) -> Self {
        if let LoanProfile::Rolling {
            due_date_limit_schedule_id,
            ..
        } = &mut self.profile
        {
            *due_date_limit_schedule_id = Some(ScheduleId::new(schedule_id));
        }
        self
    }
}
