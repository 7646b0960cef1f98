//! # Repository Contracts
//!
//! The lookups the circulation flows suspend on. Implementations must be
//! `Send + Sync` so a service can be shared across tasks; every lookup
//! returns a `Send` future. Timeouts and retries belong to the
//! implementation and surface as [`CirculationError::Lookup`].
//!
//! [`InMemoryRepositories`] implements every contract over data fixed at
//! construction.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::NaiveDate;

use circ_calendar::{AdjacentOpeningDays, OpeningDay};
use circ_core::{CirculationError, PolicyId, PolicyType, ScheduleId, ServicePointId};
use circ_policy::{FixedDueDateSchedule, LoanPolicy, OverdueFinePolicy};
use circ_rules::{CirculationRuleMatch, RuleCriteria, RuleSet};

pub trait LoanPolicyRepository: Send + Sync {
    fn find_loan_policy(
        &self,
        id: &PolicyId,
    ) -> impl Future<Output = Result<Option<LoanPolicy>, CirculationError>> + Send;
}

pub trait OverdueFinePolicyRepository: Send + Sync {
    fn find_overdue_fine_policy(
        &self,
        id: &PolicyId,
    ) -> impl Future<Output = Result<Option<OverdueFinePolicy>, CirculationError>> + Send;
}

pub trait FixedDueDateScheduleRepository: Send + Sync {
    /// Schedules for the ids that exist; unknown ids are absent from the map.
    fn find_fixed_schedules_by_ids(
        &self,
        ids: &[ScheduleId],
    ) -> impl Future<Output = Result<BTreeMap<ScheduleId, FixedDueDateSchedule>, CirculationError>> + Send;
}

pub trait CirculationRulesRepository: Send + Sync {
    fn find_rule_match(
        &self,
        criteria: &RuleCriteria,
        policy_type: PolicyType,
    ) -> impl Future<Output = Result<CirculationRuleMatch, CirculationError>> + Send;
}

pub trait CalendarRepository: Send + Sync {
    /// The requested day and the nearest open days either side of it.
    /// `None` when the service point has no calendar at all.
    fn find_adjacent_opening_days(
        &self,
        service_point: ServicePointId,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Option<AdjacentOpeningDays>, CirculationError>> + Send;

    /// Recorded days in `[from, to]`, in date order.
    fn find_opening_days_between(
        &self,
        service_point: ServicePointId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<Vec<OpeningDay>, CirculationError>> + Send;
}

/// Everything the circulation flows look up.
pub trait Repositories:
    LoanPolicyRepository
    + OverdueFinePolicyRepository
    + FixedDueDateScheduleRepository
    + CirculationRulesRepository
    + CalendarRepository
{
}

impl<T> Repositories for T where
    T: LoanPolicyRepository
        + OverdueFinePolicyRepository
        + FixedDueDateScheduleRepository
        + CirculationRulesRepository
        + CalendarRepository
{
}

// ─── In-memory implementation ───────────────────────────────────────

/// Immutable tenant data held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepositories {
    rules: RuleSet,
    loan_policies: BTreeMap<PolicyId, LoanPolicy>,
    overdue_fine_policies: BTreeMap<PolicyId, OverdueFinePolicy>,
    schedules: BTreeMap<ScheduleId, FixedDueDateSchedule>,
    calendars: BTreeMap<ServicePointId, BTreeMap<NaiveDate, OpeningDay>>,
}

impl InMemoryRepositories {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn with_loan_policy(mut self, policy: LoanPolicy) -> Self {
        self.loan_policies.insert(policy.id.clone(), policy);
        self
    }

    pub fn with_overdue_fine_policy(mut self, policy: OverdueFinePolicy) -> Self {
        self.overdue_fine_policies.insert(policy.id.clone(), policy);
        self
    }

    pub fn with_schedule(mut self, schedule: FixedDueDateSchedule) -> Self {
        self.schedules.insert(schedule.id.clone(), schedule);
        self
    }

    /// Add opening days for a service point. A later record for the same
    /// date replaces the earlier one.
    pub fn with_opening_days(
        mut self,
        service_point: ServicePointId,
        days: impl IntoIterator<Item = OpeningDay>,
    ) -> Self {
        let calendar = self.calendars.entry(service_point).or_default();
        for day in days {
            calendar.insert(day.date, day);
        }
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl LoanPolicyRepository for InMemoryRepositories {
    async fn find_loan_policy(&self, id: &PolicyId) -> Result<Option<LoanPolicy>, CirculationError> {
        Ok(self.loan_policies.get(id).cloned())
    }
}

impl OverdueFinePolicyRepository for InMemoryRepositories {
    async fn find_overdue_fine_policy(
        &self,
        id: &PolicyId,
    ) -> Result<Option<OverdueFinePolicy>, CirculationError> {
        Ok(self.overdue_fine_policies.get(id).cloned())
    }
}

impl FixedDueDateScheduleRepository for InMemoryRepositories {
    async fn find_fixed_schedules_by_ids(
        &self,
        ids: &[ScheduleId],
    ) -> Result<BTreeMap<ScheduleId, FixedDueDateSchedule>, CirculationError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.schedules.get(id).map(|s| (id.clone(), s.clone())))
            .collect())
    }
}

impl CirculationRulesRepository for InMemoryRepositories {
    async fn find_rule_match(
        &self,
        criteria: &RuleCriteria,
        policy_type: PolicyType,
    ) -> Result<CirculationRuleMatch, CirculationError> {
        self.rules.find_match(criteria, policy_type)
    }
}

impl CalendarRepository for InMemoryRepositories {
    async fn find_adjacent_opening_days(
        &self,
        service_point: ServicePointId,
        date: NaiveDate,
    ) -> Result<Option<AdjacentOpeningDays>, CirculationError> {
        let Some(calendar) = self.calendars.get(&service_point) else {
            return Ok(None);
        };

        let requested = calendar
            .get(&date)
            .cloned()
            .unwrap_or_else(|| OpeningDay::closed(date));
        let previous = calendar
            .range(..date)
            .rev()
            .find(|(_, day)| day.open)
            .map(|(_, day)| day.clone())
            .unwrap_or_else(|| OpeningDay::closed(date.pred_opt().unwrap_or(date)));
        let next = calendar
            .range(date.succ_opt().unwrap_or(date)..)
            .find(|(d, day)| **d > date && day.open)
            .map(|(_, day)| day.clone())
            .unwrap_or_else(|| OpeningDay::closed(date.succ_opt().unwrap_or(date)));

        Ok(Some(AdjacentOpeningDays::new(previous, requested, next)))
    }

    async fn find_opening_days_between(
        &self,
        service_point: ServicePointId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OpeningDay>, CirculationError> {
        if from > to {
            return Ok(Vec::new());
        }
        Ok(self
            .calendars
            .get(&service_point)
            .map(|calendar| calendar.range(from..=to).map(|(_, day)| day.clone()).collect())
            .unwrap_or_default())
    }
}
