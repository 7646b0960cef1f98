//! # Circulation Service
//!
//! Composes the repository lookups with the synchronous decision code.
//! Every flow runs its lookups one after another, in the order
//! rule match → policy → schedules → calendar, and then computes.
//! Nothing is cached between calls.

use chrono::{DateTime, FixedOffset, Utc};

use circ_calendar::AdjacentOpeningDays;
use circ_core::temporal::local_date;
use circ_core::{
    CirculationError, ItemId, PolicyId, PolicyType, ServicePointId, ValidationError, ValidationErrorKey,
};
use circ_loans::renewal::ITEM_NOT_LOANABLE_REASON;
use circ_loans::{apply_recall, Loan, OverduePeriodCalculator, RenewalContext, RenewalMode, Request, RequestQueue};
use circ_policy::{
    ensure_not_before_loan_date, truncate_to_patron_expiration, DueDateCalculator, DueDateCandidate, LoanPolicy,
    OverdueFinePolicy,
};
use circ_rules::RuleCriteria;

use crate::repository::Repositories;

/// A checkout to be priced into a loan.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutRequest {
    pub item_id: ItemId,
    pub criteria: RuleCriteria,
    pub service_point_id: ServicePointId,
    pub loan_date: DateTime<Utc>,
    /// The borrower's account expiry; the due date never passes it.
    pub patron_expiration: Option<DateTime<Utc>>,
    pub request_queue: RequestQueue,
}

impl CheckOutRequest {
    pub fn new(
        item_id: ItemId,
        criteria: RuleCriteria,
        service_point_id: ServicePointId,
        loan_date: DateTime<Utc>,
    ) -> Self {
        Self {
            item_id,
            criteria,
            service_point_id,
            loan_date,
            patron_expiration: None,
            request_queue: RequestQueue::empty(),
        }
    }

    pub fn with_patron_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.patron_expiration = Some(expiration);
        self
    }

    pub fn with_request_queue(mut self, request_queue: RequestQueue) -> Self {
        self.request_queue = request_queue;
        self
    }
}

/// Checkout, renewal, recall and overdue assessment over one set of
/// repositories in one local zone.
#[derive(Debug, Clone)]
pub struct CirculationService<R> {
    repositories: R,
    zone: FixedOffset,
}

impl<R: Repositories> CirculationService<R> {
    pub fn new(repositories: R, zone: FixedOffset) -> Self {
        Self { repositories, zone }
    }

    pub fn repositories(&self) -> &R {
        &self.repositories
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// Open a loan: due date from the matched loan policy, adjusted for
    /// closed days and capped at the patron's expiration.
    ///
    /// # Errors
    ///
    /// - `NoApplicableRule` when no rule assigns a loan or overdue fine policy.
    /// - `Validation(ItemNotLoanable)` when the policy forbids loans.
    /// - `ScheduleRangeMissing`, `CalendarUnavailable` or a period
    ///   `Validation` error from the due-date computation.
    /// - `Validation(DueDateBeforeLoanDate)` when closed-library adjustment
    ///   or patron expiration would put the due date before the loan date.
    /// - `Lookup` from any repository.
    pub async fn check_out(&self, request: CheckOutRequest) -> Result<Loan, CirculationError> {
        let policy = self.loan_policy_for(&request.criteria).await?;
        if !policy.loanable {
            return Err(ValidationError::new(ValidationErrorKey::ItemNotLoanable, ITEM_NOT_LOANABLE_REASON)
                .with_parameter("loanPolicyId", &policy.id)
                .with_parameter("loanPolicyName", &policy.name)
                .into());
        }

        let hold_at_head = request.request_queue.head().is_some_and(Request::is_hold);
        let candidate = DueDateCalculator::new(&policy, self.zone).checkout_candidate(request.loan_date, hold_at_head)?;
        let days = self.days_for_candidate(request.service_point_id, &candidate).await?;
        let mut due_date = candidate.resolve(days.as_ref())?;

        if let Some(expiration) = request.patron_expiration.filter(|e| due_date > *e) {
            let days = self
                .repositories
                .find_adjacent_opening_days(request.service_point_id, local_date(&expiration, &self.zone))
                .await?;
            due_date = truncate_to_patron_expiration(due_date, expiration, days.as_ref(), &self.zone)?;
            due_date = ensure_not_before_loan_date(due_date, request.loan_date)?;
        }

        let fine_policy = self
            .repositories
            .find_rule_match(&request.criteria, PolicyType::OverdueFine)
            .await?;

        let loan = Loan::check_out(
            request.item_id,
            request.service_point_id,
            request.loan_date,
            due_date,
            policy.id.clone(),
        )
        .with_overdue_fine_policy(fine_policy.policy_id);
        tracing::info!(loan = %loan.id, policy = %policy.id, due = %loan.due_date, "item checked out");
        Ok(loan)
    }

    /// Renew `loan` under the loan policy the rules currently select.
    ///
    /// # Errors
    ///
    /// - `Validation(LoanClosed)` for a loan that is no longer open.
    /// - `RenewalRejected` with every failed check in regular mode.
    /// - `Validation(OverrideDueDateRequired)` for an override without a
    ///   usable due date.
    /// - `NoApplicableRule` or `Lookup` before validation runs.
    pub async fn renew(
        &self,
        loan: Loan,
        criteria: &RuleCriteria,
        request_queue: RequestQueue,
        mode: RenewalMode,
        now: DateTime<Utc>,
    ) -> Result<Loan, CirculationError> {
        loan.ensure_open()?;
        let policy = self.loan_policy_for(criteria).await?;
        let service_point = loan.checkout_service_point_id;
        let context = RenewalContext::new(loan, policy, request_queue);
        let check = context.validate(now, self.zone);

        let days = match &check.candidate {
            Some(candidate) => self.days_for_candidate(service_point, candidate).await?,
            None => None,
        };
        context.complete(check, days.as_ref(), mode)
    }

    /// Shorten `loan` for a recall placed at `now`, under the loan's own
    /// policy.
    ///
    /// # Errors
    ///
    /// `Validation(LoanClosed)` for a closed loan,
    /// `Validation(UnrecognisedPeriod)` for unusable recall periods, or
    /// `Lookup`.
    pub async fn recall(&self, loan: &Loan, now: DateTime<Utc>) -> Result<Loan, CirculationError> {
        loan.ensure_open()?;
        let policy = self.loan_policy_by_id(&loan.loan_policy_id).await?;
        apply_recall(loan, &policy, now, self.zone)
    }

    /// Minutes `loan` is overdue at `now`, for fine assessment.
    ///
    /// # Errors
    ///
    /// `Validation(LoanClosed)` for a closed loan, else `Lookup` only; a
    /// missing loan or overdue fine policy falls back to its defaults.
    pub async fn overdue_minutes(&self, loan: &Loan, now: DateTime<Utc>) -> Result<i64, CirculationError> {
        loan.ensure_open()?;
        let loan_policy = self.loan_policy_by_id(&loan.loan_policy_id).await?;
        let fine_policy = match &loan.overdue_fine_policy_id {
            Some(id) => match self.repositories.find_overdue_fine_policy(id).await? {
                Some(policy) => policy,
                None => {
                    tracing::warn!(policy = %id, loan = %loan.id, "overdue fine policy not found, using defaults");
                    OverdueFinePolicy::unknown(id.clone())
                }
            },
            None => OverdueFinePolicy::unknown(PolicyId::new("")),
        };

        let calculator = OverduePeriodCalculator::new(&fine_policy, loan_policy.grace_period.as_ref(), self.zone);
        let opening_days = if calculator.needs_calendar() && now > loan.due_date {
            self.repositories
                .find_opening_days_between(
                    loan.checkout_service_point_id,
                    local_date(&loan.due_date, &self.zone),
                    local_date(&now, &self.zone),
                )
                .await?
        } else {
            Vec::new()
        };
        Ok(calculator.overdue_minutes(loan, now, &opening_days))
    }

    // ─── Lookups ────────────────────────────────────────────────────

    async fn loan_policy_for(&self, criteria: &RuleCriteria) -> Result<LoanPolicy, CirculationError> {
        let matched = self.repositories.find_rule_match(criteria, PolicyType::Loan).await?;
        self.loan_policy_by_id(&matched.policy_id).await
    }

    /// The policy with its schedules resolved, or the unknown-policy
    /// sentinel when storage has no such id.
    async fn loan_policy_by_id(&self, id: &PolicyId) -> Result<LoanPolicy, CirculationError> {
        let Some(policy) = self.repositories.find_loan_policy(id).await? else {
            tracing::warn!(policy = %id, "loan policy not found, using unknown policy");
            return Ok(LoanPolicy::unknown(id.clone()));
        };

        let schedule_ids = policy.schedule_ids();
        if schedule_ids.is_empty() {
            return Ok(policy);
        }
        let schedules = self.repositories.find_fixed_schedules_by_ids(&schedule_ids).await?;
        Ok(policy.with_schedules(&schedules))
    }

    async fn days_for_candidate(
        &self,
        service_point: ServicePointId,
        candidate: &DueDateCandidate,
    ) -> Result<Option<AdjacentOpeningDays>, CirculationError> {
        if !candidate.needs_calendar() {
            return Ok(None);
        }
        self.repositories
            .find_adjacent_opening_days(service_point, candidate.calendar_date())
            .await
    }
}
