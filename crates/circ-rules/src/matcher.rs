//! # Rule Matcher
//!
//! Selects the policy id for one policy type by scanning the ordered rule
//! list. A rule's specificity is the number of distinct dimensions it
//! constrains; the most specific matching rule wins, equal specificity is
//! decided by declaration position, and the fallback rule answers when no
//! other rule matches.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use circ_core::{CirculationError, PolicyId, PolicyType};

use crate::criteria::{Dimension, RuleCriteria};
use crate::parser::{self, RuleParseError};

/// Which of two equally specific rules wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// The rule declared further down the text wins.
    #[default]
    LastLine,
    /// The rule declared first wins.
    FirstLine,
}

/// One constraint on one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub dimension: Dimension,
    pub values: Vec<String>,
    /// When set, the condition holds for every value *not* listed.
    #[serde(default)]
    pub negated: bool,
}

impl Condition {
    pub fn any_of<I, S>(dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dimension,
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    pub fn none_of<I, S>(dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            negated: true,
            ..Self::any_of(dimension, values)
        }
    }

    pub fn matches(&self, criteria: &RuleCriteria) -> bool {
        let value = criteria.value(self.dimension);
        let listed = self.values.iter().any(|v| v == value);
        listed != self.negated
    }
}

/// A circulation rule: conditions (all must hold) and the policies it
/// assigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// 1-based line of the rule text the rule was declared on.
    pub line: usize,
    pub conditions: Vec<Condition>,
    pub policies: BTreeMap<PolicyType, PolicyId>,
    #[serde(default)]
    pub is_fallback: bool,
}

impl Rule {
    pub fn new(line: usize, conditions: Vec<Condition>) -> Self {
        Self {
            line,
            conditions,
            policies: BTreeMap::new(),
            is_fallback: false,
        }
    }

    /// The unconditional rule consulted when nothing more specific matches.
    pub fn fallback(line: usize) -> Self {
        Self {
            is_fallback: true,
            ..Self::new(line, Vec::new())
        }
    }

    pub fn with_policy(mut self, policy_type: PolicyType, id: impl Into<String>) -> Self {
        self.policies.insert(policy_type, PolicyId::new(id));
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Number of distinct dimensions this rule constrains.
    pub fn specificity(&self) -> usize {
        self.conditions
            .iter()
            .map(|c| c.dimension)
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn constrains(&self, dimension: Dimension) -> bool {
        self.conditions.iter().any(|c| c.dimension == dimension)
    }

    pub fn matches(&self, criteria: &RuleCriteria) -> bool {
        self.conditions.iter().all(|c| c.matches(criteria))
    }

    pub fn policy_for(&self, policy_type: PolicyType) -> Option<&PolicyId> {
        self.policies.get(&policy_type)
    }

    fn to_match(&self, policy_id: PolicyId) -> CirculationRuleMatch {
        CirculationRuleMatch {
            policy_id,
            applied_rule_conditions: AppliedRuleConditions {
                item_type_present: self.constrains(Dimension::MaterialType),
                loan_type_present: self.constrains(Dimension::LoanType),
                patron_group_present: self.constrains(Dimension::PatronGroup),
            },
            line: self.line,
        }
    }
}

/// Which of the item, loan type and patron group dimensions the selected
/// rule constrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedRuleConditions {
    pub item_type_present: bool,
    pub loan_type_present: bool,
    pub patron_group_present: bool,
}

/// Outcome of matching one policy type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CirculationRuleMatch {
    pub policy_id: PolicyId,
    pub applied_rule_conditions: AppliedRuleConditions,
    /// Line of the selected rule.
    pub line: usize,
}

/// An ordered, immutable list of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    rules: Vec<Rule>,
    #[serde(default)]
    tie_break: TieBreak,
}

impl RuleSet {
    /// Build a rule set from rules in declaration order.
    ///
    /// Unlike [`RuleSet::parse`], no fallback rule is required; matching
    /// fails with `NoApplicableRule` when none is present and nothing else
    /// matches.
    pub fn new(rules: Vec<Rule>, tie_break: TieBreak) -> Self {
        Self { rules, tie_break }
    }

    /// Parse circulation rule text.
    ///
    /// # Errors
    ///
    /// [`RuleParseError`] naming the offending line.
    pub fn parse(text: &str) -> Result<Self, RuleParseError> {
        parser::parse(text)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Policy id governing `criteria` for `policy_type`.
    ///
    /// # Errors
    ///
    /// [`CirculationError::NoApplicableRule`] when neither a specific rule
    /// nor a fallback assigns the type.
    pub fn find_match(
        &self,
        criteria: &RuleCriteria,
        policy_type: PolicyType,
    ) -> Result<CirculationRuleMatch, CirculationError> {
        let found = self.ranked(criteria, policy_type).into_iter().next();
        match found {
            Some(m) => {
                tracing::debug!(
                    %policy_type,
                    %criteria,
                    line = m.line,
                    policy_id = %m.policy_id,
                    "circulation rule matched"
                );
                Ok(m)
            }
            None => Err(CirculationError::NoApplicableRule {
                policy_type,
                criteria: criteria.to_string(),
            }),
        }
    }

    /// Every rule that matches `criteria` and assigns `policy_type`, best
    /// first. Fallback rules come last.
    pub fn find_all_matches(
        &self,
        criteria: &RuleCriteria,
        policy_type: PolicyType,
    ) -> Vec<CirculationRuleMatch> {
        self.ranked(criteria, policy_type)
    }

    fn ranked(&self, criteria: &RuleCriteria, policy_type: PolicyType) -> Vec<CirculationRuleMatch> {
        let mut specific: Vec<(usize, &Rule)> = Vec::new();
        let mut fallbacks: Vec<(usize, &Rule)> = Vec::new();

        for (position, rule) in self.rules.iter().enumerate() {
            if rule.policy_for(policy_type).is_none() {
                continue;
            }
            if rule.is_fallback {
                fallbacks.push((position, rule));
            } else if rule.matches(criteria) {
                specific.push((position, rule));
            }
        }

        let tie_break = self.tie_break;
        let by_position = |a: usize, b: usize| match tie_break {
            TieBreak::LastLine => b.cmp(&a),
            TieBreak::FirstLine => a.cmp(&b),
        };
        specific.sort_by(|(pa, ra), (pb, rb)| {
            rb.specificity()
                .cmp(&ra.specificity())
                .then_with(|| by_position(*pa, *pb))
        });
        fallbacks.sort_by(|(pa, _), (pb, _)| by_position(*pa, *pb));

        specific
            .into_iter()
            .chain(fallbacks)
            .filter_map(|(_, rule)| rule.policy_for(policy_type).map(|id| rule.to_match(id.clone())))
            .collect()
    }
}
