//! # Rule Text Parser
//!
//! ```text
//! priority: number-of-criteria, last-line
//! fallback-policy: l loan-default r req-default n notice-default o fine-default i lost-default
//! m book + g staff: l staff-books o staff-fines
//! g undergrad
//!     m dvd cd: l short-media
//! t !reference: r req-circulating
//! ```
//!
//! - `#` starts a comment; a line whose first non-blank character is `/` is a
//!   comment.
//! - Tabs are rejected; nesting is by spaces only.
//! - Criteria terms are joined by `+`. A term is a dimension letter followed
//!   by values (any of them matches), `all`/`*` (no constraint), or `!value`
//!   (none of them may match).
//! - A line without `:` only declares criteria; more deeply indented lines
//!   beneath it inherit them.
//! - Policies are `<letter> <id>` pairs: `l` loan, `r` request, `n` notice,
//!   `o` overdue fine, `i` lost item.
//! - Exactly one `fallback-policy` line, assigning every policy type.

use std::collections::BTreeMap;

use thiserror::Error;

use circ_core::{CirculationError, PolicyId, PolicyType};

use crate::criteria::Dimension;
use crate::matcher::{Condition, Rule, RuleSet, TieBreak};

const FALLBACK_PREFIX: &str = "fallback-policy";
const PRIORITY_PREFIX: &str = "priority";

/// Malformed rule text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {reason}")]
pub struct RuleParseError {
    /// 1-based line number.
    pub line: usize,
    pub reason: String,
}

impl RuleParseError {
    fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

impl From<RuleParseError> for CirculationError {
    fn from(e: RuleParseError) -> Self {
        CirculationError::RuleParse {
            line: e.line,
            reason: e.reason,
        }
    }
}

struct Scope {
    indent: usize,
    conditions: Vec<Condition>,
}

pub(crate) fn parse(text: &str) -> Result<RuleSet, RuleParseError> {
    let mut rules = Vec::new();
    let mut scopes: Vec<Scope> = Vec::new();
    let mut tie_break: Option<TieBreak> = None;
    let mut fallback_seen: Option<usize> = None;
    let mut last_line = 0;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        last_line = line_no;

        if raw.contains('\t') {
            return Err(RuleParseError::new(line_no, "tab characters are not allowed, indent with spaces"));
        }
        let content = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let trimmed = content.trim();
        if trimmed.is_empty() || trimmed.starts_with('/') {
            continue;
        }
        let indent = content.len() - content.trim_start().len();

        if let Some(rest) = strip_keyword(trimmed, PRIORITY_PREFIX) {
            if indent != 0 {
                return Err(RuleParseError::new(line_no, "priority must not be indented"));
            }
            if tie_break.is_some() {
                return Err(RuleParseError::new(line_no, "priority is declared more than once"));
            }
            tie_break = Some(parse_priority(rest, line_no)?);
            continue;
        }

        if let Some(rest) = strip_keyword(trimmed, FALLBACK_PREFIX) {
            if indent != 0 {
                return Err(RuleParseError::new(line_no, "fallback-policy must not be indented"));
            }
            if let Some(first) = fallback_seen {
                return Err(RuleParseError::new(
                    line_no,
                    format!("fallback-policy is already declared on line {first}"),
                ));
            }
            let policies = parse_policies(rest, line_no)?;
            let missing: Vec<String> = PolicyType::all()
                .iter()
                .filter(|t| !policies.contains_key(t))
                .map(|t| t.letter().to_string())
                .collect();
            if !missing.is_empty() {
                return Err(RuleParseError::new(
                    line_no,
                    format!("fallback-policy must assign every policy type, missing: {}", missing.join(" ")),
                ));
            }
            fallback_seen = Some(line_no);
            rules.push(Rule {
                policies,
                ..Rule::fallback(line_no)
            });
            continue;
        }

        while scopes.last().is_some_and(|s| s.indent >= indent) {
            scopes.pop();
        }

        let (criteria_text, policy_text) = match trimmed.split_once(':') {
            Some((c, p)) => (c.trim(), Some(p.trim())),
            None => (trimmed, None),
        };
        let own = parse_criteria(criteria_text, line_no)?;

        if let Some(policy_text) = policy_text {
            let policies = parse_policies(policy_text, line_no)?;
            let conditions: Vec<Condition> = scopes
                .iter()
                .flat_map(|s| s.conditions.iter().cloned())
                .chain(own.iter().cloned())
                .collect();
            rules.push(Rule {
                policies,
                ..Rule::new(line_no, conditions)
            });
        }

        scopes.push(Scope {
            indent,
            conditions: own,
        });
    }

    if fallback_seen.is_none() {
        return Err(RuleParseError::new(
            last_line.max(1),
            "fallback-policy is missing",
        ));
    }

    Ok(RuleSet::new(rules, tie_break.unwrap_or_default()))
}

/// `keyword:` prefix followed by the rest of the line.
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    line.strip_prefix(keyword)
        .and_then(|rest| rest.trim_start().strip_prefix(':'))
        .map(str::trim)
}

fn parse_priority(text: &str, line: usize) -> Result<TieBreak, RuleParseError> {
    let mut tie_break = None;
    for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token {
            "number-of-criteria" => {}
            "last-line" => tie_break = Some(TieBreak::LastLine),
            "first-line" => tie_break = Some(TieBreak::FirstLine),
            other => {
                return Err(RuleParseError::new(line, format!("unknown priority term {other:?}")));
            }
        }
    }
    Ok(tie_break.unwrap_or_default())
}

fn parse_policies(text: &str, line: usize) -> Result<BTreeMap<PolicyType, PolicyId>, RuleParseError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(RuleParseError::new(line, "no policies assigned"));
    }
    if tokens.len() % 2 != 0 {
        return Err(RuleParseError::new(line, "policies must be given as <type> <id> pairs"));
    }

    let mut policies = BTreeMap::new();
    for pair in tokens.chunks(2) {
        let (letter, id) = (pair[0], pair[1]);
        let policy_type = single_char(letter)
            .and_then(PolicyType::from_letter)
            .ok_or_else(|| RuleParseError::new(line, format!("unknown policy type {letter:?}")))?;
        if policies.insert(policy_type, PolicyId::new(id)).is_some() {
            return Err(RuleParseError::new(line, format!("{policy_type} policy is assigned twice")));
        }
    }
    Ok(policies)
}

fn parse_criteria(text: &str, line: usize) -> Result<Vec<Condition>, RuleParseError> {
    if text.is_empty() {
        return Err(RuleParseError::new(line, "rule has no criteria, use \"all\" to match everything"));
    }

    let mut conditions = Vec::new();
    for term in text.split('+').map(str::trim) {
        if term.is_empty() {
            return Err(RuleParseError::new(line, "empty criteria term"));
        }
        if term == "all" || term == "*" {
            continue;
        }

        let mut tokens = term.split_whitespace();
        let head = tokens.next().unwrap_or_default();
        let dimension = single_char(head)
            .and_then(Dimension::from_letter)
            .ok_or_else(|| RuleParseError::new(line, format!("unknown criteria type {head:?}")))?;
        let values: Vec<&str> = tokens.collect();
        if values.is_empty() {
            return Err(RuleParseError::new(line, format!("{dimension} has no values")));
        }
        if values.iter().any(|v| *v == "all" || *v == "*") {
            if values.len() > 1 {
                return Err(RuleParseError::new(line, format!("{dimension} mixes a wildcard with values")));
            }
            continue;
        }

        let negated = values.iter().filter(|v| v.starts_with('!')).count();
        if negated == 0 {
            conditions.push(Condition::any_of(dimension, values));
        } else if negated == values.len() {
            let stripped = values.iter().map(|v| v.trim_start_matches('!'));
            if stripped.clone().any(str::is_empty) {
                return Err(RuleParseError::new(line, format!("{dimension} has an empty negated value")));
            }
            conditions.push(Condition::none_of(dimension, stripped));
        } else {
            return Err(RuleParseError::new(
                line,
                format!("{dimension} mixes negated and plain values"),
            ));
        }
    }
    Ok(conditions)
}

fn single_char(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
