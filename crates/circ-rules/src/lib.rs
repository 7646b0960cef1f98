//! # circ-rules — Circulation Rule Matching
//!
//! A tenant's circulation rules are a line-oriented text. Each line narrows
//! the request space (material type, loan type, patron group, location) and
//! assigns policy ids per policy type. This crate parses that text and
//! answers "which policy applies" for one request.
//!
//! ## Modules
//!
//! - **Criteria** (`criteria.rs`): `RuleCriteria`, the request snapshot, and
//!   `Dimension`, the fixed set of matchable attributes.
//! - **Parser** (`parser.rs`): rule text to `RuleSet`, failing with a line
//!   number on malformed input.
//! - **Matcher** (`matcher.rs`): specificity-ranked scan with a configurable
//!   tie-break and a fallback rule.
//!
//! ## Matching Order
//!
//! 1. Rules that do not assign the requested policy type are ignored.
//! 2. Matching rules are ranked by the number of dimensions they constrain.
//! 3. Equal ranks are broken by declaration order (`TieBreak`).
//! 4. When nothing matches, the fallback rule answers.

pub mod criteria;
pub mod matcher;
pub mod parser;

pub use criteria::{Dimension, Location, RuleCriteria};
pub use matcher::{AppliedRuleConditions, CirculationRuleMatch, Condition, Rule, RuleSet, TieBreak};
pub use parser::RuleParseError;
