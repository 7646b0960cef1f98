//! # Policy Types
//!
//! The five kinds of policy a circulation rule can assign. Each rule line
//! names policies by a single-letter type code; the same letters are used in
//! the rule text, in diagnostics and in configuration.

use serde::{Deserialize, Serialize};

/// Number of policy types a fallback rule must cover.
pub const POLICY_TYPE_COUNT: usize = 5;

/// A kind of circulation policy selected by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    /// Loan policy (`l`): due dates, renewals, holds and recalls.
    Loan,
    /// Request policy (`r`).
    Request,
    /// Patron notice policy (`n`).
    Notice,
    /// Overdue fine policy (`o`).
    OverdueFine,
    /// Lost item fee policy (`i`).
    LostItem,
}

impl PolicyType {
    /// All policy types, in rule-text order.
    pub fn all() -> [PolicyType; POLICY_TYPE_COUNT] {
        [
            Self::Loan,
            Self::Request,
            Self::Notice,
            Self::OverdueFine,
            Self::LostItem,
        ]
    }

    /// The rule-text letter for this policy type.
    pub fn letter(&self) -> char {
        match self {
            Self::Loan => 'l',
            Self::Request => 'r',
            Self::Notice => 'n',
            Self::OverdueFine => 'o',
            Self::LostItem => 'i',
        }
    }

    /// Resolve a rule-text letter.
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::all().into_iter().find(|t| t.letter() == letter)
    }
}

impl std::fmt::Display for PolicyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Loan => "loan",
            Self::Request => "request",
            Self::Notice => "notice",
            Self::OverdueFine => "overdue fine",
            Self::LostItem => "lost item",
        };
        f.write_str(s)
    }
}
