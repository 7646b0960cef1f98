//! Overdue fine policy: the two switches the overdue calculation reads.

use serde::{Deserialize, Serialize};

use circ_core::PolicyId;

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueFinePolicy {
    pub id: PolicyId,
    #[serde(default)]
    pub name: String,
    /// Whether the loan policy's grace period still applies when the due
    /// date was shortened by a recall.
    #[serde(default = "yes")]
    pub grace_period_recall: bool,
    /// Whether time the library was closed counts as overdue.
    #[serde(default = "yes")]
    pub count_closed: bool,
}

impl OverdueFinePolicy {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: PolicyId::new(id),
            name: String::new(),
            grace_period_recall: true,
            count_closed: true,
        }
    }

    /// Policy assumed when the referenced one cannot be found.
    pub fn unknown(id: PolicyId) -> Self {
        Self {
            id,
            name: "Unknown overdue fine policy".to_string(),
            grace_period_recall: true,
            count_closed: true,
        }
    }

    pub fn with_grace_period_recall(mut self, honoured: bool) -> Self {
        self.grace_period_recall = honoured;
        self
    }

    pub fn with_count_closed(mut self, count_closed: bool) -> Self {
        self.count_closed = count_closed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_fields_absent() {
        let p: OverdueFinePolicy = serde_json::from_str(r#"{"id":"fine"}"#).unwrap();
        assert!(p.grace_period_recall);
        assert!(p.count_closed);
    }

    #[test]
    fn test_builders() {
        let p = OverdueFinePolicy::new("fine")
            .with_count_closed(false)
            .with_grace_period_recall(false);
        assert!(!p.count_closed);
        assert!(!p.grace_period_recall);
    }
}
