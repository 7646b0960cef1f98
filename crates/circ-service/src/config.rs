//! Service configuration and tenant data.
//!
//! [`CirculationConfig`] holds the runtime settings (local zone, rule
//! tie-break override, log filter). It loads from YAML or from environment
//! variables. [`TenantData`] is the YAML document that seeds the in-memory
//! repositories: rule text, policies, schedules and calendars.

use std::path::Path;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use circ_calendar::OpeningDay;
use circ_core::{temporal::parse_utc_offset, CirculationError, ServicePointId};
use circ_policy::{FixedDueDateSchedule, LoanPolicy, OverdueFinePolicy};
use circ_rules::{RuleParseError, RuleSet, TieBreak};

use crate::repository::InMemoryRepositories;

/// Runtime settings for a circulation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CirculationConfig {
    /// Local UTC offset of the library, `+HH:MM`.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Overrides the `priority:` line of the rule text when set.
    #[serde(default)]
    pub tie_break: Option<TieBreak>,
    /// `tracing_subscriber::EnvFilter` directive.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub json_logs: bool,
}

fn default_timezone() -> String {
    "+00:00".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for CirculationConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            tie_break: None,
            log_filter: default_log_filter(),
            json_logs: false,
        }
    }
}

impl CirculationConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.zone()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&read(path.as_ref())?)
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CIRC_TIMEZONE` (default: `+00:00`)
    /// - `CIRC_TIE_BREAK`: `last-line` or `first-line` (default: from the rule text)
    /// - `CIRC_LOG` (default: `info`)
    /// - `CIRC_JSON_LOGS`: `true` for JSON output (default: `false`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let tie_break = match std::env::var("CIRC_TIE_BREAK").ok().as_deref() {
            None => None,
            Some("last-line") => Some(TieBreak::LastLine),
            Some("first-line") => Some(TieBreak::FirstLine),
            Some(other) => {
                return Err(ConfigError::Invalid(format!(
                    "CIRC_TIE_BREAK must be last-line or first-line, got {other:?}"
                )))
            }
        };
        let config = Self {
            timezone: std::env::var("CIRC_TIMEZONE").unwrap_or_else(|_| default_timezone()),
            tie_break,
            log_filter: std::env::var("CIRC_LOG").unwrap_or_else(|_| default_log_filter()),
            json_logs: std::env::var("CIRC_JSON_LOGS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        };
        config.zone()?;
        Ok(config)
    }

    /// The configured local zone.
    pub fn zone(&self) -> Result<FixedOffset, ConfigError> {
        parse_utc_offset(&self.timezone).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Opening days recorded for one service point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePointCalendar {
    pub service_point_id: ServicePointId,
    #[serde(default)]
    pub opening_days: Vec<OpeningDay>,
}

/// Everything a tenant's circulation decisions read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantData {
    /// Circulation rule text.
    pub rules: String,
    #[serde(default)]
    pub loan_policies: Vec<LoanPolicy>,
    #[serde(default)]
    pub overdue_fine_policies: Vec<OverdueFinePolicy>,
    #[serde(default)]
    pub fixed_due_date_schedules: Vec<FixedDueDateSchedule>,
    #[serde(default)]
    pub calendars: Vec<ServicePointCalendar>,
}

impl TenantData {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&read(path.as_ref())?)
    }

    /// Parse the rule text and index everything for lookup. `tie_break`
    /// replaces the rule text's own priority when given.
    pub fn into_repositories(self, tie_break: Option<TieBreak>) -> Result<InMemoryRepositories, ConfigError> {
        let mut rules = RuleSet::parse(&self.rules)?;
        if let Some(tie_break) = tie_break {
            rules = rules.with_tie_break(tie_break);
        }

        let mut repositories = InMemoryRepositories::new(rules);
        for policy in self.loan_policies {
            repositories = repositories.with_loan_policy(policy);
        }
        for policy in self.overdue_fine_policies {
            repositories = repositories.with_overdue_fine_policy(policy);
        }
        for schedule in self.fixed_due_date_schedules {
            repositories = repositories.with_schedule(schedule);
        }
        for calendar in self.calendars {
            repositories = repositories.with_opening_days(calendar.service_point_id, calendar.opening_days);
        }
        tracing::info!(rules = repositories.rules().rules().len(), "tenant data loaded");
        Ok(repositories)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {0}: {1}")]
    Io(String, String),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid circulation rules: {0}")]
    Rules(#[from] RuleParseError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("tracing initialisation failed: {0}")]
    Telemetry(String),
}

impl From<ConfigError> for CirculationError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Rules(e) => e.into(),
            other => CirculationError::Configuration(other.to_string()),
        }
    }
}
