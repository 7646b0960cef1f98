//! # circ-service — Circulation Flows over Repositories
//!
//! The asynchronous edge of the loan terms engine. The decision crates
//! (`circ-rules`, `circ-policy`, `circ-calendar`, `circ-loans`) are pure and
//! synchronous; this crate fetches what they need and feeds it to them.
//!
//! - **Repositories** (`repository.rs`): `Send + Sync` lookup contracts and
//!   an immutable in-memory implementation.
//! - **Config** (`config.rs`): runtime settings and the YAML tenant document
//!   that seeds the in-memory repositories.
//! - **Telemetry** (`telemetry.rs`): `tracing-subscriber` initialisation.
//! - **Service** (`service.rs`): checkout, renewal, recall and overdue
//!   assessment.
//!
//! ## Example
//!
//! ```ignore
//! let config = CirculationConfig::load("circulation.yaml")?;
//! init_tracing(&config)?;
//! let repositories = TenantData::load("tenant.yaml")?.into_repositories(config.tie_break)?;
//! let service = CirculationService::new(repositories, config.zone()?);
//! let loan = service.check_out(request).await?;
//! ```

pub mod config;
pub mod repository;
pub mod service;
pub mod telemetry;

pub use config::{CirculationConfig, ConfigError, ServicePointCalendar, TenantData};
pub use repository::{
    CalendarRepository, CirculationRulesRepository, FixedDueDateScheduleRepository, InMemoryRepositories,
    LoanPolicyRepository, OverdueFinePolicyRepository, Repositories,
};
pub use service::{CheckOutRequest, CirculationService};
pub use telemetry::init_tracing;
