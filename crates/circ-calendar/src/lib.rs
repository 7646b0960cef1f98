//! # circ-calendar — Opening Days and Closed-Library Strategies
//!
//! A due date that lands on a day the library is closed is adjusted by the
//! strategy the loan policy names. This crate holds both halves of that
//! decision:
//!
//! - **Calendar model** (`opening_day.rs`): `OpeningDay` with its open flag
//!   and opening hours, and `AdjacentOpeningDays`, the previous / requested /
//!   next triple a strategy inspects.
//!
//! - **Strategies** (`strategy.rs`): `ClosedLibraryStrategy`, a closed enum
//!   dispatched by a single `match`. Every arm is a pure function of the
//!   requested instant, the adjacent days and the caller's zone.
//!
//! ## Crate Policy
//!
//! - Depends only on `circ-core` internally.
//! - Calendar lookups are not performed here; callers fetch the days.

pub mod opening_day;
pub mod strategy;

pub use opening_day::{AdjacentOpeningDays, OpeningDay, OpeningHour};
pub use strategy::ClosedLibraryStrategy;
