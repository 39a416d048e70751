//! Core types and trait definitions for the Carehub shift scheduler.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Backends implement the traits in [`store`]; hosts drive the
//! [`Materializer`] whenever they observe a new assignment snapshot.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod materialize;
pub mod shift;
pub mod store;
pub mod trigger;
pub mod window;

pub use error::{Error, Result};
pub use materialize::{AssignmentOutcome, Materializer, OutcomeKind, PassReport};
pub use shift::{AssignmentId, NewAssignment, ShiftAssignment, ShiftInstance};
pub use trigger::SnapshotTrigger;
pub use window::{WeekStart, WeekWindow};
