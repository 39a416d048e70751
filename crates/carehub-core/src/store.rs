//! Traits for the external services the materializer collaborates with.
//!
//! The traits are implemented by storage backends (e.g.
//! `carehub-store-sqlite`). Higher layers (`carehub-api`, `carehub-server`)
//! depend on these abstractions, not on any concrete backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  shift::{AssignmentId, NewAssignment, ShiftAssignment, ShiftInstance},
  window::WeekWindow,
};

// ─── Assignment source ───────────────────────────────────────────────────────

/// Owner of assignments and read access to instances.
pub trait ScheduleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Validate and persist a new assignment.
  fn create_assignment(
    &self,
    input: NewAssignment,
  ) -> impl Future<Output = Result<ShiftAssignment, Self::Error>> + Send + '_;

  /// Retrieve an assignment by id. Returns `None` if not found.
  fn get_assignment<'a>(
    &'a self,
    id: &'a AssignmentId,
  ) -> impl Future<Output = Result<Option<ShiftAssignment>, Self::Error>> + Send + 'a;

  /// All assignments of a family, oldest first.
  fn list_assignments(
    &self,
    family_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ShiftAssignment>, Self::Error>> + Send + '_;

  /// Every family that owns at least one assignment.
  fn list_families(&self) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  /// Switch an assignment on or off. Returns the updated assignment, or
  /// `None` if it does not exist.
  fn set_assignment_active<'a>(
    &'a self,
    id: &'a AssignmentId,
    active: bool,
  ) -> impl Future<Output = Result<Option<ShiftAssignment>, Self::Error>> + Send + 'a;

  /// Instances of an assignment scheduled within `[from, to]`, by date.
  fn list_instances<'a>(
    &'a self,
    id: &'a AssignmentId,
    from: NaiveDate,
    to: NaiveDate,
  ) -> impl Future<Output = Result<Vec<ShiftInstance>, Self::Error>> + Send + 'a;
}

// ─── Existence query ─────────────────────────────────────────────────────────

/// Answers "which dates in this window already have an instance?".
pub trait InstanceQuery: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Scheduled dates of existing instances of `id` inside `window`
  /// (inclusive). Empty if there are none.
  fn existing_dates<'a>(
    &'a self,
    id: &'a AssignmentId,
    window: WeekWindow,
  ) -> impl Future<Output = Result<Vec<NaiveDate>, Self::Error>> + Send + 'a;
}

// ─── Generation service ──────────────────────────────────────────────────────

/// Creates the missing instances of an assignment for a date range.
///
/// Implementations are expected to tolerate duplicate requests for the same
/// range: the materializer only guards against them on a best-effort basis.
pub trait InstanceGenerator: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Generate instances of `id` for `window`. Returns how many were created.
  fn generate<'a>(
    &'a self,
    id: &'a AssignmentId,
    window: WeekWindow,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}
