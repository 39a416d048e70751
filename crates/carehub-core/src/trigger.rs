//! Change detection for hosts that poll instead of reacting to events.
//!
//! A pass should run whenever a family's assignment list changes, and again
//! once the calendar moves into a new target week. [`SnapshotTrigger`]
//! remembers what each family looked like the last time a pass completed
//! cleanly and answers whether a new pass is due.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{materialize::PassReport, shift::ShiftAssignment, window::WeekWindow};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
  window:      WeekWindow,
  assignments: Vec<ShiftAssignment>,
}

#[derive(Debug, Default)]
pub struct SnapshotTrigger {
  seen: HashMap<Uuid, Snapshot>,
}

impl SnapshotTrigger {
  pub fn new() -> Self { Self::default() }

  /// Whether `assignments` for `family_id` warrant a pass against `window`.
  ///
  /// An empty list never does. Otherwise a pass is due unless the same
  /// snapshot was already recorded for the same window.
  pub fn should_run(
    &self,
    family_id:   Uuid,
    assignments: &[ShiftAssignment],
    window:      WeekWindow,
  ) -> bool {
    if assignments.is_empty() {
      return false;
    }
    match self.seen.get(&family_id) {
      Some(prev) => prev.window != window || prev.assignments != assignments,
      None       => true,
    }
  }

  /// Remember the snapshot a pass just ran against.
  ///
  /// A pass with failures is not remembered, so the next poll retries it.
  pub fn record(&mut self, family_id: Uuid, assignments: &[ShiftAssignment], report: &PassReport) {
    match report.window {
      Some(window) if report.is_clean() => {
        self
          .seen
          .insert(family_id, Snapshot { window, assignments: assignments.to_vec() });
      }
      _ => self.forget(family_id),
    }
  }

  pub fn forget(&mut self, family_id: Uuid) { self.seen.remove(&family_id); }

  /// Number of families with a remembered snapshot.
  pub fn len(&self) -> usize { self.seen.len() }

  pub fn is_empty(&self) -> bool { self.seen.is_empty() }
}
