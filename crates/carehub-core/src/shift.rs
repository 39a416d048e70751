//! Shift assignments and the dated instances generated from them.
//!
//! An assignment is the schedule pattern ("Tuesdays and Thursdays, 09:00 to
//! 13:00"). Instances are the concrete, dated occurrences. This crate only
//! ever reads assignments; instances are written by the generation service.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── AssignmentId ────────────────────────────────────────────────────────────

/// Opaque identifier of a [`ShiftAssignment`].
///
/// Backends are free to choose the representation; the SQLite store uses
/// hyphenated UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(String);

impl AssignmentId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  /// A fresh random identifier.
  pub fn generate() -> Self { Self(Uuid::new_v4().hyphenated().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for AssignmentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for AssignmentId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for AssignmentId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── ShiftAssignment ─────────────────────────────────────────────────────────

/// A shift definition linking a carer to a schedule pattern within a family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAssignment {
  pub id:           AssignmentId,
  pub family_id:    Uuid,
  pub carer_id:     Option<Uuid>,
  pub title:        String,
  /// Days of the week on which the shift takes place.
  pub weekdays:     Vec<Weekday>,
  pub start_time:   NaiveTime,
  /// Earlier than `start_time` for shifts that run past midnight.
  pub end_time:     NaiveTime,
  pub is_recurring: bool,
  pub active:       bool,
  pub created_at:   DateTime<Utc>,
}

impl ShiftAssignment {
  /// Whether the materializer should maintain future instances for this
  /// assignment.
  pub fn is_materializable(&self) -> bool { self.is_recurring && self.active }

  pub fn occurs_on(&self, date: NaiveDate) -> bool {
    use chrono::Datelike as _;
    self.weekdays.contains(&date.weekday())
  }

  pub fn is_overnight(&self) -> bool { self.end_time < self.start_time }
}

// ─── NewAssignment ───────────────────────────────────────────────────────────

/// Input to [`crate::store::ScheduleStore::create_assignment`].
/// `id` and `created_at` are always assigned by the store. `family_id` may be
/// left out of a request body that carries the family elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssignment {
  #[serde(default)]
  pub family_id:    Uuid,
  #[serde(default)]
  pub carer_id:     Option<Uuid>,
  pub title:        String,
  #[serde(default)]
  pub weekdays:     Vec<Weekday>,
  pub start_time:   NaiveTime,
  pub end_time:     NaiveTime,
  #[serde(default)]
  pub is_recurring: bool,
  #[serde(default = "default_active")]
  pub active:       bool,
}

fn default_active() -> bool { true }

impl NewAssignment {
  /// Convenience constructor for an active recurring assignment.
  pub fn recurring(
    family_id: Uuid,
    title: impl Into<String>,
    weekdays: Vec<Weekday>,
    start_time: NaiveTime,
    end_time: NaiveTime,
  ) -> Self {
    Self {
      family_id,
      carer_id: None,
      title: title.into(),
      weekdays,
      start_time,
      end_time,
      is_recurring: true,
      active: true,
    }
  }

  /// Reject inputs the generation service could never turn into sensible
  /// instances.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::InvalidAssignment("title must not be empty".into()));
    }
    if self.start_time == self.end_time {
      return Err(Error::InvalidAssignment(
        "start_time and end_time must differ".into(),
      ));
    }
    if self.is_recurring && self.weekdays.is_empty() {
      return Err(Error::InvalidAssignment(
        "a recurring assignment needs at least one weekday".into(),
      ));
    }
    Ok(())
  }

  /// Build the stored form. Duplicate weekdays are collapsed and the list is
  /// kept in Monday-first order.
  pub fn into_assignment(self, id: AssignmentId, created_at: DateTime<Utc>) -> ShiftAssignment {
    let mut weekdays = self.weekdays;
    weekdays.sort_by_key(|d| d.num_days_from_monday());
    weekdays.dedup();

    ShiftAssignment {
      id,
      family_id: self.family_id,
      carer_id: self.carer_id,
      title: self.title,
      weekdays,
      start_time: self.start_time,
      end_time: self.end_time,
      is_recurring: self.is_recurring,
      active: self.active,
      created_at,
    }
  }
}

// ─── ShiftInstance ───────────────────────────────────────────────────────────

/// A concrete, dated occurrence of an assignment.
///
/// At most one instance exists per `(shift_assignment_id, scheduled_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftInstance {
  pub instance_id:         Uuid,
  pub shift_assignment_id: AssignmentId,
  pub scheduled_date:      NaiveDate,
  pub start_time:          NaiveTime,
  pub end_time:            NaiveTime,
  pub created_at:          DateTime<Utc>,
}
