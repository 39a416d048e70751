//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, dates are `YYYY-MM-DD` (so they sort and
//! compare lexicographically; only years 1 to 9999 are accepted), times are `HH:MM:SS`. Weekday sets are compact
//! JSON. UUIDs are hyphenated lowercase strings.

use chrono::{DateTime, Datelike as _, NaiveDate, NaiveTime, Utc, Weekday};
use carehub_core::{AssignmentId, ShiftAssignment, ShiftInstance};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate / NaiveTime ────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> Result<String> {
  if !(1..=9999).contains(&d.year()) {
    return Err(Error::DateOutOfRange(d));
  }
  Ok(d.format("%Y-%m-%d").to_string())
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Weekdays ─────────────────────────────────────────────────────────────────

pub fn encode_weekdays(days: &[Weekday]) -> Result<String> { Ok(serde_json::to_string(days)?) }

pub fn decode_weekdays(s: &str) -> Result<Vec<Weekday>> { Ok(serde_json::from_str(s)?) }

// ─── Raw rows ─────────────────────────────────────────────────────────────────

/// Column values of a `shift_assignments` row, before decoding.
pub struct RawAssignment {
  pub assignment_id: String,
  pub family_id:     String,
  pub carer_id:      Option<String>,
  pub title:         String,
  pub weekdays:      String,
  pub start_time:    String,
  pub end_time:      String,
  pub is_recurring:  bool,
  pub active:        bool,
  pub created_at:    String,
}

/// Column list matching [`RawAssignment::from_row`].
pub const ASSIGNMENT_COLUMNS: &str = "assignment_id, family_id, carer_id, title, weekdays, \
                                      start_time, end_time, is_recurring, active, created_at";

impl RawAssignment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      assignment_id: row.get(0)?,
      family_id:     row.get(1)?,
      carer_id:      row.get(2)?,
      title:         row.get(3)?,
      weekdays:      row.get(4)?,
      start_time:    row.get(5)?,
      end_time:      row.get(6)?,
      is_recurring:  row.get(7)?,
      active:        row.get(8)?,
      created_at:    row.get(9)?,
    })
  }

  pub fn into_assignment(self) -> Result<ShiftAssignment> {
    Ok(ShiftAssignment {
      id:           AssignmentId::from(self.assignment_id),
      family_id:    decode_uuid(&self.family_id)?,
      carer_id:     self.carer_id.as_deref().map(decode_uuid).transpose()?,
      title:        self.title,
      weekdays:     decode_weekdays(&self.weekdays)?,
      start_time:   decode_time(&self.start_time)?,
      end_time:     decode_time(&self.end_time)?,
      is_recurring: self.is_recurring,
      active:       self.active,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Column values of a `shift_instances` row, before decoding.
pub struct RawInstance {
  pub instance_id:         String,
  pub shift_assignment_id: String,
  pub scheduled_date:      String,
  pub start_time:          String,
  pub end_time:            String,
  pub created_at:          String,
}

impl RawInstance {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      instance_id:         row.get(0)?,
      shift_assignment_id: row.get(1)?,
      scheduled_date:      row.get(2)?,
      start_time:          row.get(3)?,
      end_time:            row.get(4)?,
      created_at:          row.get(5)?,
    })
  }

  pub fn into_instance(self) -> Result<ShiftInstance> {
    Ok(ShiftInstance {
      instance_id:         decode_uuid(&self.instance_id)?,
      shift_assignment_id: AssignmentId::from(self.shift_assignment_id),
      scheduled_date:      decode_date(&self.scheduled_date)?,
      start_time:          decode_time(&self.start_time)?,
      end_time:            decode_time(&self.end_time)?,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_sort_lexicographically() {
    let a = encode_date(NaiveDate::from_ymd_opt(2025, 9, 30).unwrap()).unwrap();
    let b = encode_date(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()).unwrap();
    assert_eq!(a, "2025-09-30");
    assert!(a < b);
  }

  #[test]
  fn dates_beyond_four_digit_years_are_rejected() {
    let far = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
    assert!(matches!(encode_date(far), Err(Error::DateOutOfRange(d)) if d == far));
    assert!(matches!(encode_date(NaiveDate::MIN), Err(Error::DateOutOfRange(_))));

    let last = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
    assert_eq!(encode_date(last).unwrap(), "9999-12-31");
  }

  #[test]
  fn weekdays_are_stored_as_json() {
    let s = encode_weekdays(&[Weekday::Mon, Weekday::Sat]).unwrap();
    assert_eq!(decode_weekdays(&s).unwrap(), vec![Weekday::Mon, Weekday::Sat]);
  }

  #[test]
  fn bad_time_is_a_parse_error() {
    assert!(matches!(decode_time("9am"), Err(Error::DateParse(_))));
  }
}
