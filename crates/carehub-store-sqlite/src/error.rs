//! Error type for `carehub-store-sqlite`.

use carehub_core::AssignmentId;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] carehub_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Dates outside years 1 to 9999 have no fixed-width text form.
  #[error("date {0} is outside the supported range")]
  DateOutOfRange(NaiveDate),

  #[error("assignment not found: {0}")]
  AssignmentNotFound(AssignmentId),

  /// Generation was requested for an assignment that is not both recurring
  /// and active.
  #[error("assignment {0} is not recurring and active")]
  NotEligible(AssignmentId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
