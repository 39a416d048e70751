//! Error types for `carehub-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid assignment: {0}")]
  InvalidAssignment(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
