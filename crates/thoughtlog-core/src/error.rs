//! Error types for `thoughtlog-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid date range: {start} is after {end}")]
  InvalidRange { start: NaiveDate, end: NaiveDate },

  #[error(transparent)]
  Validation(#[from] ValidationError),
}

/// A value rejected at the point of record creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("occurrences must be between 0 and {max}, got {value}")]
  Occurrences { value: u32, max: u32 },

  #[error("duration must be between 0 and {max} minutes, got {value}")]
  Duration { value: u32, max: u32 },

  #[error("intensity must be between 0 and {max}, got {value}")]
  Intensity { value: u8, max: u8 },

  #[error("invalid patient code: {0:?}")]
  PatientCode(String),

  #[error("invalid thought code: {0:?}")]
  ThoughtCode(String),

  #[error("patient name must not be empty")]
  EmptyName,

  #[error("thought text must not be empty")]
  EmptyThought,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
