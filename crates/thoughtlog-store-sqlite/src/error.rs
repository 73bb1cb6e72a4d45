//! Error type for `thoughtlog-store-sqlite`.
//!
//! Every storage failure leaves this crate as an [`Error`]; callers never see
//! a raw `rusqlite` error.

use thiserror::Error;
use thoughtlog_core::{ValidationError, patient::PatientCode, thought::ThoughtCode};

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] thoughtlog_core::Error),

  #[error("invalid input: {0}")]
  Validation(#[from] ValidationError),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored value could not be turned back into a domain type.
  #[error("corrupt row: {0}")]
  Decode(String),

  #[error("patient not found: {0}")]
  PatientNotFound(PatientCode),

  #[error("thought not found: {0}")]
  ThoughtNotFound(ThoughtCode),

  #[error("no free code left under {0}")]
  CodesExhausted(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
