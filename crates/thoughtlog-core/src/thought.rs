//! Thoughts: entries in a patient's cognitive-therapy thought log.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::ValidationError, patient::PatientCode};

// ─── ThoughtCode ─────────────────────────────────────────────────────────────

/// `<PatientCode>-PS<NNN>`, e.g. `P001-PS004`. The owning patient is always
/// recoverable from the code.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ThoughtCode(String);

impl ThoughtCode {
  pub const MAX_NUMBER: u32 = 999;

  pub fn new(patient: &PatientCode, n: u32) -> Result<Self, ValidationError> {
    let raw = format!("{patient}-PS{n:03}");
    if n == 0 || n > Self::MAX_NUMBER {
      return Err(ValidationError::ThoughtCode(raw));
    }
    Ok(Self(raw))
  }

  pub fn patient(&self) -> PatientCode {
    // The first four bytes were validated as a patient code on construction.
    PatientCode::from_str(&self.0[..4])
      .unwrap_or_else(|_| PatientCode::first())
  }

  /// The per-patient sequence number.
  pub fn number(&self) -> u32 { self.0[7..].parse().unwrap_or_default() }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl FromStr for ThoughtCode {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let bad = || ValidationError::ThoughtCode(s.to_owned());
    let (patient, rest) = s.split_once('-').ok_or_else(bad)?;
    patient.parse::<PatientCode>().map_err(|_| bad())?;
    let digits = rest.strip_prefix("PS").ok_or_else(bad)?;
    let well_formed =
      digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_digit()) && digits != "000";
    if !well_formed {
      return Err(bad());
    }
    Ok(Self(s.to_owned()))
  }
}

impl TryFrom<String> for ThoughtCode {
  type Error = ValidationError;

  fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<ThoughtCode> for String {
  fn from(code: ThoughtCode) -> Self { code.0 }
}

impl fmt::Display for ThoughtCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Thought ─────────────────────────────────────────────────────────────────

/// A logged automatic thought. The text may be edited in place; the code and
/// creation time never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thought {
  pub code:       ThoughtCode,
  pub patient:    PatientCode,
  pub text:       String,
  pub created_at: DateTime<Utc>,
}

/// Reject blank thought text before it reaches the store.
pub fn validate_text(text: &str) -> Result<(), ValidationError> {
  if text.trim().is_empty() {
    return Err(ValidationError::EmptyThought);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn code_embeds_patient_prefix() {
    let patient: PatientCode = "P003".parse().unwrap();
    let code = ThoughtCode::new(&patient, 12).unwrap();
    assert_eq!(code.as_str(), "P003-PS012");
    assert_eq!(code.patient(), patient);
    assert_eq!(code.number(), 12);
  }

  #[test]
  fn parse_round_trips_through_display() {
    let code: ThoughtCode = "P001-PS004".parse().unwrap();
    assert_eq!(code.to_string(), "P001-PS004");
  }

  #[test]
  fn rejects_malformed_codes() {
    for bad in [
      "P001",
      "P001-PS4",
      "P001-XX004",
      "Q001-PS004",
      "P001-PS0004",
      "P001-PS000",
      "P000-PS001",
    ] {
      assert!(bad.parse::<ThoughtCode>().is_err(), "{bad:?} accepted");
    }
  }

  #[test]
  fn sequence_number_is_bounded() {
    let patient = PatientCode::first();
    assert!(ThoughtCode::new(&patient, 0).is_err());
    assert!(ThoughtCode::new(&patient, 1000).is_err());
  }
}
