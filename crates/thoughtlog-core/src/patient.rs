//! Patients: the owners of every thought and measurement.
//!
//! A patient is identified by a short code (`P001`); everything else on the
//! record is descriptive and editable.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ─── PatientCode ─────────────────────────────────────────────────────────────

/// `P` followed by exactly three digits, numbered from `P001`.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct PatientCode(String);

impl PatientCode {
  /// Highest sequence number a code can carry.
  pub const MAX_NUMBER: u32 = 999;

  /// Build the code for sequence number `n` (1-based).
  pub fn from_number(n: u32) -> Result<Self, ValidationError> {
    if n == 0 || n > Self::MAX_NUMBER {
      return Err(ValidationError::PatientCode(format!("P{n:03}")));
    }
    Ok(Self(format!("P{n:03}")))
  }

  /// The numeric part of the code.
  pub fn number(&self) -> u32 {
    // Validated on construction; the slice is always three ASCII digits.
    self.0[1..].parse().unwrap_or_default()
  }

  /// The first code handed out to a fresh store.
  pub fn first() -> Self { Self("P001".to_owned()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl FromStr for PatientCode {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let bytes = s.as_bytes();
    let well_formed = bytes.len() == 4
      && bytes[0] == b'P'
      && bytes[1..].iter().all(u8::is_ascii_digit)
      && &bytes[1..] != b"000";
    if !well_formed {
      return Err(ValidationError::PatientCode(s.to_owned()));
    }
    Ok(Self(s.to_owned()))
  }
}

impl TryFrom<String> for PatientCode {
  type Error = ValidationError;

  fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<PatientCode> for String {
  fn from(code: PatientCode) -> Self { code.0 }
}

impl fmt::Display for PatientCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Patient ─────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
  strum::EnumString,
)]
pub enum Sex {
  #[strum(serialize = "F")]
  #[serde(rename = "F")]
  Female,
  #[strum(serialize = "M")]
  #[serde(rename = "M")]
  Male,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
  pub code:          PatientCode,
  pub name:          String,
  pub birth_date:    Option<NaiveDate>,
  pub sex:           Option<Sex>,
  /// Presenting condition or working diagnosis.
  pub condition:     Option<String>,
  pub notes:         Option<String>,
  pub registered_on: NaiveDate,
}

/// Input to [`crate::store::ThoughtStore::add_patient`]. The code and the
/// registration date are assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct NewPatient {
  pub name:       String,
  pub birth_date: Option<NaiveDate>,
  pub sex:        Option<Sex>,
  pub condition:  Option<String>,
  pub notes:      Option<String>,
}

impl NewPatient {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.name.trim().is_empty() {
      return Err(ValidationError::EmptyName);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_well_formed_codes() {
    let code: PatientCode = "P042".parse().unwrap();
    assert_eq!(code.number(), 42);
    assert_eq!(code.to_string(), "P042");
  }

  #[test]
  fn rejects_malformed_codes() {
    for bad in ["", "P1", "P0001", "X001", "P0a1", "p001", "P000"] {
      assert!(bad.parse::<PatientCode>().is_err(), "{bad:?} accepted");
    }
  }

  #[test]
  fn from_number_pads_and_bounds() {
    assert_eq!(PatientCode::from_number(7).unwrap().as_str(), "P007");
    assert!(PatientCode::from_number(0).is_err());
    assert!(PatientCode::from_number(1000).is_err());
  }

  #[test]
  fn blank_name_is_rejected() {
    assert_eq!(
      NewPatient::new("   ").validate(),
      Err(ValidationError::EmptyName)
    );
    assert!(NewPatient::new("Ana").validate().is_ok());
  }
}
