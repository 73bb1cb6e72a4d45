//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Calendar dates are stored as `YYYY-MM-DD` so that string comparison
//! orders them chronologically. Timestamps are RFC 3339 strings. Codes are
//! stored verbatim and re-validated on the way out.

use chrono::{DateTime, NaiveDate, Utc};
use thoughtlog_core::{
  dimension::{DimensionRecord, DimensionRow},
  patient::{Patient, PatientCode, Sex},
  thought::{Thought, ThoughtCode},
};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Sex ─────────────────────────────────────────────────────────────────────

pub fn encode_sex(sex: Sex) -> &'static str {
  match sex {
    Sex::Female => "F",
    Sex::Male => "M",
  }
}

pub fn decode_sex(s: &str) -> Result<Sex> {
  match s {
    "F" => Ok(Sex::Female),
    "M" => Ok(Sex::Male),
    other => Err(Error::Decode(format!("unknown sex: {other:?}"))),
  }
}

// ─── Codes and numbers ───────────────────────────────────────────────────────

fn decode_patient_code(s: &str) -> Result<PatientCode> {
  s.parse().map_err(|e| Error::Decode(format!("{e}")))
}

fn decode_thought_code(s: &str) -> Result<ThoughtCode> {
  s.parse().map_err(|e| Error::Decode(format!("{e}")))
}

fn decode_count<T: TryFrom<i64>>(column: &str, value: i64) -> Result<T> {
  T::try_from(value)
    .map_err(|_| Error::Decode(format!("{column} out of range: {value}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `patients` row.
pub struct RawPatient {
  pub code:          String,
  pub name:          String,
  pub birth_date:    Option<String>,
  pub sex:           Option<String>,
  pub condition:     Option<String>,
  pub notes:         Option<String>,
  pub registered_on: String,
}

impl RawPatient {
  pub const COLUMNS: &str =
    "code, name, birth_date, sex, condition, notes, registered_on";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      code:          row.get(0)?,
      name:          row.get(1)?,
      birth_date:    row.get(2)?,
      sex:           row.get(3)?,
      condition:     row.get(4)?,
      notes:         row.get(5)?,
      registered_on: row.get(6)?,
    })
  }

  pub fn into_patient(self) -> Result<Patient> {
    Ok(Patient {
      code:          decode_patient_code(&self.code)?,
      name:          self.name,
      birth_date:    self.birth_date.as_deref().map(decode_date).transpose()?,
      sex:           self.sex.as_deref().map(decode_sex).transpose()?,
      condition:     self.condition,
      notes:         self.notes,
      registered_on: decode_date(&self.registered_on)?,
    })
  }
}

/// Raw values read directly from a `thoughts` row.
pub struct RawThought {
  pub code:         String,
  pub patient_code: String,
  pub content:      String,
  pub created_at:   String,
}

impl RawThought {
  pub const COLUMNS: &str = "code, patient_code, content, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      code:         row.get(0)?,
      patient_code: row.get(1)?,
      content:      row.get(2)?,
      created_at:   row.get(3)?,
    })
  }

  pub fn into_thought(self) -> Result<Thought> {
    Ok(Thought {
      code:       decode_thought_code(&self.code)?,
      patient:    decode_patient_code(&self.patient_code)?,
      text:       self.content,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `dimensions` row.
pub struct RawRecord {
  pub id:           i64,
  pub thought_code: String,
  pub recorded_on:  String,
  pub occurrences:  i64,
  pub duration:     Option<i64>,
  pub intensity:    Option<i64>,
}

impl RawRecord {
  pub const COLUMNS: &str =
    "id, thought_code, recorded_on, occurrences, duration, intensity";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      thought_code: row.get(1)?,
      recorded_on:  row.get(2)?,
      occurrences:  row.get(3)?,
      duration:     row.get(4)?,
      intensity:    row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<DimensionRecord> {
    Ok(DimensionRecord {
      id:          self.id,
      thought:     decode_thought_code(&self.thought_code)?,
      date:        decode_date(&self.recorded_on)?,
      occurrences: decode_count("occurrences", self.occurrences)?,
      duration:    self
        .duration
        .map(|v| decode_count("duration", v))
        .transpose()?,
      intensity:   self
        .intensity
        .map(|v| decode_count("intensity", v))
        .transpose()?,
    })
  }
}

/// Raw values of a dimension row joined with its thought.
pub struct RawRow {
  pub thought_code: String,
  pub content:      String,
  pub recorded_on:  String,
  pub occurrences:  i64,
  pub duration:     Option<i64>,
  pub intensity:    Option<i64>,
}

impl RawRow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      thought_code: row.get(0)?,
      content:      row.get(1)?,
      recorded_on:  row.get(2)?,
      occurrences:  row.get(3)?,
      duration:     row.get(4)?,
      intensity:    row.get(5)?,
    })
  }

  pub fn into_row(self) -> Result<DimensionRow> {
    Ok(DimensionRow {
      thought:      decode_thought_code(&self.thought_code)?,
      thought_text: self.content,
      date:         decode_date(&self.recorded_on)?,
      occurrences:  decode_count("occurrences", self.occurrences)?,
      duration:     self
        .duration
        .map(|v| decode_count("duration", v))
        .transpose()?,
      intensity:    self
        .intensity
        .map(|v| decode_count("intensity", v))
        .transpose()?,
    })
  }
}
