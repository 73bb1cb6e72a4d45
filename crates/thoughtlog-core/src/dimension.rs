//! Dimension records: the frequency/duration/intensity measurements taken
//! against a thought on a given day.
//!
//! Records accumulate: several records may share a (thought, date) pair and
//! every consumer sums them. Nothing is ever upserted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{error::ValidationError, thought::ThoughtCode};

/// Upper bound for a single record's occurrence count.
pub const MAX_OCCURRENCES: u32 = 10;
/// Upper bound for a single record's duration, in minutes.
pub const MAX_DURATION_MINUTES: u32 = 60;
/// Upper bound for a single record's intensity score.
pub const MAX_INTENSITY: u8 = 10;

/// A persisted measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRecord {
  pub id:          i64,
  pub thought:     ThoughtCode,
  pub date:        NaiveDate,
  pub occurrences: u32,
  /// Minutes; `None` when the clinician left the field empty.
  pub duration:    Option<u32>,
  pub intensity:   Option<u8>,
}

/// Input to [`crate::store::ThoughtStore::record_dimension`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDimension {
  pub thought:     ThoughtCode,
  pub date:        NaiveDate,
  pub occurrences: u32,
  pub duration:    Option<u32>,
  pub intensity:   Option<u8>,
}

impl NewDimension {
  /// Check every field against its declared bounds.
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.occurrences > MAX_OCCURRENCES {
      return Err(ValidationError::Occurrences {
        value: self.occurrences,
        max:   MAX_OCCURRENCES,
      });
    }
    if let Some(minutes) = self.duration
      && minutes > MAX_DURATION_MINUTES
    {
      return Err(ValidationError::Duration {
        value: minutes,
        max:   MAX_DURATION_MINUTES,
      });
    }
    if let Some(score) = self.intensity
      && score > MAX_INTENSITY
    {
      return Err(ValidationError::Intensity {
        value: score,
        max:   MAX_INTENSITY,
      });
    }
    Ok(())
  }
}

/// One measurement joined with its parent thought: the only shape the
/// aggregation engine consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRow {
  pub thought:      ThoughtCode,
  pub thought_text: String,
  pub date:         NaiveDate,
  pub occurrences:  u32,
  pub duration:     Option<u32>,
  pub intensity:    Option<u8>,
}
