//! The `ThoughtStore` trait: the single data-access contract.
//!
//! Implemented by storage backends (e.g. `thoughtlog-store-sqlite`). The
//! aggregation engine never sees this trait; it only consumes the
//! [`DimensionRow`]s a store returns.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  dimension::{DimensionRecord, DimensionRow, NewDimension},
  patient::{NewPatient, Patient, PatientCode},
  period::DateRange,
  thought::{Thought, ThoughtCode},
};

/// Abstraction over a thought-log backend.
///
/// Dimension records are append-only. Deleting a thought removes its records;
/// deleting a patient removes its thoughts.
pub trait ThoughtStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Patients ──────────────────────────────────────────────────────────

  /// Register a patient under the next free code.
  fn add_patient(
    &self,
    input: NewPatient,
  ) -> impl Future<Output = Result<Patient, Self::Error>> + Send + '_;

  /// Overwrite the descriptive fields of an existing patient.
  fn update_patient(
    &self,
    patient: Patient,
  ) -> impl Future<Output = Result<Patient, Self::Error>> + Send + '_;

  fn get_patient<'a>(
    &'a self,
    code: &'a PatientCode,
  ) -> impl Future<Output = Result<Option<Patient>, Self::Error>> + Send + 'a;

  /// All patients ordered by code.
  fn list_patients(
    &self,
  ) -> impl Future<Output = Result<Vec<Patient>, Self::Error>> + Send + '_;

  /// Returns `false` if no such patient existed.
  fn delete_patient<'a>(
    &'a self,
    code: &'a PatientCode,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Thoughts ──────────────────────────────────────────────────────────

  /// Log a thought under the patient's next free thought code.
  fn add_thought<'a>(
    &'a self,
    patient: &'a PatientCode,
    text: String,
  ) -> impl Future<Output = Result<Thought, Self::Error>> + Send + 'a;

  /// Replace a thought's text in place.
  fn edit_thought<'a>(
    &'a self,
    code: &'a ThoughtCode,
    text: String,
  ) -> impl Future<Output = Result<Thought, Self::Error>> + Send + 'a;

  fn get_thought<'a>(
    &'a self,
    code: &'a ThoughtCode,
  ) -> impl Future<Output = Result<Option<Thought>, Self::Error>> + Send + 'a;

  /// A patient's thoughts ordered by code.
  fn list_thoughts<'a>(
    &'a self,
    patient: &'a PatientCode,
  ) -> impl Future<Output = Result<Vec<Thought>, Self::Error>> + Send + 'a;

  /// Returns `false` if no such thought existed.
  fn delete_thought<'a>(
    &'a self,
    code: &'a ThoughtCode,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Dimension records ─────────────────────────────────────────────────

  /// Validate and append a measurement.
  fn record_dimension(
    &self,
    input: NewDimension,
  ) -> impl Future<Output = Result<DimensionRecord, Self::Error>> + Send + '_;

  /// Records for one thought on one day, newest first.
  fn records_on<'a>(
    &'a self,
    thought: &'a ThoughtCode,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<DimensionRecord>, Self::Error>> + Send + 'a;

  // ── Aggregation queries ───────────────────────────────────────────────

  /// Every row in `range` for thoughts whose code starts with the patient's
  /// code, ordered by date ascending.
  fn patient_rows<'a>(
    &'a self,
    patient: &'a PatientCode,
    range: DateRange,
  ) -> impl Future<Output = Result<Vec<DimensionRow>, Self::Error>> + Send + 'a;

  /// One thought's rows in `range`, ordered by date ascending.
  fn thought_rows<'a>(
    &'a self,
    thought: &'a ThoughtCode,
    range: DateRange,
  ) -> impl Future<Output = Result<Vec<DimensionRow>, Self::Error>> + Send + 'a;

  /// Forget any rows cached for `patient`, so the next query reads the
  /// backend. Writes made by other processes are only seen after this.
  /// Backends without a cache have nothing to do.
  fn discard_cached(&self, _patient: &PatientCode) {}
}
