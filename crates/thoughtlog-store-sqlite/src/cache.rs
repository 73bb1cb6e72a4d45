//! Short-lived read cache for [`patient_rows`] results.
//!
//! Purely a performance aid: entries expire after a fixed TTL and every write
//! touching a patient's thoughts or measurements drops that patient's entries.
//! Writes from another process only show up once the TTL lapses or the
//! entries are discarded through [`discard_cached`].
//!
//! [`patient_rows`]: thoughtlog_core::store::ThoughtStore::patient_rows
//! [`discard_cached`]: thoughtlog_core::store::ThoughtStore::discard_cached

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard, PoisonError},
  time::{Duration, Instant},
};

use thoughtlog_core::{
  dimension::DimensionRow, patient::PatientCode, period::DateRange,
};

type Key = (PatientCode, DateRange);

struct Entry {
  stored_at: Instant,
  rows:      Vec<DimensionRow>,
}

pub struct ReadCache {
  ttl:     Duration,
  entries: Mutex<HashMap<Key, Entry>>,
}

impl ReadCache {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl, entries: Mutex::new(HashMap::new()) }
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<Key, Entry>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn get(
    &self,
    patient: &PatientCode,
    range: DateRange,
  ) -> Option<Vec<DimensionRow>> {
    self.get_at(patient, range, Instant::now())
  }

  fn get_at(
    &self,
    patient: &PatientCode,
    range: DateRange,
    now: Instant,
  ) -> Option<Vec<DimensionRow>> {
    let key = (patient.clone(), range);
    let mut entries = self.lock();
    let fresh = entries
      .get(&key)
      .is_some_and(|e| now.duration_since(e.stored_at) < self.ttl);
    if !fresh {
      entries.remove(&key);
      return None;
    }
    entries.get(&key).map(|e| e.rows.clone())
  }

  pub fn put(&self, patient: &PatientCode, range: DateRange, rows: Vec<DimensionRow>) {
    self.put_at(patient, range, rows, Instant::now());
  }

  fn put_at(
    &self,
    patient: &PatientCode,
    range: DateRange,
    rows: Vec<DimensionRow>,
    now: Instant,
  ) {
    self
      .lock()
      .insert((patient.clone(), range), Entry { stored_at: now, rows });
  }

  /// Drop every cached range for `patient`. Returns how many were dropped.
  pub fn invalidate(&self, patient: &PatientCode) -> usize {
    let mut entries = self.lock();
    let before = entries.len();
    entries.retain(|(p, _), _| p != patient);
    before - entries.len()
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn range(d: u32) -> DateRange {
    DateRange::single(NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
  }

  fn rows() -> Vec<DimensionRow> {
    vec![DimensionRow {
      thought:      "P001-PS001".parse().unwrap(),
      thought_text: "they will laugh at me".into(),
      date:         NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
      occurrences:  1,
      duration:     None,
      intensity:    Some(4),
    }]
  }

  #[test]
  fn entries_expire_after_ttl() {
    let cache = ReadCache::new(Duration::from_secs(60));
    let p: PatientCode = "P001".parse().unwrap();
    let t0 = Instant::now();
    cache.put_at(&p, range(1), rows(), t0);

    assert!(cache.get_at(&p, range(1), t0 + Duration::from_secs(59)).is_some());
    assert!(cache.get_at(&p, range(1), t0 + Duration::from_secs(60)).is_none());
    // Expired entries are evicted on lookup.
    assert!(cache.get_at(&p, range(1), t0).is_none());
  }

  #[test]
  fn invalidate_only_touches_one_patient() {
    let cache = ReadCache::new(Duration::from_secs(60));
    let p1: PatientCode = "P001".parse().unwrap();
    let p2: PatientCode = "P002".parse().unwrap();
    cache.put(&p1, range(1), rows());
    cache.put(&p1, range(2), rows());
    cache.put(&p2, range(1), rows());

    assert_eq!(cache.invalidate(&p1), 2);
    assert!(cache.get(&p1, range(1)).is_none());
    assert!(cache.get(&p2, range(1)).is_some());
  }
}
