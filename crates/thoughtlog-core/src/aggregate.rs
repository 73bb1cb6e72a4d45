//! The aggregation engine: pure reductions over [`DimensionRow`]s.
//!
//! Nothing in here performs I/O. Every function accepts an empty slice and
//! returns an empty (or all-zero) result for it; the only failure is an
//! inverted date range.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  dimension::DimensionRow,
  period::DateRange,
  thought::ThoughtCode,
};

// ─── Intensity bands ─────────────────────────────────────────────────────────

/// Three-band classification used to color intensity everywhere.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IntensityBand {
  Low,
  Medium,
  High,
}

/// `<= 3` is low, `<= 7` is medium, anything above is high. Lower bounds are
/// closed on the lower band, so 3 is low and 7 is medium. Fractional means
/// fall through the same comparisons (3.5 is medium).
pub fn classify_intensity(value: impl Into<f64>) -> IntensityBand {
  let value = value.into();
  if value <= 3.0 {
    IntensityBand::Low
  } else if value <= 7.0 {
    IntensityBand::Medium
  } else {
    IntensityBand::High
  }
}

// ─── Per-thought summaries ───────────────────────────────────────────────────

/// Totals for one thought over whatever rows were supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtSummary {
  pub thought:           ThoughtCode,
  pub text:              String,
  pub total_occurrences: u64,
  /// Sum of durations in minutes; empty durations count as zero.
  pub total_duration:    u64,
  /// Mean over records that carry an intensity; `None` if none do.
  pub mean_intensity:    Option<f64>,
  pub max_occurrences:   u32,
  pub max_duration:      Option<u32>,
  /// Distinct dates with at least one record.
  pub active_days:       usize,
}

/// Summaries keyed by thought code, in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct ThoughtSummaries {
  entries: Vec<ThoughtSummary>,
  index:   HashMap<ThoughtCode, usize>,
}

impl ThoughtSummaries {
  pub fn get(&self, thought: &ThoughtCode) -> Option<&ThoughtSummary> {
    self.index.get(thought).map(|&i| &self.entries[i])
  }

  pub fn iter(&self) -> std::slice::Iter<'_, ThoughtSummary> {
    self.entries.iter()
  }

  pub fn as_slice(&self) -> &[ThoughtSummary] { &self.entries }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub fn codes(&self) -> impl Iterator<Item = &ThoughtCode> {
    self.entries.iter().map(|s| &s.thought)
  }
}

impl<'a> IntoIterator for &'a ThoughtSummaries {
  type IntoIter = std::slice::Iter<'a, ThoughtSummary>;
  type Item = &'a ThoughtSummary;

  fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}

#[derive(Default)]
struct SummaryAcc {
  occurrences:     u64,
  duration:        u64,
  intensity_sum:   u64,
  intensity_count: u64,
  max_occurrences: u32,
  max_duration:    Option<u32>,
  days:            BTreeSet<NaiveDate>,
}

impl SummaryAcc {
  fn push(&mut self, row: &DimensionRow) {
    self.occurrences += u64::from(row.occurrences);
    self.duration += u64::from(row.duration.unwrap_or(0));
    if let Some(score) = row.intensity {
      self.intensity_sum += u64::from(score);
      self.intensity_count += 1;
    }
    self.max_occurrences = self.max_occurrences.max(row.occurrences);
    self.max_duration = self.max_duration.max(row.duration);
    self.days.insert(row.date);
  }

  fn mean_intensity(&self) -> Option<f64> {
    (self.intensity_count > 0)
      .then(|| self.intensity_sum as f64 / self.intensity_count as f64)
  }
}

/// Group `rows` by thought and reduce each group.
pub fn summarize_by_thought(rows: &[DimensionRow]) -> ThoughtSummaries {
  let mut order: Vec<(&DimensionRow, SummaryAcc)> = Vec::new();
  let mut index: HashMap<&ThoughtCode, usize> = HashMap::new();

  for row in rows {
    let slot = *index.entry(&row.thought).or_insert_with(|| {
      order.push((row, SummaryAcc::default()));
      order.len() - 1
    });
    order[slot].1.push(row);
  }

  let entries: Vec<ThoughtSummary> = order
    .into_iter()
    .map(|(first, acc)| ThoughtSummary {
      thought:           first.thought.clone(),
      text:              first.thought_text.clone(),
      total_occurrences: acc.occurrences,
      total_duration:    acc.duration,
      mean_intensity:    acc.mean_intensity(),
      max_occurrences:   acc.max_occurrences,
      max_duration:      acc.max_duration,
      active_days:       acc.days.len(),
    })
    .collect();

  let index = entries
    .iter()
    .enumerate()
    .map(|(i, s)| (s.thought.clone(), i))
    .collect();

  ThoughtSummaries { entries, index }
}

// ─── Patient overview ────────────────────────────────────────────────────────

/// Whole-patient totals for a range, across every thought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientOverview {
  pub thoughts:          usize,
  pub records:           usize,
  pub total_occurrences: u64,
  pub total_duration:    u64,
  pub mean_intensity:    Option<f64>,
  pub active_days:       usize,
}

pub fn patient_overview(rows: &[DimensionRow]) -> PatientOverview {
  let mut acc = SummaryAcc::default();
  let mut thoughts = BTreeSet::new();
  for row in rows {
    acc.push(row);
    thoughts.insert(&row.thought);
  }
  PatientOverview {
    thoughts:          thoughts.len(),
    records:           rows.len(),
    total_occurrences: acc.occurrences,
    total_duration:    acc.duration,
    mean_intensity:    acc.mean_intensity(),
    active_days:       acc.days.len(),
  }
}

// ─── Daily series ────────────────────────────────────────────────────────────

/// One calendar day of a dense series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
  pub date:          NaiveDate,
  pub occurrences:   u64,
  pub duration:      u64,
  /// Mean of the day's intensities, or `0.0` when none were recorded.
  pub intensity:     f64,
  /// At least one record exists for this day.
  pub recorded:      bool,
  /// At least one record on this day carries an intensity.
  pub has_intensity: bool,
}

impl DailyPoint {
  fn empty(date: NaiveDate) -> Self {
    Self {
      date,
      occurrences: 0,
      duration: 0,
      intensity: 0.0,
      recorded: false,
      has_intensity: false,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityPoint {
  pub date:      NaiveDate,
  pub intensity: f64,
}

/// A dense, ascending, one-point-per-day series over a [`DateRange`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
  range:  DateRange,
  points: Vec<DailyPoint>,
}

impl DailySeries {
  pub fn range(&self) -> DateRange { self.range }

  pub fn points(&self) -> &[DailyPoint] { &self.points }

  pub fn len(&self) -> usize { self.points.len() }

  pub fn is_empty(&self) -> bool { self.points.is_empty() }

  /// Intensity restricted to days that actually carry an intensity. Zero-filled
  /// days never appear here.
  pub fn intensity_only(&self) -> Vec<IntensityPoint> {
    self
      .points
      .iter()
      .filter(|p| p.has_intensity)
      .map(|p| IntensityPoint { date: p.date, intensity: p.intensity })
      .collect()
  }

  /// Mean of [`Self::intensity_only`]; `None` if no day was rated.
  pub fn mean_intensity(&self) -> Option<f64> {
    let rated = self.intensity_only();
    if rated.is_empty() {
      return None;
    }
    Some(rated.iter().map(|p| p.intensity).sum::<f64>() / rated.len() as f64)
  }

  pub fn total_occurrences(&self) -> u64 {
    self.points.iter().map(|p| p.occurrences).sum()
  }

  pub fn total_duration(&self) -> u64 {
    self.points.iter().map(|p| p.duration).sum()
  }
}

#[derive(Default)]
struct DayAcc {
  occurrences:     u64,
  duration:        u64,
  intensity_sum:   u64,
  intensity_count: u64,
}

/// Build the dense series for `[start, end]`. Fails only when
/// `start > end`.
pub fn densify_daily_series(
  rows: &[DimensionRow],
  start: NaiveDate,
  end: NaiveDate,
) -> Result<DailySeries> {
  Ok(densify_range(rows, DateRange::new(start, end)?))
}

/// [`densify_daily_series`] over an already-validated range. Rows outside the
/// range are ignored; several rows on the same day are summed.
pub fn densify_range(rows: &[DimensionRow], range: DateRange) -> DailySeries {
  let mut by_day: BTreeMap<NaiveDate, DayAcc> = BTreeMap::new();
  for row in rows.iter().filter(|r| range.contains(r.date)) {
    let day = by_day.entry(row.date).or_default();
    day.occurrences += u64::from(row.occurrences);
    day.duration += u64::from(row.duration.unwrap_or(0));
    if let Some(score) = row.intensity {
      day.intensity_sum += u64::from(score);
      day.intensity_count += 1;
    }
  }

  let points = range
    .days()
    .map(|date| match by_day.get(&date) {
      None => DailyPoint::empty(date),
      Some(day) => DailyPoint {
        date,
        occurrences: day.occurrences,
        duration: day.duration,
        intensity: if day.intensity_count > 0 {
          day.intensity_sum as f64 / day.intensity_count as f64
        } else {
          0.0
        },
        recorded: true,
        has_intensity: day.intensity_count > 0,
      },
    })
    .collect();

  DailySeries { range, points }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, d).unwrap() }

  fn row(
    thought: &str,
    d: u32,
    occurrences: u32,
    duration: Option<u32>,
    intensity: Option<u8>,
  ) -> DimensionRow {
    DimensionRow {
      thought: thought.parse().unwrap(),
      thought_text: format!("text of {thought}"),
      date: day(d),
      occurrences,
      duration,
      intensity,
    }
  }

  // ── classify_intensity ──────────────────────────────────────────────────

  #[test]
  fn band_thresholds_close_on_the_lower_band() {
    assert_eq!(classify_intensity(0), IntensityBand::Low);
    assert_eq!(classify_intensity(3), IntensityBand::Low);
    assert_eq!(classify_intensity(4), IntensityBand::Medium);
    assert_eq!(classify_intensity(7), IntensityBand::Medium);
    assert_eq!(classify_intensity(8), IntensityBand::High);
    assert_eq!(classify_intensity(10), IntensityBand::High);
  }

  #[test]
  fn fractional_means_use_the_same_thresholds() {
    assert_eq!(classify_intensity(3.5), IntensityBand::Medium);
    assert_eq!(classify_intensity(7.01), IntensityBand::High);
  }

  // ── summarize_by_thought ────────────────────────────────────────────────

  #[test]
  fn empty_input_yields_no_summaries() {
    assert!(summarize_by_thought(&[]).is_empty());
  }

  #[test]
  fn single_record_with_null_duration() {
    let rows = [row("P001-PS001", 1, 3, None, Some(6))];
    let summaries = summarize_by_thought(&rows);
    let s = summaries.get(&"P001-PS001".parse().unwrap()).unwrap();
    assert_eq!(s.total_occurrences, 3);
    assert_eq!(s.total_duration, 0);
    assert_eq!(s.mean_intensity, Some(6.0));
    assert_eq!(s.max_duration, None);
    assert_eq!(s.active_days, 1);
  }

  #[test]
  fn one_summary_per_thought_and_totals_are_preserved() {
    let rows = [
      row("P001-PS002", 1, 2, Some(10), Some(4)),
      row("P001-PS001", 1, 5, Some(30), None),
      row("P001-PS002", 1, 1, None, Some(8)),
      row("P001-PS002", 3, 4, Some(5), None),
      row("P001-PS003", 2, 0, None, None),
    ];
    let summaries = summarize_by_thought(&rows);
    assert_eq!(summaries.len(), 3);

    let total: u64 = summaries.iter().map(|s| s.total_occurrences).sum();
    let expected: u64 = rows.iter().map(|r| u64::from(r.occurrences)).sum();
    assert_eq!(total, expected);

    let codes: Vec<_> = summaries.codes().map(ThoughtCode::as_str).collect();
    assert_eq!(codes, ["P001-PS002", "P001-PS001", "P001-PS003"]);

    let s = summaries.get(&"P001-PS002".parse().unwrap()).unwrap();
    assert_eq!(s.total_occurrences, 7);
    assert_eq!(s.total_duration, 15);
    assert_eq!(s.mean_intensity, Some(6.0));
    assert_eq!(s.max_occurrences, 4);
    assert_eq!(s.max_duration, Some(10));
    assert_eq!(s.active_days, 2);

    let unrated = summaries.get(&"P001-PS003".parse().unwrap()).unwrap();
    assert_eq!(unrated.mean_intensity, None);
  }

  // ── patient_overview ────────────────────────────────────────────────────

  #[test]
  fn overview_spans_all_thoughts() {
    let rows = [
      row("P001-PS001", 1, 2, Some(10), Some(2)),
      row("P001-PS002", 1, 1, None, Some(8)),
      row("P001-PS002", 4, 3, Some(20), None),
    ];
    let o = patient_overview(&rows);
    assert_eq!(o.thoughts, 2);
    assert_eq!(o.records, 3);
    assert_eq!(o.total_occurrences, 6);
    assert_eq!(o.total_duration, 30);
    assert_eq!(o.mean_intensity, Some(5.0));
    assert_eq!(o.active_days, 2);
  }

  // ── densify_daily_series ────────────────────────────────────────────────

  #[test]
  fn dense_series_has_one_point_per_day() {
    let rows = [row("P001-PS001", 5, 1, None, None)];
    let series = densify_daily_series(&rows, day(1), day(10)).unwrap();
    assert_eq!(series.len(), 10);
    assert!(series.points().windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(series.points()[0].date, day(1));
    assert_eq!(series.points()[9].date, day(10));

    let empty = densify_daily_series(&[], day(1), day(10)).unwrap();
    assert_eq!(empty.len(), 10);
    assert!(empty.points().iter().all(|p| !p.recorded && p.occurrences == 0));
  }

  #[test]
  fn inverted_range_is_rejected() {
    let err = densify_daily_series(&[], day(5), day(4)).unwrap_err();
    assert!(matches!(err, crate::Error::InvalidRange { .. }));
  }

  #[test]
  fn same_day_records_accumulate() {
    let rows = [
      row("P001-PS001", 2, 2, Some(10), Some(4)),
      row("P001-PS001", 2, 3, None, Some(6)),
      row("P001-PS001", 9, 7, Some(60), None),
    ];
    let series = densify_daily_series(&rows, day(1), day(3)).unwrap();
    let p = series.points()[1];
    assert_eq!(p.occurrences, 5);
    assert_eq!(p.duration, 10);
    assert_eq!(p.intensity, 5.0);
    assert!(p.recorded && p.has_intensity);
    // The day-9 row lies outside the range.
    assert_eq!(series.total_occurrences(), 5);
  }

  #[test]
  fn intensity_mean_skips_zero_filled_days() {
    let rows = [
      row("P001-PS001", 1, 1, None, Some(10)),
      row("P001-PS001", 3, 1, None, Some(0)),
    ];
    let series = densify_daily_series(&rows, day(1), day(3)).unwrap();
    assert_eq!(series.points()[1].intensity, 0.0);
    assert!(!series.points()[1].recorded);

    let rated = series.intensity_only();
    assert_eq!(rated.len(), 2);
    assert_eq!(series.mean_intensity(), Some(5.0));
  }

  #[test]
  fn recorded_day_without_intensity_is_not_rated() {
    let rows = [row("P001-PS001", 2, 4, Some(5), None)];
    let series = densify_daily_series(&rows, day(1), day(3)).unwrap();
    assert!(series.points()[1].recorded);
    assert!(series.intensity_only().is_empty());
    assert_eq!(series.mean_intensity(), None);
  }
}
