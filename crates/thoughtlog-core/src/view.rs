//! Drill-down view state for the statistics screen.
//!
//! [`DrillState`] is the whole of the screen's selection state. Every user
//! action produces a new state; [`Redraw::between`] compares it with the
//! previous one to decide what has to be refetched and recomputed, and
//! [`StatsView`] holds the last good data so a failed refresh never blanks
//! the charts.

use std::fmt;

use serde::Serialize;

use crate::{
  aggregate::{
    DailySeries, PatientOverview, ThoughtSummaries, densify_range,
    patient_overview, summarize_by_thought,
  },
  chart::{ChartSeries, Dimension, PlotKind, daily_chart, thought_chart},
  dimension::DimensionRow,
  patient::PatientCode,
  period::DateRange,
  thought::ThoughtCode,
};

// ─── DrillState ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrillState {
  pub patient:          PatientCode,
  pub period:           DateRange,
  pub selected_thought: Option<ThoughtCode>,
}

impl DrillState {
  pub fn new(patient: PatientCode, period: DateRange) -> Self {
    Self { patient, period, selected_thought: None }
  }

  /// Switch patient; the drilled-into thought is cleared when it changes.
  pub fn with_patient(&self, patient: PatientCode) -> Self {
    if patient == self.patient {
      return self.clone();
    }
    Self::new(patient, self.period)
  }

  /// Switch period; the drilled-into thought is cleared when it changes.
  pub fn with_period(&self, period: DateRange) -> Self {
    if period == self.period {
      return self.clone();
    }
    Self::new(self.patient.clone(), period)
  }

  pub fn with_selection(&self, thought: Option<ThoughtCode>) -> Self {
    Self { selected_thought: thought, ..self.clone() }
  }
}

// ─── Redraw ──────────────────────────────────────────────────────────────────

/// What a state transition invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Redraw {
  /// Rows must be fetched again from the store.
  pub refetch:   bool,
  /// The per-thought (pie) chart changed.
  pub primary:   bool,
  /// The per-day (line) chart changed.
  pub secondary: bool,
}

impl Redraw {
  pub const NONE: Self =
    Self { refetch: false, primary: false, secondary: false };

  pub fn between(prev: &DrillState, next: &DrillState) -> Self {
    let refetch = prev.patient != next.patient || prev.period != next.period;
    Self {
      refetch,
      primary: refetch,
      secondary: refetch || prev.selected_thought != next.selected_thought,
    }
  }

  pub fn is_none(&self) -> bool { *self == Self::NONE }
}

// ─── StatsView ───────────────────────────────────────────────────────────────

/// View model behind the statistics screen.
#[derive(Debug, Clone)]
pub struct StatsView {
  state:      DrillState,
  dimension:  Dimension,
  rows:       Vec<DimensionRow>,
  summaries:  ThoughtSummaries,
  overview:   PatientOverview,
  primary:    ChartSeries,
  daily:      Option<DailySeries>,
  secondary:  Option<ChartSeries>,
  last_error: Option<String>,
}

impl StatsView {
  /// An empty view for `state`; call [`Self::refresh`] with fetched rows to
  /// populate it.
  pub fn new(state: DrillState, dimension: Dimension) -> Self {
    let mut view = Self {
      state,
      dimension,
      rows: Vec::new(),
      summaries: ThoughtSummaries::default(),
      overview: patient_overview(&[]),
      primary: ChartSeries { kind: PlotKind::Pie, dimension, points: Vec::new() },
      daily: None,
      secondary: None,
      last_error: None,
    };
    view.state.selected_thought = None;
    view
  }

  pub fn state(&self) -> &DrillState { &self.state }

  pub fn dimension(&self) -> Dimension { self.dimension }

  pub fn summaries(&self) -> &ThoughtSummaries { &self.summaries }

  pub fn overview(&self) -> &PatientOverview { &self.overview }

  pub fn primary(&self) -> &ChartSeries { &self.primary }

  pub fn daily(&self) -> Option<&DailySeries> { self.daily.as_ref() }

  pub fn secondary(&self) -> Option<&ChartSeries> { self.secondary.as_ref() }

  pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }

  /// Compare `next` with the current state without changing anything.
  pub fn plan(&self, next: &DrillState) -> Redraw {
    Redraw::between(&self.state, next)
  }

  /// Install freshly fetched rows for `next`. On failure the previous state
  /// and data are kept and only the error message is recorded.
  pub fn refresh<E: fmt::Display>(
    &mut self,
    next: DrillState,
    fetched: Result<Vec<DimensionRow>, E>,
  ) -> Redraw {
    let rows = match fetched {
      Ok(rows) => rows,
      Err(e) => {
        self.last_error = Some(e.to_string());
        return Redraw::NONE;
      }
    };

    self.state = next;
    self.rows = rows;
    self.last_error = None;
    self.summaries = summarize_by_thought(&self.rows);
    self.overview = patient_overview(&self.rows);
    self.primary = thought_chart(&self.summaries, self.dimension);

    // A selection that no longer has data in range is dropped.
    if let Some(code) = &self.state.selected_thought
      && self.summaries.get(code).is_none()
    {
      self.state.selected_thought = None;
    }
    self.rebuild_secondary();

    Redraw { refetch: true, primary: true, secondary: true }
  }

  /// Drill into `thought` (or back out with `None`). Only thoughts present in
  /// the current summaries can be selected.
  pub fn select(&mut self, thought: Option<ThoughtCode>) -> Redraw {
    if let Some(code) = &thought
      && self.summaries.get(code).is_none()
    {
      return Redraw::NONE;
    }
    let next = self.state.with_selection(thought);
    let redraw = self.plan(&next);
    if redraw.secondary {
      self.state = next;
      self.rebuild_secondary();
    }
    redraw
  }

  pub fn set_dimension(&mut self, dimension: Dimension) -> Redraw {
    if dimension == self.dimension {
      return Redraw::NONE;
    }
    self.dimension = dimension;
    self.primary = thought_chart(&self.summaries, dimension);
    self.rebuild_secondary();
    Redraw {
      refetch:   false,
      primary:   true,
      secondary: self.secondary.is_some(),
    }
  }

  fn rebuild_secondary(&mut self) {
    let Some(code) = self.state.selected_thought.clone() else {
      self.daily = None;
      self.secondary = None;
      return;
    };
    let rows: Vec<DimensionRow> = self
      .rows
      .iter()
      .filter(|r| r.thought == code)
      .cloned()
      .collect();
    let series = densify_range(&rows, self.state.period);
    self.secondary = Some(daily_chart(&series, self.dimension));
    self.daily = Some(series);
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, d).unwrap() }

  fn range() -> DateRange { DateRange::new(day(1), day(7)).unwrap() }

  fn state() -> DrillState { DrillState::new("P001".parse().unwrap(), range()) }

  fn row(thought: &str, d: u32, occ: u32, intensity: Option<u8>) -> DimensionRow {
    DimensionRow {
      thought:      thought.parse().unwrap(),
      thought_text: format!("text {thought}"),
      date:         day(d),
      occurrences:  occ,
      duration:     Some(5),
      intensity,
    }
  }

  fn rows() -> Vec<DimensionRow> {
    vec![
      row("P001-PS001", 1, 2, Some(3)),
      row("P001-PS002", 2, 4, Some(9)),
      row("P001-PS001", 4, 1, None),
    ]
  }

  fn loaded() -> StatsView {
    let mut view = StatsView::new(state(), Dimension::Occurrences);
    view.refresh::<String>(state(), Ok(rows()));
    view
  }

  #[test]
  fn changing_patient_or_period_clears_selection() {
    let selected = state().with_selection(Some("P001-PS001".parse().unwrap()));

    let other_patient = selected.with_patient("P002".parse().unwrap());
    assert_eq!(other_patient.selected_thought, None);

    let other_period = selected.with_period(DateRange::single(day(3)));
    assert_eq!(other_period.selected_thought, None);

    let same = selected.with_period(range());
    assert_eq!(same, selected);
  }

  #[test]
  fn redraw_follows_what_changed() {
    let a = state();
    assert!(Redraw::between(&a, &a).is_none());

    let b = a.with_selection(Some("P001-PS001".parse().unwrap()));
    assert_eq!(Redraw::between(&a, &b), Redraw {
      refetch:   false,
      primary:   false,
      secondary: true,
    });

    let c = a.with_period(DateRange::single(day(2)));
    let r = Redraw::between(&a, &c);
    assert!(r.refetch && r.primary && r.secondary);
  }

  #[test]
  fn refresh_builds_both_charts() {
    let mut view = loaded();
    assert_eq!(view.primary().labels(), ["P001-PS001", "P001-PS002"]);
    assert!(view.secondary().is_none());

    let redraw = view.select(Some("P001-PS001".parse().unwrap()));
    assert!(redraw.secondary && !redraw.refetch);
    let line = view.secondary().unwrap();
    assert_eq!(line.kind, PlotKind::Line);
    assert_eq!(line.points.len(), 7);
    assert_eq!(view.daily().unwrap().total_occurrences(), 3);
  }

  #[test]
  fn failed_refresh_keeps_previous_data() {
    let mut view = loaded();
    view.select(Some("P001-PS002".parse().unwrap()));
    let before = view.primary().clone();

    let next = view.state().with_period(DateRange::single(day(9)));
    let redraw = view.refresh(next, Err("disk I/O error"));

    assert!(redraw.is_none());
    assert_eq!(view.last_error(), Some("disk I/O error"));
    assert_eq!(view.primary(), &before);
    assert_eq!(view.state().period, range());
    assert!(view.secondary().is_some());
  }

  #[test]
  fn unknown_thought_cannot_be_selected() {
    let mut view = loaded();
    let redraw = view.select(Some("P001-PS009".parse().unwrap()));
    assert!(redraw.is_none());
    assert_eq!(view.state().selected_thought, None);
  }

  #[test]
  fn switching_dimension_recolors_without_refetch() {
    let mut view = loaded();
    view.select(Some("P001-PS001".parse().unwrap()));

    let redraw = view.set_dimension(Dimension::Intensity);
    assert!(!redraw.refetch && redraw.primary && redraw.secondary);
    assert_eq!(view.primary().values(), [3.0, 9.0]);
    // Only the rated day of P001-PS001 is plotted.
    assert_eq!(view.secondary().unwrap().labels(), ["2024-03-01"]);
  }

  #[test]
  fn drill_state_serializes_codes_as_strings() {
    let s = state().with_selection(Some("P001-PS002".parse().unwrap()));
    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json["patient"], "P001");
    assert_eq!(json["selected_thought"], "P001-PS002");
    assert_eq!(json["period"]["start"], "2024-03-01");
  }

  #[test]
  fn selection_without_data_in_new_range_is_dropped() {
    let mut view = loaded();
    let next = view.state().with_selection(Some("P001-PS002".parse().unwrap()));
    view.refresh::<String>(next, Ok(vec![row("P001-PS001", 1, 1, None)]));
    assert_eq!(view.state().selected_thought, None);
    assert!(view.secondary().is_none());
  }
}
