//! Presentation adapter: turns aggregates into chart-ready series.
//!
//! A [`ChartSeries`] is the `(labels, values, colors)` triple a renderer
//! consumes, tagged with the kind of plot it was built for. No rendering
//! happens here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregate::{
  DailySeries, IntensityBand, ThoughtSummaries, ThoughtSummary,
  classify_intensity,
};

// ─── Dimension ───────────────────────────────────────────────────────────────

/// Which measurement a chart shows.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
  #[default]
  Occurrences,
  Duration,
  Intensity,
}

impl Dimension {
  pub fn next(self) -> Self {
    match self {
      Self::Occurrences => Self::Duration,
      Self::Duration => Self::Intensity,
      Self::Intensity => Self::Occurrences,
    }
  }

  /// Y-axis title for line charts.
  pub fn axis_title(self) -> &'static str {
    match self {
      Self::Occurrences => "Times",
      Self::Duration => "Duration (minutes)",
      Self::Intensity => "Intensity",
    }
  }

  /// The summary value charted for this dimension. Intensity without any
  /// rated record counts as zero, which keeps it off the chart.
  pub fn summary_value(self, summary: &ThoughtSummary) -> f64 {
    match self {
      Self::Occurrences => summary.total_occurrences as f64,
      Self::Duration => summary.total_duration as f64,
      Self::Intensity => summary.mean_intensity.unwrap_or(0.0),
    }
  }
}

// ─── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
  }
}

/// Cyclic palette for non-intensity charts; twelve soft, distinguishable
/// colors.
pub const PALETTE: [Rgb; 12] = [
  Rgb(0x8d, 0xd3, 0xc7),
  Rgb(0xff, 0xff, 0xb3),
  Rgb(0xbe, 0xba, 0xda),
  Rgb(0xfb, 0x80, 0x72),
  Rgb(0x80, 0xb1, 0xd3),
  Rgb(0xfd, 0xb4, 0x62),
  Rgb(0xb3, 0xde, 0x69),
  Rgb(0xfc, 0xcd, 0xe5),
  Rgb(0xd9, 0xd9, 0xd9),
  Rgb(0xbc, 0x80, 0xbd),
  Rgb(0xcc, 0xeb, 0xc5),
  Rgb(0xff, 0xed, 0x6f),
];

pub fn palette_color(position: usize) -> Rgb { PALETTE[position % PALETTE.len()] }

impl IntensityBand {
  pub fn color(self) -> Rgb {
    match self {
      Self::Low => Rgb(0x90, 0xee, 0x90),
      Self::Medium => Rgb(0xff, 0xff, 0x00),
      Self::High => Rgb(0xff, 0x00, 0x00),
    }
  }
}

// ─── ChartSeries ─────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
  Pie,
  Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
  pub label: String,
  pub value: f64,
  pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
  pub kind:      PlotKind,
  pub dimension: Dimension,
  pub points:    Vec<ChartPoint>,
}

impl ChartSeries {
  pub fn labels(&self) -> Vec<&str> {
    self.points.iter().map(|p| p.label.as_str()).collect()
  }

  pub fn values(&self) -> Vec<f64> { self.points.iter().map(|p| p.value).collect() }

  pub fn colors(&self) -> Vec<Rgb> { self.points.iter().map(|p| p.color).collect() }

  pub fn is_empty(&self) -> bool { self.points.is_empty() }

  pub fn total(&self) -> f64 { self.points.iter().map(|p| p.value).sum() }

  /// Upper bound for the value axis: the full 0–10 scale for intensity, the
  /// largest value otherwise.
  pub fn y_max(&self) -> f64 {
    match self.dimension {
      Dimension::Intensity => 10.0,
      _ => self.points.iter().map(|p| p.value).fold(0.0, f64::max),
    }
  }
}

/// Per-thought series for the primary (pie) chart. Thoughts whose value is
/// exactly zero are left out.
pub fn thought_chart(
  summaries: &ThoughtSummaries,
  dimension: Dimension,
) -> ChartSeries {
  let mut points: Vec<ChartPoint> = Vec::with_capacity(summaries.len());
  for summary in summaries {
    let value = dimension.summary_value(summary);
    if value == 0.0 {
      continue;
    }
    let color = match dimension {
      Dimension::Intensity => classify_intensity(value).color(),
      _ => palette_color(points.len()),
    };
    points.push(ChartPoint { label: summary.thought.to_string(), value, color });
  }
  ChartSeries { kind: PlotKind::Pie, dimension, points }
}

/// Per-day series for the secondary (line) chart. Intensity only plots days
/// that were actually rated; the other dimensions plot every day.
pub fn daily_chart(series: &DailySeries, dimension: Dimension) -> ChartSeries {
  let points = match dimension {
    Dimension::Intensity => series
      .intensity_only()
      .into_iter()
      .map(|p| ChartPoint {
        label: p.date.to_string(),
        value: p.intensity,
        color: classify_intensity(p.intensity).color(),
      })
      .collect(),
    Dimension::Occurrences | Dimension::Duration => series
      .points()
      .iter()
      .map(|p| ChartPoint {
        label: p.date.to_string(),
        value: if dimension == Dimension::Occurrences {
          p.occurrences as f64
        } else {
          p.duration as f64
        },
        color: palette_color(0),
      })
      .collect(),
  };
  ChartSeries { kind: PlotKind::Line, dimension, points }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::{
    aggregate::{densify_daily_series, summarize_by_thought},
    dimension::DimensionRow,
  };

  fn row(thought: &str, d: u32, occ: u32, intensity: Option<u8>) -> DimensionRow {
    DimensionRow {
      thought:      thought.parse().unwrap(),
      thought_text: String::new(),
      date:         NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
      occurrences:  occ,
      duration:     None,
      intensity,
    }
  }

  #[test]
  fn zero_valued_thoughts_are_not_charted() {
    let rows = [row("P001-PS001", 1, 0, None), row("P001-PS002", 1, 5, None)];
    let chart = thought_chart(&summarize_by_thought(&rows), Dimension::Occurrences);
    assert_eq!(chart.kind, PlotKind::Pie);
    assert_eq!(chart.labels(), ["P001-PS002"]);
    assert_eq!(chart.values(), [5.0]);
  }

  #[test]
  fn palette_follows_charted_position() {
    let rows = [
      row("P001-PS001", 1, 2, None),
      row("P001-PS002", 1, 0, None),
      row("P001-PS003", 1, 4, None),
    ];
    let chart = thought_chart(&summarize_by_thought(&rows), Dimension::Occurrences);
    assert_eq!(chart.colors(), [PALETTE[0], PALETTE[1]]);
  }

  #[test]
  fn intensity_chart_uses_bands() {
    let rows = [
      row("P001-PS001", 1, 1, Some(2)),
      row("P001-PS002", 1, 1, Some(7)),
      row("P001-PS003", 1, 1, Some(9)),
      row("P001-PS004", 1, 1, None),
    ];
    let chart = thought_chart(&summarize_by_thought(&rows), Dimension::Intensity);
    assert_eq!(chart.labels(), ["P001-PS001", "P001-PS002", "P001-PS003"]);
    assert_eq!(chart.colors(), [
      IntensityBand::Low.color(),
      IntensityBand::Medium.color(),
      IntensityBand::High.color(),
    ]);
    assert_eq!(chart.y_max(), 10.0);
  }

  #[test]
  fn daily_intensity_chart_skips_unrated_days() {
    let rows = [row("P001-PS001", 1, 1, Some(10)), row("P001-PS001", 3, 1, Some(0))];
    let series = densify_daily_series(
      &rows,
      NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
      NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
    )
    .unwrap();

    let intensity = daily_chart(&series, Dimension::Intensity);
    assert_eq!(intensity.labels(), ["2024-03-01", "2024-03-03"]);

    let occurrences = daily_chart(&series, Dimension::Occurrences);
    assert_eq!(occurrences.values(), [1.0, 0.0, 1.0]);
    assert_eq!(occurrences.y_max(), 1.0);
  }

  #[test]
  fn dimension_parses_lowercase_names() {
    assert_eq!("duration".parse::<Dimension>().unwrap(), Dimension::Duration);
    assert_eq!(Dimension::Intensity.to_string(), "intensity");
    assert_eq!(Dimension::Intensity.next(), Dimension::Occurrences);
  }

  #[test]
  fn rgb_displays_as_hex() {
    assert_eq!(IntensityBand::Low.color().to_string(), "#90ee90");
  }
}
