//! Date ranges and the period presets offered by the statistics screens.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── DateRange ───────────────────────────────────────────────────────────────

/// An inclusive `[start, end]` range of calendar days. `start <= end` always
/// holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RangeBounds")]
pub struct DateRange {
  start: NaiveDate,
  end:   NaiveDate,
}

/// Unchecked wire form of [`DateRange`].
#[derive(Deserialize)]
struct RangeBounds {
  start: NaiveDate,
  end:   NaiveDate,
}

impl TryFrom<RangeBounds> for DateRange {
  type Error = Error;

  fn try_from(b: RangeBounds) -> Result<Self> { Self::new(b.start, b.end) }
}

impl DateRange {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
    if start > end {
      return Err(Error::InvalidRange { start, end });
    }
    Ok(Self { start, end })
  }

  pub fn single(day: NaiveDate) -> Self { Self { start: day, end: day } }

  pub fn start(&self) -> NaiveDate { self.start }

  pub fn end(&self) -> NaiveDate { self.end }

  pub fn contains(&self, day: NaiveDate) -> bool {
    self.start <= day && day <= self.end
  }

  /// Number of calendar days covered, counting both ends.
  pub fn num_days(&self) -> usize {
    (self.end - self.start).num_days() as usize + 1
  }

  /// Every day in the range, ascending.
  pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
    let end = self.end;
    self.start.iter_days().take_while(move |d| *d <= end)
  }
}

impl fmt::Display for DateRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} .. {}", self.start, self.end)
  }
}

// ─── Period ──────────────────────────────────────────────────────────────────

/// The named period presets, without custom bounds. Used for CLI/config
/// parsing and for cycling through presets in the stats screen.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::VariantArray,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PeriodKind {
  Today,
  Week,
  CalendarWeek,
  #[default]
  Month,
}

impl PeriodKind {
  /// The preset after this one, wrapping around.
  pub fn next(self) -> Self {
    use strum::VariantArray as _;
    let all = Self::VARIANTS;
    let at = all.iter().position(|k| *k == self).unwrap_or_default();
    all[(at + 1) % all.len()]
  }
}

/// A period selection, resolved to concrete bounds by [`select_period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
  /// The reference day only.
  Today,
  /// The reference day and the seven days before it.
  Week,
  /// Monday of the reference day's week through the reference day.
  CalendarWeek,
  /// The reference day and the thirty days before it; not a calendar month.
  Month,
  /// Explicit caller-supplied bounds.
  Custom { start: NaiveDate, end: NaiveDate },
}

impl From<PeriodKind> for Period {
  fn from(kind: PeriodKind) -> Self {
    match kind {
      PeriodKind::Today => Self::Today,
      PeriodKind::Week => Self::Week,
      PeriodKind::CalendarWeek => Self::CalendarWeek,
      PeriodKind::Month => Self::Month,
    }
  }
}

/// Resolve `period` against `reference` into an inclusive range.
pub fn select_period(period: Period, reference: NaiveDate) -> Result<DateRange> {
  let back = |days: u64| {
    reference
      .checked_sub_days(Days::new(days))
      .unwrap_or(NaiveDate::MIN)
  };

  match period {
    Period::Today => Ok(DateRange::single(reference)),
    Period::Week => DateRange::new(back(7), reference),
    Period::CalendarWeek => {
      let since_monday = reference.weekday().num_days_from_monday();
      DateRange::new(back(u64::from(since_monday)), reference)
    }
    Period::Month => DateRange::new(back(30), reference),
    Period::Custom { start, end } => DateRange::new(start, end),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn today_is_a_single_day() {
    let r = select_period(Period::Today, day(2024, 3, 10)).unwrap();
    assert_eq!((r.start(), r.end()), (day(2024, 3, 10), day(2024, 3, 10)));
    assert_eq!(r.num_days(), 1);
  }

  #[test]
  fn week_reaches_seven_days_back() {
    let r = select_period(Period::Week, day(2024, 3, 10)).unwrap();
    assert_eq!((r.start(), r.end()), (day(2024, 3, 3), day(2024, 3, 10)));
  }

  #[test]
  fn month_is_thirty_days_not_a_calendar_month() {
    let r = select_period(Period::Month, day(2024, 3, 10)).unwrap();
    assert_eq!(r.start(), day(2024, 2, 9));
    assert_eq!(r.end(), day(2024, 3, 10));
  }

  #[test]
  fn calendar_week_starts_on_monday() {
    // 2024-03-10 is a Sunday.
    let r = select_period(Period::CalendarWeek, day(2024, 3, 10)).unwrap();
    assert_eq!(r.start(), day(2024, 3, 4));

    // On a Monday the range is that day alone.
    let r = select_period(Period::CalendarWeek, day(2024, 3, 4)).unwrap();
    assert_eq!(r.num_days(), 1);
  }

  #[test]
  fn custom_bounds_are_validated() {
    let ok = select_period(
      Period::Custom { start: day(2024, 1, 1), end: day(2024, 1, 31) },
      day(2024, 6, 1),
    )
    .unwrap();
    assert_eq!(ok.num_days(), 31);

    let err = select_period(
      Period::Custom { start: day(2024, 2, 1), end: day(2024, 1, 31) },
      day(2024, 6, 1),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidRange { .. }));
  }

  #[test]
  fn days_iterates_inclusively() {
    let r = DateRange::new(day(2024, 2, 27), day(2024, 3, 2)).unwrap();
    let days: Vec<_> = r.days().collect();
    assert_eq!(days.len(), r.num_days());
    assert_eq!(days.first(), Some(&day(2024, 2, 27)));
    assert_eq!(days.last(), Some(&day(2024, 3, 2)));
  }

  #[test]
  fn deserializing_a_reversed_range_fails() {
    let ok: DateRange =
      serde_json::from_str(r#"{"start":"2024-03-01","end":"2024-03-07"}"#).unwrap();
    assert_eq!(ok, DateRange::new(day(2024, 3, 1), day(2024, 3, 7)).unwrap());

    let reversed =
      serde_json::from_str::<DateRange>(r#"{"start":"2024-03-07","end":"2024-03-01"}"#);
    assert!(reversed.is_err());
  }

  #[test]
  fn period_kinds_parse_and_cycle() {
    assert_eq!(
      "calendar-week".parse::<PeriodKind>().unwrap(),
      PeriodKind::CalendarWeek
    );
    assert_eq!(PeriodKind::Month.next(), PeriodKind::Today);
    assert_eq!(PeriodKind::Today.next(), PeriodKind::Week);
  }
}
