//! Handlers for the one-shot subcommands. Each prints a plain table, or JSON
//! with `--json`, to stdout.

use anyhow::{Context as _, Result, bail};
use chrono::NaiveDate;
use serde::Serialize;
use thoughtlog_core::{
  aggregate::{
    DailySeries, PatientOverview, ThoughtSummary, densify_range, patient_overview,
    summarize_by_thought,
  },
  chart::{ChartSeries, Dimension, daily_chart, thought_chart},
  dimension::NewDimension,
  patient::{NewPatient, Patient, PatientCode},
  period::{DateRange, Period, select_period},
  store::ThoughtStore,
  thought::{Thought, ThoughtCode},
};

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
  let text = serde_json::to_string_pretty(value).context("serialising output")?;
  println!("{text}");
  Ok(())
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
  value.map_or_else(|| "-".to_owned(), |v| v.to_string())
}

// ─── Patients ─────────────────────────────────────────────────────────────────

fn print_patient(p: &Patient) {
  println!("{}  {}", p.code, p.name);
  println!("  birth date:  {}", or_dash(p.birth_date));
  println!("  sex:         {}", or_dash(p.sex));
  println!("  condition:   {}", p.condition.as_deref().unwrap_or("-"));
  println!("  notes:       {}", p.notes.as_deref().unwrap_or("-"));
  println!("  registered:  {}", p.registered_on);
}

pub async fn add_patient<S: ThoughtStore>(store: &S, input: NewPatient, json: bool) -> Result<()> {
  let patient = store.add_patient(input).await.context("registering patient")?;
  if json {
    return print_json(&patient);
  }
  print_patient(&patient);
  Ok(())
}

pub async fn list_patients<S: ThoughtStore>(store: &S, json: bool) -> Result<()> {
  let patients = store.list_patients().await.context("listing patients")?;
  if json {
    return print_json(&patients);
  }
  for p in &patients {
    println!(
      "{}  {:<24}  {}",
      p.code,
      p.name,
      p.condition.as_deref().unwrap_or("")
    );
  }
  Ok(())
}

pub async fn show_patient<S: ThoughtStore>(
  store: &S,
  code: &PatientCode,
  json: bool,
) -> Result<()> {
  let Some(patient) = store.get_patient(code).await.context("loading patient")? else {
    bail!("patient not found: {code}");
  };
  if json {
    return print_json(&patient);
  }
  print_patient(&patient);
  Ok(())
}

pub async fn delete_patient<S: ThoughtStore>(store: &S, code: &PatientCode) -> Result<()> {
  if !store.delete_patient(code).await.context("deleting patient")? {
    bail!("patient not found: {code}");
  }
  println!("deleted {code}");
  Ok(())
}

// ─── Thoughts ─────────────────────────────────────────────────────────────────

fn print_thought(t: &Thought) {
  println!("{}  {}", t.code, t.text);
}

pub async fn add_thought<S: ThoughtStore>(
  store: &S,
  patient: &PatientCode,
  text: String,
) -> Result<()> {
  let thought = store.add_thought(patient, text).await.context("logging thought")?;
  print_thought(&thought);
  Ok(())
}

pub async fn edit_thought<S: ThoughtStore>(
  store: &S,
  code: &ThoughtCode,
  text: String,
) -> Result<()> {
  let thought = store.edit_thought(code, text).await.context("editing thought")?;
  print_thought(&thought);
  Ok(())
}

pub async fn delete_thought<S: ThoughtStore>(store: &S, code: &ThoughtCode) -> Result<()> {
  if !store.delete_thought(code).await.context("deleting thought")? {
    bail!("thought not found: {code}");
  }
  println!("deleted {code}");
  Ok(())
}

pub async fn list_thoughts<S: ThoughtStore>(
  store: &S,
  patient: &PatientCode,
  json: bool,
) -> Result<()> {
  let thoughts = store.list_thoughts(patient).await.context("listing thoughts")?;
  if json {
    return print_json(&thoughts);
  }
  thoughts.iter().for_each(print_thought);
  Ok(())
}

// ─── Measurements ─────────────────────────────────────────────────────────────

pub async fn record<S: ThoughtStore>(store: &S, input: NewDimension) -> Result<()> {
  let rec = store.record_dimension(input).await.context("recording measurement")?;
  println!(
    "#{}  {}  {}  times {}  duration {}  intensity {}",
    rec.id,
    rec.thought,
    rec.date,
    rec.occurrences,
    or_dash(rec.duration),
    or_dash(rec.intensity),
  );
  Ok(())
}

pub async fn day<S: ThoughtStore>(store: &S, thought: &ThoughtCode, date: NaiveDate) -> Result<()> {
  let records = store.records_on(thought, date).await.context("loading records")?;
  if records.is_empty() {
    println!("no records for {thought} on {date}");
  }
  for rec in &records {
    println!(
      "#{:<6} times {:>2}  duration {:>3}  intensity {:>2}",
      rec.id,
      rec.occurrences,
      or_dash(rec.duration),
      or_dash(rec.intensity),
    );
  }
  Ok(())
}

// ─── Statistics ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SummaryReport<'a> {
  patient:   &'a PatientCode,
  range:     DateRange,
  dimension: Dimension,
  overview:  PatientOverview,
  thoughts:  &'a [ThoughtSummary],
  chart:     ChartSeries,
}

pub async fn summary<S: ThoughtStore>(
  store: &S,
  patient: &PatientCode,
  period: Period,
  today: NaiveDate,
  dimension: Dimension,
  json: bool,
) -> Result<()> {
  let range = select_period(period, today)?;
  let rows = store
    .patient_rows(patient, range)
    .await
    .context("loading measurements")?;
  let summaries = summarize_by_thought(&rows);
  let report = SummaryReport {
    patient,
    range,
    dimension,
    overview: patient_overview(&rows),
    thoughts: summaries.as_slice(),
    chart: thought_chart(&summaries, dimension),
  };
  if json {
    return print_json(&report);
  }

  let o = &report.overview;
  println!("{patient}  {range}");
  println!(
    "{} thoughts, {} records, {} times, {} min, mean intensity {}, {} active days",
    o.thoughts,
    o.records,
    o.total_occurrences,
    o.total_duration,
    or_dash(o.mean_intensity.map(|v| format!("{v:.1}"))),
    o.active_days,
  );
  println!();
  println!(
    "{:<11} {:>6} {:>7} {:>9} {:>5}  {}",
    "thought", "times", "minutes", "intensity", "days", "text"
  );
  for s in report.thoughts {
    println!(
      "{:<11} {:>6} {:>7} {:>9} {:>5}  {}",
      s.thought,
      s.total_occurrences,
      s.total_duration,
      or_dash(s.mean_intensity.map(|v| format!("{v:.1}"))),
      s.active_days,
      s.text,
    );
  }

  let total = report.chart.total();
  if total > 0.0 {
    println!();
    println!("share of {dimension}:");
    for p in &report.chart.points {
      println!(
        "  {:<11} {:>6.1}  {:>3.0}%  {}",
        p.label,
        p.value,
        p.value / total * 100.0,
        p.color
      );
    }
  }
  Ok(())
}

#[derive(Serialize)]
struct SeriesReport<'a> {
  thought:   &'a ThoughtCode,
  dimension: Dimension,
  series:    DailySeries,
  chart:     ChartSeries,
}

pub async fn series<S: ThoughtStore>(
  store: &S,
  thought: &ThoughtCode,
  period: Period,
  today: NaiveDate,
  dimension: Dimension,
  json: bool,
) -> Result<()> {
  let range = select_period(period, today)?;
  let rows = store
    .thought_rows(thought, range)
    .await
    .context("loading measurements")?;
  let series = densify_range(&rows, range);
  let chart = daily_chart(&series, dimension);
  if json {
    return print_json(&SeriesReport { thought, dimension, series, chart });
  }

  println!("{thought}  {range}  {dimension}");
  for p in &chart.points {
    println!("  {}  {:>6.1}", p.label, p.value);
  }
  println!(
    "total times {}, total minutes {}, mean intensity {}",
    series.total_occurrences(),
    series.total_duration(),
    or_dash(series.mean_intensity().map(|v| format!("{v:.1}"))),
  );
  Ok(())
}
