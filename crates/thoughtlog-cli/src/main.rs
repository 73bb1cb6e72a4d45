//! `thoughtlog`: record automatic thoughts and review their statistics.
//!
//! # Usage
//!
//! ```
//! thoughtlog patient add --name "Ana"
//! thoughtlog thought add --patient P001 "they will laugh at me"
//! thoughtlog record P001-PS001 --occurrences 3 --intensity 6
//! thoughtlog summary --patient P001 --period week
//! thoughtlog stats --patient P001
//! ```

mod app;
mod commands;
mod settings;
mod ui;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use thoughtlog_core::{
  chart::Dimension,
  patient::{PatientCode, Sex},
  period::{Period, PeriodKind},
  thought::ThoughtCode,
};
use thoughtlog_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{app::App, settings::Settings};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "thoughtlog", version, about = "Automatic-thought log for clinicians")]
struct Cli {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "thoughtlog.toml")]
  config: PathBuf,

  /// SQLite database file; overrides `database_path` from the config.
  #[arg(long, value_name = "FILE")]
  database: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create the database file and schema.
  Init,
  /// Manage patients.
  #[command(subcommand)]
  Patient(PatientCommand),
  /// Manage a patient's thoughts.
  #[command(subcommand)]
  Thought(ThoughtCommand),
  /// Record a measurement against a thought.
  Record {
    thought: ThoughtCode,
    #[arg(long)]
    occurrences: u32,
    /// Minutes.
    #[arg(long)]
    duration: Option<u32>,
    #[arg(long)]
    intensity: Option<u8>,
    /// Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
  },
  /// List a thought's records for one day, newest first.
  Day {
    thought: ThoughtCode,
    #[arg(long)]
    date: Option<NaiveDate>,
  },
  /// Per-thought totals for a patient.
  Summary {
    #[arg(long)]
    patient: PatientCode,
    #[command(flatten)]
    window: Window,
  },
  /// Dense per-day series for one thought.
  Series {
    thought: ThoughtCode,
    #[command(flatten)]
    window: Window,
  },
  /// Interactive drill-down statistics screen.
  Stats {
    #[arg(long)]
    patient: PatientCode,
    #[arg(long)]
    period: Option<PeriodKind>,
    #[arg(long)]
    dimension: Option<Dimension>,
  },
}

#[derive(Subcommand, Debug)]
enum PatientCommand {
  Add {
    #[arg(long)]
    name: String,
    #[arg(long)]
    birth_date: Option<NaiveDate>,
    #[arg(long)]
    sex: Option<Sex>,
    #[arg(long)]
    condition: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    json: bool,
  },
  List {
    #[arg(long)]
    json: bool,
  },
  Show {
    code: PatientCode,
    #[arg(long)]
    json: bool,
  },
  Delete { code: PatientCode },
}

#[derive(Subcommand, Debug)]
enum ThoughtCommand {
  Add {
    #[arg(long)]
    patient: PatientCode,
    text: String,
  },
  Edit { code: ThoughtCode, text: String },
  Delete { code: ThoughtCode },
  List {
    #[arg(long)]
    patient: PatientCode,
    #[arg(long)]
    json: bool,
  },
}

/// Date window and output options shared by `summary` and `series`.
#[derive(Args, Debug)]
struct Window {
  /// Preset relative to today; ignored when --from/--to are given.
  #[arg(long)]
  period: Option<PeriodKind>,
  #[arg(long, requires = "to")]
  from: Option<NaiveDate>,
  #[arg(long, requires = "from")]
  to: Option<NaiveDate>,
  #[arg(long)]
  dimension: Option<Dimension>,
  #[arg(long)]
  json: bool,
}

impl Window {
  fn period(&self, settings: &Settings) -> Period {
    match (self.from, self.to) {
      (Some(start), Some(end)) => Period::Custom { start, end },
      _ => self.period.unwrap_or(settings.default_period).into(),
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  // Logs go to stderr so stdout stays clean for tables and JSON.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();
  let mut settings = Settings::load(&cli.config)?;
  if let Some(path) = cli.database {
    settings.database_path = settings::expand_tilde(&path);
  }

  let store = SqliteStore::open(&settings.database_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.database_path))?
    .with_cache_ttl(Duration::from_secs(settings.cache_ttl_secs));
  tracing::debug!(path = ?settings.database_path, "store opened");

  let today = Local::now().date_naive();

  match cli.command {
    Command::Init => {
      tracing::info!("database ready at {}", settings.database_path.display());
      Ok(())
    }
    Command::Patient(cmd) => match cmd {
      PatientCommand::Add { name, birth_date, sex, condition, notes, json } => {
        let input = thoughtlog_core::patient::NewPatient {
          name,
          birth_date,
          sex,
          condition,
          notes,
        };
        commands::add_patient(&store, input, json).await
      }
      PatientCommand::List { json } => commands::list_patients(&store, json).await,
      PatientCommand::Show { code, json } => {
        commands::show_patient(&store, &code, json).await
      }
      PatientCommand::Delete { code } => commands::delete_patient(&store, &code).await,
    },
    Command::Thought(cmd) => match cmd {
      ThoughtCommand::Add { patient, text } => {
        commands::add_thought(&store, &patient, text).await
      }
      ThoughtCommand::Edit { code, text } => {
        commands::edit_thought(&store, &code, text).await
      }
      ThoughtCommand::Delete { code } => commands::delete_thought(&store, &code).await,
      ThoughtCommand::List { patient, json } => {
        commands::list_thoughts(&store, &patient, json).await
      }
    },
    Command::Record { thought, occurrences, duration, intensity, date } => {
      let input = thoughtlog_core::dimension::NewDimension {
        thought,
        date: date.unwrap_or(today),
        occurrences,
        duration,
        intensity,
      };
      commands::record(&store, input).await
    }
    Command::Day { thought, date } => {
      commands::day(&store, &thought, date.unwrap_or(today)).await
    }
    Command::Summary { patient, window } => {
      let period = window.period(&settings);
      let dimension = window.dimension.unwrap_or(settings.default_dimension);
      commands::summary(&store, &patient, period, today, dimension, window.json).await
    }
    Command::Series { thought, window } => {
      let period = window.period(&settings);
      let dimension = window.dimension.unwrap_or(settings.default_dimension);
      commands::series(&store, &thought, period, today, dimension, window.json).await
    }
    Command::Stats { patient, period, dimension } => {
      let app = App::new(
        store,
        patient,
        period.unwrap_or(settings.default_period),
        dimension.unwrap_or(settings.default_dimension),
        today,
      )?;
      run_stats(app).await
    }
  }
}

// ─── Stats screen ─────────────────────────────────────────────────────────────

async fn run_stats(mut app: App<SqliteStore>) -> Result<()> {
  app.load().await;

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<SqliteStore>,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
