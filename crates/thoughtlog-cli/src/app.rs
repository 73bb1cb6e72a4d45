//! Statistics screen state and key dispatch.

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thoughtlog_core::{
  aggregate::ThoughtSummary,
  chart::Dimension,
  patient::PatientCode,
  period::{PeriodKind, select_period},
  store::ThoughtStore,
  thought::ThoughtCode,
  view::{DrillState, StatsView},
};
use tracing::warn;

// ─── Action ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Quit,
  Up,
  Down,
  Drill,
  Clear,
  NextDimension,
  NextPeriod,
  Refresh,
}

impl Action {
  pub fn from_key(key: KeyEvent) -> Option<Self> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Some(Self::Quit);
    }
    Some(match key.code {
      KeyCode::Char('q') => Self::Quit,
      KeyCode::Up | KeyCode::Char('k') => Self::Up,
      KeyCode::Down | KeyCode::Char('j') => Self::Down,
      KeyCode::Enter => Self::Drill,
      KeyCode::Esc => Self::Clear,
      KeyCode::Char('d') => Self::NextDimension,
      KeyCode::Char('p') => Self::NextPeriod,
      KeyCode::Char('r') => Self::Refresh,
      _ => return None,
    })
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level state of the statistics screen.
pub struct App<S> {
  pub view:   StatsView,
  /// Preset behind the current date range.
  pub period: PeriodKind,
  /// Position in the thought list.
  pub cursor: usize,
  /// Reference day the period presets are resolved against.
  pub today:  NaiveDate,
  store:      S,
}

impl<S: ThoughtStore> App<S> {
  pub fn new(
    store: S,
    patient: PatientCode,
    period: PeriodKind,
    dimension: Dimension,
    today: NaiveDate,
  ) -> anyhow::Result<Self> {
    let range = select_period(period.into(), today)?;
    Ok(Self {
      view: StatsView::new(DrillState::new(patient, range), dimension),
      period,
      cursor: 0,
      today,
      store,
    })
  }

  /// Fetch rows for the current state, replacing what is on screen.
  pub async fn load(&mut self) {
    let state = self.view.state().clone();
    self.fetch_into(state).await;
  }

  async fn fetch_into(&mut self, next: DrillState) {
    let fetched = self.store.patient_rows(&next.patient, next.period).await;
    if let Err(e) = &fetched {
      warn!(patient = %next.patient, period = %next.period, "refresh failed: {e}");
    }
    let redraw = self.view.refresh(next, fetched);
    if redraw.refetch {
      self.clamp_cursor();
    }
  }

  /// Move to `next`, fetching only if the transition needs it.
  pub async fn apply(&mut self, next: DrillState) {
    let redraw = self.view.plan(&next);
    if redraw.refetch {
      self.fetch_into(next).await;
    } else if redraw.secondary {
      self.view.select(next.selected_thought);
    }
  }

  pub fn thoughts(&self) -> &[ThoughtSummary] { self.view.summaries().as_slice() }

  pub fn cursor_thought(&self) -> Option<&ThoughtCode> {
    self.thoughts().get(self.cursor).map(|s| &s.thought)
  }

  fn clamp_cursor(&mut self) {
    self.cursor = self.cursor.min(self.thoughts().len().saturating_sub(1));
  }

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    let Some(action) = Action::from_key(key) else {
      return Ok(true);
    };
    self.dispatch(action).await
  }

  pub async fn dispatch(&mut self, action: Action) -> anyhow::Result<bool> {
    match action {
      Action::Quit => return Ok(false),
      Action::Up => self.cursor = self.cursor.saturating_sub(1),
      Action::Down => {
        if self.cursor + 1 < self.thoughts().len() {
          self.cursor += 1;
        }
      }
      Action::Drill => {
        if let Some(code) = self.cursor_thought().cloned() {
          let next = self.view.state().with_selection(Some(code));
          self.apply(next).await;
        }
      }
      Action::Clear => {
        let next = self.view.state().with_selection(None);
        self.apply(next).await;
      }
      Action::NextDimension => {
        self.view.set_dimension(self.view.dimension().next());
      }
      Action::NextPeriod => {
        let kind = self.period.next();
        let range = select_period(kind.into(), self.today)?;
        let next = self.view.state().with_period(range);
        self.apply(next).await;
        // A failed fetch keeps the old range, and the preset must follow it.
        if self.view.state().period == range {
          self.period = kind;
        }
      }
      Action::Refresh => {
        self.store.discard_cached(&self.view.state().patient);
        self.load().await;
      }
    }
    Ok(true)
  }
}
