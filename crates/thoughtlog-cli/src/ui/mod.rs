//! TUI rendering for the statistics screen.

pub mod daily_chart;
pub mod thought_chart;

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};
use thoughtlog_core::{chart::Rgb, store::ThoughtStore};

use crate::app::App;

pub fn color(rgb: Rgb) -> Color { Color::Rgb(rgb.0, rgb.1, rgb.2) }

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<S: ThoughtStore>(f: &mut Frame, app: &App<S>) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(1), // overview
      Constraint::Min(0),    // charts
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_overview(f, rows[1], app);

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(rows[2]);
  thought_chart::draw(f, cols[0], app);
  daily_chart::draw(f, cols[1], app);

  draw_status(f, rows[3], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<S: ThoughtStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let state = app.view.state();
  let left = Span::styled(
    format!(" thoughtlog  {}", state.patient),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{} ({})  {} ", state.period, app.period, app.view.dimension()),
    Style::default().fg(Color::Gray),
  );

  let pad = area
    .width
    .saturating_sub(left.content.len() as u16)
    .saturating_sub(right.content.len() as u16);
  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

fn draw_overview<S: ThoughtStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let o = app.view.overview();
  let intensity = o
    .mean_intensity
    .map_or_else(|| "-".to_owned(), |v| format!("{v:.1}"));
  let text = format!(
    " {} thoughts  {} records  {} times  {} min  intensity {}  {} active days",
    o.thoughts, o.records, o.total_occurrences, o.total_duration, intensity, o.active_days,
  );
  f.render_widget(
    Paragraph::new(text).style(Style::default().fg(Color::Gray)),
    area,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<S: ThoughtStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let (label, label_bg, text) = match app.view.last_error() {
    Some(err) => ("ERROR", Color::Red, format!("  {err}")),
    None => (
      "STATS",
      Color::Cyan,
      "  ↑↓ move  Enter drill  Esc clear  d dimension  p period  r refresh  q quit"
        .to_owned(),
    ),
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {label} "),
      Style::default()
        .fg(Color::Black)
        .bg(label_bg)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(text, Style::default().fg(Color::DarkGray)),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
