//! Per-thought pane: bars for the current dimension above the thought list.
//!
//! Terminals have no pie chart, so each slice becomes a horizontal bar in the
//! slice's color, labelled with its share of the total.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, ListState, Paragraph},
};
use thoughtlog_core::store::ThoughtStore;

use super::color;
use crate::app::App;

/// Bars carry integer values; scale so fractional means keep their ratio.
const BAR_SCALE: f64 = 100.0;

pub fn draw<S: ThoughtStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let parts = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
    .split(area);

  draw_bars(f, parts[0], app);
  draw_list(f, parts[1], app);
}

fn draw_bars<S: ThoughtStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let series = app.view.primary();
  let block = Block::default()
    .title(format!(" By thought: {} ", series.dimension))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if series.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("No data in this period.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let total = series.total();
  let bars: Vec<Bar> = series
    .points
    .iter()
    .map(|p| {
      let share = if total > 0.0 { p.value / total * 100.0 } else { 0.0 };
      Bar::default()
        .value((p.value * BAR_SCALE).round() as u64)
        .label(Line::from(p.label.clone()))
        .text_value(format!("{:.1} ({share:.0}%)", p.value))
        .style(Style::default().fg(color(p.color)))
        .value_style(Style::default().fg(Color::Black).bg(color(p.color)))
    })
    .collect();

  let chart = BarChart::default()
    .block(block)
    .direction(Direction::Horizontal)
    .bar_width(1)
    .bar_gap(0)
    .data(BarGroup::default().bars(&bars));
  f.render_widget(chart, area);
}

fn draw_list<S: ThoughtStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let selected = app.view.state().selected_thought.as_ref();
  let block = Block::default()
    .title(format!(" Thoughts ({}) ", app.thoughts().len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = app
    .thoughts()
    .iter()
    .map(|s| {
      let marker = if Some(&s.thought) == selected { "▶ " } else { "  " };
      ListItem::new(Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::styled(
          format!("{} ", s.thought),
          Style::default().fg(Color::Cyan),
        ),
        Span::raw(s.text.clone()),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select((!items.is_empty()).then_some(app.cursor));

  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    area,
    &mut state,
  );
}
