//! Daily line chart for the drilled-into thought.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Style},
  symbols,
  widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};
use thoughtlog_core::store::ThoughtStore;

use super::color;
use crate::app::App;

pub fn draw<S: ThoughtStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let state = app.view.state();
  let title = match &state.selected_thought {
    Some(code) => format!(" {code} by day "),
    None => " By day ".to_owned(),
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let (Some(series), Some(daily)) = (app.view.secondary(), app.view.daily()) else {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("Select a thought and press Enter.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  // x is the day offset from the start of the range, so sparse intensity
  // points still land on their own day.
  let start = daily.range().start();
  let data: Vec<(f64, f64)> = series
    .points
    .iter()
    .filter_map(|p| {
      let day = p.label.parse::<chrono::NaiveDate>().ok()?;
      Some(((day - start).num_days() as f64, p.value))
    })
    .collect();

  let line_color = series
    .points
    .last()
    .map_or(Color::Cyan, |p| color(p.color));
  let dataset = Dataset::default()
    .name(series.dimension.to_string())
    .marker(symbols::Marker::Braille)
    .graph_type(GraphType::Line)
    .style(Style::default().fg(line_color))
    .data(&data);

  let x_max = daily.len().saturating_sub(1).max(1) as f64;
  let y_max = series.y_max().max(1.0);
  let range = daily.range();

  let chart = Chart::new(vec![dataset])
    .block(block)
    .x_axis(
      Axis::default()
        .title("Date")
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, x_max])
        .labels([range.start().to_string(), range.end().to_string()]),
    )
    .y_axis(
      Axis::default()
        .title(series.dimension.axis_title())
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, y_max])
        .labels(["0".to_owned(), format!("{y_max:.0}")]),
    );
  f.render_widget(chart, area);
}
