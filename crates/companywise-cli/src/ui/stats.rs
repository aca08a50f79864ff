//! Stats screen — solved totals across every employer.

use companywise_core::question::Difficulty;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

const TOP_EMPLOYERS: usize = 10;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let stats = app.tracker.stats();

  let block = Block::default()
    .title(" Progress ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let heading = Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);

  let mut lines = vec![
    Line::from(vec![
      Span::styled(format!("{:<14}", "Solved"), heading),
      Span::raw(stats.total_solved.to_string()),
    ]),
    Line::from(vec![
      Span::styled(format!("{:<14}", "Employers"), heading),
      Span::raw(stats.employers_practiced().to_string()),
    ]),
    Line::from(vec![
      Span::styled(format!("{:<14}", "Most solved"), heading),
      Span::raw(stats.most_solved_employer().unwrap_or("–").to_string()),
    ]),
    Line::from(""),
    Line::from(Span::styled("By difficulty", heading)),
  ];

  for d in Difficulty::ALL {
    let color = match d {
      Difficulty::Easy => Color::Green,
      Difficulty::Medium => Color::Yellow,
      Difficulty::Hard => Color::Red,
    };
    lines.push(Line::from(vec![
      Span::styled(format!("  {:<12}", d.as_str()), Style::default().fg(color)),
      Span::raw(stats.difficulty_count(d).to_string()),
    ]));
  }

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled("Top employers", heading)));
  let top = stats.top_employers(TOP_EMPLOYERS);
  if top.is_empty() {
    lines.push(Line::from(Span::styled(
      "  Nothing solved yet.",
      Style::default().fg(Color::DarkGray),
    )));
  }
  for (rank, (employer, count)) in top.into_iter().enumerate() {
    lines.push(Line::from(vec![
      Span::styled(format!("  {:>2}. ", rank + 1), Style::default().fg(Color::DarkGray)),
      Span::raw(format!("{employer:<24}")),
      Span::raw(count.to_string()),
    ]));
  }

  f.render_widget(Paragraph::new(lines), inner);
}
