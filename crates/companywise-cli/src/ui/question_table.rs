//! Question pane — right panel: progress, period tabs, controls and the
//! derived question table.

use companywise_core::question::Difficulty;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, TableState},
};

use crate::app::{App, InputMode, Screen};

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the question pane into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let employer = app.selected_employer.as_deref().unwrap_or("(none)");
  let border = if app.screen == Screen::Questions {
    Color::Cyan
  } else {
    Color::DarkGray
  };

  let block = Block::default()
    .title(format!(" {employer} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // progress
      Constraint::Length(1), // periods
      Constraint::Length(1), // controls
      Constraint::Min(0),    // table
      Constraint::Length(1), // link
    ])
    .split(inner);

  draw_progress(f, rows[0], app);
  draw_periods(f, rows[1], app);
  draw_controls(f, rows[2], app);
  draw_table(f, rows[3], app);
  draw_link(f, rows[4], app);
}

// ─── Header rows ──────────────────────────────────────────────────────────────

fn draw_progress(f: &mut Frame, area: Rect, app: &App) {
  let Some(progress) = app.progress() else { return };
  let gauge = Gauge::default()
    .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
    .percent(u16::from(progress.percent))
    .label(format!(
      "{}/{} solved ({}%)",
      progress.solved, progress.total, progress.percent
    ));
  f.render_widget(gauge, area);
}

fn draw_periods(f: &mut Frame, area: Rect, app: &App) {
  let mut spans = vec![Span::styled(
    "Period ",
    Style::default().fg(Color::DarkGray),
  )];
  for period in app.selectable_periods() {
    let style = if period == app.period {
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::styled(format!(" {} ", period.label()), style));
    spans.push(Span::raw(" "));
  }
  f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_controls(f: &mut Frame, area: Rect, app: &App) {
  let label = Style::default().fg(Color::DarkGray);
  let value = Style::default().fg(Color::Yellow);

  let search = if app.mode == InputMode::Search {
    format!("{}_", app.controls.search_term)
  } else if app.controls.search_term.is_empty() {
    "–".to_string()
  } else {
    app.controls.search_term.clone()
  };

  let line = Line::from(vec![
    Span::styled("Search ", label),
    Span::styled(search, value),
    Span::styled("  Difficulty ", label),
    Span::styled(app.controls.difficulty.label(), value),
    Span::styled("  Sort ", label),
    Span::styled(app.controls.sort.label(), value),
  ]);
  f.render_widget(Paragraph::new(line), area);
}

// ─── Table ────────────────────────────────────────────────────────────────────

fn draw_table(f: &mut Frame, area: Rect, app: &App) {
  if app.view.is_empty() {
    let msg = if app.is_loading() {
      "Loading…"
    } else {
      "No questions found."
    };
    f.render_widget(
      Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
      area,
    );
    return;
  }

  let header = Row::new(["", "ID", "Title", "Difficulty", "Accept", "Freq"])
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let rows = app.visible_questions().map(|q| {
    let solved = app.is_solved(&q.id);
    let marker = if solved {
      Cell::from("✓").style(Style::default().fg(Color::Green))
    } else {
      Cell::from(" ")
    };
    let title_style = if solved {
      Style::default().fg(Color::DarkGray)
    } else {
      Style::default()
    };

    Row::new(vec![
      marker,
      Cell::from(q.id.clone()),
      Cell::from(q.title.clone()).style(title_style),
      difficulty_cell(q.difficulty),
      Cell::from(format!("{:.1}%", q.acceptance_percent)),
      Cell::from(format!("{:.1}%", q.frequency_percent)),
    ])
  });

  let widths = [
    Constraint::Length(1),
    Constraint::Length(6),
    Constraint::Min(20),
    Constraint::Length(10),
    Constraint::Length(7),
    Constraint::Length(7),
  ];

  let mut state = TableState::default();
  state.select(Some(app.question_cursor));

  f.render_stateful_widget(
    Table::new(rows, widths)
      .header(header)
      .column_spacing(1)
      .row_highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    area,
    &mut state,
  );
}

/// Problem link of the question under the cursor.
fn draw_link(f: &mut Frame, area: Rect, app: &App) {
  let Some(question) = app.cursor_question() else { return };
  let url = if question.url.is_empty() {
    Span::styled("no link", Style::default().fg(Color::DarkGray))
  } else {
    Span::styled(question.url.clone(), Style::default().fg(Color::Blue))
  };
  let line = Line::from(vec![
    Span::styled("Link ", Style::default().fg(Color::DarkGray)),
    url,
  ]);
  f.render_widget(Paragraph::new(line), area);
}

fn difficulty_cell(difficulty: Option<Difficulty>) -> Cell<'static> {
  match difficulty {
    Some(d) => {
      let color = match d {
        Difficulty::Easy => Color::Green,
        Difficulty::Medium => Color::Yellow,
        Difficulty::Hard => Color::Red,
      };
      Cell::from(d.as_str()).style(Style::default().fg(color))
    }
    None => Cell::from("?").style(Style::default().fg(Color::DarkGray)),
  }
}
