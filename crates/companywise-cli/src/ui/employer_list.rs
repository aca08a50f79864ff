//! Employer list pane — left panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, InputMode, Screen};

/// Render the employer list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let visible = app.visible_employers();
  let total = app.manifest.employers.len();
  let filtering =
    app.mode == InputMode::EmployerFilter || !app.employer_filter.is_empty();

  let title = if filtering {
    format!(" Employers ({}/{}) ", visible.len(), total)
  } else {
    format!(" Employers ({total}) ")
  };

  // Dimmed while another pane has focus.
  let border = if app.screen == Screen::Employers {
    Color::Cyan
  } else {
    Color::DarkGray
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let items: Vec<ListItem> = visible
    .iter()
    .map(|employer| {
      let selected =
        app.selected_employer.as_deref() == Some(employer.name.as_str());
      let marker = if selected { "▸ " } else { "  " };
      let solved = app
        .tracker
        .ledger()
        .solved()
        .filter(|(e, _)| *e == employer.name)
        .count();

      let mut spans = vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::raw(employer.name.clone()),
      ];
      if solved > 0 {
        spans.push(Span::styled(
          format!("  ✓{solved}"),
          Style::default().fg(Color::Green),
        ));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Filter bar at the bottom of the pane.
  if filtering && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.mode == InputMode::EmployerFilter {
      format!("/{}_", app.employer_filter)
    } else {
      format!("/{}", app.employer_filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  let mut state = ListState::default();
  state.select(if visible.is_empty() {
    None
  } else {
    Some(app.employer_cursor)
  });

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
