//! Beneficiary list screen: filter bar, table, pager and history pane.

use benef_core::{api::FilterKey, beneficiary::Beneficiary, choice::Status, list::HistoryView};
use ratatui::{
  Frame,
  layout::{Constraint, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

use crate::app::{App, filter_choices};

/// Render the list screen into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let state = app.list.state();

  let (main, side) = if state.history.is_some() {
    let [main, side] =
      Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)]).areas(area);
    (main, Some(side))
  } else {
    (area, None)
  };

  let [filters, table, pager] = Layout::vertical([
    Constraint::Length(4),
    Constraint::Min(0),
    Constraint::Length(1),
  ])
  .areas(main);

  draw_filters(f, filters, app);
  draw_table(f, table, app);
  draw_pager(f, pager, app);

  if let (Some(side), Some(history)) = (side, &state.history) {
    draw_history(f, side, history);
  }
}

// ─── Filters ──────────────────────────────────────────────────────────────────

fn draw_filters(f: &mut Frame, area: Rect, app: &App) {
  let filters = &app.list.state().filters;

  let spans_for = |idx: usize, key: FilterKey| {
    let focused = app.filter_focus == Some(idx);
    let value = filters.get(key);
    let shown = match (focused, filter_choices(key).is_some()) {
      (true, true) => format!("‹{value}›"),
      (true, false) => format!("{value}_"),
      (false, _) if value.is_empty() => "·".to_owned(),
      (false, _) => value.to_owned(),
    };
    let label_style = if focused {
      Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    let value_style = if focused {
      Style::default().fg(Color::Yellow)
    } else {
      Style::default()
    };
    vec![
      Span::styled(format!("{}: ", key.label()), label_style),
      Span::styled(format!("{shown:<16}"), value_style),
    ]
  };

  // Two rows of three filters.
  let lines: Vec<Line> = FilterKey::ALL
    .chunks(3)
    .enumerate()
    .map(|(row, keys)| {
      Line::from(
        keys
          .iter()
          .enumerate()
          .flat_map(|(col, key)| spans_for(row * 3 + col, *key))
          .collect::<Vec<_>>(),
      )
    })
    .collect();

  let border = if app.filter_focus.is_some() {
    Color::Yellow
  } else {
    Color::DarkGray
  };
  let block = Block::default()
    .title(" Filters ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));
  f.render_widget(Paragraph::new(lines).block(block), area);
}

// ─── Table ────────────────────────────────────────────────────────────────────

fn status_color(record: &Beneficiary) -> Color {
  match record.status() {
    Some(Status::Active) => Color::Green,
    Some(Status::Suspended) => Color::Yellow,
    Some(Status::Canceled | Status::Inactive) => Color::Red,
    None => Color::Gray,
  }
}

fn draw_table(f: &mut Frame, area: Rect, app: &App) {
  let state = app.list.state();

  let block = Block::default()
    .title(format!(" Beneficiaries ({}) ", state.pagination.total))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if let Some(error) = &state.error {
    f.render_widget(
      Paragraph::new(error.as_str())
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(block),
      area,
    );
    return;
  }
  if state.loading {
    f.render_widget(
      Paragraph::new("Loading…")
        .style(Style::default().fg(Color::DarkGray))
        .block(block),
      area,
    );
    return;
  }
  if state.items.is_empty() {
    f.render_widget(
      Paragraph::new("No beneficiaries found.")
        .style(Style::default().fg(Color::DarkGray))
        .block(block),
      area,
    );
    return;
  }

  let header = Row::new(["Registration", "Name", "CPF", "Plan", "Status", "Type", "Created"])
    .style(
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    );

  let rows = state.items.iter().map(|b| {
    Row::new(vec![
      Cell::from(b.registration.clone().unwrap_or_else(|| "-".into())),
      Cell::from(b.full_name.clone()),
      Cell::from(b.cpf.clone()),
      Cell::from(b.plan.clone()),
      Cell::from(b.status.clone()).style(Style::default().fg(status_color(b))),
      Cell::from(b.kind.clone()),
      Cell::from(b.created_display()),
    ])
  });

  let widths = [
    Constraint::Length(12),
    Constraint::Min(20),
    Constraint::Length(14),
    Constraint::Length(16),
    Constraint::Length(10),
    Constraint::Length(10),
    Constraint::Length(16),
  ];

  let mut table_state = TableState::default();
  table_state.select(Some(app.list_cursor));

  f.render_stateful_widget(
    Table::new(rows, widths)
      .header(header)
      .block(block)
      .row_highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    area,
    &mut table_state,
  );
}

fn draw_pager(f: &mut Frame, area: Rect, app: &App) {
  let p = app.list.state().pagination;
  let dim = Style::default().fg(Color::DarkGray);
  let arrow = |enabled: bool, text: &'static str| {
    Span::styled(
      text,
      if enabled {
        Style::default().fg(Color::White)
      } else {
        dim
      },
    )
  };

  let line = Line::from(vec![
    arrow(p.has_previous(), " ← previous "),
    Span::raw(format!(
      " Page {} of {}  ·  {} record(s)  ·  {} per page ",
      p.page,
      p.pages.max(1),
      p.total,
      p.per_page
    )),
    arrow(p.has_next(), " next → "),
  ]);
  f.render_widget(Paragraph::new(line), area);
}

// ─── History pane ─────────────────────────────────────────────────────────────

fn draw_history(f: &mut Frame, area: Rect, history: &HistoryView) {
  let title = if history.name.is_empty() {
    format!(" History #{} ", history.id)
  } else {
    format!(" History: {} ", history.name)
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if let Some(error) = &history.error {
    f.render_widget(
      Paragraph::new(error.as_str())
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(block),
      area,
    );
    return;
  }
  if history.entries.is_empty() {
    f.render_widget(
      Paragraph::new("No changes recorded.")
        .style(Style::default().fg(Color::DarkGray))
        .block(block),
      area,
    );
    return;
  }

  let mut lines: Vec<Line> = Vec::new();
  for entry in &history.entries {
    let by = entry.changed_by.as_deref().unwrap_or("-");
    lines.push(Line::from(vec![
      Span::styled(entry.changed_at_display(), Style::default().fg(Color::DarkGray)),
      Span::styled(format!("  {by}"), Style::default().fg(Color::DarkGray)),
    ]));
    lines.push(Line::from(vec![
      Span::styled(
        format!("{} ", entry.changed_field),
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      ),
      Span::raw(entry.old_value.as_deref().unwrap_or("∅").to_owned()),
      Span::styled(" → ", Style::default().fg(Color::DarkGray)),
      Span::raw(entry.new_value.as_deref().unwrap_or("∅").to_owned()),
    ]));
    lines.push(Line::from(""));
  }

  f.render_widget(
    Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
    area,
  );
}
