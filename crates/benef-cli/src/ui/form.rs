//! Registration / edit form screen.

use benef_core::{
  field::{Field, Section},
  form::{Banner, FormMode, FormState},
};
use ratatui::{
  Frame,
  layout::{Constraint, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

const LABEL_WIDTH: usize = 22;

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the form into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(form) = &app.form else {
    return;
  };
  let state = form.state();

  let title = match state.mode {
    FormMode::Create => " New beneficiary ".to_owned(),
    FormMode::Edit(id) => format!(" Edit beneficiary #{id} "),
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let [banner, fields] =
    Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);
  draw_banner(f, banner, state);

  let (lines, cursor_line) = field_lines(state, &app.visible_fields(), app.form_cursor);

  // Keep the cursor row on screen.
  let height = fields.height as usize;
  let scroll = cursor_line.saturating_sub(height.saturating_sub(2));
  f.render_widget(Paragraph::new(lines).scroll((scroll as u16, 0)), fields);
}

fn draw_banner(f: &mut Frame, area: Rect, state: &FormState) {
  let (text, style) = match &state.banner {
    Banner::None if state.errors.is_empty() => (String::new(), Style::default()),
    Banner::None => (
      format!("{} field(s) need attention", state.errors.len()),
      Style::default().fg(Color::Red),
    ),
    Banner::Loading if state.submitting => (
      "Saving…".to_owned(),
      Style::default().fg(Color::DarkGray),
    ),
    Banner::Loading => ("Loading…".to_owned(), Style::default().fg(Color::DarkGray)),
    Banner::Success(msg) => (
      msg.clone(),
      Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD),
    ),
    Banner::Failure(msg) => (msg.clone(), Style::default().fg(Color::Red)),
  };
  f.render_widget(Paragraph::new(text).style(style), area);
}

// ─── Field rows ───────────────────────────────────────────────────────────────

/// One line per section heading and per field, plus the line index of the
/// field under the cursor.
fn field_lines(state: &FormState, fields: &[Field], cursor: usize) -> (Vec<Line<'static>>, usize) {
  let mut lines = Vec::new();
  let mut cursor_line = 0;
  let mut section: Option<Section> = None;

  for (i, field) in fields.iter().copied().enumerate() {
    if section != Some(field.section()) {
      if section.is_some() {
        lines.push(Line::from(""));
      }
      section = Some(field.section());
      lines.push(Line::from(Span::styled(
        field.section().title(),
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      )));
    }

    let focused = i == cursor;
    if focused {
      cursor_line = lines.len();
    }
    lines.push(field_line(state, field, focused));
  }

  (lines, cursor_line)
}

fn field_line(state: &FormState, field: Field, focused: bool) -> Line<'static> {
  let marker = if focused { "▸ " } else { "  " };
  let required = if field.is_required() { "*" } else { "" };
  let label = format!("{}{required}", field.label());

  let value = state.record.get(field);
  let shown = match (field.choices().is_some(), focused) {
    (true, true) => format!("‹ {value} ›"),
    (true, false) if value.is_empty() => "-".to_owned(),
    (false, true) => format!("{value}_"),
    _ => value.to_owned(),
  };
  let hint = if field.is_date() && value.is_empty() {
    " YYYY-MM-DD"
  } else {
    ""
  };

  let label_style = if focused {
    Style::default()
      .fg(Color::Yellow)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Gray)
  };

  let mut spans = vec![
    Span::styled(marker, label_style),
    Span::styled(format!("{label:<LABEL_WIDTH$}"), label_style),
    Span::raw(shown),
    Span::styled(hint, Style::default().fg(Color::DarkGray)),
  ];
  if let Some(error) = state.error(field) {
    spans.push(Span::styled(
      format!("  {error}"),
      Style::default().fg(Color::Red),
    ));
  }
  Line::from(spans)
}
