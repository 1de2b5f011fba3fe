//! TUI rendering: header, active screen, status bar and modals.

pub mod form;
pub mod list;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let [header, body, status] = Layout::vertical([
    Constraint::Length(1), // header
    Constraint::Min(0),    // body
    Constraint::Length(1), // status bar
  ])
  .areas(area);

  draw_header(f, header, app);
  match app.screen {
    Screen::List => list::draw(f, body, app),
    Screen::Form => form::draw(f, body, app),
  }
  draw_status(f, status, app);

  if app.screen == Screen::List {
    let state = app.list.state();
    if let Some(alert) = &state.alert {
      draw_modal(f, area, " Error ", alert, "[Enter] ok", Color::Red);
    } else if let Some(request) = &state.pending_delete {
      draw_modal(
        f,
        area,
        " Confirm ",
        &request.prompt(),
        "[y] delete  [n] cancel",
        Color::Yellow,
      );
    }
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let (reach, reach_color) = match app.online {
    Some(true) => ("online", Color::Green),
    Some(false) => ("unreachable", Color::Red),
    None => ("…", Color::Gray),
  };

  let left = vec![
    Span::styled(
      " benef ",
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!(" {} ", app.base_url), Style::default().fg(Color::Gray)),
    Span::styled(reach, Style::default().fg(reach_color)),
  ];
  let right = Span::styled(
    format!("{date} "),
    Style::default().fg(Color::Gray),
  );

  // Simple left-right header: pad the middle.
  let left_width: usize = left.iter().map(|s| s.content.chars().count()).sum();
  let pad = (area.width as usize)
    .saturating_sub(left_width)
    .saturating_sub(right.content.len());

  let mut spans = left;
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(right);

  f.render_widget(
    Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray)),
    area,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.screen {
    Screen::List if app.filter_focus.is_some() => (
      "FILTER",
      "Type to filter  Tab next field  ←→ cycle  Enter search  Esc done",
    ),
    Screen::List => (
      "LIST",
      "↑↓ select  ←→ page  / filter  n new  Enter edit  d delete  h history  c/p export  q quit",
    ),
    Screen::Form => (
      "FORM",
      "↑↓ field  ←→/Space choose  F2/Ctrl-S save  Esc back",
    ),
  };

  let notice = match app.screen {
    Screen::List => app.list.state().notice.clone(),
    Screen::Form => None,
  };
  let (text, color) = match (&app.pending, notice) {
    (Some(pending), _) => (pending.label(), Color::Yellow),
    (None, Some(notice)) => (notice, Color::Green),
    (None, None) => (hints.to_string(), Color::Gray),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let text_span = Span::styled(format!("  {text}"), Style::default().fg(color));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, text_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Modals ───────────────────────────────────────────────────────────────────

fn draw_modal(f: &mut Frame, area: Rect, title: &str, message: &str, keys: &str, color: Color) {
  let width = area.width.min(60);
  let height = area.height.min(7);
  let rect = Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(color));
  let text = vec![
    Line::from(message.to_owned()),
    Line::from(""),
    Line::from(Span::styled(keys.to_owned(), Style::default().fg(Color::DarkGray))),
  ];

  f.render_widget(Clear, rect);
  f.render_widget(
    Paragraph::new(text)
      .block(block)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true }),
    rect,
  );
}
