//! Application state machine and event dispatcher.
//!
//! Key handling never waits on the network. A key that needs the server
//! moves the view-model into its in-flight state and queues a [`Pending`]
//! action; the event loop draws that state, then runs the action.

use std::{sync::Arc, time::Instant};

use benef_client::ApiClient;
use benef_core::{
  api::{BeneficiaryApi, ExportFormat, FilterKey},
  choice,
  field::Field,
  form::FormController,
  list::{DeleteRequest, ListController},
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Paginated table with filters; the history pane may be open beside it.
  List,
  /// Registration or edit form.
  Form,
}

/// Options offered when cycling a list filter with ←/→.
pub fn filter_choices(key: FilterKey) -> Option<&'static [&'static str]> {
  match key {
    FilterKey::Status => Field::Status.choices(),
    FilterKey::Kind => Field::Kind.choices(),
    FilterKey::Plan => Field::Plan.choices(),
    _ => None,
  }
}

// ─── Pending work ─────────────────────────────────────────────────────────────

/// Network work queued by a key press, run after the next frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
  /// Reachability check, then the first page.
  Start,
  /// The list page the snapshot points at.
  Fetch,
  Delete(DeleteRequest),
  Export(ExportFormat),
  History(i64),
  /// The record behind the open edit form.
  Load,
  /// The save started on the open form.
  Submit,
}

impl Pending {
  /// Status-bar text while the work runs.
  pub fn label(&self) -> String {
    match self {
      Self::Start | Self::Fetch | Self::Load => "Loading…".to_owned(),
      Self::Delete(request) => format!("Deleting {}…", request.name),
      Self::Export(format) => format!("Exporting {}…", format.label()),
      Self::History(_) => "Loading history…".to_owned(),
      Self::Submit => "Saving…".to_owned(),
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<A = Arc<ApiClient>> {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  pub list: ListController<A>,

  /// The open form, if any.
  pub form: Option<FormController<A>>,

  /// Work to run once the current state has been drawn.
  pub pending: Option<Pending>,

  /// Row under the cursor on the current page.
  pub list_cursor: usize,

  /// Filter input being typed into, as an index into [`FilterKey::ALL`].
  pub filter_focus: Option<usize>,

  /// Position within the form's visible fields.
  pub form_cursor: usize,

  /// Result of the startup reachability check.
  pub online: Option<bool>,

  /// Server the client talks to, for the header.
  pub base_url: String,

  client: A,
}

impl<A: BeneficiaryApi + Clone> App<A> {
  pub fn new(client: A, base_url: String, per_page: u32) -> Self {
    Self {
      screen: Screen::List,
      list: ListController::new(client.clone(), per_page),
      form: None,
      pending: None,
      list_cursor: 0,
      filter_focus: None,
      form_cursor: 0,
      online: None,
      base_url,
      client,
    }
  }

  /// Queue the reachability check and the first page.
  pub fn start(&mut self) {
    self.list.begin_fetch();
    self.pending = Some(Pending::Start);
  }

  /// Time-driven transitions, run once per frame.
  pub fn tick(&mut self, now: Instant) {
    let due = self
      .form
      .as_ref()
      .is_some_and(|form| form.state().redirect_due(now));
    if self.screen == Screen::Form && due {
      self.close_form(true);
    }
  }

  /// Run the queued network work, if any.
  pub async fn run_pending(&mut self) {
    let Some(pending) = self.pending.take() else {
      return;
    };
    debug!(?pending, "running");
    match pending {
      Pending::Start => {
        let online = self.client.ping().await;
        info!(online, "reachability checked");
        self.online = Some(online);
        self.list.finish_fetch().await;
      }
      Pending::Fetch => self.list.finish_fetch().await,
      Pending::Delete(request) => {
        self.list.finish_delete(request).await;
      }
      Pending::Export(format) => {
        self.list.export(format).await;
      }
      Pending::History(id) => self.list.open_history(id).await,
      Pending::Load => {
        if let Some(form) = self.form.as_mut() {
          form.load().await;
        }
      }
      Pending::Submit => {
        if let Some(form) = self.form.as_mut() {
          form.finish_submit().await;
        }
      }
    }
    self.clamp_list_cursor();
  }

  fn fetch(&mut self) {
    self.list.begin_fetch();
    self.pending = Some(Pending::Fetch);
  }

  // ── Selection ─────────────────────────────────────────────────────────────

  /// Id of the record under the list cursor.
  pub fn selected_id(&self) -> Option<i64> {
    self
      .list
      .state()
      .items
      .get(self.list_cursor)
      .and_then(|b| b.id)
  }

  fn clamp_list_cursor(&mut self) {
    let len = self.list.state().items.len();
    self.list_cursor = self.list_cursor.min(len.saturating_sub(1));
  }

  /// Form fields shown for the record being edited, in form order.
  pub fn visible_fields(&self) -> Vec<Field> {
    match &self.form {
      Some(form) => {
        let record = &form.state().record;
        Field::all().filter(|f| f.is_shown_for(record)).collect()
      }
      None => Vec::new(),
    }
  }

  pub fn current_field(&self) -> Option<Field> {
    self.visible_fields().get(self.form_cursor).copied()
  }

  // ── Navigation ────────────────────────────────────────────────────────────

  fn open_create(&mut self) {
    self.form = Some(FormController::create(self.client.clone()));
    self.form_cursor = 0;
    self.screen = Screen::Form;
  }

  fn open_edit(&mut self, id: i64) {
    debug!(id, "opening edit form");
    self.form = Some(FormController::loading(self.client.clone(), id));
    self.form_cursor = 0;
    self.screen = Screen::Form;
    self.pending = Some(Pending::Load);
  }

  fn close_form(&mut self, reload: bool) {
    self.form = None;
    self.screen = Screen::List;
    if reload {
      self.fetch();
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
      return true;
    }

    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    match self.screen {
      Screen::List => self.handle_list_key(key),
      Screen::Form => {
        self.handle_form_key(key);
        true
      }
    }
  }

  fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    // Modals take every key until dismissed.
    if self.list.state().alert.is_some() {
      if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        self.list.dismiss_alert();
      }
      return true;
    }
    if self.list.state().pending_delete.is_some() {
      match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
          self.pending = self.list.begin_delete().map(Pending::Delete);
        }
        KeyCode::Char('n') | KeyCode::Esc => self.list.cancel_delete(),
        _ => {}
      }
      return true;
    }

    if let Some(idx) = self.filter_focus {
      self.handle_filter_key(idx, key);
      return true;
    }

    self.list.clear_notice();
    match key.code {
      KeyCode::Char('q') => return false,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.list.state().items.len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }
      KeyCode::Left | KeyCode::Char('[') => {
        if self.list.begin_previous_page() {
          self.list_cursor = 0;
          self.pending = Some(Pending::Fetch);
        }
      }
      KeyCode::Right | KeyCode::Char(']') => {
        if self.list.begin_next_page() {
          self.list_cursor = 0;
          self.pending = Some(Pending::Fetch);
        }
      }
      KeyCode::Char('r') => self.fetch(),

      // Filters
      KeyCode::Char('/') => self.filter_focus = Some(0),

      // Records
      KeyCode::Char('n') => self.open_create(),
      KeyCode::Enter | KeyCode::Char('e') => {
        if let Some(id) = self.selected_id() {
          self.open_edit(id);
        }
      }
      KeyCode::Char('d') => {
        if let Some(id) = self.selected_id() {
          self.list.request_delete(id);
        }
      }
      KeyCode::Char('h') => match self.selected_id() {
        Some(id) if self.list.state().history.as_ref().is_none_or(|h| h.id != id) => {
          self.pending = Some(Pending::History(id));
        }
        _ => self.list.close_history(),
      },
      KeyCode::Esc => self.list.close_history(),

      // Exports
      KeyCode::Char('c') => self.pending = Some(Pending::Export(ExportFormat::Csv)),
      KeyCode::Char('p') => self.pending = Some(Pending::Export(ExportFormat::Pdf)),

      _ => {}
    }
    true
  }

  fn handle_filter_key(&mut self, idx: usize, key: KeyEvent) {
    let filter = FilterKey::ALL[idx];
    let count = FilterKey::ALL.len();
    match key.code {
      KeyCode::Esc => self.filter_focus = None,
      KeyCode::Enter => {
        self.filter_focus = None;
        self.list.begin_search();
        self.list_cursor = 0;
        self.pending = Some(Pending::Fetch);
      }
      KeyCode::Tab => self.filter_focus = Some((idx + 1) % count),
      KeyCode::BackTab => self.filter_focus = Some((idx + count - 1) % count),
      KeyCode::Left | KeyCode::Right => {
        if let Some(options) = filter_choices(filter) {
          let current = self.list.state().filters.get(filter);
          let next = choice::cycle(options, current, key.code == KeyCode::Right, true);
          self.list.set_filter(filter, &next);
        }
      }
      KeyCode::Backspace => {
        let mut value = self.list.state().filters.get(filter).to_owned();
        value.pop();
        self.list.set_filter(filter, &value);
      }
      KeyCode::Char(c) => {
        let mut value = self.list.state().filters.get(filter).to_owned();
        value.push(c);
        self.list.set_filter(filter, &value);
      }
      _ => {}
    }
  }

  fn handle_form_key(&mut self, key: KeyEvent) {
    let fields = self.visible_fields();
    let Some(form) = self.form.as_mut() else {
      self.screen = Screen::List;
      return;
    };

    // Saved: the list comes back on its own, or right away on Enter/Esc.
    if form.state().committed_at.is_some() {
      if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
        self.close_form(true);
      }
      return;
    }

    let submit = key.code == KeyCode::F(2)
      || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s'));
    if submit {
      if form.begin_submit() {
        self.pending = Some(Pending::Submit);
      } else {
        // Jump to the first field that needs attention.
        let errors = &form.state().errors;
        if let Some(pos) = fields.iter().position(|f| errors.contains_key(f)) {
          self.form_cursor = pos;
        }
      }
      return;
    }

    let field = fields.get(self.form_cursor).copied();
    match (key.code, field) {
      (KeyCode::Esc, _) => {
        self.close_form(false);
        return;
      }
      (KeyCode::Down | KeyCode::Tab | KeyCode::Enter, _) => {
        self.form_cursor += 1;
      }
      (KeyCode::Up | KeyCode::BackTab, _) => {
        self.form_cursor = self.form_cursor.saturating_sub(1);
      }
      (KeyCode::Left | KeyCode::Right, Some(f)) => {
        form.cycle_choice(f, key.code == KeyCode::Right);
      }
      (KeyCode::Char(' '), Some(f)) if f.choices().is_some() => {
        form.cycle_choice(f, true);
      }
      (KeyCode::Backspace, Some(f)) if f.choices().is_none() => {
        let mut value = form.state().record.get(f).to_owned();
        value.pop();
        form.set_field(f, &value);
      }
      (KeyCode::Char(c), Some(f)) if f.choices().is_none() => {
        let mut value = form.state().record.get(f).to_owned();
        value.push(c);
        form.set_field(f, &value);
      }
      _ => {}
    }

    // Changing status or type can hide fields below the cursor.
    let shown = self.visible_fields().len();
    self.form_cursor = self.form_cursor.min(shown.saturating_sub(1));
  }
}
