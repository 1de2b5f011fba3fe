//! Paginated, filterable list view-model.
//!
//! Like the form, the list keeps an immutable [`ListState`] snapshot that the
//! presentation layer reads, and a [`ListController`] that runs the
//! transitions involving the network.
//!
//! Fetching is explicit. Typing into a filter never fetches; only
//! [`ListController::search`] (or a page change) does.
//!
//! Each network action also comes split in two: a synchronous `begin_*`
//! step that moves the snapshot into its in-flight state, and an awaited
//! `finish_*` step. A caller that draws in between shows the loading state.

use tracing::{debug, info, warn};

use crate::{
  ApiError,
  api::{BeneficiaryApi, DEFAULT_PER_PAGE, ExportFormat, FilterKey, ListFilters, ListQuery},
  beneficiary::{Beneficiary, BeneficiaryPage, HistoryEntry},
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
  pub page:     u32,
  pub per_page: u32,
  pub total:    u64,
  pub pages:    u32,
}

impl Pagination {
  pub fn new(per_page: u32) -> Self {
    Self {
      page: 1,
      per_page,
      total: 0,
      pages: 0,
    }
  }

  pub fn has_previous(&self) -> bool { self.page > 1 }

  pub fn has_next(&self) -> bool { self.page < self.pages }
}

/// A delete waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
  pub id:   i64,
  pub name: String,
}

impl DeleteRequest {
  pub fn prompt(&self) -> String { format!("Delete beneficiary {}?", self.name) }
}

/// Change history of one record, as shown beside the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryView {
  pub id:      i64,
  pub name:    String,
  pub entries: Vec<HistoryEntry>,
  pub error:   Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListState {
  pub items:          Vec<Beneficiary>,
  pub filters:        ListFilters,
  pub pagination:     Pagination,
  /// A list fetch is outstanding.
  pub loading:        bool,
  /// Banner shown in place of the table when the last fetch failed.
  pub error:          Option<String>,
  /// Blocking message the user must dismiss (failed delete or export).
  pub alert:          Option<String>,
  /// Transient confirmation, e.g. where an export was saved.
  pub notice:         Option<String>,
  pub pending_delete: Option<DeleteRequest>,
  pub history:        Option<HistoryView>,
}

impl ListState {
  pub fn new(per_page: u32) -> Self {
    Self {
      items:          Vec::new(),
      filters:        ListFilters::default(),
      pagination:     Pagination::new(per_page),
      loading:        false,
      error:          None,
      alert:          None,
      notice:         None,
      pending_delete: None,
      history:        None,
    }
  }

  /// The request the current state would issue.
  pub fn query(&self) -> ListQuery {
    ListQuery {
      filters:  self.filters.to_query(),
      page:     self.pagination.page,
      per_page: self.pagination.per_page,
    }
  }

  pub fn with_filter(mut self, key: FilterKey, value: &str) -> Self {
    self.filters.set(key, value);
    self
  }

  pub fn with_page(mut self, page: u32) -> Self {
    self.pagination.page = page;
    self
  }

  pub fn begin_fetch(mut self) -> Self {
    self.loading = true;
    self.error = None;
    self
  }

  /// Apply a list response. Counters missing from the response, or zero,
  /// fall back to page 1, 10 per page, no records, a single page.
  pub fn with_page_result(mut self, result: Result<BeneficiaryPage, ApiError>) -> Self {
    let positive = |n: Option<u32>, fallback| n.filter(|n| *n > 0).unwrap_or(fallback);
    self.loading = false;
    match result {
      Ok(page) => {
        self.items = page.items;
        self.pagination = Pagination {
          page:     positive(page.current_page, 1),
          per_page: positive(page.per_page, DEFAULT_PER_PAGE),
          total:    page.total.unwrap_or(0),
          pages:    positive(page.pages, 1),
        };
        self.error = None;
      }
      Err(e) => {
        self.items.clear();
        self.error = Some(format!("Failed to load beneficiaries: {e}"));
      }
    }
    self
  }

  pub fn find(&self, id: i64) -> Option<&Beneficiary> {
    self.items.iter().find(|b| b.id == Some(id))
  }
}

// ─── Controller ──────────────────────────────────────────────────────────────

pub struct ListController<A> {
  api:   A,
  state: ListState,
}

impl<A: BeneficiaryApi> ListController<A> {
  pub fn new(api: A, per_page: u32) -> Self {
    Self {
      api,
      state: ListState::new(per_page),
    }
  }

  pub fn state(&self) -> &ListState { &self.state }

  fn transition(&mut self, f: impl FnOnce(ListState) -> ListState) {
    let per_page = self.state.pagination.per_page;
    let prev = std::mem::replace(&mut self.state, ListState::new(per_page));
    self.state = f(prev);
  }

  /// Mark a fetch of the current page as outstanding.
  pub fn begin_fetch(&mut self) { self.transition(ListState::begin_fetch); }

  /// Request the page the snapshot points at and apply the response.
  pub async fn finish_fetch(&mut self) {
    let query = self.state.query();
    debug!(?query, "fetching beneficiaries");
    let result = self.api.list(&query).await;
    if let Err(e) = &result {
      warn!(error = %e, "listing beneficiaries failed");
    }
    self.transition(|s| s.with_page_result(result));
  }

  /// Fetch the current page with the current filters.
  pub async fn fetch(&mut self) {
    self.begin_fetch();
    self.finish_fetch().await;
  }

  /// Update a filter value without fetching.
  pub fn set_filter(&mut self, key: FilterKey, value: &str) {
    self.transition(|s| s.with_filter(key, value));
  }

  pub fn begin_search(&mut self) {
    self.transition(|s| s.with_page(1).begin_fetch());
  }

  /// Go back to page 1 and fetch with the current filters.
  pub async fn search(&mut self) {
    self.begin_search();
    self.finish_fetch().await;
  }

  /// Step back one page, if there is one. Returns whether it moved.
  pub fn begin_previous_page(&mut self) -> bool {
    if !self.state.pagination.has_previous() {
      return false;
    }
    let page = self.state.pagination.page - 1;
    self.transition(|s| s.with_page(page).begin_fetch());
    true
  }

  pub fn begin_next_page(&mut self) -> bool {
    if !self.state.pagination.has_next() {
      return false;
    }
    let page = self.state.pagination.page + 1;
    self.transition(|s| s.with_page(page).begin_fetch());
    true
  }

  /// Move to the previous page, if there is one. Returns whether it moved.
  pub async fn previous_page(&mut self) -> bool {
    if !self.begin_previous_page() {
      return false;
    }
    self.finish_fetch().await;
    true
  }

  /// Move to the next page, if there is one. Returns whether it moved.
  pub async fn next_page(&mut self) -> bool {
    if !self.begin_next_page() {
      return false;
    }
    self.finish_fetch().await;
    true
  }

  // ── Delete ────────────────────────────────────────────────────────────────

  /// Ask for confirmation before deleting record `id`. Returns `false` if
  /// the record is not on the current page.
  pub fn request_delete(&mut self, id: i64) -> bool {
    let Some(target) = self.state.find(id) else {
      return false;
    };
    let request = DeleteRequest {
      id,
      name: target.full_name.clone(),
    };
    self.transition(|mut s| {
      s.pending_delete = Some(request);
      s
    });
    true
  }

  pub fn cancel_delete(&mut self) {
    self.transition(|mut s| {
      s.pending_delete = None;
      s
    });
  }

  /// Take the confirmed request off the modal.
  pub fn begin_delete(&mut self) -> Option<DeleteRequest> {
    let request = self.state.pending_delete.clone()?;
    self.cancel_delete();
    Some(request)
  }

  /// Delete `request`'s record, then reload the current page.
  ///
  /// If the reload shows the current page no longer exists, the list moves
  /// to the last page and fetches once more. On failure the list is left as
  /// it was and the error goes to the blocking alert.
  pub async fn finish_delete(&mut self, request: DeleteRequest) -> bool {
    if let Err(e) = self.api.delete(request.id).await {
      warn!(id = request.id, error = %e, "deleting beneficiary failed");
      self.transition(|mut s| {
        s.alert = Some(format!("Failed to delete beneficiary: {e}"));
        s
      });
      return false;
    }
    info!(id = request.id, "beneficiary deleted");

    self.fetch().await;
    let Pagination { page, pages, .. } = self.state.pagination;
    if self.state.error.is_none() && page > pages {
      self.transition(|s| s.with_page(pages));
      self.fetch().await;
    }
    true
  }

  /// Carry out the pending delete, if there is one.
  pub async fn confirm_delete(&mut self) -> bool {
    match self.begin_delete() {
      Some(request) => self.finish_delete(request).await,
      None => false,
    }
  }

  // ── Export ────────────────────────────────────────────────────────────────

  /// Download the records matching the current filters.
  pub async fn export(&mut self, format: ExportFormat) -> bool {
    let filters = self.state.filters.to_query();
    match self.api.export(format, &filters).await {
      Ok(path) => {
        info!(path = %path.display(), "export saved");
        self.transition(|mut s| {
          s.notice = Some(format!("{} saved to {}", format.label(), path.display()));
          s
        });
        true
      }
      Err(e) => {
        warn!(?format, error = %e, "export failed");
        self.transition(|mut s| {
          s.alert = Some(format!("Failed to export {}: {e}", format.label()));
          s
        });
        false
      }
    }
  }

  pub fn dismiss_alert(&mut self) {
    self.transition(|mut s| {
      s.alert = None;
      s
    });
  }

  pub fn clear_notice(&mut self) {
    self.transition(|mut s| {
      s.notice = None;
      s
    });
  }

  // ── History ───────────────────────────────────────────────────────────────

  /// Load the change history of record `id` into the side pane.
  pub async fn open_history(&mut self, id: i64) {
    let name = self
      .state
      .find(id)
      .map(|b| b.full_name.clone())
      .unwrap_or_default();
    let view = match self.api.history(id).await {
      Ok(entries) => HistoryView {
        id,
        name,
        entries,
        error: None,
      },
      Err(e) => {
        warn!(id, error = %e, "loading history failed");
        HistoryView {
          id,
          name,
          entries: Vec::new(),
          error: Some(format!("Failed to load history: {e}")),
        }
      }
    };
    self.transition(|mut s| {
      s.history = Some(view);
      s
    });
  }

  pub fn close_history(&mut self) {
    self.transition(|mut s| {
      s.history = None;
      s
    });
  }
}
