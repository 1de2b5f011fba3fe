//! The `BeneficiaryApi` trait and supporting query types.
//!
//! The trait is implemented by the HTTP client (`benef-client`). The form and
//! list view-models depend on this abstraction, not on any concrete
//! transport, so they can be driven by an in-memory fake in tests.

use std::{future::Future, path::PathBuf, sync::Arc};

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::{
  ApiError,
  beneficiary::{Beneficiary, BeneficiaryPage, HistoryEntry},
};

/// Page size used when the caller does not choose one.
pub const DEFAULT_PER_PAGE: u32 = 10;

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Filter criteria of the list view, exactly as typed.
///
/// Values are kept raw so the filter inputs can show them back; only
/// [`ListFilters::to_query`] trims and drops the empty ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters {
  /// Name substring (`nome`).
  pub name:         String,
  /// CPF substring (`cpf`).
  pub cpf:          String,
  /// Exact status wire value (`situacao`).
  pub status:       String,
  /// Exact beneficiary type wire value (`tipo`).
  pub kind:         String,
  /// Registration number substring (`matricula`).
  pub registration: String,
  /// Plan name substring (`plano`).
  pub plan:         String,
}

/// Which filter input is being addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
  Name,
  Cpf,
  Status,
  Kind,
  Registration,
  Plan,
}

impl FilterKey {
  pub const ALL: [FilterKey; 6] = [
    Self::Name,
    Self::Cpf,
    Self::Status,
    Self::Kind,
    Self::Registration,
    Self::Plan,
  ];

  /// Query-string parameter name.
  pub fn param(self) -> &'static str {
    match self {
      Self::Name => "nome",
      Self::Cpf => "cpf",
      Self::Status => "situacao",
      Self::Kind => "tipo",
      Self::Registration => "matricula",
      Self::Plan => "plano",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Name => "Name",
      Self::Cpf => "CPF",
      Self::Status => "Status",
      Self::Kind => "Type",
      Self::Registration => "Registration",
      Self::Plan => "Plan",
    }
  }
}

impl ListFilters {
  pub fn get(&self, key: FilterKey) -> &str {
    match key {
      FilterKey::Name => &self.name,
      FilterKey::Cpf => &self.cpf,
      FilterKey::Status => &self.status,
      FilterKey::Kind => &self.kind,
      FilterKey::Registration => &self.registration,
      FilterKey::Plan => &self.plan,
    }
  }

  pub fn set(&mut self, key: FilterKey, value: impl Into<String>) {
    let slot = match key {
      FilterKey::Name => &mut self.name,
      FilterKey::Cpf => &mut self.cpf,
      FilterKey::Status => &mut self.status,
      FilterKey::Kind => &mut self.kind,
      FilterKey::Registration => &mut self.registration,
      FilterKey::Plan => &mut self.plan,
    };
    *slot = value.into();
  }

  /// Trimmed, non-empty filters as query parameters.
  pub fn to_query(&self) -> Vec<(&'static str, String)> {
    FilterKey::ALL
      .into_iter()
      .filter_map(|key| {
        let value = self.get(key).trim();
        (!value.is_empty()).then(|| (key.param(), value.to_owned()))
      })
      .collect()
  }
}

/// Parameters of `GET /beneficiarios`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
  pub filters:  Vec<(&'static str, String)>,
  pub page:     u32,
  pub per_page: u32,
}

impl ListQuery {
  /// Full query string parameters: `page`, `per_page`, then the filters.
  pub fn params(&self) -> Vec<(&'static str, String)> {
    let mut params = vec![
      ("page", self.page.to_string()),
      ("per_page", self.per_page.to_string()),
    ];
    params.extend(self.filters.iter().cloned());
    params
  }
}

// ─── Exports ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
  Csv,
  Pdf,
}

impl ExportFormat {
  pub fn extension(self) -> &'static str {
    match self {
      Self::Csv => "csv",
      Self::Pdf => "pdf",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Csv => "CSV",
      Self::Pdf => "PDF",
    }
  }
}

/// Download file name for an export made on `date`.
pub fn export_file_name(format: ExportFormat, date: NaiveDate) -> String {
  format!(
    "beneficiarios_{}.{}",
    date.format("%Y-%m-%d"),
    format.extension()
  )
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the beneficiary REST API.
///
/// All methods return `Send` futures so implementations can be driven from a
/// multi-threaded tokio runtime.
pub trait BeneficiaryApi: Send + Sync {
  /// `GET /beneficiarios?page=&per_page=&<filters>`
  fn list(
    &self,
    query: &ListQuery,
  ) -> impl Future<Output = Result<BeneficiaryPage, ApiError>> + Send;

  /// `GET /beneficiarios/{id}`
  fn get(&self, id: i64) -> impl Future<Output = Result<Beneficiary, ApiError>> + Send;

  /// `POST /beneficiarios`. Returns the stored record.
  fn create(
    &self,
    body: &Map<String, Value>,
  ) -> impl Future<Output = Result<Beneficiary, ApiError>> + Send;

  /// `PUT /beneficiarios/{id}`. Returns the stored record.
  fn update(
    &self,
    id: i64,
    body: &Map<String, Value>,
  ) -> impl Future<Output = Result<Beneficiary, ApiError>> + Send;

  /// `DELETE /beneficiarios/{id}`. Logical delete; 204 on success.
  fn delete(&self, id: i64) -> impl Future<Output = Result<(), ApiError>> + Send;

  /// `GET /beneficiarios/{id}/historico`
  fn history(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Vec<HistoryEntry>, ApiError>> + Send;

  /// `GET /beneficiarios/export/{csv,pdf}?<filters>`. Saves the payload as
  /// a dated download and returns where it was written.
  fn export(
    &self,
    format: ExportFormat,
    filters: &[(&'static str, String)],
  ) -> impl Future<Output = Result<PathBuf, ApiError>> + Send;

  /// Whether the server answers at all. Never fails; an unreachable server
  /// is `false`.
  fn ping(&self) -> impl Future<Output = bool> + Send;
}

/// Shared handles delegate to the inner implementation, so one client can
/// back both the list and the form.
impl<T: BeneficiaryApi> BeneficiaryApi for Arc<T> {
  fn list(
    &self,
    query: &ListQuery,
  ) -> impl Future<Output = Result<BeneficiaryPage, ApiError>> + Send {
    (**self).list(query)
  }

  fn get(&self, id: i64) -> impl Future<Output = Result<Beneficiary, ApiError>> + Send {
    (**self).get(id)
  }

  fn create(
    &self,
    body: &Map<String, Value>,
  ) -> impl Future<Output = Result<Beneficiary, ApiError>> + Send {
    (**self).create(body)
  }

  fn update(
    &self,
    id: i64,
    body: &Map<String, Value>,
  ) -> impl Future<Output = Result<Beneficiary, ApiError>> + Send {
    (**self).update(id, body)
  }

  fn delete(&self, id: i64) -> impl Future<Output = Result<(), ApiError>> + Send {
    (**self).delete(id)
  }

  fn history(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Vec<HistoryEntry>, ApiError>> + Send {
    (**self).history(id)
  }

  fn export(
    &self,
    format: ExportFormat,
    filters: &[(&'static str, String)],
  ) -> impl Future<Output = Result<PathBuf, ApiError>> + Send {
    (**self).export(format, filters)
  }

  fn ping(&self) -> impl Future<Output = bool> + Send { (**self).ping() }
}
