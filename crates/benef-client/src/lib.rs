//! Async HTTP client wrapping the beneficiary JSON API.
//!
//! [`ApiClient`] implements [`BeneficiaryApi`], so the list and form
//! view-models in `benef-core` drive it directly.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context, Result};
use benef_core::{
  ApiError,
  api::{BeneficiaryApi, ExportFormat, ListQuery, export_file_name},
  beneficiary::{Beneficiary, BeneficiaryPage, HistoryEntry},
};
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the beneficiary API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Server root; requests go to `<base_url>/api/...`.
  pub base_url:     String,
  /// Where exported CSV/PDF files are written.
  pub download_dir: PathBuf,
  pub timeout:      Duration,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url:     DEFAULT_BASE_URL.to_owned(),
      download_dir: PathBuf::from("."),
      timeout:      DEFAULT_TIMEOUT,
    }
  }
}

/// Async HTTP client for the beneficiary REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &ApiConfig { &self.config }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    self
      .client
      .request(method, self.url(path))
      .header(header::CONTENT_TYPE, "application/json")
  }

  /// Send `req`. Any non-2xx status becomes an [`ApiError::Http`] carrying
  /// the server's `error` message when the body has one.
  async fn execute(&self, req: RequestBuilder) -> Result<Response, ApiError> {
    let resp = req.send().await.map_err(|e| {
      warn!(error = %e, "request failed");
      ApiError::Transport(e.to_string())
    })?;

    let status = resp.status();
    debug!(path = resp.url().path(), %status, "response");
    if status.is_success() {
      return Ok(resp);
    }

    let body = resp
      .bytes()
      .await
      .map_err(|e| ApiError::Transport(e.to_string()))?;
    Err(ApiError::from_response(status.as_u16(), &body))
  }

  /// Send `req` and decode the JSON body. A 204 yields `T::default()`
  /// without touching the body.
  async fn json<T: DeserializeOwned + Default>(&self, req: RequestBuilder) -> Result<T, ApiError> {
    let resp = self.execute(req).await?;
    if resp.status() == StatusCode::NO_CONTENT {
      return Ok(T::default());
    }
    resp.json().await.map_err(|e| ApiError::Decode(e.to_string()))
  }
}

async fn save_download(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, ApiError> {
  let io = |e: std::io::Error| ApiError::Io(format!("{}: {e}", dir.display()));
  tokio::fs::create_dir_all(dir).await.map_err(io)?;
  let path = dir.join(name);
  tokio::fs::write(&path, bytes)
    .await
    .map_err(|e| ApiError::Io(format!("{}: {e}", path.display())))?;
  Ok(path)
}

impl BeneficiaryApi for ApiClient {
  // ── Beneficiaries ─────────────────────────────────────────────────────────

  /// `GET /api/beneficiarios?page=&per_page=&<filters>`
  async fn list(&self, query: &ListQuery) -> Result<BeneficiaryPage, ApiError> {
    let req = self
      .request(Method::GET, "/beneficiarios")
      .query(&query.params());
    self.json(req).await
  }

  /// `GET /api/beneficiarios/<id>`
  async fn get(&self, id: i64) -> Result<Beneficiary, ApiError> {
    self
      .json(self.request(Method::GET, &format!("/beneficiarios/{id}")))
      .await
  }

  /// `POST /api/beneficiarios`
  async fn create(&self, body: &Map<String, Value>) -> Result<Beneficiary, ApiError> {
    let req = self.request(Method::POST, "/beneficiarios").json(body);
    self.json(req).await
  }

  /// `PUT /api/beneficiarios/<id>`
  async fn update(&self, id: i64, body: &Map<String, Value>) -> Result<Beneficiary, ApiError> {
    let req = self
      .request(Method::PUT, &format!("/beneficiarios/{id}"))
      .json(body);
    self.json(req).await
  }

  /// `DELETE /api/beneficiarios/<id>`
  async fn delete(&self, id: i64) -> Result<(), ApiError> {
    self
      .execute(self.request(Method::DELETE, &format!("/beneficiarios/{id}")))
      .await?;
    Ok(())
  }

  /// `GET /api/beneficiarios/<id>/historico`
  async fn history(&self, id: i64) -> Result<Vec<HistoryEntry>, ApiError> {
    self
      .json(self.request(Method::GET, &format!("/beneficiarios/{id}/historico")))
      .await
  }

  // ── Exports ───────────────────────────────────────────────────────────────

  /// `GET /api/beneficiarios/export/<csv|pdf>?<filters>`
  ///
  /// The body is saved verbatim; error bodies are not inspected.
  async fn export(
    &self,
    format: ExportFormat,
    filters: &[(&'static str, String)],
  ) -> Result<PathBuf, ApiError> {
    let path = format!("/beneficiarios/export/{}", format.extension());
    let resp = self
      .request(Method::GET, &path)
      .query(filters)
      .send()
      .await
      .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = resp.status();
    debug!(path = %path, %status, "export response");
    if !status.is_success() {
      return Err(ApiError::status_only(status.as_u16()));
    }

    let bytes = resp
      .bytes()
      .await
      .map_err(|e| ApiError::Transport(e.to_string()))?;
    let name = export_file_name(format, Utc::now().date_naive());
    save_download(&self.config.download_dir, &name, &bytes).await
  }

  /// `GET /api/beneficiarios?per_page=1`; reachable when it answers 2xx.
  async fn ping(&self) -> bool {
    let req = self
      .request(Method::GET, "/beneficiarios")
      .query(&[("per_page", "1")]);
    match req.send().await {
      Ok(resp) => resp.status().is_success(),
      Err(e) => {
        debug!(error = %e, "ping failed");
        false
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base_url: &str) -> ApiClient {
    ApiClient::new(ApiConfig {
      base_url: base_url.to_owned(),
      ..ApiConfig::default()
    })
    .unwrap()
  }

  #[test]
  fn urls_live_under_api_prefix() {
    assert_eq!(
      client("http://host:5000").url("/beneficiarios"),
      "http://host:5000/api/beneficiarios"
    );
    assert_eq!(
      client("http://host:5000/").url("/beneficiarios/3"),
      "http://host:5000/api/beneficiarios/3"
    );
  }

  #[test]
  fn defaults() {
    let config = ApiConfig::default();
    assert_eq!(config.base_url, "http://localhost:5000");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.download_dir, PathBuf::from("."));
  }
}
