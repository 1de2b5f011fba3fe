//! `ApiClient` against an in-process mock of the beneficiary REST API.
//!
//! The mock keeps records as raw JSON in memory and mimics the wire quirks
//! of the real server: `null` optionals, a numeric `id_titular`,
//! `{"error": ...}` bodies and a bodiless 204 on delete.

use std::{collections::HashMap, sync::Arc};

use axum::{
  Json, Router,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::{IntoResponse, Response},
  routing::get,
};
use benef_client::{ApiClient, ApiConfig};
use benef_core::{
  ApiError,
  api::{BeneficiaryApi, ExportFormat, FilterKey, ListQuery},
  beneficiary::Beneficiary,
  list::ListController,
};
use serde_json::{Map, Value, json};
use tokio::{net::TcpListener, sync::RwLock};

// ─── Mock server ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Store {
  records:      Vec<Value>,
  next_id:      i64,
  fail_exports: bool,
  last_query:   HashMap<String, String>,
}

type Db = Arc<RwLock<Store>>;
type Reply = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
  (status, Json(json!({ "error": message })))
}

fn not_found() -> (StatusCode, Json<Value>) {
  error(StatusCode::NOT_FOUND, "Beneficiário não encontrado")
}

fn app(db: Db) -> Router {
  Router::new()
    .route("/api/beneficiarios", get(list).post(create))
    .route(
      "/api/beneficiarios/{id}",
      get(fetch).put(update).delete(remove),
    )
    .route("/api/beneficiarios/{id}/historico", get(history))
    .route("/api/beneficiarios/export/{format}", get(export))
    .with_state(db)
}

fn matches(record: &Value, query: &HashMap<String, String>) -> bool {
  let text = |key: &str| record[key].as_str().unwrap_or_default().to_lowercase();
  if let Some(name) = query.get("nome") {
    if !text("nome_completo").contains(&name.to_lowercase()) {
      return false;
    }
  }
  if let Some(status) = query.get("situacao") {
    if record["situacao_cadastral"] != status.as_str() {
      return false;
    }
  }
  if let Some(kind) = query.get("tipo") {
    if record["tipo_beneficiario"] != kind.as_str() {
      return false;
    }
  }
  true
}

async fn list(State(db): State<Db>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
  let mut store = db.write().await;
  store.last_query = query.clone();

  let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
  let per_page: usize = query.get("per_page").and_then(|p| p.parse().ok()).unwrap_or(10);
  let hits: Vec<&Value> = store
    .records
    .iter()
    .filter(|r| r["ativo"] == true && matches(r, &query))
    .collect();
  let total = hits.len();
  let items: Vec<Value> = hits
    .into_iter()
    .skip((page - 1) * per_page)
    .take(per_page)
    .cloned()
    .collect();

  Json(json!({
    "beneficiarios": items,
    "current_page": page,
    "per_page": per_page,
    "total": total,
    "pages": total.div_ceil(per_page),
  }))
}

async fn fetch(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
  let store = db.read().await;
  store
    .records
    .iter()
    .find(|r| r["id"] == id)
    .map(|r| (StatusCode::OK, Json(r.clone())))
    .ok_or_else(not_found)
}

async fn create(State(db): State<Db>, Json(body): Json<Map<String, Value>>) -> Reply {
  let mut store = db.write().await;
  if store.records.iter().any(|r| Some(&r["cpf"]) == body.get("cpf")) {
    return Err(error(StatusCode::BAD_REQUEST, "CPF já cadastrado"));
  }
  store.next_id += 1;
  let id = store.next_id;

  let mut record = body;
  record.insert("id".into(), json!(id));
  record.insert("matricula".into(), json!(format!("BEN{id:06}")));
  record.insert("ativo".into(), json!(true));
  record.insert("data_criacao".into(), json!("2024-03-01T10:15:00"));
  let record = Value::Object(record);
  store.records.push(record.clone());
  Ok((StatusCode::CREATED, Json(record)))
}

async fn update(
  State(db): State<Db>,
  Path(id): Path<i64>,
  Json(body): Json<Map<String, Value>>,
) -> Reply {
  let mut store = db.write().await;
  let record = store
    .records
    .iter_mut()
    .find(|r| r["id"] == id)
    .ok_or_else(not_found)?;
  if let Value::Object(fields) = record {
    fields.extend(body);
  }
  Ok((StatusCode::OK, Json(record.clone())))
}

async fn remove(
  State(db): State<Db>,
  Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
  let mut store = db.write().await;
  let record = store
    .records
    .iter_mut()
    .find(|r| r["id"] == id && r["ativo"] == true)
    .ok_or_else(not_found)?;
  record["ativo"] = json!(false);
  Ok(StatusCode::NO_CONTENT)
}

async fn history(Path(id): Path<i64>) -> Json<Value> {
  Json(json!([
    {
      "id": 1,
      "beneficiario_id": id,
      "campo_alterado": "cidade",
      "valor_antigo": "Santos",
      "valor_novo": "Campinas",
      "data_alteracao": "2024-03-02T09:00:00",
      "usuario_alteracao": "Sistema"
    },
    {
      "id": 2,
      "beneficiario_id": id,
      "campo_alterado": "telefone_fixo",
      "valor_antigo": null,
      "valor_novo": "(11) 3333-4444",
      "data_alteracao": null,
      "usuario_alteracao": null
    }
  ]))
}

async fn export(
  State(db): State<Db>,
  Path(format): Path<String>,
  Query(query): Query<HashMap<String, String>>,
) -> Response {
  let mut store = db.write().await;
  store.last_query = query.clone();
  if store.fail_exports {
    return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" }))).into_response();
  }

  let body = match format.as_str() {
    "csv" => {
      let mut csv = String::from("id,nome_completo\n");
      for r in store.records.iter().filter(|r| matches(r, &query)) {
        csv.push_str(&format!("{},{}\n", r["id"], r["nome_completo"].as_str().unwrap_or_default()));
      }
      csv.into_bytes()
    }
    "pdf" => b"%PDF-1.4\n%%EOF\n".to_vec(),
    _ => return StatusCode::NOT_FOUND.into_response(),
  };
  let content_type = if format == "csv" { "text/csv" } else { "application/pdf" };
  ([(header::CONTENT_TYPE, content_type)], body).into_response()
}

fn seeded(id: i64, name: &str, cpf: &str, status: &str) -> Value {
  json!({
    "id": id,
    "matricula": format!("BEN{id:06}"),
    "ativo": true,
    "nome_completo": name,
    "cpf": cpf,
    "email": "seed@example.com",
    "situacao_cadastral": status,
    "tipo_beneficiario": "Titular",
    "telefone_fixo": null,
    "data_criacao": "2024-01-15T14:30:00",
  })
}

async fn spawn(records: Vec<Value>) -> (String, Db) {
  let next_id = records.len() as i64;
  let db: Db = Arc::new(RwLock::new(Store {
    records,
    next_id,
    ..Store::default()
  }));
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  let router = app(db.clone());
  tokio::spawn(async move { axum::serve(listener, router).await });
  (format!("http://{addr}"), db)
}

fn client(base_url: &str, download_dir: &std::path::Path) -> ApiClient {
  ApiClient::new(ApiConfig {
    base_url: base_url.to_owned(),
    download_dir: download_dir.to_owned(),
    ..ApiConfig::default()
  })
  .unwrap()
}

fn query(page: u32, per_page: u32, filters: Vec<(&'static str, String)>) -> ListQuery {
  ListQuery {
    filters,
    page,
    per_page,
  }
}

// ─── CRUD ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get() {
  let (url, _db) = spawn(Vec::new()).await;
  let dir = tempfile::tempdir().unwrap();
  let api = client(&url, dir.path());

  let mut draft = Beneficiary::draft();
  draft.full_name = "Maria da Silva".into();
  draft.cpf = "123.456.789-01".into();
  draft.email = "maria@example.com".into();

  let created = api.create(&draft.submission()).await.unwrap();
  let id = created.id.expect("server assigns an id");
  assert_eq!(created.registration.as_deref(), Some("BEN000001"));

  let fetched = api.get(id).await.unwrap();
  assert_eq!(fetched.full_name, "Maria da Silva");
  assert_eq!(fetched.nationality, "Brasileira");
  assert_eq!(fetched.status, "Ativo");
  assert_eq!(fetched.created_display(), "01/03/2024 10:15");
}

#[tokio::test]
async fn server_error_message_passes_through() {
  let (url, _db) = spawn(vec![seeded(1, "Ana", "111.111.111-11", "Ativo")]).await;
  let dir = tempfile::tempdir().unwrap();
  let api = client(&url, dir.path());

  let mut body = Map::new();
  body.insert("nome_completo".into(), json!("Outra Ana"));
  body.insert("cpf".into(), json!("111.111.111-11"));
  body.insert("email".into(), json!("ana@example.com"));

  let err = api.create(&body).await.unwrap_err();
  assert_eq!(err.status(), Some(400));
  assert_eq!(err.to_string(), "CPF já cadastrado");

  let err = api.get(404).await.unwrap_err();
  assert_eq!(err.status(), Some(404));
  assert_eq!(err.to_string(), "Beneficiário não encontrado");
}

#[tokio::test]
async fn lenient_wire_values() {
  let mut record = seeded(3, "Bruno", "222.222.222-22", "Ativo");
  record["tipo_beneficiario"] = json!("Dependente");
  record["id_titular"] = json!(1);
  record["data_nascimento"] = json!("1990-05-10T00:00:00");
  let (url, _db) = spawn(vec![record]).await;
  let dir = tempfile::tempdir().unwrap();
  let api = client(&url, dir.path());

  let mut fetched = api.get(3).await.unwrap();
  assert_eq!(fetched.policyholder_id, "1");
  assert_eq!(fetched.landline, "");
  assert!(fetched.is_dependent());
  fetched.truncate_dates();
  assert_eq!(fetched.birth_date, "1990-05-10");
}

#[tokio::test]
async fn update_merges_fields() {
  let (url, db) = spawn(vec![seeded(1, "Ana", "111.111.111-11", "Ativo")]).await;
  let dir = tempfile::tempdir().unwrap();
  let api = client(&url, dir.path());

  let mut record = api.get(1).await.unwrap();
  record.city = "Campinas".into();
  let stored = api.update(1, &record.submission()).await.unwrap();
  assert_eq!(stored.city, "Campinas");
  assert_eq!(db.read().await.records[0]["cidade"], "Campinas");

  let err = api.update(9, &record.submission()).await.unwrap_err();
  assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn delete_is_bodiless_and_logical() {
  let (url, db) = spawn(vec![
    seeded(1, "Ana", "111.111.111-11", "Ativo"),
    seeded(2, "Bruno", "222.222.222-22", "Ativo"),
  ])
  .await;
  let dir = tempfile::tempdir().unwrap();
  let api = client(&url, dir.path());

  api.delete(2).await.unwrap();
  assert_eq!(db.read().await.records.len(), 2);

  let page = api.list(&query(1, 10, Vec::new())).await.unwrap();
  assert_eq!(page.items.len(), 1);
  assert_eq!(page.total, Some(1));

  let err = api.delete(2).await.unwrap_err();
  assert_eq!(err.status(), Some(404));
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_sends_paging_and_filters() {
  let records = (1..=12)
    .map(|i| {
      let status = if i % 4 == 0 { "Suspenso" } else { "Ativo" };
      seeded(i, &format!("Pessoa {i}"), &format!("{i:011}"), status)
    })
    .collect();
  let (url, db) = spawn(records).await;
  let dir = tempfile::tempdir().unwrap();
  let api = client(&url, dir.path());

  let page = api
    .list(&query(2, 5, vec![("situacao", "Ativo".to_owned())]))
    .await
    .unwrap();
  assert_eq!(page.current_page, Some(2));
  assert_eq!(page.per_page, Some(5));
  assert_eq!(page.total, Some(9));
  assert_eq!(page.pages, Some(2));
  assert_eq!(page.items.len(), 4);

  let sent = db.read().await.last_query.clone();
  assert_eq!(sent.get("page").map(String::as_str), Some("2"));
  assert_eq!(sent.get("per_page").map(String::as_str), Some("5"));
  assert_eq!(sent.get("situacao").map(String::as_str), Some("Ativo"));
  assert!(!sent.contains_key("nome"));
}

#[tokio::test]
async fn list_controller_over_http() {
  let records = (1..=11)
    .map(|i| seeded(i, &format!("Pessoa {i}"), &format!("{i:011}"), "Ativo"))
    .collect();
  let (url, db) = spawn(records).await;
  let dir = tempfile::tempdir().unwrap();
  let mut list = ListController::new(client(&url, dir.path()), 10);

  list.fetch().await;
  assert_eq!(list.state().pagination.pages, 2);
  assert!(list.next_page().await);
  assert_eq!(list.state().items.len(), 1);

  // Deleting the only record on page 2 sends the list back to page 1.
  assert!(list.request_delete(11));
  assert!(list.confirm_delete().await);
  assert_eq!(list.state().pagination.page, 1);
  assert_eq!(list.state().items.len(), 10);

  list.set_filter(FilterKey::Name, "pessoa 1");
  list.search().await;
  assert_eq!(
    db.read().await.last_query.get("nome").map(String::as_str),
    Some("pessoa 1")
  );
  // "Pessoa 1" and "Pessoa 10"; 11 is deleted.
  assert_eq!(list.state().pagination.total, 2);
}

#[tokio::test]
async fn history_entries_decode() {
  let (url, _db) = spawn(Vec::new()).await;
  let dir = tempfile::tempdir().unwrap();
  let api = client(&url, dir.path());

  let entries = api.history(7).await.unwrap();
  assert_eq!(entries.len(), 2);
  assert_eq!(entries[0].beneficiary_id, 7);
  assert_eq!(entries[0].changed_field, "cidade");
  assert_eq!(entries[0].changed_at_display(), "02/03/2024 09:00");
  assert_eq!(entries[1].old_value, None);
  assert_eq!(entries[1].changed_at_display(), "-");
}

// ─── Exports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn csv_export_is_written_to_download_dir() {
  let (url, db) = spawn(vec![
    seeded(1, "Ana", "111.111.111-11", "Ativo"),
    seeded(2, "Bruno", "222.222.222-22", "Suspenso"),
  ])
  .await;
  let dir = tempfile::tempdir().unwrap();
  let downloads = dir.path().join("exports");
  let api = client(&url, &downloads);

  let path = api
    .export(ExportFormat::Csv, &[("situacao", "Suspenso".to_owned())])
    .await
    .unwrap();
  assert_eq!(path.parent(), Some(downloads.as_path()));
  let name = path.file_name().unwrap().to_str().unwrap();
  assert!(name.starts_with("beneficiarios_") && name.ends_with(".csv"), "{name}");

  let contents = std::fs::read_to_string(&path).unwrap();
  assert_eq!(contents, "id,nome_completo\n2,Bruno\n");
  assert_eq!(
    db.read().await.last_query.get("situacao").map(String::as_str),
    Some("Suspenso")
  );
}

#[tokio::test]
async fn pdf_export_keeps_raw_bytes() {
  let (url, _db) = spawn(Vec::new()).await;
  let dir = tempfile::tempdir().unwrap();
  let api = client(&url, dir.path());

  let path = api.export(ExportFormat::Pdf, &[]).await.unwrap();
  assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
  assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4\n%%EOF\n");
}

#[tokio::test]
async fn failed_export_reports_status_only() {
  let (url, db) = spawn(Vec::new()).await;
  db.write().await.fail_exports = true;
  let dir = tempfile::tempdir().unwrap();
  let api = client(&url, dir.path());

  let err = api.export(ExportFormat::Csv, &[]).await.unwrap_err();
  assert_eq!(err.to_string(), "HTTP error! status: 500");
  assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

// ─── Reachability ────────────────────────────────────────────────────────────

#[tokio::test]
async fn ping_reports_reachability() {
  let (url, _db) = spawn(Vec::new()).await;
  let dir = tempfile::tempdir().unwrap();
  assert!(client(&url, dir.path()).ping().await);

  let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
  let addr = closed.local_addr().unwrap();
  drop(closed);

  let api = client(&format!("http://{addr}"), dir.path());
  assert!(!api.ping().await);
  let err = api.get(1).await.unwrap_err();
  assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
}
