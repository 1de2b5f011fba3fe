//! The beneficiary record and the other payloads the REST API returns.
//!
//! [`Beneficiary`] is a flat record of strings: every editable field holds
//! exactly what the user typed (or what the server sent), and the empty
//! string means "not filled in". Server-assigned fields are kept alongside
//! but are never part of a submission.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};

use crate::{
  choice::{BeneficiaryKind, Status},
  field::{ALWAYS_SENT, DATES, Field},
};

/// Nationality pre-filled on new records.
pub const DEFAULT_NATIONALITY: &str = "Brasileira";

// ─── Record ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Beneficiary {
  // Server-assigned.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id:         Option<i64>,
  #[serde(rename = "matricula", skip_serializing_if = "Option::is_none")]
  pub registration: Option<String>,
  #[serde(rename = "data_criacao", skip_serializing_if = "Option::is_none")]
  pub created_at: Option<String>,
  #[serde(rename = "data_atualizacao", skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<String>,
  #[serde(rename = "ativo", skip_serializing_if = "Option::is_none")]
  pub active:     Option<bool>,

  // Identity.
  #[serde(rename = "nome_completo", deserialize_with = "lenient")]
  pub full_name:       String,
  #[serde(rename = "data_nascimento", deserialize_with = "lenient")]
  pub birth_date:      String,
  #[serde(rename = "sexo", deserialize_with = "lenient")]
  pub sex:             String,
  #[serde(deserialize_with = "lenient")]
  pub cpf:             String,
  #[serde(deserialize_with = "lenient")]
  pub rg:              String,
  #[serde(rename = "orgao_emissor_rg", deserialize_with = "lenient")]
  pub rg_issuer:       String,
  #[serde(rename = "data_emissao_rg", deserialize_with = "lenient")]
  pub rg_issue_date:   String,
  #[serde(rename = "nome_mae", deserialize_with = "lenient")]
  pub mother_name:     String,
  #[serde(rename = "estado_civil", deserialize_with = "lenient")]
  pub marital_status:  String,
  #[serde(rename = "nacionalidade", deserialize_with = "lenient")]
  pub nationality:     String,

  // Address.
  #[serde(rename = "logradouro", deserialize_with = "lenient")]
  pub street:          String,
  #[serde(rename = "numero_endereco", deserialize_with = "lenient")]
  pub street_number:   String,
  #[serde(rename = "complemento_endereco", deserialize_with = "lenient")]
  pub complement:      String,
  #[serde(rename = "bairro", deserialize_with = "lenient")]
  pub neighborhood:    String,
  #[serde(rename = "cidade", deserialize_with = "lenient")]
  pub city:            String,
  #[serde(rename = "uf", deserialize_with = "lenient")]
  pub state_code:      String,
  #[serde(deserialize_with = "lenient")]
  pub cep:             String,

  // Contact.
  #[serde(rename = "telefone_fixo", deserialize_with = "lenient")]
  pub landline:        String,
  #[serde(rename = "telefone_celular", deserialize_with = "lenient")]
  pub mobile:          String,
  #[serde(deserialize_with = "lenient")]
  pub email:           String,

  // Plan membership.
  #[serde(rename = "plano_saude_vinculado", deserialize_with = "lenient")]
  pub plan:                String,
  #[serde(rename = "data_inicio_cobertura", deserialize_with = "lenient")]
  pub coverage_start:      String,
  #[serde(rename = "data_termino_cobertura", deserialize_with = "lenient")]
  pub coverage_end:        String,
  #[serde(rename = "situacao_cadastral", deserialize_with = "lenient")]
  pub status:              String,
  #[serde(rename = "tipo_beneficiario", deserialize_with = "lenient")]
  pub kind:                String,
  #[serde(rename = "grau_parentesco", deserialize_with = "lenient")]
  pub relationship:        String,
  #[serde(rename = "id_titular", deserialize_with = "lenient")]
  pub policyholder_id:     String,
  #[serde(rename = "numero_carteira_plano", deserialize_with = "lenient")]
  pub card_number:         String,
  #[serde(rename = "data_adesao_plano", deserialize_with = "lenient")]
  pub enrollment_date:     String,
  #[serde(rename = "data_cancelamento_plano", deserialize_with = "lenient")]
  pub cancellation_date:   String,
  #[serde(rename = "motivo_cancelamento", deserialize_with = "lenient")]
  pub cancellation_reason: String,
}

impl Beneficiary {
  /// A blank record as the form starts it in create mode.
  pub fn draft() -> Self {
    Self {
      status: Status::Active.to_string(),
      kind: BeneficiaryKind::Policyholder.to_string(),
      nationality: DEFAULT_NATIONALITY.to_owned(),
      ..Self::default()
    }
  }

  pub fn get(&self, field: Field) -> &str {
    match field {
      Field::FullName => &self.full_name,
      Field::BirthDate => &self.birth_date,
      Field::Sex => &self.sex,
      Field::Cpf => &self.cpf,
      Field::Rg => &self.rg,
      Field::RgIssuer => &self.rg_issuer,
      Field::RgIssueDate => &self.rg_issue_date,
      Field::MotherName => &self.mother_name,
      Field::MaritalStatus => &self.marital_status,
      Field::Nationality => &self.nationality,
      Field::Street => &self.street,
      Field::StreetNumber => &self.street_number,
      Field::Complement => &self.complement,
      Field::Neighborhood => &self.neighborhood,
      Field::City => &self.city,
      Field::StateCode => &self.state_code,
      Field::Cep => &self.cep,
      Field::Landline => &self.landline,
      Field::Mobile => &self.mobile,
      Field::Email => &self.email,
      Field::Plan => &self.plan,
      Field::CoverageStart => &self.coverage_start,
      Field::CoverageEnd => &self.coverage_end,
      Field::Status => &self.status,
      Field::Kind => &self.kind,
      Field::Relationship => &self.relationship,
      Field::PolicyholderId => &self.policyholder_id,
      Field::CardNumber => &self.card_number,
      Field::EnrollmentDate => &self.enrollment_date,
      Field::CancellationDate => &self.cancellation_date,
      Field::CancellationReason => &self.cancellation_reason,
    }
  }

  fn slot_mut(&mut self, field: Field) -> &mut String {
    match field {
      Field::FullName => &mut self.full_name,
      Field::BirthDate => &mut self.birth_date,
      Field::Sex => &mut self.sex,
      Field::Cpf => &mut self.cpf,
      Field::Rg => &mut self.rg,
      Field::RgIssuer => &mut self.rg_issuer,
      Field::RgIssueDate => &mut self.rg_issue_date,
      Field::MotherName => &mut self.mother_name,
      Field::MaritalStatus => &mut self.marital_status,
      Field::Nationality => &mut self.nationality,
      Field::Street => &mut self.street,
      Field::StreetNumber => &mut self.street_number,
      Field::Complement => &mut self.complement,
      Field::Neighborhood => &mut self.neighborhood,
      Field::City => &mut self.city,
      Field::StateCode => &mut self.state_code,
      Field::Cep => &mut self.cep,
      Field::Landline => &mut self.landline,
      Field::Mobile => &mut self.mobile,
      Field::Email => &mut self.email,
      Field::Plan => &mut self.plan,
      Field::CoverageStart => &mut self.coverage_start,
      Field::CoverageEnd => &mut self.coverage_end,
      Field::Status => &mut self.status,
      Field::Kind => &mut self.kind,
      Field::Relationship => &mut self.relationship,
      Field::PolicyholderId => &mut self.policyholder_id,
      Field::CardNumber => &mut self.card_number,
      Field::EnrollmentDate => &mut self.enrollment_date,
      Field::CancellationDate => &mut self.cancellation_date,
      Field::CancellationReason => &mut self.cancellation_reason,
    }
  }

  pub fn set(&mut self, field: Field, value: impl Into<String>) {
    *self.slot_mut(field) = value.into();
  }

  pub fn status(&self) -> Option<Status> { self.status.parse().ok() }

  pub fn kind(&self) -> Option<BeneficiaryKind> { self.kind.parse().ok() }

  pub fn is_dependent(&self) -> bool { self.kind() == Some(BeneficiaryKind::Dependent) }

  /// Cut every date field down to its calendar-date part, e.g.
  /// `1990-05-10T00:00:00Z` becomes `1990-05-10`.
  pub fn truncate_dates(&mut self) {
    for field in DATES {
      let slot = self.slot_mut(field);
      if let Some(idx) = slot.find('T') {
        slot.truncate(idx);
      }
    }
  }

  /// The JSON body sent on create/update: every editable field, minus
  /// empty optional ones. Full name, CPF and email are always sent.
  pub fn submission(&self) -> Map<String, Value> {
    Field::all()
      .filter(|f| !self.get(*f).is_empty() || ALWAYS_SENT.contains(f))
      .map(|f| (f.key().to_owned(), Value::String(self.get(f).to_owned())))
      .collect()
  }

  /// Creation timestamp as `dd/mm/yyyy HH:MM`, or `-` when absent or
  /// unparseable.
  pub fn created_display(&self) -> String {
    self
      .created_at
      .as_deref()
      .and_then(parse_timestamp)
      .map(|ts| ts.format("%d/%m/%Y %H:%M").to_string())
      .unwrap_or_else(|| "-".to_owned())
  }
}

// ─── History ─────────────────────────────────────────────────────────────────

/// One entry of a record's change history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub id:             i64,
  #[serde(rename = "beneficiario_id")]
  pub beneficiary_id: i64,
  #[serde(rename = "campo_alterado")]
  pub changed_field:  String,
  #[serde(rename = "valor_antigo", default)]
  pub old_value:      Option<String>,
  #[serde(rename = "valor_novo", default)]
  pub new_value:      Option<String>,
  #[serde(rename = "data_alteracao", default)]
  pub changed_at:     Option<String>,
  #[serde(rename = "usuario_alteracao", default)]
  pub changed_by:     Option<String>,
}

impl HistoryEntry {
  pub fn changed_at_display(&self) -> String {
    self
      .changed_at
      .as_deref()
      .and_then(parse_timestamp)
      .map(|ts| ts.format("%d/%m/%Y %H:%M").to_string())
      .unwrap_or_else(|| "-".to_owned())
  }
}

// ─── Paging ──────────────────────────────────────────────────────────────────

/// Body of `GET /beneficiarios`. Every counter is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeneficiaryPage {
  #[serde(rename = "beneficiarios")]
  pub items:        Vec<Beneficiary>,
  pub current_page: Option<u32>,
  pub per_page:     Option<u32>,
  pub total:        Option<u64>,
  pub pages:        Option<u32>,
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Accept `null`, strings, numbers and booleans as a string field.
fn lenient<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
  match Option::<Value>::deserialize(d)? {
    None | Some(Value::Null) => Ok(String::new()),
    Some(Value::String(s)) => Ok(s),
    Some(Value::Number(n)) => Ok(n.to_string()),
    Some(Value::Bool(b)) => Ok(b.to_string()),
    Some(other) => Err(de::Error::custom(format!(
      "expected a scalar, found {other}"
    ))),
  }
}

/// Parse the server's ISO-8601 timestamps, with or without an offset.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
  DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.naive_local())
    .ok()
    .or_else(|| raw.parse::<NaiveDateTime>().ok())
}
