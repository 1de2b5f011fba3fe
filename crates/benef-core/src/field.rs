//! The catalogue of editable beneficiary fields.
//!
//! [`Field`] names every input of the registration form. Its string form is
//! the JSON key the REST API uses, which is also the key of the
//! per-field error map.

use strum::{EnumIter, IntoEnumIterator, IntoStaticStr, VariantNames};

use crate::{
  beneficiary::Beneficiary,
  choice::{
    BeneficiaryKind, MaritalStatus, Plan, Relationship, Sex, StateCode, Status,
  },
  mask::Mask,
};

// ─── Sections ────────────────────────────────────────────────────────────────

/// Visual grouping of fields on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
  Personal,
  Address,
  Contact,
  Plan,
}

impl Section {
  pub fn title(self) -> &'static str {
    match self {
      Self::Personal => "Personal data",
      Self::Address => "Address",
      Self::Contact => "Contact",
      Self::Plan => "Health plan",
    }
  }
}

// ─── Field ───────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  EnumIter,
  IntoStaticStr,
)]
pub enum Field {
  #[strum(serialize = "nome_completo")]
  FullName,
  #[strum(serialize = "data_nascimento")]
  BirthDate,
  #[strum(serialize = "sexo")]
  Sex,
  #[strum(serialize = "cpf")]
  Cpf,
  #[strum(serialize = "rg")]
  Rg,
  #[strum(serialize = "orgao_emissor_rg")]
  RgIssuer,
  #[strum(serialize = "data_emissao_rg")]
  RgIssueDate,
  #[strum(serialize = "nome_mae")]
  MotherName,
  #[strum(serialize = "estado_civil")]
  MaritalStatus,
  #[strum(serialize = "nacionalidade")]
  Nationality,

  #[strum(serialize = "logradouro")]
  Street,
  #[strum(serialize = "numero_endereco")]
  StreetNumber,
  #[strum(serialize = "complemento_endereco")]
  Complement,
  #[strum(serialize = "bairro")]
  Neighborhood,
  #[strum(serialize = "cidade")]
  City,
  #[strum(serialize = "uf")]
  StateCode,
  #[strum(serialize = "cep")]
  Cep,

  #[strum(serialize = "telefone_fixo")]
  Landline,
  #[strum(serialize = "telefone_celular")]
  Mobile,
  #[strum(serialize = "email")]
  Email,

  #[strum(serialize = "plano_saude_vinculado")]
  Plan,
  #[strum(serialize = "data_inicio_cobertura")]
  CoverageStart,
  #[strum(serialize = "data_termino_cobertura")]
  CoverageEnd,
  #[strum(serialize = "situacao_cadastral")]
  Status,
  #[strum(serialize = "tipo_beneficiario")]
  Kind,
  #[strum(serialize = "grau_parentesco")]
  Relationship,
  #[strum(serialize = "id_titular")]
  PolicyholderId,
  #[strum(serialize = "numero_carteira_plano")]
  CardNumber,
  #[strum(serialize = "data_adesao_plano")]
  EnrollmentDate,
  #[strum(serialize = "data_cancelamento_plano")]
  CancellationDate,
  #[strum(serialize = "motivo_cancelamento")]
  CancellationReason,
}

/// Fields every record must carry, whatever the form mode.
pub const REQUIRED: [Field; 22] = [
  Field::FullName,
  Field::BirthDate,
  Field::Sex,
  Field::Cpf,
  Field::Rg,
  Field::RgIssuer,
  Field::RgIssueDate,
  Field::MotherName,
  Field::MaritalStatus,
  Field::Street,
  Field::StreetNumber,
  Field::Neighborhood,
  Field::City,
  Field::StateCode,
  Field::Cep,
  Field::Mobile,
  Field::Email,
  Field::Plan,
  Field::CoverageStart,
  Field::Kind,
  Field::CardNumber,
  Field::EnrollmentDate,
];

/// Date-bearing fields. The server may send them with a time suffix; the
/// form keeps only the calendar date.
pub const DATES: [Field; 6] = [
  Field::BirthDate,
  Field::RgIssueDate,
  Field::CoverageStart,
  Field::CoverageEnd,
  Field::EnrollmentDate,
  Field::CancellationDate,
];

/// Fields sent on submit even when empty.
pub const ALWAYS_SENT: [Field; 3] = [Field::FullName, Field::Cpf, Field::Email];

impl Field {
  /// The JSON key of this field.
  pub fn key(self) -> &'static str { self.into() }

  /// All fields in form order.
  pub fn all() -> impl Iterator<Item = Field> { Field::iter() }

  pub fn label(self) -> &'static str {
    match self {
      Self::FullName => "Full name",
      Self::BirthDate => "Birth date",
      Self::Sex => "Sex",
      Self::Cpf => "CPF",
      Self::Rg => "RG",
      Self::RgIssuer => "RG issuer",
      Self::RgIssueDate => "RG issue date",
      Self::MotherName => "Mother's name",
      Self::MaritalStatus => "Marital status",
      Self::Nationality => "Nationality",
      Self::Street => "Street",
      Self::StreetNumber => "Number",
      Self::Complement => "Complement",
      Self::Neighborhood => "Neighborhood",
      Self::City => "City",
      Self::StateCode => "State",
      Self::Cep => "CEP",
      Self::Landline => "Landline",
      Self::Mobile => "Mobile",
      Self::Email => "Email",
      Self::Plan => "Health plan",
      Self::CoverageStart => "Coverage start",
      Self::CoverageEnd => "Coverage end",
      Self::Status => "Status",
      Self::Kind => "Beneficiary type",
      Self::Relationship => "Relationship",
      Self::PolicyholderId => "Policyholder ID",
      Self::CardNumber => "Card number",
      Self::EnrollmentDate => "Enrollment date",
      Self::CancellationDate => "Cancellation date",
      Self::CancellationReason => "Cancellation reason",
    }
  }

  pub fn section(self) -> Section {
    match self {
      Self::FullName
      | Self::BirthDate
      | Self::Sex
      | Self::Cpf
      | Self::Rg
      | Self::RgIssuer
      | Self::RgIssueDate
      | Self::MotherName
      | Self::MaritalStatus
      | Self::Nationality => Section::Personal,
      Self::Street
      | Self::StreetNumber
      | Self::Complement
      | Self::Neighborhood
      | Self::City
      | Self::StateCode
      | Self::Cep => Section::Address,
      Self::Landline | Self::Mobile | Self::Email => Section::Contact,
      _ => Section::Plan,
    }
  }

  pub fn is_required(self) -> bool { REQUIRED.contains(&self) }

  pub fn is_date(self) -> bool { DATES.contains(&self) }

  /// Display mask applied on every keystroke, if any.
  pub fn mask(self) -> Option<Mask> {
    match self {
      Self::Cpf => Some(Mask::Cpf),
      Self::Cep => Some(Mask::Cep),
      Self::Landline | Self::Mobile => Some(Mask::Phone),
      _ => None,
    }
  }

  /// Wire values offered by a selector, or `None` for free-text fields.
  pub fn choices(self) -> Option<&'static [&'static str]> {
    match self {
      Self::Sex => Some(Sex::VARIANTS),
      Self::MaritalStatus => Some(MaritalStatus::VARIANTS),
      Self::StateCode => Some(StateCode::VARIANTS),
      Self::Plan => Some(Plan::VARIANTS),
      Self::Status => Some(Status::VARIANTS),
      Self::Kind => Some(BeneficiaryKind::VARIANTS),
      Self::Relationship => Some(Relationship::VARIANTS),
      _ => None,
    }
  }

  /// Whether the form shows this field for `record`. Dependent-only and
  /// cancellation fields are hidden when they do not apply.
  pub fn is_shown_for(self, record: &Beneficiary) -> bool {
    match self {
      Self::Relationship | Self::PolicyholderId => record.is_dependent(),
      Self::CancellationDate | Self::CancellationReason => {
        record.status().is_some_and(Status::is_terminated)
      }
      _ => true,
    }
  }
}
