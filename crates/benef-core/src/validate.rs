//! Client-side validation of a beneficiary record.
//!
//! [`validate`] is pure and total: it evaluates every rule against the
//! record and reports at most one message per field. A record may be
//! submitted only when the returned map is empty.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;

use crate::{
  beneficiary::Beneficiary,
  field::{Field, REQUIRED},
  mask,
};

pub const MSG_REQUIRED: &str = "This field is required";
pub const MSG_CPF: &str = "CPF must have 11 digits";
pub const MSG_EMAIL: &str = "Invalid email";
pub const MSG_CEP: &str = "CEP must have 8 digits";
pub const MSG_RELATIONSHIP: &str = "Relationship is required for dependents";
pub const MSG_POLICYHOLDER: &str = "Policyholder is required for dependents";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid")
});

/// Validation messages keyed by field.
pub type FieldErrors = BTreeMap<Field, String>;

pub fn validate(record: &Beneficiary) -> FieldErrors {
  let mut errors = FieldErrors::new();

  for field in REQUIRED {
    if record.get(field).trim().is_empty() {
      errors.insert(field, MSG_REQUIRED.to_owned());
    }
  }

  if !record.cpf.is_empty() && mask::digits(&record.cpf).len() != 11 {
    errors.insert(Field::Cpf, MSG_CPF.to_owned());
  }

  if !record.email.is_empty() && !EMAIL.is_match(&record.email) {
    errors.insert(Field::Email, MSG_EMAIL.to_owned());
  }

  if !record.cep.is_empty() && mask::digits(&record.cep).len() != 8 {
    errors.insert(Field::Cep, MSG_CEP.to_owned());
  }

  if record.is_dependent() {
    if record.relationship.is_empty() {
      errors.insert(Field::Relationship, MSG_RELATIONSHIP.to_owned());
    }
    if record.policyholder_id.is_empty() {
      errors.insert(Field::PolicyholderId, MSG_POLICYHOLDER.to_owned());
    }
  }

  errors
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  /// A record that passes every rule.
  pub(crate) fn complete() -> Beneficiary {
    let mut b = Beneficiary::draft();
    b.full_name = "Maria da Silva".into();
    b.birth_date = "1990-05-10".into();
    b.sex = "F".into();
    b.cpf = "123.456.789-01".into();
    b.rg = "123456789".into();
    b.rg_issuer = "SSP".into();
    b.rg_issue_date = "2008-02-01".into();
    b.mother_name = "Ana da Silva".into();
    b.marital_status = "Casado".into();
    b.street = "Avenida Paulista".into();
    b.street_number = "1000".into();
    b.neighborhood = "Bela Vista".into();
    b.city = "São Paulo".into();
    b.state_code = "SP".into();
    b.cep = "01310-100".into();
    b.mobile = "(11) 98765-4321".into();
    b.email = "maria@example.com".into();
    b.plan = "Plano Básico".into();
    b.coverage_start = "2024-01-01".into();
    b.card_number = "CARD-00001".into();
    b.enrollment_date = "2024-01-01".into();
    b
  }

  #[test]
  fn complete_record_is_valid() {
    assert!(validate(&complete()).is_empty());
  }

  #[test]
  fn each_missing_required_field_is_reported_alone() {
    for field in REQUIRED {
      let mut b = complete();
      b.set(field, "");
      let errors = validate(&b);
      assert_eq!(errors.len(), 1, "{field:?}: {errors:?}");
      assert_eq!(errors[&field], MSG_REQUIRED);
    }
  }

  #[test]
  fn whitespace_only_counts_as_missing() {
    let mut b = complete();
    b.city = "   ".into();
    assert_eq!(validate(&b)[&Field::City], MSG_REQUIRED);
  }

  #[test]
  fn cpf_needs_eleven_digits() {
    let mut b = complete();
    b.cpf = "123.456.789-0".into();
    assert_eq!(validate(&b)[&Field::Cpf], MSG_CPF);
    b.cpf = "12345678901".into();
    assert!(validate(&b).is_empty());
  }

  #[test]
  fn email_shape() {
    let mut b = complete();
    for bad in ["maria", "maria@example", "@.", "maria@.com"] {
      b.email = bad.into();
      assert_eq!(validate(&b).get(&Field::Email).map(String::as_str), Some(MSG_EMAIL), "{bad}");
    }
    b.email = "a@b.c".into();
    assert!(validate(&b).is_empty());
  }

  #[test]
  fn cep_needs_eight_digits() {
    let mut b = complete();
    b.cep = "0131-010".into();
    assert_eq!(validate(&b)[&Field::Cep], MSG_CEP);
    b.cep = "01310100".into();
    assert!(validate(&b).is_empty());
  }

  #[test]
  fn dependent_requires_relationship_and_policyholder() {
    let mut b = complete();
    b.kind = "Dependente".into();
    let errors = validate(&b);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[&Field::Relationship], MSG_RELATIONSHIP);
    assert_eq!(errors[&Field::PolicyholderId], MSG_POLICYHOLDER);

    b.relationship = "Filho(a)".into();
    b.policyholder_id = "12".into();
    assert!(validate(&b).is_empty());
  }

  #[test]
  fn policyholder_ignores_dependent_fields() {
    let b = complete();
    assert!(b.relationship.is_empty());
    assert!(validate(&b).is_empty());
  }
}
