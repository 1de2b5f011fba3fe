//! Closed value sets offered by the registration form's selectors.
//!
//! Each enum serialises to the exact wire string the REST API stores, so the
//! flat form record can keep plain strings and still round-trip through
//! these types with [`std::str::FromStr`].

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, VariantNames};

/// Registration status of a beneficiary.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  VariantNames,
)]
pub enum Status {
  #[default]
  #[serde(rename = "Ativo")]
  #[strum(serialize = "Ativo")]
  Active,
  #[serde(rename = "Suspenso")]
  #[strum(serialize = "Suspenso")]
  Suspended,
  #[serde(rename = "Cancelado")]
  #[strum(serialize = "Cancelado")]
  Canceled,
  #[serde(rename = "Inativo")]
  #[strum(serialize = "Inativo")]
  Inactive,
}

impl Status {
  /// Whether cancellation date and reason are relevant for this status.
  pub fn is_terminated(self) -> bool { matches!(self, Self::Canceled | Self::Inactive) }
}

/// Whether a beneficiary holds the plan or is enrolled under someone who does.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  VariantNames,
)]
pub enum BeneficiaryKind {
  #[default]
  #[serde(rename = "Titular")]
  #[strum(serialize = "Titular")]
  Policyholder,
  #[serde(rename = "Dependente")]
  #[strum(serialize = "Dependente")]
  Dependent,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumIter, EnumString, VariantNames,
)]
pub enum Sex {
  #[strum(serialize = "M")]
  Male,
  #[strum(serialize = "F")]
  Female,
  #[strum(serialize = "Outro")]
  Other,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumIter, EnumString, VariantNames,
)]
pub enum MaritalStatus {
  #[strum(serialize = "Solteiro")]
  Single,
  #[strum(serialize = "Casado")]
  Married,
  #[strum(serialize = "Divorciado")]
  Divorced,
  #[strum(serialize = "Viúvo")]
  Widowed,
  #[strum(serialize = "União Estável")]
  DomesticPartnership,
}

/// Relationship of a dependent to the policyholder.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumIter, EnumString, VariantNames,
)]
pub enum Relationship {
  #[strum(serialize = "Cônjuge")]
  Spouse,
  #[strum(serialize = "Companheiro(a)")]
  Partner,
  #[strum(serialize = "Filho(a)")]
  Child,
  #[strum(serialize = "Enteado(a)")]
  Stepchild,
  #[strum(serialize = "Pai")]
  Father,
  #[strum(serialize = "Mãe")]
  Mother,
  #[strum(serialize = "Sogro(a)")]
  ParentInLaw,
  #[strum(serialize = "Irmão(ã)")]
  Sibling,
  #[strum(serialize = "Neto(a)")]
  Grandchild,
  #[strum(serialize = "Avô/Avó")]
  Grandparent,
}

/// Brazilian state codes offered by the address form.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumIter, EnumString, VariantNames,
)]
pub enum StateCode {
  SP,
  RJ,
  MG,
  RS,
  PR,
  SC,
  BA,
  GO,
  PE,
  CE,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumIter, EnumString, VariantNames,
)]
pub enum Plan {
  #[strum(serialize = "Plano Básico")]
  Basic,
  #[strum(serialize = "Plano Premium")]
  Premium,
  #[strum(serialize = "Plano Executivo")]
  Executive,
  #[strum(serialize = "Plano Familiar")]
  Family,
}

/// Step through `options` from `current`, wrapping around and passing through
/// the empty "not selected" slot when `allow_empty` is set.
pub fn cycle(
  options: &[&'static str],
  current: &str,
  forward: bool,
  allow_empty: bool,
) -> String {
  let mut slots: Vec<&str> = Vec::with_capacity(options.len() + 1);
  if allow_empty {
    slots.push("");
  }
  slots.extend_from_slice(options);
  if slots.is_empty() {
    return current.to_owned();
  }

  let next = match slots.iter().position(|s| *s == current) {
    Some(i) if forward => (i + 1) % slots.len(),
    Some(i) => (i + slots.len() - 1) % slots.len(),
    None => 0,
  };
  slots[next].to_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wire_strings_round_trip() {
    assert_eq!(Status::Canceled.as_ref(), "Cancelado");
    assert_eq!("Dependente".parse::<BeneficiaryKind>().unwrap(), BeneficiaryKind::Dependent);
    assert_eq!(MaritalStatus::DomesticPartnership.to_string(), "União Estável");
    assert!("Ativa".parse::<Status>().is_err());
  }

  #[test]
  fn serde_uses_wire_strings() {
    let json = serde_json::to_string(&Status::Suspended).unwrap();
    assert_eq!(json, "\"Suspenso\"");
  }

  #[test]
  fn cycle_wraps_through_empty_slot() {
    let opts = BeneficiaryKind::VARIANTS;
    assert_eq!(cycle(opts, "Titular", true, false), "Dependente");
    assert_eq!(cycle(opts, "Dependente", true, false), "Titular");
    assert_eq!(cycle(opts, "Titular", false, false), "Dependente");

    assert_eq!(cycle(Sex::VARIANTS, "", true, true), "M");
    assert_eq!(cycle(Sex::VARIANTS, "Outro", true, true), "");
    assert_eq!(cycle(Sex::VARIANTS, "garbage", true, true), "");
  }
}
