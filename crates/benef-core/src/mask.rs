//! Display masks for CPF, CEP and phone inputs.
//!
//! Masks are display transforms only: each one strips every non-digit
//! character, then reinserts separators progressively as digits accumulate.
//! Digits beyond the mask's capacity are dropped. Validation always works on
//! [`digits`], never on the masked text.

/// The masks the form applies on every keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mask {
  /// `###.###.###-##`
  Cpf,
  /// `#####-###`
  Cep,
  /// `(##) ####-####` or `(##) #####-####`
  Phone,
}

impl Mask {
  pub fn apply(self, value: &str) -> String {
    match self {
      Self::Cpf => cpf(value),
      Self::Cep => cep(value),
      Self::Phone => phone(value),
    }
  }
}

/// The ASCII digits of `value`, in order.
pub fn digits(value: &str) -> String {
  value.chars().filter(char::is_ascii_digit).collect()
}

/// Mask a CPF as `###.###.###-##`.
pub fn cpf(value: &str) -> String {
  let d = digits(value);
  let d = &d[..d.len().min(11)];

  let mut out = String::with_capacity(14);
  for (i, c) in d.chars().enumerate() {
    match i {
      3 | 6 => out.push('.'),
      9 => out.push('-'),
      _ => {}
    }
    out.push(c);
  }
  out
}

/// Mask a CEP as `#####-###`.
pub fn cep(value: &str) -> String {
  let d = digits(value);
  let d = &d[..d.len().min(8)];

  if d.len() > 5 {
    format!("{}-{}", &d[..5], &d[5..])
  } else {
    d.to_owned()
  }
}

/// Mask a phone number with a two-digit area code.
///
/// Eight local digits produce `(##) ####-####`; nine or more produce
/// `(##) #####-####`. Fewer than eight local digits are shown unsplit.
pub fn phone(value: &str) -> String {
  let d = digits(value);
  if d.len() <= 2 {
    return d;
  }

  let (area, local) = d.split_at(2);
  let local = match local.len() {
    0..=7 => local.to_owned(),
    8 => format!("{}-{}", &local[..4], &local[4..]),
    _ => format!("{}-{}", &local[..5], &local[5..9]),
  };
  format!("({area}) {local}")
}
