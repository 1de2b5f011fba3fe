//! Registration/edit form view-model.
//!
//! [`FormState`] is an immutable snapshot: every transition consumes the
//! state and returns the next one, and the presentation layer only ever
//! reads it. [`FormController`] pairs a state with a [`BeneficiaryApi`] and
//! runs the transitions that need the network (load and submit), each as a
//! synchronous first half and an awaited second half.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
  ApiError,
  api::BeneficiaryApi,
  beneficiary::Beneficiary,
  choice,
  field::Field,
  validate::{FieldErrors, validate},
};

/// How long the success banner stays up before returning to the list.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

// ─── Snapshot ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
  Create,
  Edit(i64),
}

/// The form's feedback line. Loading, success and failure exclude each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Banner {
  #[default]
  None,
  Loading,
  Success(String),
  Failure(String),
}

#[derive(Debug, Clone)]
pub struct FormState {
  pub mode:         FormMode,
  pub record:       Beneficiary,
  pub errors:       FieldErrors,
  pub banner:       Banner,
  /// A create/update request is outstanding; further submits are ignored.
  pub submitting:   bool,
  /// When the record was committed by the server, if it has been.
  pub committed_at: Option<Instant>,
}

impl FormState {
  /// A blank form in create mode.
  pub fn create() -> Self {
    Self {
      mode:         FormMode::Create,
      record:       Beneficiary::draft(),
      errors:       FieldErrors::new(),
      banner:       Banner::None,
      submitting:   false,
      committed_at: None,
    }
  }

  /// An edit-mode form waiting for record `id` to load.
  pub fn loading(id: i64) -> Self {
    Self {
      mode: FormMode::Edit(id),
      banner: Banner::Loading,
      ..Self::create()
    }
  }

  /// Apply the outcome of fetching the record being edited.
  pub fn with_loaded(mut self, result: Result<Beneficiary, ApiError>) -> Self {
    match result {
      Ok(mut record) => {
        record.truncate_dates();
        self.record = record;
        self.banner = Banner::None;
      }
      Err(e) => {
        self.banner = Banner::Failure(format!("Failed to load beneficiary: {e}"));
      }
    }
    self
  }

  /// One keystroke's worth of change to `field`.
  ///
  /// Masked fields are re-masked, the field's error is cleared and any
  /// banner is dropped: editing always rescinds stale feedback.
  pub fn with_edit(mut self, field: Field, value: &str) -> Self {
    let value = match field.mask() {
      Some(mask) => mask.apply(value),
      None => value.to_owned(),
    };
    self.record.set(field, value);
    self.errors.remove(&field);
    self.banner = Banner::None;
    self
  }

  /// Record validation failures. Nothing was sent.
  pub fn with_errors(mut self, errors: FieldErrors) -> Self {
    self.errors = errors;
    self.submitting = false;
    self.banner = Banner::None;
    self
  }

  pub fn begin_submit(mut self) -> Self {
    self.submitting = true;
    self.banner = Banner::Loading;
    self
  }

  /// Apply the outcome of a create/update call that returned at `now`.
  pub fn with_submit_result(
    mut self,
    result: Result<Beneficiary, ApiError>,
    now: Instant,
  ) -> Self {
    self.submitting = false;
    match result {
      Ok(_) => {
        let msg = match self.mode {
          FormMode::Create => "Beneficiary registered successfully!",
          FormMode::Edit(_) => "Beneficiary updated successfully!",
        };
        self.banner = Banner::Success(msg.to_owned());
        self.committed_at = Some(now);
      }
      Err(e) => {
        self.banner = Banner::Failure(format!("Failed to save beneficiary: {e}"));
      }
    }
    self
  }

  /// Whether the presentation layer should now return to the list. Always
  /// `false` before the record has been committed.
  pub fn redirect_due(&self, now: Instant) -> bool {
    self
      .committed_at
      .is_some_and(|at| now.saturating_duration_since(at) >= REDIRECT_DELAY)
  }

  pub fn error(&self, field: Field) -> Option<&str> {
    self.errors.get(&field).map(String::as_str)
  }
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SubmitError {
  #[error("{} field(s) failed validation", .0.len())]
  Invalid(FieldErrors),
  #[error(transparent)]
  Api(#[from] ApiError),
}

/// Validate `record` and, if it passes, create or update it.
///
/// Validation failures never reach the network.
pub async fn submit_record<A: BeneficiaryApi>(
  api: &A,
  mode: FormMode,
  record: &Beneficiary,
) -> Result<Beneficiary, SubmitError> {
  let errors = validate(record);
  if !errors.is_empty() {
    return Err(SubmitError::Invalid(errors));
  }

  let body = record.submission();
  let stored = match mode {
    FormMode::Create => api.create(&body).await?,
    FormMode::Edit(id) => api.update(id, &body).await?,
  };
  Ok(stored)
}

// ─── Controller ──────────────────────────────────────────────────────────────

pub struct FormController<A> {
  api:   A,
  state: FormState,
}

impl<A: BeneficiaryApi> FormController<A> {
  pub fn create(api: A) -> Self {
    Self {
      api,
      state: FormState::create(),
    }
  }

  /// An edit form for record `id` that has not been fetched yet.
  pub fn loading(api: A, id: i64) -> Self {
    Self {
      api,
      state: FormState::loading(id),
    }
  }

  /// Fetch the record being edited. Load failures are reported in the
  /// banner; the form stays usable.
  pub async fn load(&mut self) {
    let FormMode::Edit(id) = self.state.mode else {
      return;
    };
    let result = self.api.get(id).await;
    if let Err(e) = &result {
      warn!(id, error = %e, "loading beneficiary failed");
    }
    self.transition(|s| s.with_loaded(result));
  }

  /// Open record `id` for editing.
  pub async fn edit(api: A, id: i64) -> Self {
    let mut form = Self::loading(api, id);
    form.load().await;
    form
  }

  pub fn state(&self) -> &FormState { &self.state }

  fn transition(&mut self, f: impl FnOnce(FormState) -> FormState) {
    let prev = std::mem::replace(&mut self.state, FormState::create());
    self.state = f(prev);
  }

  pub fn set_field(&mut self, field: Field, value: &str) {
    self.transition(|s| s.with_edit(field, value));
  }

  /// Step a selector field to its next (or previous) option.
  pub fn cycle_choice(&mut self, field: Field, forward: bool) {
    let Some(options) = field.choices() else {
      return;
    };
    let allow_empty = !matches!(field, Field::Status | Field::Kind);
    let next = choice::cycle(
      options,
      self.state.record.get(field),
      forward,
      allow_empty,
    );
    self.set_field(field, &next);
  }

  /// Validate the record and mark a save as outstanding. Returns `false`,
  /// with nothing to send, when a save is already outstanding or done or
  /// when validation fails.
  pub fn begin_submit(&mut self) -> bool {
    if self.state.submitting || self.state.committed_at.is_some() {
      return false;
    }
    let errors = validate(&self.state.record);
    if !errors.is_empty() {
      debug!(count = errors.len(), "form has validation errors");
      self.transition(|s| s.with_errors(errors));
      return false;
    }
    self.transition(FormState::begin_submit);
    true
  }

  /// Send the save started by [`Self::begin_submit`]. Returns `true` once
  /// the server has committed the record.
  pub async fn finish_submit(&mut self) -> bool {
    if !self.state.submitting {
      return false;
    }
    let mode = self.state.mode;
    let outcome = submit_record(&self.api, mode, &self.state.record).await;
    match outcome {
      Ok(stored) => {
        debug!(id = ?stored.id, ?mode, "beneficiary saved");
        let now = Instant::now();
        self.transition(|s| s.with_submit_result(Ok(stored), now));
        true
      }
      Err(SubmitError::Invalid(errors)) => {
        debug!(count = errors.len(), "form has validation errors");
        self.transition(|s| s.with_errors(errors));
        false
      }
      Err(SubmitError::Api(e)) => {
        warn!(?mode, error = %e, "saving beneficiary failed");
        let now = Instant::now();
        self.transition(|s| s.with_submit_result(Err(e), now));
        false
      }
    }
  }

  /// Validate and, if valid, persist the record.
  pub async fn submit(&mut self) -> bool {
    self.begin_submit() && self.finish_submit().await
  }
}
