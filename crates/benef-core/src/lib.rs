//! Core types and view-models for the beneficiary management client.
//!
//! This crate has no HTTP and terminal dependencies. The
//! HTTP client (`benef-client`) implements [`api::BeneficiaryApi`]; the
//! terminal UI (`benef-cli`) renders the [`form::FormState`] and
//! [`list::ListState`] snapshots.

pub mod api;
pub mod beneficiary;
pub mod choice;
pub mod error;
pub mod field;
pub mod form;
pub mod list;
pub mod mask;
pub mod validate;

pub use error::ApiError;
