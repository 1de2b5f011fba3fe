//! Error types for `benef-core`.

use thiserror::Error;

/// A failed call against the beneficiary REST API.
///
/// The `Display` output is what the UI shows the user: server-reported
/// messages pass through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
  /// The server answered with a non-2xx status.
  #[error("{message}")]
  Http { status: u16, message: String },

  /// The request never produced a response (connection refused, timeout…).
  #[error("{0}")]
  Transport(String),

  /// A 2xx response whose body did not have the expected shape.
  #[error("unexpected response body: {0}")]
  Decode(String),

  /// Writing a downloaded export to disk failed.
  #[error("{0}")]
  Io(String),
}

impl ApiError {
  /// Error for a non-2xx status whose body was not inspected.
  pub fn status_only(status: u16) -> Self {
    Self::Http {
      status,
      message: format!("HTTP error! status: {status}"),
    }
  }

  /// Error for a non-2xx status, preferring the `{"error": "..."}` message
  /// carried in `body` when there is one.
  pub fn from_response(status: u16, body: &[u8]) -> Self {
    let message = serde_json::from_slice::<serde_json::Value>(body)
      .ok()
      .and_then(|v| v.get("error")?.as_str().map(str::to_owned))
      .filter(|m| !m.is_empty());
    match message {
      Some(message) => Self::Http { status, message },
      None => Self::status_only(status),
    }
  }

  /// The HTTP status, when the server answered at all.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Http { status, .. } => Some(*status),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn server_message_passes_through() {
    let err = ApiError::from_response(400, br#"{"error":"CPF already registered"}"#);
    assert_eq!(err.to_string(), "CPF already registered");
    assert_eq!(err.status(), Some(400));
  }

  #[test]
  fn missing_message_synthesizes_status_text() {
    let err = ApiError::from_response(502, b"<html>bad gateway</html>");
    assert_eq!(err.to_string(), "HTTP error! status: 502");

    let err = ApiError::from_response(500, br#"{"detail":"boom"}"#);
    assert_eq!(err.to_string(), "HTTP error! status: 500");
  }
}
