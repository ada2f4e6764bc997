use thiserror::Error;
use uuid::Uuid;

use super::value_objects::ValueObjectError;

#[derive(Debug, Error)]
pub enum GatewayError {
  /// Rejected before any network call (missing customer, empty lines)
  #[error("Validation error: {0}")]
  Validation(String),

  /// Bad credentials or missing session in the login response.
  /// Terminal for the enclosing operation; never retried automatically.
  #[error("Authentication failed: {0}")]
  Auth(String),

  /// Network failure or malformed response body. Safe to retry with
  /// backoff; retry policy belongs to the caller.
  #[error("Transport error: {0}")]
  Transport(String),

  /// Remote service returned a non-success status or an explicit failure
  /// marker. Detail is the raw response, preserved verbatim for support.
  #[error("Gateway rejected the submission: {0}")]
  Rejected(String),

  #[error("Configuration error: {0}")]
  Configuration(String),

  #[error("Invoice record not found: {0}")]
  RecordNotFound(Uuid),

  #[error("Record store error: {0}")]
  Store(String),
}

impl From<ValueObjectError> for GatewayError {
  fn from(err: ValueObjectError) -> Self {
    GatewayError::Validation(err.to_string())
  }
}
