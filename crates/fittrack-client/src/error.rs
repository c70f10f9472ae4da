//! Error type for the client gateway.

use fittrack_core::fallback::is_connection_failure;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
  /// The server answered 401. The session is left untouched; the caller
  /// decides whether to sign in again.
  #[error("unauthorized (credential sent: {had_credential})")]
  Unauthorized { had_credential: bool },

  #[error("{status}: {message}")]
  Http { status: StatusCode, message: String },

  /// The server could not be reached and no substitute data applies.
  #[error("network error: {0}")]
  Network(#[source] reqwest::Error),

  #[error("unexpected response body: {0}")]
  Decode(String),

  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),
}

impl GatewayError {
  /// Whether the server could not be reached at all, as opposed to
  /// answering with an error.
  pub fn is_unreachable(&self) -> bool {
    match self {
      Self::Network(e) => {
        e.is_connect() || e.is_timeout() || is_connection_failure(&e.to_string())
      }
      _ => false,
    }
  }
}

pub type Result<T, E = GatewayError> = std::result::Result<T, E>;
