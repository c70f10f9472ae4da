//! Error types for `fittrack-core`.

use thiserror::Error;

use crate::fallback::is_connection_failure;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Wrap a backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// Whether this is a store failure whose message matches one of the
  /// known connection-failure signatures.
  pub fn is_store_unavailable(&self) -> bool {
    match self {
      Self::Store(e) => is_connection_failure(&e.to_string()),
      _ => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
