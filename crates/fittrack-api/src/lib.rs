//! Resource handlers for the fittrack JSON API.
//!
//! Handlers here are plain async functions over an [`ApiState`]; they do not
//! parse paths or check credentials. The server crate owns the single entry
//! point, resolves the caller's owner id, and calls into the matching
//! handler with the method, ids, and raw body.
//!
//! Every handler returns [`ApiResult`]. Store failures that look like the
//! store is unreachable are answered from the [`FallbackProvider`] when one
//! is configured.

pub mod error;
pub mod exercises;
pub mod fallback;
pub mod health;
pub mod resources;
pub mod stats;

use std::sync::Arc;

use axum::response::Response;
use chrono::{NaiveDate, Utc};
use fittrack_core::fallback::FallbackProvider;
use serde_json::{Value, json};

pub use error::ApiError;

pub type ApiResult = Result<Response, ApiError>;

// ─── State ────────────────────────────────────────────────────────────────────

/// Shared state for all API handlers.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  /// `None` disables mock fallback; store outages then surface as 500.
  pub fallback: Option<Arc<FallbackProvider>>,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store, fallback: None } }

  pub fn with_fallback(mut self, provider: FallbackProvider) -> Self {
    self.fallback = Some(Arc::new(provider));
    self
  }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      fallback: self.fallback.clone(),
    }
  }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Wrap a list in the reference-preserving envelope clients expect.
pub fn envelope(values: Vec<Value>) -> Value {
  json!({ "$id": "1", "$values": values })
}

/// Parse a write payload. Empty and malformed bodies are `BadRequest`.
pub fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Err(ApiError::BadRequest("Request body is required".into()));
  }
  serde_json::from_slice(body).map_err(|_| ApiError::BadRequest("Invalid JSON body".into()))
}

pub(crate) fn today() -> NaiveDate { Utc::now().date_naive() }
