//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use fittrack_core::fallback::is_connection_failure;
use serde_json::json;
use thiserror::Error;

/// The message every 401 carries.
pub const UNAUTHENTICATED_MESSAGE: &str = "Missing or invalid authorization token";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{UNAUTHENTICATED_MESSAGE}")]
  Unauthenticated,

  #[error("{0}")]
  NotFound(String),

  /// No handler for the path. Carries the segments that were tried.
  #[error("no route for {path}")]
  RouteNotFound {
    path:     String,
    segments: Vec<String>,
  },

  #[error("{0}")]
  BadRequest(String),

  #[error("Method not allowed")]
  MethodNotAllowed,

  #[error("Request body too large")]
  PayloadTooLarge,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("{0}")]
  Internal(String),
}

impl ApiError {
  /// Whether this is a store failure that looks like the store could not be
  /// reached, as opposed to the store rejecting the operation.
  pub fn is_store_unavailable(&self) -> bool {
    matches!(self, ApiError::Store(e) if is_connection_failure(&e.to_string()))
  }
}

impl From<fittrack_core::Error> for ApiError {
  fn from(e: fittrack_core::Error) -> Self {
    use fittrack_core::Error as Core;
    match e {
      Core::NotFound(m) => ApiError::NotFound(m),
      Core::BadRequest(m) => ApiError::BadRequest(m),
      Core::Store(e) => ApiError::Store(e),
      Core::Serialization(e) => ApiError::Internal(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let message = self.to_string();
    match self {
      ApiError::Unauthenticated => {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
      }
      ApiError::NotFound(_) => {
        (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
      }
      ApiError::RouteNotFound { path, segments } => (
        StatusCode::NOT_FOUND,
        Json(json!({
          "message":  "Resource not found",
          "path":     path,
          "segments": segments,
        })),
      )
        .into_response(),
      ApiError::BadRequest(_) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
      }
      ApiError::MethodNotAllowed => {
        (StatusCode::METHOD_NOT_ALLOWED, Json(json!({ "message": message })))
          .into_response()
      }
      ApiError::PayloadTooLarge => {
        (StatusCode::PAYLOAD_TOO_LARGE, Json(json!({ "message": message })))
          .into_response()
      }
      ApiError::Store(_) | ApiError::Internal(_) => {
        tracing::error!(error = %message, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "message": "Internal server error", "error": message })),
        )
          .into_response()
      }
    }
  }
}
