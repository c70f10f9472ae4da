//! Liveness checks. Neither touches the store.

use axum::{Json, http::Method, response::IntoResponse};
use chrono::Utc;
use serde_json::json;

use crate::{ApiError, ApiResult};

/// `GET /api/health`
pub fn liveness(method: &Method) -> ApiResult {
  if method != Method::GET {
    return Err(ApiError::MethodNotAllowed);
  }
  Ok(
    Json(json!({
      "status":    "ok",
      "timestamp": Utc::now().to_rfc3339(),
      "version":   env!("CARGO_PKG_VERSION"),
    }))
    .into_response(),
  )
}

/// `GET /api/health/auth` — the caller got past the credential check.
pub fn auth_liveness(method: &Method, owner: &str) -> ApiResult {
  if method != Method::GET {
    return Err(ApiError::MethodNotAllowed);
  }
  Ok(
    Json(json!({
      "status":        "ok",
      "authenticated": true,
      "userId":        owner,
      "timestamp":     Utc::now().to_rfc3339(),
    }))
    .into_response(),
  )
}
