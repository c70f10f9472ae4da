//! Answering from substitute data when the store cannot be reached.

use axum::{
  Json,
  http::{HeaderName, HeaderValue, StatusCode},
  response::IntoResponse,
};
use fittrack_core::fallback::FallbackProvider;
use serde_json::Value;

use crate::{ApiError, ApiResult, ApiState};

pub const DATA_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-data-source");

const WARNING_TEXT: &str =
  "199 fittrack \"Store unavailable; serving sample data\"";

/// Pass `result` through unless it failed because the store is unreachable,
/// in which case the whole response is rebuilt by `make` from substitute
/// data for `key`.
///
/// With fallback disabled, or no substitute for `key`, the original error is
/// returned and becomes a 500.
pub fn or_fallback<S, F>(state: &ApiState<S>, key: &str, result: ApiResult, make: F) -> ApiResult
where
  F: FnOnce(&FallbackProvider) -> Result<(StatusCode, Value), ApiError>,
{
  let err = match result {
    Err(err) if err.is_store_unavailable() => err,
    other => return other,
  };

  let Some(provider) = state.fallback.as_deref() else {
    return Err(err);
  };
  if !provider.has_substitute(key) {
    tracing::warn!(key, error = %err, "store unavailable and no substitute data");
    return Err(err);
  }

  tracing::warn!(key, error = %err, "store unavailable, serving substitute data");
  let (status, body) = make(provider)?;
  let mut response = (status, Json(body)).into_response();
  let headers = response.headers_mut();
  headers.insert(axum::http::header::WARNING, HeaderValue::from_static(WARNING_TEXT));
  headers.insert(DATA_SOURCE_HEADER, HeaderValue::from_static("mock"));
  Ok(response)
}

/// The element of `items` whose `id` is `id`.
pub(crate) fn pick(items: Vec<Value>, id: &str, noun: &str) -> Result<Value, ApiError> {
  items
    .into_iter()
    .find(|item| item.get("id").and_then(Value::as_str) == Some(id))
    .ok_or_else(|| ApiError::NotFound(format!("{noun} not found")))
}
