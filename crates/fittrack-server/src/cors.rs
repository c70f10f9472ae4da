//! CORS headers and the outermost panic response.

use std::any::Any;

use axum::{
  Json,
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;

pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Attach the CORS headers every response carries.
pub fn apply(headers: &mut HeaderMap) {
  headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
  headers.insert(
    header::ACCESS_CONTROL_ALLOW_METHODS,
    HeaderValue::from_static(ALLOW_METHODS),
  );
  headers.insert(
    header::ACCESS_CONTROL_ALLOW_HEADERS,
    HeaderValue::from_static(ALLOW_HEADERS),
  );
}

/// `500 {message, error}` for a handler that panicked.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
  let detail = if let Some(s) = err.downcast_ref::<String>() {
    s.clone()
  } else if let Some(s) = err.downcast_ref::<&str>() {
    (*s).to_owned()
  } else {
    "unknown panic".to_owned()
  };
  tracing::error!(error = %detail, "handler panicked");

  let mut response = (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "message": "Internal server error", "error": detail })),
  )
    .into_response();
  apply(response.headers_mut());
  response
}
