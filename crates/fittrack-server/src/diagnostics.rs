//! `ping` and `debug`: unauthenticated endpoints for checking what reaches
//! the router.

use axum::{Json, http::Method, response::IntoResponse};
use chrono::Utc;
use fittrack_api::{ApiError, ApiResult};
use serde_json::json;

use crate::route::Route;

pub fn ping(method: &Method) -> ApiResult {
  if method != Method::GET {
    return Err(ApiError::MethodNotAllowed);
  }
  Ok(Json(json!({ "message": "pong", "timestamp": Utc::now().to_rfc3339() })).into_response())
}

/// The router's view of the request. `route` is what the part of the path
/// after `debug` resolves to: `/api/debug/goals/7` reports the goals route
/// with id `7`.
pub fn debug(method: &Method, path: &str, has_authorization: bool) -> ApiResult {
  let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
  let target = segments
    .iter()
    .position(|s| s.eq_ignore_ascii_case("debug"))
    .map_or(&[][..], |at| &segments[at + 1..]);
  let route = Route::parse(&target.join("/"));
  Ok(
    Json(json!({
      "method":           method.as_str(),
      "path":             path,
      "segments":         segments,
      "route":            format!("{route:?}"),
      "hasAuthorization": has_authorization,
      "timestamp":        Utc::now().to_rfc3339(),
    }))
    .into_response(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  async fn body(result: ApiResult) -> serde_json::Value {
    let resp = result.unwrap();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn debug_resolves_the_rest_of_the_path() {
    let out = body(debug(&Method::GET, "/api/debug/goals/7", false)).await;
    let expected = Route::Resource {
      kind: fittrack_core::resource::ResourceKind::Goals,
      id:   Some("7".into()),
    };
    assert_eq!(out["route"], format!("{expected:?}"));

    let out = body(debug(&Method::GET, "/api/debug/stats/workout-frequency", true)).await;
    assert!(out["route"].as_str().unwrap().contains("WorkoutFrequency"));
    assert_eq!(out["hasAuthorization"], true);
  }
}
