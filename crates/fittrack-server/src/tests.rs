//! Router tests driven in-process with `oneshot`.

use std::sync::Arc;

use axum::http::{Request, StatusCode, header};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use fittrack_core::{memory::MemoryStore, store::DocumentStore};
use fittrack_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use super::*;

fn config() -> ServerConfig {
  ServerConfig { mock_seed: Some(5), ..ServerConfig::default() }
}

fn make_state() -> AppState<MemoryStore> {
  AppState::new(Arc::new(MemoryStore::new()), config())
}

fn bearer(sub: &str) -> String {
  let claims = json!({ "sub": sub, "iat": 1_700_000_000 });
  format!("Bearer h.{}.s", B64.encode(claims.to_string()))
}

async fn send<S: DocumentStore + 'static>(
  state:  AppState<S>,
  method: &str,
  uri:    &str,
  auth:   Option<&str>,
  body:   Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(auth) = auth {
    builder = builder.header(header::AUTHORIZATION, auth);
  }
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = router(state).oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let headers = resp.headers().clone();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, headers, json)
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn post_goal_returns_201_with_defaults() {
  let alice = bearer("alice");
  let (status, _, goal) = send(
    make_state(),
    "POST",
    "/api/goals",
    Some(&alice),
    Some(json!({
      "Name": "Lose Weight",
      "TargetValue": 70,
      "StartingValue": 80,
      "StartDate": "2023-01-01",
      "TargetDate": "2023-12-31",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert!(goal["id"].is_string());
  assert_eq!(goal["isCompleted"], false);
  assert_eq!(goal["progresses"], json!([]));
  assert_eq!(goal["startDate"], "2023-01-01");
}

#[tokio::test]
async fn missing_credential_is_401() {
  let (status, headers, body) = send(make_state(), "GET", "/api/goals", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["message"], "Missing or invalid authorization token");
  assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn deleting_another_users_plan_is_404() {
  let state = make_state();
  let (_, _, plan) = send(
    state.clone(),
    "POST",
    "/api/workoutplans",
    Some(&bearer("alice")),
    Some(json!({ "name": "Push" })),
  )
  .await;
  let uri = format!("/api/workoutplans/{}", plan["id"].as_str().unwrap());

  let (status, _, _) = send(state.clone(), "DELETE", &uri, Some(&bearer("bob")), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _, _) = send(state, "GET", &uri, Some(&bearer("alice")), None).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn store_outage_on_workout_frequency_serves_thirty_days() {
  let store = MemoryStore::new();
  store.close().await.unwrap();
  let state = AppState::new(Arc::new(store), config());

  let (status, headers, body) = send(
    state,
    "GET",
    "/api/stats/workout-frequency",
    Some(&bearer("alice")),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(headers["x-data-source"], "mock");
  let days = body.as_object().unwrap();
  assert_eq!(days.len(), 30);
  assert!(days.values().all(|v| matches!(v.as_u64(), Some(0..=2))));
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn preflight_is_empty_200_without_auth() {
  let (status, headers, body) =
    send(make_state(), "OPTIONS", "/api/anything/at/all", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, Value::Null);
  assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], cors::ALLOW_HEADERS);
}

#[tokio::test]
async fn unknown_resource_lists_segments() {
  let (status, _, body) =
    send(make_state(), "GET", "/api/workouts/7", Some(&bearer("alice")), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["message"], "Resource not found");
  assert_eq!(body["path"], "/api/workouts/7");
  assert_eq!(body["segments"], json!(["api", "workouts", "7"]));
}

#[tokio::test]
async fn nested_exercises_through_the_router() {
  let state = make_state();
  let alice = bearer("alice");
  let (_, _, plan) = send(
    state.clone(),
    "POST",
    "/api/workoutplans",
    Some(&alice),
    Some(json!({ "name": "Pull" })),
  )
  .await;
  let base = format!("/api/workoutplans/{}/exercises", plan["id"].as_str().unwrap());

  let (status, _, ex) = send(
    state.clone(),
    "POST",
    &base,
    Some(&alice),
    Some(json!({ "name": "Row", "sets": 4 })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (_, _, plan) = send(
    state.clone(),
    "GET",
    &format!("/api/workoutplans/{}", plan["id"].as_str().unwrap()),
    Some(&alice),
    None,
  )
  .await;
  assert_eq!(plan["exercises"][0]["id"], ex["id"]);

  let (_, _, catalog) = send(state.clone(), "GET", "/api/exercises", Some(&alice), None).await;
  assert_eq!(catalog["$values"][0]["planId"], plan["id"]);

  let (status, _, _) = send(state, "GET", &base, Some(&bearer("bob")), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_ping_and_debug() {
  let state = make_state();
  let (status, _, body) = send(state.clone(), "GET", "/api/health", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ok");

  let (status, _, _) = send(state.clone(), "GET", "/api/health/auth", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (_, _, body) =
    send(state.clone(), "GET", "/api/health/auth", Some(&bearer("carol")), None).await;
  assert_eq!(body["userId"], "carol");

  let (_, _, body) = send(state.clone(), "GET", "/api/ping", None, None).await;
  assert_eq!(body["message"], "pong");

  let (_, _, body) = send(state, "POST", "/api/debug/x", Some("Bearer t"), None).await;
  assert_eq!(body["method"], "POST");
  assert_eq!(body["hasAuthorization"], true);
  assert_eq!(body["segments"], json!(["api", "debug", "x"]));
}

#[tokio::test]
async fn debug_reports_the_route_it_would_take() {
  let state = make_state();
  let (_, _, body) = send(state.clone(), "GET", "/api/debug/goals/7", None, None).await;
  assert!(body["route"].as_str().unwrap().starts_with("Resource"));
  assert!(body["route"].as_str().unwrap().contains("\"7\""));

  let (_, _, body) = send(state, "GET", "/api/debug/nowhere", None, None).await;
  assert!(body["route"].as_str().unwrap().starts_with("Unknown"));
}

#[tokio::test]
async fn only_the_size_cap_reads_as_too_large() {
  let over = axum::body::to_bytes(Body::from("xx"), 1).await.unwrap_err();
  assert!(exceeds_limit(&over));

  let dropped = axum::Error::new(std::io::Error::other("connection reset"));
  assert!(!exceeds_limit(&dropped));
}

#[tokio::test]
async fn malformed_credentials_share_the_fallback_owner() {
  let state = make_state();
  send(
    state.clone(),
    "POST",
    "/api/goals",
    Some("Bearer garbage"),
    Some(json!({ "name": "Shared" })),
  )
  .await;
  let (_, _, list) = send(state, "GET", "/api/goals", Some("Bearer other-garbage"), None).await;
  assert_eq!(list["$values"][0]["userId"], auth::FALLBACK_OWNER);
}

#[tokio::test]
async fn strict_claims_rejects_malformed_credentials() {
  let config = ServerConfig { strict_claims: true, ..config() };
  let state = AppState::new(Arc::new(MemoryStore::new()), config);
  let (status, _, _) = send(state, "GET", "/api/goals", Some("Bearer garbage"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn oversized_body_is_413() {
  let big = "x".repeat(MAX_BODY_BYTES + 1);
  let (status, _, _) = send(
    make_state(),
    "POST",
    "/api/goals",
    Some(&bearer("alice")),
    Some(json!({ "name": big })),
  )
  .await;
  assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn disabled_fallback_surfaces_500() {
  let store = MemoryStore::new();
  store.close().await.unwrap();
  let config = ServerConfig { mock_fallback: false, ..config() };
  let state = AppState::new(Arc::new(store), config);
  let (status, _, body) = send(state, "GET", "/api/goals", Some(&bearer("alice")), None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["message"], "Internal server error");
}

// ── SQLite backend ────────────────────────────────────────────────────────────

#[tokio::test]
async fn sqlite_backend_round_trip() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let state = AppState::new(Arc::new(store), config());
  let alice = bearer("alice");

  let (_, _, log) = send(
    state.clone(),
    "POST",
    "/api/workoutlogs",
    Some(&alice),
    Some(json!({ "WorkoutDate": "2024-04-01", "Duration": 50 })),
  )
  .await;
  let uri = format!("/api/workoutlogs/{}", log["id"].as_str().unwrap());

  let (status, _, fetched) = send(state.clone(), "GET", &uri, Some(&alice), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched["workoutDate"], "2024-04-01");
  assert_eq!(fetched["duration"], 50);

  let (_, _, summary) = send(state, "GET", "/api/stats", Some(&alice), None).await;
  assert_eq!(summary["totalWorkoutLogs"], 1);
  assert_eq!(summary["lastWorkoutDate"], "2024-04-01");
}

#[test]
fn backend_names_parse() {
  assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
  assert_eq!("SQLite".parse::<StoreBackend>().unwrap(), StoreBackend::Sqlite);
  assert_eq!(StoreBackend::Memory.to_string(), "memory");
}
