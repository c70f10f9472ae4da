//! HTTP front end for fittrack.
//!
//! Every request enters through one handler, which answers preflight
//! requests, resolves the [`Route`], checks the bearer credential, and hands
//! off to the matching `fittrack-api` handler. CORS headers are attached to
//! every response on the way out.

pub mod auth;
pub mod cors;
pub mod diagnostics;
pub mod route;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  body::Body,
  extract::{Request, State},
  http::{Method, StatusCode, header},
  response::{IntoResponse, Response},
  routing::any,
};
use bytes::Bytes;
use fittrack_api::{ApiError, ApiResult, ApiState, exercises, health, resources, stats};
use fittrack_core::{fallback::FallbackProvider, store::DocumentStore};
use http_body_util::LengthLimitError;
use serde::Deserialize;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use auth::{AuthConfig, extract_owner};
pub use route::Route;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
  /// SQLite file at `store_path`.
  #[default]
  Sqlite,
  /// Process-local; contents are lost on exit.
  Memory,
}

/// Runtime server configuration, deserialised from `fittrack.toml` and
/// `FITTRACK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub store_backend: StoreBackend,
  pub store_path:    PathBuf,
  /// See [`AuthConfig::strict_claims`].
  pub strict_claims: bool,
  /// Serve substitute data when the store is unreachable.
  pub mock_fallback: bool,
  /// Fixed seed for substitute data. Seeded from the clock when unset.
  pub mock_seed:     Option<u64>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          "127.0.0.1".to_owned(),
      port:          3000,
      store_backend: StoreBackend::default(),
      store_path:    PathBuf::from("fittrack.db"),
      strict_claims: false,
      mock_fallback: true,
      mock_seed:     None,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

pub struct AppState<S> {
  pub api:    ApiState<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   AuthConfig,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    let mut api = ApiState::new(store);
    if config.mock_fallback {
      let provider = match config.mock_seed {
        Some(seed) => FallbackProvider::seeded(seed),
        None => FallbackProvider::from_clock(),
      };
      api = api.with_fallback(provider);
    }
    Self {
      api,
      auth: AuthConfig { strict_claims: config.strict_claims },
      config: Arc::new(config),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      api:    self.api.clone(),
      config: Arc::clone(&self.config),
      auth:   self.auth,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`]. Every path goes to the same entry handler.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: DocumentStore + 'static,
{
  Router::new()
    .route("/", any(entry::<S>))
    .route("/{*path}", any(entry::<S>))
    .layer(CatchPanicLayer::custom(cors::panic_response))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn entry<S>(State(state): State<AppState<S>>, req: Request<Body>) -> Response
where
  S: DocumentStore + 'static,
{
  let mut response = dispatch(&state, req)
    .await
    .unwrap_or_else(IntoResponse::into_response);
  cors::apply(response.headers_mut());
  response
}

async fn dispatch<S: DocumentStore>(state: &AppState<S>, req: Request<Body>) -> ApiResult {
  let method = req.method().clone();
  if method == Method::OPTIONS {
    return Ok(StatusCode::OK.into_response());
  }

  let path = req.uri().path().to_owned();
  let route = Route::parse(&path);
  let owner = if route.requires_auth() {
    extract_owner(req.headers(), &state.auth)?
  } else {
    String::new()
  };
  let has_authorization = req.headers().contains_key(header::AUTHORIZATION);
  let body = collect_body(req).await?;
  let api = &state.api;

  match route {
    Route::Resource { kind, id } => {
      resources::handle(api, kind, &method, &owner, id.as_deref(), &body).await
    }
    Route::PlanExercises { plan_id, exercise_id } => {
      exercises::nested(api, &method, &owner, &plan_id, exercise_id.as_deref(), &body).await
    }
    Route::ExerciseCatalog { id } => {
      exercises::catalog(api, &method, &owner, id.as_deref()).await
    }
    Route::Stats(view) => stats::handle(api, view, &method, &owner).await,
    Route::Health { auth: false } => health::liveness(&method),
    Route::Health { auth: true } => health::auth_liveness(&method, &owner),
    Route::Ping => diagnostics::ping(&method),
    Route::Debug => diagnostics::debug(&method, &path, has_authorization),
    Route::Unknown { segments } => Err(ApiError::RouteNotFound { path, segments }),
  }
}

async fn collect_body(req: Request<Body>) -> Result<Bytes, ApiError> {
  axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
    .await
    .map_err(|e| {
      if exceeds_limit(&e) {
        ApiError::PayloadTooLarge
      } else {
        tracing::debug!(error = %e, "failed to read request body");
        ApiError::BadRequest("Failed to read request body".into())
      }
    })
}

/// Whether a body-read error comes from the [`MAX_BODY_BYTES`] cap rather
/// than from the connection.
fn exceeds_limit(err: &axum::Error) -> bool {
  let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
  while let Some(e) = source {
    if e.is::<LengthLimitError>() {
      return true;
    }
    source = e.source();
  }
  false
}

#[cfg(test)]
mod tests;
