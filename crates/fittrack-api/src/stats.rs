//! `stats` handlers: the dashboard summary and the 30-day workout frequency.

use axum::{
  Json,
  http::{Method, StatusCode},
  response::IntoResponse,
};
use fittrack_core::{
  fallback,
  model::{Goal, WorkoutLog, WorkoutPlan},
  repository::{Record, Repository},
  resource::ResourceKind,
  stats::{decode_all, summarize, workout_frequency},
  store::DocumentStore,
};

use crate::{ApiError, ApiResult, ApiState, fallback::or_fallback, today};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsView {
  Summary,
  WorkoutFrequency,
}

impl StatsView {
  /// The view named by the segment after `stats`. A bare `stats` is the
  /// summary.
  pub fn from_segment(segment: Option<&str>) -> Option<Self> {
    match segment {
      None | Some("summary") => Some(Self::Summary),
      Some("workout-frequency") => Some(Self::WorkoutFrequency),
      Some(_) => None,
    }
  }

  fn fallback_key(self) -> &'static str {
    match self {
      Self::Summary => fallback::STATS_SUMMARY,
      Self::WorkoutFrequency => fallback::STATS_FREQUENCY,
    }
  }
}

pub async fn handle<S: DocumentStore>(
  state:  &ApiState<S>,
  view:   StatsView,
  method: &Method,
  owner:  &str,
) -> ApiResult {
  if method != Method::GET {
    return Err(ApiError::MethodNotAllowed);
  }

  let result = match view {
    StatsView::Summary => summary(state, owner).await,
    StatsView::WorkoutFrequency => frequency(state, owner).await,
  };

  let key = view.fallback_key();
  or_fallback(state, key, result, |provider| {
    let body = provider
      .read(key, today())
      .ok_or_else(|| ApiError::Internal(format!("no substitute data for {key}")))?;
    Ok((StatusCode::OK, body))
  })
}

async fn list<S: DocumentStore>(
  state: &ApiState<S>,
  kind:  ResourceKind,
  owner: &str,
) -> Result<Vec<Record>, ApiError> {
  Ok(Repository::new(state.store.as_ref(), kind).list(owner).await?)
}

async fn summary<S: DocumentStore>(state: &ApiState<S>, owner: &str) -> ApiResult {
  let goals: Vec<Goal> = decode_all(list(state, ResourceKind::Goals, owner).await?);
  let plans: Vec<WorkoutPlan> =
    decode_all(list(state, ResourceKind::WorkoutPlans, owner).await?);
  let logs: Vec<WorkoutLog> = decode_all(list(state, ResourceKind::WorkoutLogs, owner).await?);
  Ok(Json(summarize(&goals, &plans, &logs)).into_response())
}

async fn frequency<S: DocumentStore>(state: &ApiState<S>, owner: &str) -> ApiResult {
  let logs: Vec<WorkoutLog> = decode_all(list(state, ResourceKind::WorkoutLogs, owner).await?);
  Ok(Json(workout_frequency(&logs, today())).into_response())
}
