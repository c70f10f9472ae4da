//! Exercise templates, which live embedded in their workout plan.
//!
//! Two views:
//!
//! - [`nested`] — `workoutplans/{planId}/exercises[/{exerciseId}]`, full CRUD
//!   against one plan's `exercises` list. The plan must exist and belong to
//!   the caller before anything else happens.
//! - [`catalog`] — the flat, read-only `exercises` resource: every exercise
//!   across the caller's plans, each tagged with its `planId`.

use axum::{
  Json,
  http::{Method, StatusCode},
  response::IntoResponse,
};
use fittrack_core::{
  Error as CoreError,
  fallback::{self, FallbackProvider},
  normalize::{self, EXERCISE_FIELDS},
  repository::{Record, Repository},
  resource::ResourceKind,
  store::DocumentStore,
};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::{
  ApiError, ApiResult, ApiState, envelope,
  fallback::{or_fallback, pick},
  parse_body, today,
};

const NOUN: &str = "Exercise";

// ─── Nested ───────────────────────────────────────────────────────────────────

pub async fn nested<S: DocumentStore>(
  state:       &ApiState<S>,
  method:      &Method,
  owner:       &str,
  plan_id:     &str,
  exercise_id: Option<&str>,
  body:        &[u8],
) -> ApiResult {
  let result = dispatch(state, method, owner, plan_id, exercise_id, body).await;
  or_fallback(state, fallback::EXERCISES, result, |provider| {
    substitute(provider, method, plan_id, exercise_id, body)
  })
}

async fn dispatch<S: DocumentStore>(
  state:       &ApiState<S>,
  method:      &Method,
  owner:       &str,
  plan_id:     &str,
  exercise_id: Option<&str>,
  body:        &[u8],
) -> ApiResult {
  let plans = Repository::new(state.store.as_ref(), ResourceKind::WorkoutPlans);
  let plan = plans.get(owner, plan_id).await?;

  // Writes go through `Repository::edit`, which re-reads the plan and
  // stores the edited list in one step.
  match (method, exercise_id) {
    (&Method::GET, None) => Ok(Json(envelope(exercises_of(&plan))).into_response()),
    (&Method::GET, Some(eid)) => {
      Ok(Json(pick(exercises_of(&plan), eid, NOUN)?).into_response())
    }
    (&Method::POST, None) => {
      let mut payload = into_object(parse_body(body)?)?;
      normalize::strip_system_keys(&mut payload);
      if let Some(field) = normalize::missing_required(EXERCISE_FIELDS, &payload) {
        return Err(ApiError::BadRequest(format!("Missing required field: {field}")));
      }
      let mut exercise = normalize::to_client(EXERCISE_FIELDS, &payload);
      exercise.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
      let exercise = Value::Object(exercise);

      let added = exercise.clone();
      plans
        .edit(owner, plan_id, move |plan| {
          with_exercises(plan, |list| {
            list.push(added);
            Ok(())
          })
        })
        .await?;
      tracing::debug!(plan_id, "exercise added");
      Ok((StatusCode::CREATED, Json(exercise)).into_response())
    }
    (&Method::PUT, Some(eid)) => {
      let mut patch = into_object(parse_body(body)?)?;
      normalize::strip_system_keys(&mut patch);
      let patch = normalize::canonical_keys(EXERCISE_FIELDS, &patch);

      let target = eid.to_owned();
      let plan = plans
        .edit(owner, plan_id, move |plan| {
          with_exercises(plan, |list| {
            let index = position(list, &target)?;
            let mut merged = match &list[index] {
              Value::Object(existing) => normalize::to_client(EXERCISE_FIELDS, existing),
              _ => Map::new(),
            };
            merged.extend(patch);
            merged.insert("id".into(), Value::String(target.clone()));
            if let Some(field) = normalize::missing_required(EXERCISE_FIELDS, &merged) {
              return Err(CoreError::BadRequest(format!("Missing required field: {field}")));
            }
            list[index] = Value::Object(merged);
            Ok(())
          })
        })
        .await?;
      Ok(Json(pick(exercises_of(&plan), eid, NOUN)?).into_response())
    }
    (&Method::DELETE, Some(eid)) => {
      let target = eid.to_owned();
      plans
        .edit(owner, plan_id, move |plan| {
          with_exercises(plan, |list| {
            let index = position(list, &target)?;
            list.remove(index);
            Ok(())
          })
        })
        .await?;
      Ok(Json(deleted()).into_response())
    }
    (&Method::PUT | &Method::DELETE, None) => {
      Err(ApiError::BadRequest("Missing exercise id".into()))
    }
    _ => Err(ApiError::MethodNotAllowed),
  }
}

fn substitute(
  provider:    &FallbackProvider,
  method:      &Method,
  plan_id:     &str,
  exercise_id: Option<&str>,
  body:        &[u8],
) -> Result<(StatusCode, Value), ApiError> {
  match (method, exercise_id) {
    (&Method::GET, None) => {
      Ok((StatusCode::OK, envelope(mock_plan_exercises(provider, plan_id))))
    }
    (&Method::GET, Some(eid)) => {
      Ok((StatusCode::OK, pick(mock_plan_exercises(provider, plan_id), eid, NOUN)?))
    }
    (&Method::POST, None) => {
      Ok((StatusCode::CREATED, provider.echo_write(parse_body(body)?)))
    }
    (&Method::PUT, Some(eid)) => {
      let mut echoed = provider.echo_write(parse_body(body)?);
      if let Value::Object(obj) = &mut echoed {
        obj.insert("id".into(), Value::String(eid.to_owned()));
      }
      Ok((StatusCode::OK, echoed))
    }
    (&Method::DELETE, Some(_)) => Ok((StatusCode::OK, deleted())),
    _ => Err(ApiError::MethodNotAllowed),
  }
}

fn exercises_of(plan: &Record) -> Vec<Value> {
  match plan.get("exercises") {
    Some(Value::Array(list)) => list.clone(),
    _ => Vec::new(),
  }
}

fn position(exercises: &[Value], id: &str) -> fittrack_core::Result<usize> {
  exercises
    .iter()
    .position(|ex| ex.get("id").and_then(Value::as_str) == Some(id))
    .ok_or_else(|| CoreError::NotFound(format!("{NOUN} not found")))
}

/// Run `change` on the plan's exercise list and put the list back.
fn with_exercises(
  mut plan: Record,
  change: impl FnOnce(&mut Vec<Value>) -> fittrack_core::Result<()>,
) -> fittrack_core::Result<Record> {
  let mut list = exercises_of(&plan);
  change(&mut list)?;
  plan.insert("exercises".into(), Value::Array(list));
  Ok(plan)
}

fn into_object(payload: Value) -> Result<Map<String, Value>, ApiError> {
  match payload {
    Value::Object(map) => Ok(map),
    _ => Err(ApiError::BadRequest("Request body must be a JSON object".into())),
  }
}

fn deleted() -> Value { json!({ "message": format!("{NOUN} deleted successfully") }) }

// ─── Catalog ──────────────────────────────────────────────────────────────────

pub async fn catalog<S: DocumentStore>(
  state:  &ApiState<S>,
  method: &Method,
  owner:  &str,
  id:     Option<&str>,
) -> ApiResult {
  if method != Method::GET {
    return Err(ApiError::MethodNotAllowed);
  }

  let result = owned_exercises(state, owner)
    .await
    .and_then(|items| respond(items, id));

  or_fallback(state, fallback::EXERCISES, result, |provider| {
    let items = mock_catalog(provider);
    let body = match id {
      Some(id) => pick(items, id, NOUN)?,
      None => envelope(items),
    };
    Ok((StatusCode::OK, body))
  })
}

async fn owned_exercises<S: DocumentStore>(
  state: &ApiState<S>,
  owner: &str,
) -> Result<Vec<Value>, ApiError> {
  let plans = Repository::new(state.store.as_ref(), ResourceKind::WorkoutPlans)
    .list(owner)
    .await?;
  Ok(plans.iter().flat_map(tagged_exercises).collect())
}

fn respond(items: Vec<Value>, id: Option<&str>) -> ApiResult {
  Ok(match id {
    Some(id) => Json(pick(items, id, NOUN)?).into_response(),
    None => Json(envelope(items)).into_response(),
  })
}

/// A plan's exercises, each tagged with the plan id.
fn tagged_exercises(plan: &Record) -> Vec<Value> {
  let plan_id = plan.get("id").cloned().unwrap_or(Value::Null);
  exercises_of(plan)
    .into_iter()
    .map(|mut ex| {
      if let Value::Object(obj) = &mut ex {
        obj.insert("planId".into(), plan_id.clone());
      }
      ex
    })
    .collect()
}

/// The mock exercises of `plan_id`, or the whole mock catalog when
/// `plan_id` names no mock plan.
fn mock_plan_exercises(provider: &FallbackProvider, plan_id: &str) -> Vec<Value> {
  let catalog = mock_catalog(provider);
  let own: Vec<Value> = catalog
    .iter()
    .filter(|ex| ex.get("planId").and_then(Value::as_str) == Some(plan_id))
    .cloned()
    .collect();
  if own.is_empty() { catalog } else { own }
}

fn mock_catalog(provider: &FallbackProvider) -> Vec<Value> {
  match provider.read(fallback::EXERCISES, today()) {
    Some(Value::Array(items)) => items,
    _ => Vec::new(),
  }
}
