//! Handler for the flat resource families: `goals`, `workoutplans`,
//! `workoutlogs`, and `users`.
//!
//! | Method   | Id      | Result |
//! |----------|---------|--------|
//! | `GET`    | —       | `200` enveloped list |
//! | `GET`    | present | `200` record or `404` |
//! | `POST`   | —       | `201` created record |
//! | `PUT`    | present | `200` merged record or `404` |
//! | `DELETE` | present | `200 {message}` or `404` |
//!
//! Anything else is `405`, except `PUT`/`DELETE` without an id (`400`).

use axum::{
  Json,
  http::{Method, StatusCode},
  response::IntoResponse,
};
use fittrack_core::{
  fallback::FallbackProvider,
  repository::Repository,
  resource::ResourceKind,
  store::DocumentStore,
};
use serde_json::{Value, json};

use crate::{
  ApiError, ApiResult, ApiState, envelope,
  fallback::{or_fallback, pick},
  parse_body, today,
};

pub async fn handle<S: DocumentStore>(
  state:  &ApiState<S>,
  kind:   ResourceKind,
  method: &Method,
  owner:  &str,
  id:     Option<&str>,
  body:   &[u8],
) -> ApiResult {
  let result = dispatch(state, kind, method, owner, id, body).await;
  or_fallback(state, kind.as_ref(), result, |provider| {
    substitute(provider, kind, method, id, body)
  })
}

async fn dispatch<S: DocumentStore>(
  state:  &ApiState<S>,
  kind:   ResourceKind,
  method: &Method,
  owner:  &str,
  id:     Option<&str>,
  body:   &[u8],
) -> ApiResult {
  let repo = Repository::new(state.store.as_ref(), kind);
  match (method, id) {
    (&Method::GET, None) => {
      let records = repo.list(owner).await?;
      let values = records.into_iter().map(Value::Object).collect();
      Ok(Json(envelope(values)).into_response())
    }
    (&Method::GET, Some(id)) => Ok(Json(repo.get(owner, id).await?).into_response()),
    (&Method::POST, None) => {
      let payload = parse_body(body)?;
      let record = repo.create(owner, payload).await?;
      Ok((StatusCode::CREATED, Json(record)).into_response())
    }
    (&Method::PUT, Some(id)) => {
      let payload = parse_body(body)?;
      Ok(Json(repo.update(owner, id, payload).await?).into_response())
    }
    (&Method::DELETE, Some(id)) => {
      repo.delete(owner, id).await?;
      Ok(Json(deleted(kind)).into_response())
    }
    (&Method::PUT | &Method::DELETE, None) => {
      Err(ApiError::BadRequest("Missing record id".into()))
    }
    _ => Err(ApiError::MethodNotAllowed),
  }
}

fn deleted(kind: ResourceKind) -> Value {
  json!({ "message": format!("{} deleted successfully", kind.noun()) })
}

/// Rebuild the response for `method` from substitute data.
fn substitute(
  provider: &FallbackProvider,
  kind:     ResourceKind,
  method:   &Method,
  id:       Option<&str>,
  body:     &[u8],
) -> Result<(StatusCode, Value), ApiError> {
  let read = || -> Vec<Value> {
    match provider.read(kind.as_ref(), today()) {
      Some(Value::Array(values)) => values,
      _ => Vec::new(),
    }
  };
  match (method, id) {
    (&Method::GET, None) => Ok((StatusCode::OK, envelope(read()))),
    (&Method::GET, Some(id)) => Ok((StatusCode::OK, pick(read(), id, kind.noun())?)),
    (&Method::POST, _) => {
      Ok((StatusCode::CREATED, provider.echo_write(parse_body(body)?)))
    }
    (&Method::PUT, Some(id)) => {
      let mut echoed = provider.echo_write(parse_body(body)?);
      if let Value::Object(obj) = &mut echoed {
        obj.insert("id".into(), Value::String(id.to_owned()));
      }
      Ok((StatusCode::OK, echoed))
    }
    (&Method::DELETE, _) => Ok((StatusCode::OK, deleted(kind))),
    _ => Err(ApiError::MethodNotAllowed),
  }
}
