//! Async HTTP gateway to the fittrack JSON API.
//!
//! Paths are relative to `{base_url}/api/`, e.g. `goals`,
//! `workoutplans/{id}/exercises`, or `stats/summary`. Records coming back are
//! run through the record normalizer so either API generation reads the same.
//! When the server cannot be reached at all, reads and writes are answered
//! from a [`FallbackProvider`] keyed by the path's resource name, and a
//! warning notification is raised.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use chrono::Utc;
use fittrack_core::{
  fallback::{self, FallbackProvider},
  model::{Goal, WorkoutLog, WorkoutPlan},
  normalize::{self, EXERCISE_FIELDS, FieldSpec},
  resource::ResourceKind,
  stats::{StatsSummary, decode_all},
};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
  envelope::unwrap_list,
  error::{GatewayError, Result},
  notify::{Notification, Notifier, Severity, TracingNotifier},
  session::Session,
};

const DATA_SOURCE_HEADER: &str = "x-data-source";

/// Cheap to clone; clones share the HTTP client, session, and fallback.
#[derive(Clone)]
pub struct Gateway {
  client:   Client,
  base_url: String,
  session:  Session,
  fallback: Option<Arc<FallbackProvider>>,
  notifier: Arc<dyn Notifier>,
}

impl Gateway {
  pub fn new(base_url: impl Into<String>, session: Session) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(GatewayError::Client)?;
    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_owned(),
      session,
      fallback: None,
      notifier: Arc::new(TracingNotifier),
    })
  }

  /// Answer from `provider` when the server is unreachable.
  pub fn with_fallback(mut self, provider: FallbackProvider) -> Self {
    self.fallback = Some(Arc::new(provider));
    self
  }

  pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
    self.notifier = Arc::new(notifier);
    self
  }

  pub fn session(&self) -> &Session { &self.session }

  fn url(&self, path: &str) -> String {
    format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
  }

  // ── Transport ─────────────────────────────────────────────────────────────

  async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
    let mut req = self.client.request(method.clone(), self.url(path));
    let token = self.session.current();
    if let Some(token) = &token {
      req = req.bearer_auth(token);
    }
    if let Some(body) = body {
      req = req.json(body);
    }

    let resp = req.send().await.map_err(GatewayError::Network)?;
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
      return Err(GatewayError::Unauthorized { had_credential: token.is_some() });
    }
    let mock = resp
      .headers()
      .get(DATA_SOURCE_HEADER)
      .is_some_and(|v| v.as_bytes() == b"mock");
    let bytes = resp.bytes().await.map_err(GatewayError::Network)?;

    if !status.is_success() {
      let message = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_owned))
        .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
      return Err(GatewayError::Http { status, message });
    }
    if mock {
      self.notifier.notify(Notification::new(
        Severity::Warning,
        format!("The server is showing sample data for {path}"),
      ));
    }
    if bytes.is_empty() {
      return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
  }

  /// Pass `result` through unless the server was unreachable and substitute
  /// data exists for `path`.
  fn or_fallback<T>(
    &self,
    path: &str,
    result: Result<T>,
    make: impl FnOnce(&FallbackProvider, &'static str) -> Option<T>,
  ) -> Result<T> {
    let err = match result {
      Err(err) if err.is_unreachable() => err,
      other => return other,
    };
    let substitute = self.fallback.as_deref().and_then(|provider| {
      let key = fallback_key(path).filter(|key| provider.has_substitute(key))?;
      make(provider, key)
    });
    match substitute {
      Some(value) => {
        tracing::warn!(path, error = %err, "server unreachable, using substitute data");
        self.notifier.notify(Notification::new(
          Severity::Warning,
          format!("Could not reach the server; showing sample data for {path}"),
        ));
        Ok(value)
      }
      None => Err(err),
    }
  }

  // ── Generic resource operations ───────────────────────────────────────────

  pub async fn list(&self, path: &str) -> Result<Vec<Value>> {
    let result = self.send(Method::GET, path, None).await.and_then(unwrap_list);
    let items = self.or_fallback(path, result, |provider, key| {
      unwrap_list(provider.read(key, today())?).ok()
    })?;
    Ok(items.into_iter().map(|item| normalized(path, item)).collect())
  }

  pub async fn get(&self, path: &str, id: &str) -> Result<Value> {
    let result = self.send(Method::GET, &join(path, id), None).await;
    let record = self.or_fallback(path, result, |provider, key| {
      unwrap_list(provider.read(key, today())?)
        .ok()?
        .into_iter()
        .find(|item| item.get("id").and_then(Value::as_str) == Some(id))
    })?;
    Ok(normalized(path, record))
  }

  pub async fn create(&self, path: &str, payload: &Value) -> Result<Value> {
    let result = self.send(Method::POST, path, Some(payload)).await;
    let record = self.or_fallback(path, result, |provider, _| {
      Some(provider.echo_write(payload.clone()))
    })?;
    Ok(normalized(path, record))
  }

  pub async fn update(&self, path: &str, id: &str, payload: &Value) -> Result<Value> {
    let result = self.send(Method::PUT, &join(path, id), Some(payload)).await;
    let record = self.or_fallback(path, result, |provider, _| {
      let mut echoed = provider.echo_write(payload.clone());
      if let Value::Object(obj) = &mut echoed {
        obj.insert("id".into(), Value::String(id.to_owned()));
      }
      Some(echoed)
    })?;
    Ok(normalized(path, record))
  }

  pub async fn delete(&self, path: &str, id: &str) -> Result<()> {
    let result = self.send(Method::DELETE, &join(path, id), None).await.map(drop);
    self.or_fallback(path, result, |_, _| Some(()))
  }

  // ── Typed helpers ─────────────────────────────────────────────────────────

  pub async fn goals(&self) -> Result<Vec<Goal>> { self.typed_list("goals").await }

  pub async fn workout_plans(&self) -> Result<Vec<WorkoutPlan>> {
    self.typed_list("workoutplans").await
  }

  pub async fn workout_logs(&self) -> Result<Vec<WorkoutLog>> {
    self.typed_list("workoutlogs").await
  }

  async fn typed_list<T: DeserializeOwned + Default>(&self, path: &str) -> Result<Vec<T>> {
    let items = self.list(path).await?;
    Ok(decode_all(
      items
        .into_iter()
        .filter_map(|item| match item {
          Value::Object(obj) => Some(obj),
          _ => None,
        })
        .collect(),
    ))
  }

  pub async fn stats_summary(&self) -> Result<StatsSummary> {
    self.stats(fallback::STATS_SUMMARY).await
  }

  pub async fn workout_frequency(&self) -> Result<BTreeMap<String, u32>> {
    self.stats(fallback::STATS_FREQUENCY).await
  }

  async fn stats<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let result = self.send(Method::GET, path, None).await;
    let body = self.or_fallback(path, result, |provider, key| provider.read(key, today()))?;
    serde_json::from_value(body).map_err(|e| GatewayError::Decode(e.to_string()))
  }
}

fn today() -> chrono::NaiveDate { Utc::now().date_naive() }

fn join(path: &str, id: &str) -> String { format!("{}/{id}", path.trim_end_matches('/')) }

fn segments(path: &str) -> Vec<String> {
  path
    .split('/')
    .filter(|s| !s.is_empty())
    .map(str::to_ascii_lowercase)
    .collect()
}

fn is_plan_exercises(segments: &[String]) -> bool {
  segments
    .windows(3)
    .any(|w| w[0] == "workoutplans" && w[2] == "exercises")
}

/// Substitute-data key for a gateway path.
pub fn fallback_key(path: &str) -> Option<&'static str> {
  let segs = segments(path);
  if is_plan_exercises(&segs) {
    return Some(fallback::EXERCISES);
  }
  match segs.first().map(String::as_str)? {
    "goals" => Some(fallback::GOALS),
    "workoutplans" => Some(fallback::WORKOUT_PLANS),
    "workoutlogs" => Some(fallback::WORKOUT_LOGS),
    "exercises" => Some(fallback::EXERCISES),
    "stats" => match segs.get(1).map(String::as_str) {
      None | Some("summary") => Some(fallback::STATS_SUMMARY),
      Some("workout-frequency") => Some(fallback::STATS_FREQUENCY),
      Some(_) => None,
    },
    _ => None,
  }
}

/// Field table for the records a path returns.
fn fields_for(path: &str) -> Option<&'static [FieldSpec]> {
  let segs = segments(path);
  if is_plan_exercises(&segs) {
    return Some(EXERCISE_FIELDS);
  }
  match segs.first().map(String::as_str)? {
    "exercises" => Some(EXERCISE_FIELDS),
    name => name.parse::<ResourceKind>().ok().map(ResourceKind::fields),
  }
}

fn normalized(path: &str, record: Value) -> Value {
  match (fields_for(path), record) {
    (Some(fields), Value::Object(obj)) => Value::Object(normalize::received(fields, &obj)),
    (_, other) => other,
  }
}
