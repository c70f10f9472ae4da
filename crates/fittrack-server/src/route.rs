//! Path → [`Route`] resolution for the single API entry point.
//!
//! Resolution is a pure function of the path. An optional leading `api`
//! segment is dropped and the first remaining segment, lower-cased, names
//! the resource. Before that table lookup, any path shaped
//! `…/workoutplans/{planId}/exercises[/{exerciseId}]` goes to the nested
//! exercise handler.

use fittrack_api::stats::StatsView;
use fittrack_core::resource::ResourceKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
  /// `goals`, `workoutplans`, `workoutlogs`, `users`.
  Resource {
    kind: ResourceKind,
    id:   Option<String>,
  },
  PlanExercises {
    plan_id:     String,
    exercise_id: Option<String>,
  },
  /// The flat, read-only `exercises` resource.
  ExerciseCatalog { id: Option<String> },
  Stats(StatsView),
  Health { auth: bool },
  Ping,
  Debug,
  Unknown { segments: Vec<String> },
}

impl Route {
  pub fn parse(path: &str) -> Self {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let unknown = || Route::Unknown {
      segments: segments.iter().map(|s| (*s).to_owned()).collect(),
    };

    if let Some(route) = nested_exercises(&segments) {
      return route;
    }

    let rest = match segments.split_first() {
      Some((first, rest)) if first.eq_ignore_ascii_case("api") => rest,
      _ => &segments[..],
    };
    let Some((head, tail)) = rest.split_first() else {
      return unknown();
    };
    let head = head.to_ascii_lowercase();
    let sub = tail.first().map(|s| s.to_ascii_lowercase());

    match head.as_str() {
      "exercises" if tail.len() <= 1 => Route::ExerciseCatalog { id: owned(tail.first()) },
      "stats" if tail.len() <= 1 => StatsView::from_segment(sub.as_deref())
        .map(Route::Stats)
        .unwrap_or_else(unknown),
      "health" => match sub.as_deref() {
        None => Route::Health { auth: false },
        Some("auth") if tail.len() == 1 => Route::Health { auth: true },
        _ => unknown(),
      },
      "ping" if tail.is_empty() => Route::Ping,
      "debug" => Route::Debug,
      name if tail.len() <= 1 => match name.parse::<ResourceKind>() {
        Ok(kind) => Route::Resource { kind, id: owned(tail.first()) },
        Err(_) => unknown(),
      },
      _ => unknown(),
    }
  }

  /// Everything except the bare liveness check and the diagnostics needs a
  /// credential.
  pub fn requires_auth(&self) -> bool {
    !matches!(self, Route::Health { auth: false } | Route::Ping | Route::Debug)
  }
}

fn owned(segment: Option<&&str>) -> Option<String> { segment.map(|s| (*s).to_owned()) }

fn nested_exercises(segments: &[&str]) -> Option<Route> {
  let at = segments.windows(3).position(|w| {
    w[0].eq_ignore_ascii_case("workoutplans") && w[2].eq_ignore_ascii_case("exercises")
  })?;
  let tail = &segments[at + 3..];
  if tail.len() > 1 {
    return None;
  }
  Some(Route::PlanExercises {
    plan_id:     segments[at + 1].to_owned(),
    exercise_id: owned(tail.first()),
  })
}
