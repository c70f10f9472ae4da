//! Substitute data served when the backing store cannot be reached.
//!
//! Reads are answered from fixed or procedurally generated records keyed by
//! resource name; writes echo the submitted payload with a synthesized
//! identity. The random source is injectable so fallback behaviour can be
//! reproduced in tests; the default seed comes from the wall clock.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde_json::{Value, json};

use crate::{
  model::{Exercise, Goal, GoalProgress, WorkoutLog, WorkoutPlan},
  stats::{self, frequency_window},
};

// ─── Failure detection ───────────────────────────────────────────────────────

/// Error-text fragments that identify an unreachable store or network.
/// Matched case-insensitively as substrings.
pub const CONNECTION_FAILURE_SIGNATURES: &[&str] = &[
  "connection refused",
  "econnrefused",
  "enotfound",
  "etimedout",
  "timed out",
  "connectionclosed",
  "connection closed",
  "unable to open database",
  "error sending request",
  "failed to fetch",
  "network error",
];

pub fn is_connection_failure(message: &str) -> bool {
  let message = message.to_ascii_lowercase();
  CONNECTION_FAILURE_SIGNATURES
    .iter()
    .any(|sig| message.contains(sig))
}

// ─── Keys ────────────────────────────────────────────────────────────────────

pub const GOALS: &str = "goals";
pub const WORKOUT_PLANS: &str = "workoutplans";
pub const WORKOUT_LOGS: &str = "workoutlogs";
pub const EXERCISES: &str = "exercises";
pub const STATS_SUMMARY: &str = "stats/summary";
pub const STATS_FREQUENCY: &str = "stats/workout-frequency";

/// Resource keys with substitute data. Anything else has none.
pub const KEYS: &[&str] = &[
  GOALS,
  WORKOUT_PLANS,
  WORKOUT_LOGS,
  EXERCISES,
  STATS_SUMMARY,
  STATS_FREQUENCY,
];

// ─── Provider ────────────────────────────────────────────────────────────────

pub struct FallbackProvider {
  rng: Mutex<StdRng>,
}

impl FallbackProvider {
  /// Reproducible provider.
  pub fn seeded(seed: u64) -> Self {
    Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
  }

  /// Provider seeded from the current time.
  pub fn from_clock() -> Self {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    Self::seeded(nanos as u64)
  }

  pub fn has_substitute(&self, key: &str) -> bool { KEYS.contains(&key) }

  /// Substitute read result for `key`, or `None` if there is none.
  ///
  /// Collections come back as plain arrays; callers apply their own
  /// envelope.
  pub fn read(&self, key: &str, today: NaiveDate) -> Option<Value> {
    let value = match key {
      GOALS => json!(mock_goals(today)),
      WORKOUT_PLANS => json!(mock_plans()),
      WORKOUT_LOGS => json!(self.mock_logs(today)),
      EXERCISES => Value::Array(mock_exercise_catalog()),
      STATS_SUMMARY => {
        json!(stats::summarize(&mock_goals(today), &mock_plans(), &self.mock_logs(today)))
      }
      STATS_FREQUENCY => json!(self.workout_frequency(today)),
      _ => return None,
    };
    Some(value)
  }

  /// Echo a write payload back with a synthesized `id`.
  pub fn echo_write(&self, payload: Value) -> Value {
    match payload {
      Value::Object(mut obj) => {
        obj.insert("id".into(), Value::String(self.synthetic_id()));
        Value::Object(obj)
      }
      other => other,
    }
  }

  /// A random v4-shaped UUID drawn from this provider's source.
  pub fn synthetic_id(&self) -> String {
    let mut bytes = [0u8; 16];
    self.rng.lock().fill(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()
  }

  /// Thirty days of synthetic workout counts ending `today`. Each day is
  /// independently a workout day with a weekday-dependent probability; a
  /// workout day is occasionally a double session.
  pub fn workout_frequency(&self, today: NaiveDate) -> BTreeMap<String, u8> {
    let mut rng = self.rng.lock();
    frequency_window(today)
      .map(|date| {
        let count = if rng.gen_bool(workout_probability(date.weekday())) {
          if rng.gen_bool(0.25) { 2 } else { 1 }
        } else {
          0
        };
        (date.to_string(), count)
      })
      .collect()
  }

  fn mock_logs(&self, today: NaiveDate) -> Vec<WorkoutLog> {
    let mut rng = self.rng.lock();
    let plans = mock_plans();
    (1..=5u64)
      .filter_map(|n| {
        let date = today.checked_sub_days(Days::new(n * 2 - 1))?;
        let plan = &plans[(n as usize) % plans.len()];
        Some(WorkoutLog {
          id: Some(format!("mock-log-{n}")),
          workout_date: Some(date.to_string()),
          duration: f64::from(rng.gen_range(30..=75u32)),
          notes: "Sample workout".into(),
          workout_plan_id: plan.id.clone(),
          ..WorkoutLog::default()
        })
      })
      .collect()
  }
}

impl Default for FallbackProvider {
  fn default() -> Self { Self::from_clock() }
}

/// Monday/Wednesday/Friday are the usual training days, Tuesday/Thursday
/// less so, weekends least.
fn workout_probability(day: Weekday) -> f64 {
  match day {
    Weekday::Mon | Weekday::Wed | Weekday::Fri => 0.8,
    Weekday::Tue | Weekday::Thu => 0.5,
    Weekday::Sat | Weekday::Sun => 0.3,
  }
}

// ─── Fixed records ───────────────────────────────────────────────────────────

fn mock_goals(today: NaiveDate) -> Vec<Goal> {
  let start = today.checked_sub_days(Days::new(60)).unwrap_or(today);
  let target = today.checked_add_days(Days::new(120)).unwrap_or(today);
  let goal = |n: u8, name: &str, metric: &str, unit: &str, from: f64, now: f64, to: f64| Goal {
    id: Some(format!("mock-goal-{n}")),
    name: name.into(),
    start_date: Some(start.to_string()),
    target_date: Some(target.to_string()),
    starting_value: from,
    current_value: now,
    target_value: to,
    metric_type: metric.into(),
    unit: unit.into(),
    progresses: vec![GoalProgress {
      date: Some(today.to_string()),
      value: now,
      notes: String::new(),
    }],
    ..Goal::default()
  };
  vec![
    goal(1, "Lose Weight", "weight", "kg", 80.0, 76.5, 70.0),
    goal(2, "Run 5k", "distance", "km", 1.0, 3.5, 5.0),
    goal(3, "Bench Press 100kg", "weight", "kg", 60.0, 82.5, 100.0),
  ]
}

fn mock_plans() -> Vec<WorkoutPlan> {
  let exercise = |id: &str, name: &str, sets: u32, reps: u32, groups: &[&str]| Exercise {
    id: Some(id.into()),
    name: name.into(),
    sets,
    reps,
    muscle_groups: groups.iter().map(|g| (*g).to_owned()).collect(),
    ..Exercise::default()
  };
  vec![
    WorkoutPlan {
      id: Some("mock-plan-1".into()),
      name: "Upper Body".into(),
      description: "Push and pull".into(),
      frequency: "2x per week".into(),
      exercises: vec![
        exercise("mock-ex-1", "Bench Press", 4, 8, &["chest", "triceps"]),
        exercise("mock-ex-2", "Pull Up", 3, 10, &["back", "biceps"]),
      ],
      ..WorkoutPlan::default()
    },
    WorkoutPlan {
      id: Some("mock-plan-2".into()),
      name: "Lower Body".into(),
      description: "Squat focus".into(),
      frequency: "1x per week".into(),
      exercises: vec![
        exercise("mock-ex-3", "Back Squat", 5, 5, &["quads", "glutes"]),
        exercise("mock-ex-4", "Romanian Deadlift", 3, 10, &["hamstrings"]),
      ],
      ..WorkoutPlan::default()
    },
  ]
}

fn mock_exercise_catalog() -> Vec<Value> {
  mock_plans()
    .into_iter()
    .flat_map(|plan| {
      let plan_id = plan.id.unwrap_or_default();
      plan.exercises.into_iter().map(move |ex| {
        let mut v = json!(ex);
        v["planId"] = Value::String(plan_id.clone());
        v
      })
    })
    .collect()
}
