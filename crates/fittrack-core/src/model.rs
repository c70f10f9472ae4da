//! Typed views of the client (camelCase) record shapes.
//!
//! Records travel through the system as JSON objects so that fields unknown
//! to this crate survive a round trip. These structs are the typed lens used
//! by stats, mock generation, and the client gateway; `extra` keeps whatever
//! the typed fields do not cover.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─── Goals ───────────────────────────────────────────────────────────────────

/// One recorded measurement towards a goal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalProgress {
  #[serde(deserialize_with = "lenient::opt_text")]
  pub date:  Option<String>,
  #[serde(deserialize_with = "lenient::number")]
  pub value: f64,
  #[serde(deserialize_with = "lenient::text")]
  pub notes: String,
}

/// A measurable target, e.g. "reach 70 kg by December".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Goal {
  #[serde(deserialize_with = "lenient::opt_text")]
  pub id:             Option<String>,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub user_id:        Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub name:           String,
  #[serde(deserialize_with = "lenient::text")]
  pub description:    String,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub start_date:     Option<String>,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub target_date:    Option<String>,
  #[serde(deserialize_with = "lenient::number")]
  pub starting_value: f64,
  #[serde(deserialize_with = "lenient::number")]
  pub current_value:  f64,
  #[serde(deserialize_with = "lenient::number")]
  pub target_value:   f64,
  #[serde(deserialize_with = "lenient::text")]
  pub metric_type:    String,
  #[serde(deserialize_with = "lenient::text")]
  pub unit:           String,
  #[serde(deserialize_with = "lenient::flag")]
  pub is_completed:   bool,
  #[serde(deserialize_with = "lenient::list")]
  pub progresses:     Vec<GoalProgress>,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub created_at:     Option<String>,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub updated_at:     Option<String>,
  #[serde(flatten)]
  pub extra:          Map<String, Value>,
}

impl Goal {
  /// Fraction of the distance from starting to target value already
  /// covered, clamped to `0.0..=1.0`.
  pub fn progress_ratio(&self) -> f64 {
    let span = self.target_value - self.starting_value;
    if span == 0.0 {
      return if self.is_completed { 1.0 } else { 0.0 };
    }
    ((self.current_value - self.starting_value) / span).clamp(0.0, 1.0)
  }
}

// ─── Workout plans ───────────────────────────────────────────────────────────

/// An exercise template embedded in a [`WorkoutPlan`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Exercise {
  #[serde(deserialize_with = "lenient::opt_text")]
  pub id:            Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub name:          String,
  #[serde(deserialize_with = "lenient::text")]
  pub description:   String,
  #[serde(deserialize_with = "lenient::count")]
  pub sets:          u32,
  #[serde(deserialize_with = "lenient::count")]
  pub reps:          u32,
  /// Target duration in seconds for time-based exercises.
  #[serde(deserialize_with = "lenient::opt_count")]
  pub duration:      Option<u32>,
  #[serde(deserialize_with = "lenient::list")]
  pub muscle_groups: Vec<String>,
  #[serde(flatten)]
  pub extra:         Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkoutPlan {
  #[serde(deserialize_with = "lenient::opt_text")]
  pub id:          Option<String>,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub user_id:     Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub name:        String,
  #[serde(deserialize_with = "lenient::text")]
  pub description: String,
  /// Free text, e.g. "3x per week".
  #[serde(deserialize_with = "lenient::text")]
  pub frequency:   String,
  #[serde(deserialize_with = "lenient::list")]
  pub exercises:   Vec<Exercise>,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub created_at:  Option<String>,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub updated_at:  Option<String>,
  #[serde(flatten)]
  pub extra:       Map<String, Value>,
}

// ─── Workout logs ────────────────────────────────────────────────────────────

/// One exercise as actually performed during a logged workout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExerciseLog {
  #[serde(deserialize_with = "lenient::opt_text")]
  pub id:            Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub exercise_name: String,
  #[serde(deserialize_with = "lenient::count")]
  pub sets:          u32,
  #[serde(deserialize_with = "lenient::count")]
  pub reps:          u32,
  #[serde(deserialize_with = "lenient::number")]
  pub weight:        f64,
  #[serde(deserialize_with = "lenient::text")]
  pub weight_unit:   String,
  #[serde(deserialize_with = "lenient::opt_count")]
  pub duration:      Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkoutLog {
  #[serde(deserialize_with = "lenient::opt_text")]
  pub id:              Option<String>,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub user_id:         Option<String>,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub workout_date:    Option<String>,
  /// Minutes.
  #[serde(deserialize_with = "lenient::number")]
  pub duration:        f64,
  #[serde(deserialize_with = "lenient::text")]
  pub notes:           String,
  /// Soft reference; the plan may since have been deleted.
  #[serde(deserialize_with = "lenient::opt_text")]
  pub workout_plan_id: Option<String>,
  #[serde(deserialize_with = "lenient::list")]
  pub exercise_logs:   Vec<ExerciseLog>,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub created_at:      Option<String>,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub updated_at:      Option<String>,
  #[serde(flatten)]
  pub extra:           Map<String, Value>,
}

impl WorkoutLog {
  pub fn date(&self) -> Option<NaiveDate> {
    self.workout_date.as_deref().and_then(parse_date)
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
  #[serde(deserialize_with = "lenient::opt_text")]
  pub id:          Option<String>,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub user_id:     Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub name:        String,
  #[serde(deserialize_with = "lenient::text")]
  pub email:       String,
  #[serde(deserialize_with = "lenient::text")]
  pub picture:     String,
  #[serde(deserialize_with = "lenient::text")]
  pub unit_system: String,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub created_at:  Option<String>,
  #[serde(deserialize_with = "lenient::opt_text")]
  pub updated_at:  Option<String>,
  #[serde(flatten)]
  pub extra:       Map<String, Value>,
}

// ─── Dates ───────────────────────────────────────────────────────────────────

/// Parse the calendar date at the start of a date or RFC 3339 string.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
  s.get(..10)
    .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
}

// ─── Lenient field readers ───────────────────────────────────────────────────

/// Per-field deserializers that never fail. A field holding a value of the
/// wrong JSON type reads as its default instead of failing the whole record;
/// numbers and flags sent as strings are parsed.
mod lenient {
  use serde::{Deserialize, Deserializer, de::DeserializeOwned};
  use serde_json::Value;

  fn as_f64(value: &Value) -> Option<f64> {
    match value {
      Value::Number(n) => n.as_f64(),
      Value::String(s) => s.trim().parse().ok(),
      _ => None,
    }
  }

  fn as_count(value: &Value) -> Option<u32> {
    as_f64(value)
      .filter(|n| n.is_finite() && *n >= 0.0)
      .map(|n| n.round().min(f64::from(u32::MAX)) as u32)
  }

  pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(as_f64(&Value::deserialize(d)?).filter(|n| n.is_finite()).unwrap_or_default())
  }

  pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(as_count(&Value::deserialize(d)?).unwrap_or_default())
  }

  pub fn opt_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(as_count(&Value::deserialize(d)?))
  }

  pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
      Value::Bool(b) => b,
      Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
      Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
      _ => false,
    })
  }

  pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(opt_string(Value::deserialize(d)?).unwrap_or_default())
  }

  pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(opt_string(Value::deserialize(d)?))
  }

  fn opt_string(value: Value) -> Option<String> {
    match value {
      Value::String(s) => Some(s),
      Value::Number(n) => Some(n.to_string()),
      Value::Bool(b) => Some(b.to_string()),
      _ => None,
    }
  }

  /// A list whose malformed items read as defaults; anything but an array
  /// reads as empty.
  pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
  where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
  {
    Ok(match Value::deserialize(d)? {
      Value::Array(items) => items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect(),
      _ => Vec::new(),
    })
  }
}
