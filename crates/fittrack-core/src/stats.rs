//! Aggregates derived from an owner's goals, plans, and logs.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::model::{Goal, WorkoutLog, WorkoutPlan};

/// Length of the workout-frequency window, ending today.
pub const FREQUENCY_DAYS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
  pub total_goals:            usize,
  pub completed_goals:        usize,
  pub active_goals:           usize,
  pub total_workout_plans:    usize,
  pub total_workout_logs:     usize,
  pub total_duration_minutes: f64,
  pub last_workout_date:      Option<NaiveDate>,
}

pub fn summarize(goals: &[Goal], plans: &[WorkoutPlan], logs: &[WorkoutLog]) -> StatsSummary {
  let completed_goals = goals.iter().filter(|g| g.is_completed).count();
  StatsSummary {
    total_goals: goals.len(),
    completed_goals,
    active_goals: goals.len() - completed_goals,
    total_workout_plans: plans.len(),
    total_workout_logs: logs.len(),
    total_duration_minutes: logs.iter().map(|l| l.duration).sum(),
    last_workout_date: logs.iter().filter_map(WorkoutLog::date).max(),
  }
}

/// The [`FREQUENCY_DAYS`] calendar days ending with `today`, oldest first.
pub fn frequency_window(today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
  (0..FREQUENCY_DAYS)
    .rev()
    .filter_map(move |back| today.checked_sub_days(Days::new(back)))
}

/// Number of logged workouts per day over the window, keyed by ISO date.
/// Days without a workout are present with a count of zero.
pub fn workout_frequency(logs: &[WorkoutLog], today: NaiveDate) -> BTreeMap<String, u32> {
  let mut counts: BTreeMap<String, u32> = frequency_window(today)
    .map(|d| (d.to_string(), 0))
    .collect();
  for date in logs.iter().filter_map(WorkoutLog::date) {
    if let Some(n) = counts.get_mut(&date.to_string()) {
      *n += 1;
    }
  }
  counts
}

/// Decode client-shape records into a typed view. The model types read each
/// field leniently, so one malformed field defaults alone and the rest of the
/// record still counts; a record that is not decodable at all counts as a
/// default value.
pub fn decode_all<T>(records: Vec<Map<String, Value>>) -> Vec<T>
where
  T: DeserializeOwned + Default,
{
  records
    .into_iter()
    .map(|r| serde_json::from_value(Value::Object(r)).unwrap_or_default())
    .collect()
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn day(s: &str) -> NaiveDate { s.parse().unwrap() }

  fn log(date: &str, minutes: f64) -> WorkoutLog {
    WorkoutLog {
      workout_date: Some(date.to_owned()),
      duration: minutes,
      ..WorkoutLog::default()
    }
  }

  #[test]
  fn summary_counts() {
    let goals = vec![
      Goal { is_completed: true, ..Goal::default() },
      Goal::default(),
      Goal::default(),
    ];
    let logs = vec![log("2024-03-01", 45.0), log("2024-03-04T07:00:00Z", 30.0)];
    let s = summarize(&goals, &[WorkoutPlan::default()], &logs);
    assert_eq!(s.total_goals, 3);
    assert_eq!(s.completed_goals, 1);
    assert_eq!(s.active_goals, 2);
    assert_eq!(s.total_workout_plans, 1);
    assert_eq!(s.total_workout_logs, 2);
    assert_eq!(s.total_duration_minutes, 75.0);
    assert_eq!(s.last_workout_date, Some(day("2024-03-04")));
  }

  #[test]
  fn window_is_thirty_days_ending_today() {
    let days: Vec<_> = frequency_window(day("2024-03-30")).collect();
    assert_eq!(days.len(), 30);
    assert_eq!(days[0], day("2024-03-01"));
    assert_eq!(days[29], day("2024-03-30"));
  }

  #[test]
  fn frequency_counts_only_inside_window() {
    let logs = vec![
      log("2024-03-30", 20.0),
      log("2024-03-30", 20.0),
      log("2024-03-02", 20.0),
      log("2023-12-25", 20.0),
    ];
    let freq = workout_frequency(&logs, day("2024-03-30"));
    assert_eq!(freq.len(), 30);
    assert_eq!(freq["2024-03-30"], 2);
    assert_eq!(freq["2024-03-02"], 1);
    assert_eq!(freq.values().sum::<u32>(), 3);
  }

  fn obj(v: Value) -> Map<String, Value> {
    match v {
      Value::Object(o) => o,
      other => panic!("not an object: {other}"),
    }
  }

  #[test]
  fn odd_field_types_still_aggregate() {
    let logs: Vec<WorkoutLog> = decode_all(vec![
      obj(json!({
        "workoutDate": "2024-03-30",
        "duration": 40,
        "exerciseLogs": [{ "duration": 90.5 }],
      })),
      obj(json!({ "workoutDate": "2024-03-29T18:00:00Z", "duration": "20.5" })),
    ]);
    let goals: Vec<Goal> = decode_all(vec![obj(json!({
      "name": "Cut",
      "isCompleted": true,
      "targetValue": "70",
    }))]);

    let s = summarize(&goals, &[], &logs);
    assert_eq!(s.completed_goals, 1);
    assert_eq!(s.total_duration_minutes, 60.5);
    assert_eq!(s.last_workout_date, Some(day("2024-03-30")));

    let freq = workout_frequency(&logs, day("2024-03-30"));
    assert_eq!(freq["2024-03-30"], 1);
    assert_eq!(freq["2024-03-29"], 1);
  }

  #[test]
  fn decode_tolerates_odd_records() {
    let mut odd = Map::new();
    odd.insert("duration".into(), Value::String("long".into()));
    let logs: Vec<WorkoutLog> = decode_all(vec![odd, Map::new()]);
    assert_eq!(logs.len(), 2);
  }
}
