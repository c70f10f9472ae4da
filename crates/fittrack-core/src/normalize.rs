//! Field-name normalization between the legacy PascalCase record shape and
//! the camelCase shape served to clients.
//!
//! Every resource has its own field table. Mapping is done field by field
//! rather than by blanket case conversion: only the fields named in a table
//! are touched, and anything else in the record passes through unchanged.
//!
//! Precedence for a field present under both names is PascalCase first, then
//! camelCase, then the field's default. A JSON `null` counts as absent.

use serde_json::{Map, Value};

// ─── Field tables ────────────────────────────────────────────────────────────

/// Value a field takes when neither of its names is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
  /// `""`
  Text,
  /// `0`
  Number,
  /// `false`
  Flag,
  /// `[]`
  List,
  /// `null`
  Null,
}

impl FieldDefault {
  pub fn value(self) -> Value {
    match self {
      Self::Text => Value::String(String::new()),
      Self::Number => Value::from(0),
      Self::Flag => Value::Bool(false),
      Self::List => Value::Array(Vec::new()),
      Self::Null => Value::Null,
    }
  }
}

/// One field of a record under both naming conventions.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
  pub camel:    &'static str,
  pub pascal:   &'static str,
  pub default:  FieldDefault,
  /// Must be present and non-empty when a record is created.
  pub required: bool,
  /// Field table for the elements of a nested sequence.
  pub nested:   Option<&'static [FieldSpec]>,
}

const fn field(
  camel: &'static str,
  pascal: &'static str,
  default: FieldDefault,
) -> FieldSpec {
  FieldSpec { camel, pascal, default, required: false, nested: None }
}

const fn required(camel: &'static str, pascal: &'static str) -> FieldSpec {
  FieldSpec {
    camel,
    pascal,
    default: FieldDefault::Text,
    required: true,
    nested: None,
  }
}

const fn list_of(
  camel: &'static str,
  pascal: &'static str,
  nested: &'static [FieldSpec],
) -> FieldSpec {
  FieldSpec {
    camel,
    pascal,
    default: FieldDefault::List,
    required: false,
    nested: Some(nested),
  }
}

use FieldDefault::{Flag, List, Null, Number, Text};

pub const GOAL_PROGRESS_FIELDS: &[FieldSpec] = &[
  field("date", "Date", Null),
  field("value", "Value", Number),
  field("notes", "Notes", Text),
];

pub const GOAL_FIELDS: &[FieldSpec] = &[
  required("name", "Name"),
  field("description", "Description", Text),
  field("startDate", "StartDate", Null),
  field("targetDate", "TargetDate", Null),
  field("startingValue", "StartingValue", Number),
  field("currentValue", "CurrentValue", Number),
  field("targetValue", "TargetValue", Number),
  field("metricType", "MetricType", Text),
  field("unit", "Unit", Text),
  field("isCompleted", "IsCompleted", Flag),
  list_of("progresses", "Progresses", GOAL_PROGRESS_FIELDS),
];

pub const EXERCISE_FIELDS: &[FieldSpec] = &[
  field("id", "Id", Null),
  required("name", "Name"),
  field("description", "Description", Text),
  field("sets", "Sets", Number),
  field("reps", "Reps", Number),
  field("duration", "Duration", Null),
  field("muscleGroups", "MuscleGroups", List),
];

pub const WORKOUT_PLAN_FIELDS: &[FieldSpec] = &[
  required("name", "Name"),
  field("description", "Description", Text),
  field("frequency", "Frequency", Text),
  list_of("exercises", "Exercises", EXERCISE_FIELDS),
];

pub const EXERCISE_LOG_FIELDS: &[FieldSpec] = &[
  field("id", "Id", Null),
  field("exerciseName", "ExerciseName", Text),
  field("sets", "Sets", Number),
  field("reps", "Reps", Number),
  field("weight", "Weight", Number),
  field("weightUnit", "WeightUnit", Text),
  field("duration", "Duration", Null),
];

pub const WORKOUT_LOG_FIELDS: &[FieldSpec] = &[
  field("workoutDate", "WorkoutDate", Null),
  field("duration", "Duration", Number),
  field("notes", "Notes", Text),
  field("workoutPlanId", "WorkoutPlanId", Null),
  list_of("exerciseLogs", "ExerciseLogs", EXERCISE_LOG_FIELDS),
];

pub const USER_FIELDS: &[FieldSpec] = &[
  field("name", "Name", Text),
  field("email", "Email", Text),
  field("picture", "Picture", Text),
  field("unitSystem", "UnitSystem", Text),
];

/// Store-owned keys as either API generation sends them.
pub const RECORD_KEYS: &[FieldSpec] = &[
  field("id", "Id", Null),
  field("userId", "UserId", Null),
  field("createdAt", "CreatedAt", Null),
  field("updatedAt", "UpdatedAt", Null),
];

/// Keys owned by the store. Never accepted from a client payload.
pub const SYSTEM_KEYS: &[&str] = &[
  "id", "Id", "_id", "userId", "UserId", "createdAt", "CreatedAt",
  "updatedAt", "UpdatedAt",
];

// ─── Mapping ─────────────────────────────────────────────────────────────────

fn pick<'a>(record: &'a Map<String, Value>, entry: &FieldSpec) -> Option<&'a Value> {
  record
    .get(entry.pascal)
    .filter(|v| !v.is_null())
    .or_else(|| record.get(entry.camel).filter(|v| !v.is_null()))
}

fn map_nested(
  entry: &FieldSpec,
  value: &Value,
  f: fn(&[FieldSpec], &Map<String, Value>) -> Map<String, Value>,
) -> Value {
  match (entry.nested, value) {
    (Some(fields), Value::Array(items)) => Value::Array(
      items
        .iter()
        .map(|item| match item {
          Value::Object(obj) => Value::Object(f(fields, obj)),
          other => other.clone(),
        })
        .collect(),
    ),
    _ => value.clone(),
  }
}

/// Produce the camelCase client shape, filling defaults for absent fields.
pub fn to_client(fields: &[FieldSpec], record: &Map<String, Value>) -> Map<String, Value> {
  let mut out = record.clone();
  for entry in fields {
    let value = match pick(record, entry) {
      Some(v) => map_nested(entry, v, to_client),
      None => entry.default.value(),
    };
    out.remove(entry.pascal);
    out.insert(entry.camel.to_owned(), value);
  }
  out
}

/// Like [`to_client`] but only renames; absent fields stay absent.
///
/// Used for partial updates, where filling defaults would overwrite stored
/// values the client did not send.
pub fn canonical_keys(
  fields: &[FieldSpec],
  record: &Map<String, Value>,
) -> Map<String, Value> {
  let mut out = record.clone();
  for entry in fields {
    let value = pick(record, entry).map(|v| map_nested(entry, v, canonical_keys));
    out.remove(entry.pascal);
    match value {
      Some(v) => {
        out.insert(entry.camel.to_owned(), v);
      }
      None => {
        out.remove(entry.camel);
      }
    }
  }
  out
}

/// Produce the PascalCase storage shape.
pub fn to_storage(fields: &[FieldSpec], record: &Map<String, Value>) -> Map<String, Value> {
  let mut out = record.clone();
  for entry in fields {
    let value = pick(record, entry).map(|v| map_nested(entry, v, to_storage));
    out.remove(entry.camel);
    match value {
      Some(v) => {
        out.insert(entry.pascal.to_owned(), v);
      }
      None => {
        out.remove(entry.pascal);
      }
    }
  }
  out
}

/// Remove every store-owned key from a client payload.
pub fn strip_system_keys(record: &mut Map<String, Value>) {
  for key in SYSTEM_KEYS {
    record.remove(*key);
  }
}

/// The first required field missing (or empty) under both names.
pub fn missing_required(
  fields: &[FieldSpec],
  record: &Map<String, Value>,
) -> Option<&'static str> {
  fields
    .iter()
    .filter(|entry| entry.required)
    .find(|entry| match pick(record, entry) {
      None => true,
      Some(Value::String(s)) => s.trim().is_empty(),
      Some(_) => false,
    })
    .map(|entry| entry.camel)
}

/// Client shape of a record received from an API of either generation:
/// [`to_client`] plus renaming of the store-owned keys, which stay absent
/// when absent.
pub fn received(fields: &[FieldSpec], record: &Map<String, Value>) -> Map<String, Value> {
  to_client(fields, &canonical_keys(RECORD_KEYS, record))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn obj(v: Value) -> Map<String, Value> {
    match v {
      Value::Object(m) => m,
      _ => panic!("not an object"),
    }
  }

  #[test]
  fn pascal_wins_over_camel() {
    let rec = obj(json!({ "Name": "Legacy", "name": "Current" }));
    let out = to_client(GOAL_FIELDS, &rec);
    assert_eq!(out["name"], "Legacy");
    assert!(!out.contains_key("Name"));
  }

  #[test]
  fn camel_used_when_pascal_absent_or_null() {
    let rec = obj(json!({ "Name": null, "name": "Current" }));
    assert_eq!(to_client(GOAL_FIELDS, &rec)["name"], "Current");
  }

  #[test]
  fn defaults_fill_missing_fields() {
    let out = to_client(GOAL_FIELDS, &Map::new());
    assert_eq!(out["name"], "");
    assert_eq!(out["targetValue"], 0);
    assert_eq!(out["isCompleted"], false);
    assert_eq!(out["progresses"], json!([]));
    assert_eq!(out["startDate"], Value::Null);
  }

  #[test]
  fn unknown_fields_pass_through() {
    let rec = obj(json!({ "Name": "Run", "Colour": "red", "mood": 3 }));
    let out = to_client(GOAL_FIELDS, &rec);
    assert_eq!(out["Colour"], "red");
    assert_eq!(out["mood"], 3);
  }

  #[test]
  fn nested_exercises_use_their_own_table() {
    let rec = obj(json!({
      "Name": "Push day",
      "Exercises": [{ "Name": "Bench", "Sets": 3, "Reps": 8, "Grip": "wide" }]
    }));
    let out = to_client(WORKOUT_PLAN_FIELDS, &rec);
    let ex = &out["exercises"][0];
    assert_eq!(ex["name"], "Bench");
    assert_eq!(ex["sets"], 3);
    assert_eq!(ex["muscleGroups"], json!([]));
    assert_eq!(ex["Grip"], "wide");
    // Goal-only fields never leak into an exercise.
    assert!(ex.get("targetValue").is_none());
  }

  #[test]
  fn storage_shape_is_pascal() {
    let rec = obj(json!({
      "name": "Lose Weight",
      "targetValue": 70,
      "progresses": [{ "date": "2023-02-01", "value": 78 }],
      "extra": true
    }));
    let out = to_storage(GOAL_FIELDS, &rec);
    assert_eq!(out["Name"], "Lose Weight");
    assert_eq!(out["TargetValue"], 70);
    assert_eq!(out["Progresses"][0]["Value"], 78);
    assert_eq!(out["extra"], true);
    assert!(!out.contains_key("name"));
    // Absent fields are not invented in storage.
    assert!(!out.contains_key("Unit"));

    let back = to_client(GOAL_FIELDS, &out);
    assert_eq!(back["name"], "Lose Weight");
    assert_eq!(back["progresses"][0]["date"], "2023-02-01");
  }

  #[test]
  fn canonical_keys_do_not_invent_defaults() {
    let rec = obj(json!({ "CurrentValue": 75 }));
    let out = canonical_keys(GOAL_FIELDS, &rec);
    assert_eq!(out.len(), 1);
    assert_eq!(out["currentValue"], 75);
  }

  #[test]
  fn required_fields_are_reported() {
    assert_eq!(missing_required(GOAL_FIELDS, &Map::new()), Some("name"));
    let blank = obj(json!({ "name": "  " }));
    assert_eq!(missing_required(GOAL_FIELDS, &blank), Some("name"));
    let ok = obj(json!({ "Name": "Run" }));
    assert_eq!(missing_required(GOAL_FIELDS, &ok), None);
    assert_eq!(missing_required(USER_FIELDS, &Map::new()), None);
  }

  #[test]
  fn system_keys_are_stripped() {
    let mut rec = obj(json!({ "id": "x", "UserId": "mallory", "_id": 1, "name": "a" }));
    strip_system_keys(&mut rec);
    assert_eq!(rec.len(), 1);
  }

  #[test]
  fn received_records_rename_store_keys() {
    let rec = obj(json!({ "Id": "g1", "UserId": "alice", "Name": "Run" }));
    let out = received(GOAL_FIELDS, &rec);
    assert_eq!(out["id"], "g1");
    assert_eq!(out["userId"], "alice");
    assert_eq!(out["name"], "Run");
    assert!(!out.contains_key("Id"));
    assert!(!out.contains_key("createdAt"));
  }
}
