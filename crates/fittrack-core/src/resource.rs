//! The owner-scoped resource families and their storage collections.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::normalize::{self, FieldSpec};

/// A resource family backed by its own document collection.
///
/// Parsing is case-insensitive so `/api/WorkoutPlans` and
/// `/api/workoutplans` name the same collection.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResourceKind {
  Goals,
  #[strum(serialize = "workoutplans")]
  WorkoutPlans,
  #[strum(serialize = "workoutlogs")]
  WorkoutLogs,
  Users,
}

impl ResourceKind {
  /// Collection (table) name in the backing store.
  pub fn collection(self) -> &'static str {
    match self {
      Self::Goals => "goals",
      Self::WorkoutPlans => "workoutplans",
      Self::WorkoutLogs => "workoutlogs",
      Self::Users => "users",
    }
  }

  /// Field table used by the normalizer for top-level records.
  pub fn fields(self) -> &'static [FieldSpec] {
    match self {
      Self::Goals => normalize::GOAL_FIELDS,
      Self::WorkoutPlans => normalize::WORKOUT_PLAN_FIELDS,
      Self::WorkoutLogs => normalize::WORKOUT_LOG_FIELDS,
      Self::Users => normalize::USER_FIELDS,
    }
  }

  /// Human-readable singular noun used in messages.
  pub fn noun(self) -> &'static str {
    match self {
      Self::Goals => "Goal",
      Self::WorkoutPlans => "Workout plan",
      Self::WorkoutLogs => "Workout log",
      Self::Users => "User",
    }
  }
}
