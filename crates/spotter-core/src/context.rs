//! User context snapshot types.
//!
//! A [`UserContext`] is assembled once, before a session starts, from the
//! user's profile, active workout plan, active meal plan, and preferences.
//! It is never mutated in place: a refresh produces a whole new value and
//! the cache swaps the `Arc` atomically, so every reader within a session
//! sees one consistent snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Immutable point-in-time copy of everything the session needs to answer
/// quick questions without touching storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    /// Owner of this snapshot.
    pub user_id: UserId,
    /// Active workout plan.
    pub workout_plan: WorkoutPlan,
    /// Active meal plan.
    pub meal_plan: MealPlan,
    /// Coaching preferences and constraints.
    pub preferences: Preferences,
    /// When the snapshot was assembled.
    pub loaded_at: DateTime<Utc>,
}

/// A workout plan: an ordered cycle of training days.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    /// Plan name, e.g. "PPL 3-day".
    pub name: String,
    /// Training days, in cycle order.
    pub days: Vec<WorkoutDay>,
}

impl WorkoutPlan {
    /// The plan day for a 0-based day index, wrapping modulo plan length.
    ///
    /// A 3-day plan asked for day 4 serves day 1 again. Returns `None` only
    /// for an empty plan.
    #[must_use]
    pub fn day(&self, index: usize) -> Option<&WorkoutDay> {
        if self.days.is_empty() {
            return None;
        }
        self.days.get(index % self.days.len())
    }
}

/// One training day within a plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDay {
    /// 0-based position in the plan cycle.
    pub day_index: usize,
    /// Focus label, e.g. "push" or "legs".
    pub focus: String,
    /// Prescribed exercises for the day.
    pub exercises: Vec<ExercisePrescription>,
}

/// One prescribed exercise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePrescription {
    /// Exercise name.
    pub exercise: String,
    /// Prescribed set count.
    pub sets: u32,
    /// Prescribed reps per set, e.g. "8-10".
    pub reps: String,
    /// Target working weight in kilograms, if prescribed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
    /// Coaching notes, e.g. "pause at the bottom".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A meal plan: daily targets plus the planned meals that hit them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    /// Plan name, e.g. "lean bulk 2200".
    pub name: String,
    /// Daily calorie target.
    pub daily_kcal: u32,
    /// Daily protein target in grams.
    pub protein_g: u32,
    /// Planned meals for one day.
    pub meals: Vec<PlannedMeal>,
}

/// One planned meal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedMeal {
    /// Meal name, e.g. "breakfast".
    pub name: String,
    /// Calories for the meal.
    pub kcal: u32,
    /// What the meal is.
    pub description: String,
}

/// Coaching preferences and constraints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Coaching register, e.g. "drill sergeant" or "encouraging".
    pub coaching_style: String,
    /// Injuries and movement restrictions the coach must respect.
    #[serde(default)]
    pub injuries: Vec<String>,
    /// Unit system for weights and distances.
    pub unit_system: UnitSystem,
}

/// Unit system for user-facing numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Kilograms, kilometers.
    Metric,
    /// Pounds, miles.
    Imperial,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_day_plan() -> WorkoutPlan {
        WorkoutPlan {
            name: "PPL".into(),
            days: (0..3)
                .map(|i| WorkoutDay {
                    day_index: i,
                    focus: format!("day-{i}"),
                    exercises: vec![],
                })
                .collect(),
        }
    }

    #[test]
    fn day_lookup_in_range() {
        let plan = three_day_plan();
        assert_eq!(plan.day(1).unwrap().focus, "day-1");
    }

    #[test]
    fn day_lookup_wraps_modulo_plan_length() {
        let plan = three_day_plan();
        assert_eq!(plan.day(3).unwrap().focus, "day-0");
        assert_eq!(plan.day(7).unwrap().focus, "day-1");
    }

    #[test]
    fn empty_plan_has_no_days() {
        let plan = WorkoutPlan {
            name: "empty".into(),
            days: vec![],
        };
        assert!(plan.day(0).is_none());
    }

    #[test]
    fn unit_system_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UnitSystem::Metric).unwrap(),
            "\"metric\""
        );
    }
}
