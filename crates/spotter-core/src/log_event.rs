//! Log events — facts the user states mid-session that must eventually
//! reach durable storage.
//!
//! A `LogEvent` is created by a tool handler, enqueued without blocking the
//! voice interaction, and consumed exactly once by the persistence worker.
//! Ordering is FIFO within one session's queue; there is no cross-session
//! ordering guarantee.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Kind of fact being recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEntity {
    /// One completed set of an exercise.
    ExerciseSet,
    /// One eaten meal.
    Meal,
    /// A body-weight reading.
    BodyWeight,
    /// Free-form note.
    Note,
}

impl LogEntity {
    /// Stable string name, used in log lines and metric labels.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExerciseSet => "exercise_set",
            Self::Meal => "meal",
            Self::BodyWeight => "body_weight",
            Self::Note => "note",
        }
    }
}

/// One fact to persist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    /// What kind of record this is.
    pub entity: LogEntity,
    /// Entity-specific fields (numbers and short strings).
    pub fields: Map<String, Value>,
    /// Client-observed timestamp of the fact itself.
    pub recorded_at: DateTime<Utc>,
}

impl LogEvent {
    /// Build an event with explicit fields.
    #[must_use]
    pub fn new(entity: LogEntity, fields: Map<String, Value>) -> Self {
        Self {
            entity,
            fields,
            recorded_at: Utc::now(),
        }
    }

    /// One completed set: exercise name, reps, weight, optional RPE.
    #[must_use]
    pub fn exercise_set(exercise: &str, reps: u32, weight_kg: f64, rpe: Option<f64>) -> Self {
        let mut fields = Map::new();
        let _ = fields.insert("exercise".into(), json!(exercise));
        let _ = fields.insert("reps".into(), json!(reps));
        let _ = fields.insert("weightKg".into(), json!(weight_kg));
        if let Some(rpe) = rpe {
            let _ = fields.insert("rpe".into(), json!(rpe));
        }
        Self::new(LogEntity::ExerciseSet, fields)
    }

    /// One eaten meal: description and calories.
    #[must_use]
    pub fn meal(description: &str, kcal: u32) -> Self {
        let mut fields = Map::new();
        let _ = fields.insert("description".into(), json!(description));
        let _ = fields.insert("kcal".into(), json!(kcal));
        Self::new(LogEntity::Meal, fields)
    }

    /// A free-form note.
    #[must_use]
    pub fn note(text: &str) -> Self {
        let mut fields = Map::new();
        let _ = fields.insert("text".into(), json!(text));
        Self::new(LogEntity::Note, fields)
    }

    /// Short human-readable summary for log lines.
    #[must_use]
    pub fn summary(&self) -> String {
        match self.entity {
            LogEntity::ExerciseSet => format!(
                "{} x{} @ {}kg",
                self.fields
                    .get("exercise")
                    .and_then(Value::as_str)
                    .unwrap_or("?"),
                self.fields.get("reps").and_then(Value::as_u64).unwrap_or(0),
                self.fields
                    .get("weightKg")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
            ),
            LogEntity::Meal => format!(
                "{} ({} kcal)",
                self.fields
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("?"),
                self.fields.get("kcal").and_then(Value::as_u64).unwrap_or(0),
            ),
            LogEntity::BodyWeight => format!(
                "{}kg",
                self.fields
                    .get("weightKg")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
            ),
            LogEntity::Note => self
                .fields
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or("?")
                .to_string(),
        }
    }
}
