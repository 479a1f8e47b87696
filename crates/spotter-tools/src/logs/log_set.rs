//! `log_set` — record one completed set.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use spotter_core::log_event::LogEvent;

use crate::errors::ToolError;
use crate::schema::{ToolDefinition, ToolSchemaBuilder};
use crate::traits::{EventSink, LatencyClass, SessionTool, ToolContext, ToolOutcome};
use crate::validation::{optional_f64, require_f64, require_str, require_u64};

/// Records a completed set into the persistence queue.
pub struct LogSetTool {
    sink: Arc<dyn EventSink>,
}

impl LogSetTool {
    /// Create the handler over an event sink.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl SessionTool for LogSetTool {
    fn name(&self) -> &str {
        "log_set"
    }

    fn latency_class(&self) -> LatencyClass {
        LatencyClass::QueueWrite
    }

    fn definition(&self) -> ToolDefinition {
        ToolSchemaBuilder::new(
            "log_set",
            "Record one completed set: exercise, reps, and weight in kilograms.",
        )
        .required_property("exercise", json!({"type": "string", "description": "Exercise name"}))
        .required_property("reps", json!({"type": "integer", "description": "Reps completed"}))
        .required_property(
            "weightKg",
            json!({"type": "number", "description": "Weight used, in kilograms"}),
        )
        .property("rpe", json!({"type": "number", "description": "Rate of perceived exertion, 1-10"}))
        .build()
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<ToolOutcome, ToolError> {
        let exercise = require_str(&args, "exercise")?;
        let reps = require_u64(&args, "reps")? as u32;
        let weight_kg = require_f64(&args, "weightKg")?;
        let rpe = optional_f64(&args, "rpe");

        if reps == 0 {
            return Err(ToolError::invalid_args("Parameter 'reps' must be at least 1"));
        }

        let event = LogEvent::exercise_set(exercise, reps, weight_kg, rpe);
        let summary = event.summary();
        self.sink.enqueue(event);

        // Confirmed before the write is durable; that's the contract.
        Ok(ToolOutcome::with_details(
            format!("Logged — {summary}."),
            json!({ "entity": "exercise_set", "summary": summary }),
        ))
    }
}
