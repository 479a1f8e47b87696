//! `log_meal` — record one eaten meal.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use spotter_core::log_event::LogEvent;

use crate::errors::ToolError;
use crate::schema::{ToolDefinition, ToolSchemaBuilder};
use crate::traits::{EventSink, LatencyClass, SessionTool, ToolContext, ToolOutcome};
use crate::validation::{require_str, require_u64};

/// Records an eaten meal into the persistence queue.
pub struct LogMealTool {
    sink: Arc<dyn EventSink>,
}

impl LogMealTool {
    /// Create the handler over an event sink.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl SessionTool for LogMealTool {
    fn name(&self) -> &str {
        "log_meal"
    }

    fn latency_class(&self) -> LatencyClass {
        LatencyClass::QueueWrite
    }

    fn definition(&self) -> ToolDefinition {
        ToolSchemaBuilder::new("log_meal", "Record an eaten meal and its calories.")
            .required_property(
                "description",
                json!({"type": "string", "description": "What was eaten"}),
            )
            .required_property(
                "kcal",
                json!({"type": "integer", "description": "Estimated calories"}),
            )
            .build()
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<ToolOutcome, ToolError> {
        let description = require_str(&args, "description")?;
        let kcal = require_u64(&args, "kcal")? as u32;

        let event = LogEvent::meal(description, kcal);
        let summary = event.summary();
        self.sink.enqueue(event);

        Ok(ToolOutcome::with_details(
            format!("Logged — {summary}."),
            json!({ "entity": "meal", "summary": summary }),
        ))
    }
}
