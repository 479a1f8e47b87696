//! `get_preferences` — coaching style, injuries, and units from the snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use spotter_core::context::UnitSystem;

use crate::errors::ToolError;
use crate::schema::{ToolDefinition, ToolSchemaBuilder};
use crate::traits::{ContextReader, LatencyClass, SessionTool, ToolContext, ToolOutcome};

/// Serves the user's coaching preferences and constraints.
pub struct PreferencesTool {
    context: Arc<dyn ContextReader>,
}

impl PreferencesTool {
    /// Create the handler over a context reader.
    pub fn new(context: Arc<dyn ContextReader>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl SessionTool for PreferencesTool {
    fn name(&self) -> &str {
        "get_preferences"
    }

    fn latency_class(&self) -> LatencyClass {
        LatencyClass::CacheRead
    }

    fn definition(&self) -> ToolDefinition {
        ToolSchemaBuilder::new(
            "get_preferences",
            "Get the user's coaching preferences, injuries to respect, and unit system.",
        )
        .build()
    }

    async fn execute(&self, _args: Value, _ctx: &ToolContext) -> Result<ToolOutcome, ToolError> {
        let snapshot = self.context.snapshot();
        let prefs = &snapshot.preferences;

        let injuries = if prefs.injuries.is_empty() {
            "no flagged injuries".to_string()
        } else {
            format!("watching: {}", prefs.injuries.join(", "))
        };
        let units = match prefs.unit_system {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        };
        let reply = format!(
            "Coaching style is {}, {injuries}, units are {units}.",
            prefs.coaching_style,
        );

        Ok(ToolOutcome::with_details(
            reply,
            json!({ "preferences": prefs }),
        ))
    }
}
