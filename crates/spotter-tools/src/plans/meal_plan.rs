//! `get_meal_plan` — daily targets and planned meals from the snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::errors::ToolError;
use crate::schema::{ToolDefinition, ToolSchemaBuilder};
use crate::traits::{ContextReader, LatencyClass, SessionTool, ToolContext, ToolOutcome};

/// Serves calorie/protein targets and the planned meals.
pub struct MealPlanTool {
    context: Arc<dyn ContextReader>,
}

impl MealPlanTool {
    /// Create the handler over a context reader.
    pub fn new(context: Arc<dyn ContextReader>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl SessionTool for MealPlanTool {
    fn name(&self) -> &str {
        "get_meal_plan"
    }

    fn latency_class(&self) -> LatencyClass {
        LatencyClass::CacheRead
    }

    fn definition(&self) -> ToolDefinition {
        ToolSchemaBuilder::new(
            "get_meal_plan",
            "Get the user's meal plan: daily calorie and protein targets and the planned meals.",
        )
        .build()
    }

    async fn execute(&self, _args: Value, _ctx: &ToolContext) -> Result<ToolOutcome, ToolError> {
        let snapshot = self.context.snapshot();
        let plan = &snapshot.meal_plan;

        let meals: Vec<String> = plan
            .meals
            .iter()
            .map(|m| format!("{} ({} kcal)", m.name, m.kcal))
            .collect();

        let reply = format!(
            "You're on {}: {} kcal and {}g protein a day, across {}.",
            plan.name,
            plan.daily_kcal,
            plan.protein_g,
            if meals.is_empty() {
                "no planned meals".to_string()
            } else {
                meals.join(", ")
            },
        );

        Ok(ToolOutcome::with_details(reply, json!({ "mealPlan": plan })))
    }
}
