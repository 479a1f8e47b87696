//! `get_todays_workout` — today's training day from the snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::errors::ToolError;
use crate::schema::{ToolDefinition, ToolSchemaBuilder};
use crate::traits::{ContextReader, LatencyClass, SessionTool, ToolContext, ToolOutcome};
use crate::validation::optional_u64;

use super::format_weight;

/// Serves "what am I doing today?" from the cached workout plan.
pub struct TodaysWorkoutTool {
    context: Arc<dyn ContextReader>,
}

impl TodaysWorkoutTool {
    /// Create the handler over a context reader.
    pub fn new(context: Arc<dyn ContextReader>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl SessionTool for TodaysWorkoutTool {
    fn name(&self) -> &str {
        "get_todays_workout"
    }

    fn latency_class(&self) -> LatencyClass {
        LatencyClass::CacheRead
    }

    fn definition(&self) -> ToolDefinition {
        ToolSchemaBuilder::new(
            "get_todays_workout",
            "Get the user's workout for today: focus and prescribed exercises.",
        )
        .property(
            "dayIndex",
            json!({"type": "integer", "description": "0-based day in the plan cycle; defaults to 0"}),
        )
        .build()
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<ToolOutcome, ToolError> {
        let day_index = optional_u64(&args, "dayIndex").unwrap_or(0) as usize;
        let snapshot = self.context.snapshot();

        let Some(day) = snapshot.workout_plan.day(day_index) else {
            return Ok(ToolOutcome::reply(
                "Your plan has no training days yet. Ask your coach to set one up.",
            ));
        };

        let units = snapshot.preferences.unit_system;
        let lines: Vec<String> = day
            .exercises
            .iter()
            .map(|ex| {
                let mut line = format!("{} {}x{}", ex.exercise, ex.sets, ex.reps);
                if let Some(weight) = ex.target_weight_kg {
                    line.push_str(&format!(" at {}", format_weight(weight, units)));
                }
                line
            })
            .collect();

        let reply = if lines.is_empty() {
            format!("Today is a {} day with nothing prescribed yet.", day.focus)
        } else {
            format!("Today is {} day: {}.", day.focus, lines.join(", "))
        };

        Ok(ToolOutcome::with_details(
            reply,
            json!({
                "planName": snapshot.workout_plan.name,
                "day": day,
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{StaticContext, make_ctx, sample_context};

    fn tool() -> (Arc<StaticContext>, TodaysWorkoutTool) {
        let ctx = Arc::new(StaticContext::new(sample_context()));
        let tool = TodaysWorkoutTool::new(Arc::clone(&ctx) as Arc<dyn ContextReader>);
        (ctx, tool)
    }

    #[tokio::test]
    async fn serves_day_zero_by_default() {
        let (_, tool) = tool();
        let r = tool.execute(json!({}), &make_ctx()).await.unwrap();
        assert!(!r.is_error);
        assert!(r.reply.contains("push day"));
        assert!(r.reply.contains("bench press 3x8-10 at 80kg"));
    }

    #[tokio::test]
    async fn day_index_selects_and_wraps() {
        let (_, tool) = tool();
        let r = tool.execute(json!({"dayIndex": 2}), &make_ctx()).await.unwrap();
        assert!(r.reply.contains("legs"));

        // 3-day plan: day 3 wraps to day 0
        let r = tool.execute(json!({"dayIndex": 3}), &make_ctx()).await.unwrap();
        assert!(r.reply.contains("push"));
    }

    #[tokio::test]
    async fn reads_only_the_snapshot() {
        let (ctx, tool) = tool();
        let _ = tool.execute(json!({}), &make_ctx()).await.unwrap();
        // One snapshot read, and no other collaborator exists to call.
        assert_eq!(ctx.read_count(), 1);
    }

    #[tokio::test]
    async fn details_carry_the_structured_day() {
        let (_, tool) = tool();
        let r = tool.execute(json!({}), &make_ctx()).await.unwrap();
        let details = r.details.unwrap();
        assert_eq!(details["planName"], "PPL 3-day");
        assert_eq!(details["day"]["focus"], "push");
    }

    #[tokio::test]
    async fn empty_plan_is_a_calm_reply_not_an_error() {
        let mut context = sample_context();
        context.workout_plan.days.clear();
        let tool = TodaysWorkoutTool::new(Arc::new(StaticContext::new(context)));
        let r = tool.execute(json!({}), &make_ctx()).await.unwrap();
        assert!(!r.is_error);
        assert!(r.reply.contains("no training days"));
    }
}
