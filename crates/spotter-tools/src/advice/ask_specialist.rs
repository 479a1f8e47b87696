//! `ask_specialist` — delegate a complex question to the reasoning subsystem.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use spotter_core::specialist::SpecialistTag;
use tracing::warn;

use crate::errors::ToolError;
use crate::router::FALLBACK_REPLY;
use crate::schema::{ToolDefinition, ToolSchemaBuilder};
use crate::traits::{Advisor, LatencyClass, SessionTool, ToolContext, ToolOutcome};
use crate::validation::require_str;

/// Routes a free-text question to one of the closed set of specialists.
///
/// Any delegation failure collapses into the fixed fallback reply; the raw
/// error goes to the logs, never to the user.
pub struct AskSpecialistTool {
    advisor: Arc<dyn Advisor>,
}

impl AskSpecialistTool {
    /// Create the handler over an advisor.
    pub fn new(advisor: Arc<dyn Advisor>) -> Self {
        Self { advisor }
    }
}

#[async_trait]
impl SessionTool for AskSpecialistTool {
    fn name(&self) -> &str {
        "ask_specialist"
    }

    fn latency_class(&self) -> LatencyClass {
        LatencyClass::Delegated
    }

    fn definition(&self) -> ToolDefinition {
        ToolSchemaBuilder::new(
            "ask_specialist",
            "Ask a specialist a question the cached plans can't answer.",
        )
        .required_property(
            "specialist",
            json!({
                "type": "string",
                "enum": ["workout", "diet", "supplement"],
                "description": "Which specialist to ask"
            }),
        )
        .required_property(
            "query",
            json!({"type": "string", "description": "The question, in the user's words"}),
        )
        .build()
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome, ToolError> {
        let tag_str = require_str(&args, "specialist")?;
        let query = require_str(&args, "query")?;

        // Unrecognized tag is a caller error; no network call is made.
        let specialist: SpecialistTag = tag_str.parse().map_err(|_| {
            ToolError::invalid_args(format!(
                "Unknown specialist '{tag_str}'; expected one of: workout, diet, supplement"
            ))
        })?;

        match self.advisor.ask(specialist, query).await {
            Ok(answer) => Ok(ToolOutcome::with_details(
                answer.text,
                json!({
                    "specialist": answer.specialist,
                    "provider": answer.provider,
                }),
            )),
            Err(e) => {
                warn!(
                    session_id = %ctx.session_id,
                    specialist = %specialist,
                    error = %e,
                    "delegated call failed; serving fallback reply"
                );
                Ok(ToolOutcome::error(FALLBACK_REPLY))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotter_delegate::DelegateError;

    use crate::testutil::{ScriptedAdvisor, make_ctx};

    fn tool(advisor: Arc<ScriptedAdvisor>) -> AskSpecialistTool {
        AskSpecialistTool::new(advisor as Arc<dyn Advisor>)
    }

    #[tokio::test]
    async fn each_supported_tag_reaches_the_advisor() {
        for tag in ["workout", "diet", "supplement"] {
            let advisor = Arc::new(ScriptedAdvisor::answering());
            let t = tool(Arc::clone(&advisor));
            let r = t
                .execute(json!({"specialist": tag, "query": "help"}), &make_ctx())
                .await
                .unwrap();
            assert!(!r.is_error);
            assert_eq!(advisor.call_count(), 1);
            assert_eq!(advisor.last_specialist().unwrap().as_str(), tag);
        }
    }

    #[tokio::test]
    async fn unsupported_tag_makes_no_call() {
        let advisor = Arc::new(ScriptedAdvisor::answering());
        let t = tool(Arc::clone(&advisor));
        let err = t
            .execute(json!({"specialist": "astrology", "query": "?"}), &make_ctx())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_arguments");
        assert_eq!(advisor.call_count(), 0);
    }

    #[tokio::test]
    async fn answer_text_is_the_reply() {
        let advisor = Arc::new(ScriptedAdvisor::answering());
        let t = tool(advisor);
        let r = t
            .execute(
                json!({"specialist": "diet", "query": "more protein?"}),
                &make_ctx(),
            )
            .await
            .unwrap();
        assert_eq!(r.reply, "diet says: more protein?");
    }

    #[tokio::test]
    async fn every_failure_kind_becomes_the_fallback_reply() {
        let cases: [fn() -> DelegateError; 3] = [
            || DelegateError::Timeout { budget_ms: 2000 },
            || DelegateError::Unavailable { message: "connection refused".into() },
            || DelegateError::Rejected { message: "bad query".into() },
        ];
        for fail in cases {
            let advisor = Arc::new(ScriptedAdvisor::failing(fail));
            let t = tool(advisor);
            let r = t
                .execute(json!({"specialist": "workout", "query": "?"}), &make_ctx())
                .await
                .unwrap();
            assert!(r.is_error);
            assert_eq!(r.reply, FALLBACK_REPLY);
            // Internal detail never leaks into the outcome.
            assert!(r.details.is_none());
            assert!(!r.reply.contains("connection refused"));
        }
    }
}
