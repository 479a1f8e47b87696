//! Router — lookup → execute → translate pipeline for one capability call.

use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::errors::ToolError;
use crate::registry::ToolRegistry;
use crate::schema::ToolDefinition;
use crate::traits::{ToolContext, ToolOutcome};

/// The one user-facing reply for any delegation failure.
///
/// Uniform regardless of the underlying cause; internal detail stays in
/// the logs.
pub const FALLBACK_REPLY: &str = "I'm having trouble with that one — could you rephrase?";

/// Convert a `Duration` to milliseconds, rounding up (ceiling).
///
/// `Duration::as_millis()` truncates sub-millisecond values to 0, which
/// makes cache reads report "0ms". At least 1ms is reported for any
/// non-zero duration.
fn duration_ceil_ms(d: Duration) -> u64 {
    let micros = d.as_micros();
    if micros == 0 {
        return 0;
    }
    ((micros + 999) / 1000) as u64
}

/// Single entry point for capability invocation.
///
/// Each call is individually isolated: a failure produces a typed error or
/// an error-flagged outcome for that call only and never affects
/// concurrently in-flight or subsequent calls.
pub struct Router {
    registry: ToolRegistry,
}

impl Router {
    /// Create a router over a finished registry.
    #[must_use]
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Definitions for the LLM tool layer.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    /// Invoke one capability.
    ///
    /// Unknown names come back as [`ToolError::UnknownCapability`] and bad
    /// arguments as [`ToolError::InvalidArguments`], both non-fatal. A
    /// delegation error can never escape: if a handler surfaces one, it is
    /// translated to the fixed [`FALLBACK_REPLY`] here as a second line of
    /// defense.
    #[instrument(skip_all, fields(capability, session_id = %ctx.session_id))]
    pub async fn invoke(
        &self,
        capability: &str,
        args: Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutcome, ToolError> {
        let start = Instant::now();

        let Some(tool) = self.registry.get(capability) else {
            warn!(capability, "unknown capability requested");
            counter!("capability_invocations_total", "capability" => "unknown", "outcome" => "unknown_capability")
                .increment(1);
            return Err(ToolError::UnknownCapability {
                name: capability.to_string(),
            });
        };

        let class = tool.latency_class();
        let result = if ctx.cancellation.is_cancelled() {
            Ok(ToolOutcome::error("Session is ending; call not served."))
        } else {
            tool.execute(args, ctx).await
        };
        let duration_ms = duration_ceil_ms(start.elapsed());
        histogram!("capability_duration_seconds", "capability" => capability.to_string(), "class" => class.as_str())
            .record(start.elapsed().as_secs_f64());

        let (outcome, label) = match result {
            Ok(outcome) => {
                let label = if outcome.is_error { "error" } else { "ok" };
                (Ok(outcome), label)
            }
            Err(ToolError::Delegate(e)) => {
                warn!(capability, error = %e, "delegate error reached the router; translating");
                (Ok(ToolOutcome::error(FALLBACK_REPLY)), "delegate")
            }
            Err(e) => {
                let label = e.kind();
                (Err(e), label)
            }
        };

        counter!("capability_invocations_total", "capability" => capability.to_string(), "outcome" => label)
            .increment(1);
        info!(capability, duration_ms, outcome = label, "capability served");
        outcome
    }
}
