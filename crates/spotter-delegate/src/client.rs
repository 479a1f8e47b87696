//! Delegation client — single-attempt calls with a hard timeout budget.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use spotter_core::specialist::SpecialistTag;
use tracing::{debug, instrument, warn};

use crate::errors::DelegateError;
use crate::providers::{ProviderRouting, ReasonerProvider};
use crate::reasoner::Reasoner;

/// Default end-to-end budget for one delegated call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// One delegated query as handed to the [`Reasoner`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationRequest {
    /// Specialist to route to.
    pub specialist: SpecialistTag,
    /// Provider selected for this specialist.
    pub provider: ReasonerProvider,
    /// Free-text question.
    pub query: String,
}

/// A specialist's answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Answer text, ready to be spoken.
    pub text: String,
    /// Specialist that answered.
    pub specialist: SpecialistTag,
    /// Provider that served the call.
    pub provider: ReasonerProvider,
}

/// Async request/response bridge to the reasoning subsystem.
///
/// One call is one attempt: no automatic retries, because a reasoning call
/// is expensive and may not be idempotent in side effects. On timeout the
/// call is abandoned from the caller's perspective; downstream abort is the
/// subsystem's business.
pub struct DelegationClient {
    reasoner: Arc<dyn Reasoner>,
    routing: ProviderRouting,
    timeout: Duration,
}

impl DelegationClient {
    /// Create a client with the default timeout budget.
    #[must_use]
    pub fn new(reasoner: Arc<dyn Reasoner>, routing: ProviderRouting) -> Self {
        Self::with_timeout(reasoner, routing, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit timeout budget.
    #[must_use]
    pub fn with_timeout(
        reasoner: Arc<dyn Reasoner>,
        routing: ProviderRouting,
        timeout: Duration,
    ) -> Self {
        Self {
            reasoner,
            routing,
            timeout,
        }
    }

    /// The configured timeout budget.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask a specialist one question.
    ///
    /// Empty and whitespace-only queries are rejected before any network
    /// activity.
    #[instrument(skip_all, fields(specialist = %specialist))]
    pub async fn ask(
        &self,
        specialist: SpecialistTag,
        query: &str,
    ) -> Result<Answer, DelegateError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DelegateError::Rejected {
                message: "empty query".into(),
            });
        }

        let request = DelegationRequest {
            specialist,
            provider: self.routing.select(specialist),
            query: query.to_string(),
        };

        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.reasoner.route(&request)).await;
        let elapsed = start.elapsed();
        histogram!("delegate_call_duration_seconds", "specialist" => specialist.as_str())
            .record(elapsed.as_secs_f64());

        let outcome = match result {
            Ok(Ok(answer)) => {
                debug!(elapsed_ms = elapsed.as_millis() as u64, "specialist answered");
                Ok(answer)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "delegated call failed");
                Err(e)
            }
            Err(_) => {
                let budget_ms = self.timeout.as_millis() as u64;
                warn!(budget_ms, "delegated call timed out; abandoning");
                Err(DelegateError::Timeout { budget_ms })
            }
        };

        let label = match &outcome {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        counter!("delegate_calls_total", "specialist" => specialist.as_str(), "outcome" => label)
            .increment(1);
        outcome
    }
}
