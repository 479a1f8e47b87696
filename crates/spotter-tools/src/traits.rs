//! Capability trait, invocation context, and collaborator seams.
//!
//! Handlers never hold concrete runtime components; they hold the narrow
//! traits defined here. The runtime crate wires them to the real
//! `ContextCache`, `PersistenceQueue`, and `DelegationClient`, and tests
//! wire them to mocks.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use spotter_core::context::UserContext;
use spotter_core::ids::SessionId;
use spotter_core::log_event::LogEvent;
use spotter_core::specialist::SpecialistTag;
use spotter_delegate::{Answer, DelegateError, DelegationClient};
use tokio_util::sync::CancellationToken;

use crate::errors::ToolError;
use crate::schema::ToolDefinition;

/// Latency class a handler declares; part of the performance contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LatencyClass {
    /// Answers from the context snapshot only. No storage, no network.
    CacheRead,
    /// Enqueues a log event and confirms before it is durable.
    QueueWrite,
    /// Awaits one delegated reasoning call.
    Delegated,
}

impl LatencyClass {
    /// Stable label for metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CacheRead => "cache_read",
            Self::QueueWrite => "queue_write",
            Self::Delegated => "delegated",
        }
    }
}

/// Per-invocation context handed to every handler.
#[derive(Clone, Debug)]
pub struct ToolContext {
    /// Session the call belongs to.
    pub session_id: SessionId,
    /// Cancelled when the session starts draining.
    pub cancellation: CancellationToken,
}

/// What a handler returns to the voice layer.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolOutcome {
    /// Text for the voice layer to speak or confirm.
    pub reply: String,
    /// Structured payload for the tool layer, when one is useful.
    pub details: Option<Value>,
    /// Whether this outcome describes a failure.
    pub is_error: bool,
}

impl ToolOutcome {
    /// A successful text reply.
    #[must_use]
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: text.into(),
            details: None,
            is_error: false,
        }
    }

    /// A successful reply with a structured payload.
    #[must_use]
    pub fn with_details(text: impl Into<String>, details: Value) -> Self {
        Self {
            reply: text.into(),
            details: Some(details),
            is_error: false,
        }
    }

    /// A failure outcome with user-safe text.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            reply: text.into(),
            details: None,
            is_error: true,
        }
    }
}

/// A capability handler.
#[async_trait]
pub trait SessionTool: Send + Sync {
    /// Capability name, unique within the registry.
    fn name(&self) -> &str;

    /// Declared latency class.
    fn latency_class(&self) -> LatencyClass;

    /// Definition exposed to the LLM tool layer.
    fn definition(&self) -> ToolDefinition;

    /// Run the capability.
    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome, ToolError>;
}

/// Read access to the session's context snapshot.
///
/// This is the only collaborator cache-read handlers hold, which is what
/// makes "no storage, no network" true by construction.
pub trait ContextReader: Send + Sync {
    /// The current snapshot. Pure and non-blocking.
    fn snapshot(&self) -> Arc<UserContext>;
}

/// Write access to the persistence queue.
///
/// `enqueue` never blocks and never fails observably: acknowledgment is
/// immediate and independent of eventual persistence.
pub trait EventSink: Send + Sync {
    /// Hand an event to the background worker.
    fn enqueue(&self, event: LogEvent);
}

/// One delegated question to a specialist.
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Ask, with the advisor's own timeout budget applied.
    async fn ask(&self, specialist: SpecialistTag, query: &str) -> Result<Answer, DelegateError>;
}

#[async_trait]
impl Advisor for DelegationClient {
    async fn ask(&self, specialist: SpecialistTag, query: &str) -> Result<Answer, DelegateError> {
        DelegationClient::ask(self, specialist, query).await
    }
}
