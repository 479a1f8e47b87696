//! Consumed storage seams.
//!
//! Durable storage is an external collaborator. The core makes exactly two
//! kinds of calls against it: one context read per session start (plus any
//! explicit refresh), and one append per log event. Everything else about
//! the store (engine, schema, batching) is not this crate's business.

use async_trait::async_trait;
use spotter_core::context::UserContext;
use spotter_core::ids::{SessionId, UserId};
use spotter_core::log_event::LogEvent;

/// Storage-side failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("not found")]
    NotFound,

    /// The store could not serve the call.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Internal detail, for logs only.
        message: String,
    },
}

/// Read side: assembles a user's context snapshot in one call.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Load profile, active plans, and preferences for `user_id`.
    async fn load_user_context(&self, user_id: &UserId) -> Result<UserContext, StoreError>;
}

/// Write side: appends one log event durably.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Append one event. One call per event; no batching required.
    async fn append_log(&self, session_id: &SessionId, event: &LogEvent) -> Result<(), StoreError>;
}
