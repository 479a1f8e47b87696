//! Session lifecycle events.
//!
//! `SessionEvent`s are broadcast to subscribers (UI bridges, debugging
//! taps) and are never load-bearing for control flow: emission is
//! non-blocking and slow receivers lag and drop. Each variant carries a
//! flattened [`BaseEvent`] with the session ID and timestamp.

use serde::{Deserialize, Serialize};

use crate::log_event::LogEntity;

/// Fields common to every session event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseEvent {
    /// Session this event belongs to.
    pub session_id: String,
    /// ISO 8601 timestamp.
    pub timestamp: String,
}

impl BaseEvent {
    /// Create a new base event with the current UTC timestamp.
    #[must_use]
    pub fn now(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// High-level session lifecycle events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Context preload finished and the snapshot is cached.
    #[serde(rename = "context_loaded")]
    ContextLoaded {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// User the snapshot belongs to.
        #[serde(rename = "userId")]
        user_id: String,
    },

    /// Transport attached; the session is serving.
    #[serde(rename = "session_active")]
    SessionActive {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
    },

    /// One capability invocation finished.
    #[serde(rename = "tool_completed")]
    ToolCompleted {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Capability name.
        capability: String,
        /// Wall time of the call in milliseconds.
        #[serde(rename = "durationMs")]
        duration_ms: u64,
        /// Whether the call produced an error result.
        #[serde(rename = "isError")]
        is_error: bool,
    },

    /// A log event was accepted into the persistence queue.
    #[serde(rename = "log_enqueued")]
    LogEnqueued {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// What kind of record was enqueued.
        entity: LogEntity,
    },

    /// A log event was dropped because the queue was full.
    #[serde(rename = "log_dropped")]
    LogDropped {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// What kind of record was dropped.
        entity: LogEntity,
    },

    /// The worker's durable write failed; the event was discarded.
    #[serde(rename = "log_write_failed")]
    LogWriteFailed {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// What kind of record was lost.
        entity: LogEntity,
    },

    /// Session reached `Closed`.
    #[serde(rename = "session_closed")]
    SessionClosed {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Whether the worker stopped within the grace period.
        #[serde(rename = "drainedCleanly")]
        drained_cleanly: bool,
    },
}

impl SessionEvent {
    /// Get the base event fields.
    #[must_use]
    pub fn base(&self) -> &BaseEvent {
        match self {
            Self::ContextLoaded { base, .. }
            | Self::SessionActive { base }
            | Self::ToolCompleted { base, .. }
            | Self::LogEnqueued { base, .. }
            | Self::LogDropped { base, .. }
            | Self::LogWriteFailed { base, .. }
            | Self::SessionClosed { base, .. } => base,
        }
    }

    /// Session ID this event belongs to.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.base().session_id
    }

    /// Event type string (for type discrimination).
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ContextLoaded { .. } => "context_loaded",
            Self::SessionActive { .. } => "session_active",
            Self::ToolCompleted { .. } => "tool_completed",
            Self::LogEnqueued { .. } => "log_enqueued",
            Self::LogDropped { .. } => "log_dropped",
            Self::LogWriteFailed { .. } => "log_write_failed",
            Self::SessionClosed { .. } => "session_closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_now_stamps_session() {
        let base = BaseEvent::now("sess-1");
        assert_eq!(base.session_id, "sess-1");
        assert!(!base.timestamp.is_empty());
    }

    #[test]
    fn serializes_with_type_tag_and_flattened_base() {
        let ev = SessionEvent::ToolCompleted {
            base: BaseEvent::now("sess-1"),
            capability: "get_todays_workout".into(),
            duration_ms: 3,
            is_error: false,
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["type"], "tool_completed");
        assert_eq!(v["sessionId"], "sess-1");
        assert_eq!(v["capability"], "get_todays_workout");
    }

    #[test]
    fn event_type_matches_serde_tag() {
        let ev = SessionEvent::SessionClosed {
            base: BaseEvent::now("s"),
            drained_cleanly: true,
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["type"], ev.event_type());
    }

    #[test]
    fn session_id_accessor() {
        let ev = SessionEvent::SessionActive {
            base: BaseEvent::now("sess-9"),
        };
        assert_eq!(ev.session_id(), "sess-9");
    }
}
