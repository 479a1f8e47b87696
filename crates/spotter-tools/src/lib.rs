//! # spotter-tools
//!
//! Capability trait and all capability handlers for the Spotter session core.
//!
//! A capability is a named operation the voice/LLM tool layer can invoke.
//! The set is closed and statically known; each handler declares a latency
//! class that is part of the performance contract:
//!
//! - **Cache reads** ([`plans`]) answer from the context snapshot only —
//!   touching storage or the network from one of these is a design bug.
//! - **Queue writes** ([`logs`]) enqueue a [`spotter_core::log_event::LogEvent`]
//!   and confirm before the write is durable.
//! - **Delegated calls** ([`advice`]) go through the
//!   [`Advisor`](traits::Advisor) seam and collapse every failure into one
//!   fixed fallback reply.
//!
//! [`router::Router`] is the single entry point (`invoke`); the
//! [`registry::ToolRegistry`] underneath is immutable after construction.
//!
//! ## Crate Position
//!
//! Depends on spotter-core and spotter-delegate. Depended on by
//! spotter-runtime, which wires the collaborator traits to real components.

#![deny(unsafe_code)]

pub mod advice;
pub mod errors;
pub mod logs;
pub mod plans;
pub mod registry;
pub mod router;
pub mod schema;
pub mod testutil;
pub mod traits;
pub mod validation;

pub use errors::ToolError;
pub use registry::{ToolRegistry, builtin_tools};
pub use router::{FALLBACK_REPLY, Router};
pub use traits::{
    Advisor, ContextReader, EventSink, LatencyClass, SessionTool, ToolContext, ToolOutcome,
};
