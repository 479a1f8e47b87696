//! # spotter-runtime
//!
//! Session orchestration for Spotter: the state machine that takes one
//! voice-coaching session from preload to teardown.
//!
//! - **[`controller::SessionController`]**: Created → ContextLoading →
//!   Ready → Active → Draining → Closed, owning everything below
//! - **[`context_cache::ContextCache`]**: load-once snapshot with atomic
//!   swap for refresh
//! - **[`persistence::PersistenceQueue`]** + worker: bounded fire-and-forget
//!   queue drained by one background task per session
//! - **[`storage`]**: the consumed `ContextStore`/`LogStore` seams
//! - **[`emitter::EventEmitter`]**: broadcast of lifecycle events
//!
//! ## Crate Position
//!
//! Top of the workspace. Depends on spotter-core, spotter-delegate, and
//! spotter-tools; nothing depends on it.

#![deny(unsafe_code)]

pub mod config;
pub mod context_cache;
pub mod controller;
pub mod emitter;
pub mod errors;
pub mod persistence;
pub mod storage;
pub mod testutil;

pub use config::SessionConfig;
pub use context_cache::ContextCache;
pub use controller::{SessionController, TransportHandle};
pub use emitter::EventEmitter;
pub use errors::{ContextLoadError, SessionError};
pub use persistence::{PersistenceQueue, spawn_worker};
pub use storage::{ContextStore, LogStore, StoreError};
