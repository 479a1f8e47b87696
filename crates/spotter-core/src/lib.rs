//! # spotter-core
//!
//! Foundation types for the Spotter voice-session core.
//!
//! This crate provides the shared vocabulary that all other Spotter crates
//! depend on:
//!
//! - **Branded IDs**: [`ids::UserId`], [`ids::SessionId`] as newtypes
//! - **Context snapshots**: [`context::UserContext`] and the plan types inside it
//! - **Log events**: [`log_event::LogEvent`] value type for deferred persistence
//! - **Session lifecycle**: [`session_state::SessionState`] transition enum
//! - **Specialists**: [`specialist::SpecialistTag`] closed delegation targets
//! - **Events**: [`events::SessionEvent`] lifecycle events for subscribers
//! - **Logging**: [`logging::init_tracing`] subscriber setup
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other spotter crates.

#![deny(unsafe_code)]

pub mod context;
pub mod events;
pub mod ids;
pub mod log_event;
pub mod logging;
pub mod session_state;
pub mod specialist;
