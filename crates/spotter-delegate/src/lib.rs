//! # spotter-delegate
//!
//! Bridge to the external reasoning subsystem.
//!
//! The session core never reasons itself: complex questions are delegated
//! as a single request/response call to a specialist. This crate owns that
//! boundary:
//!
//! - **[`Reasoner`]**: the consumed trait (`route(specialist, query)`)
//! - **[`HttpReasoner`]**: production implementation over HTTP
//! - **[`DelegationClient`]**: single-attempt call with a hard timeout
//!   budget and typed error translation
//! - **[`ReasonerProvider`]** / **[`ProviderRouting`]**: per-specialist
//!   LLM-provider selection, kept out of the session controller
//!
//! ## Crate Position
//!
//! Depends on spotter-core. Depended on by spotter-runtime (wiring) and,
//! through the `Advisor` seam, by the delegated tool handler.

#![deny(unsafe_code)]

pub mod client;
pub mod errors;
pub mod providers;
pub mod reasoner;

pub use client::{Answer, DelegationClient, DelegationRequest};
pub use errors::DelegateError;
pub use providers::{ProviderRouting, ReasonerProvider};
pub use reasoner::{HttpReasoner, HttpReasonerConfig, Reasoner};
