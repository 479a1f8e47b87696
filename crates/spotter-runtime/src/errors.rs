//! Runtime error taxonomy.

use spotter_core::ids::UserId;
use spotter_core::session_state::SessionState;
use spotter_tools::ToolError;

/// Why the context preload failed. Fatal to session start: the caller
/// must abort the connection.
#[derive(Debug, thiserror::Error)]
pub enum ContextLoadError {
    /// No profile data exists for the user.
    #[error("no profile data for user {0}")]
    NotFound(UserId),

    /// The context store could not be reached.
    #[error("context store unavailable: {0}")]
    StoreUnavailable(String),

    /// The session was constructed with a missing or blank user identity.
    #[error("missing or invalid user identity")]
    InvalidIdentity,
}

/// Session-level errors surfaced by the controller.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Context preload failed; the session never reached Ready.
    #[error("session failed to initialize: {0}")]
    FatalInit(#[from] ContextLoadError),

    /// A lifecycle method was called from the wrong state.
    #[error("invalid lifecycle transition: {from} -> {to}")]
    InvalidTransition {
        /// State the session was in.
        from: SessionState,
        /// State the caller tried to enter.
        to: SessionState,
    },

    /// A tool call arrived while the session was not Active.
    #[error("session is not serving calls (state: {0})")]
    NotServing(SessionState),

    /// A context refresh failed; the previous snapshot keeps serving.
    #[error("context refresh failed: {0}")]
    Refresh(ContextLoadError),

    /// A recoverable per-call failure, contained to that call.
    #[error(transparent)]
    Tool(#[from] ToolError),
}
