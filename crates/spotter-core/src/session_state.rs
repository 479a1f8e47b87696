//! Session lifecycle states.
//!
//! One `SessionState` per session, owned by the controller. Transitions are
//! one-directional: a session never re-preloads context once it has gone
//! Active, and `Closed` is terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Constructed, `start()` not yet called.
    Created,
    /// Context preload in progress.
    ContextLoading,
    /// Context loaded and worker running; waiting for the transport to attach.
    Ready,
    /// Serving tool calls.
    Active,
    /// Session ending; no new calls, in-flight calls completing.
    Draining,
    /// Terminal. The session object is eligible for disposal.
    Closed,
}

impl SessionState {
    /// Whether tool calls are accepted in this state.
    #[must_use]
    pub fn can_serve(self) -> bool {
        self == Self::Active
    }

    /// Whether this is the terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Closed
    }

    /// Whether the forward transition `self → next` is legal.
    ///
    /// Legal edges: Created→ContextLoading, Created→Closed (disposed before
    /// start), ContextLoading→Ready, ContextLoading→Closed (fatal init),
    /// Ready→Active, Ready→Closed (ended before attach), Active→Draining,
    /// Draining→Closed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::ContextLoading | Self::Closed)
                | (Self::ContextLoading, Self::Ready | Self::Closed)
                | (Self::Ready, Self::Active | Self::Closed)
                | (Self::Active, Self::Draining)
                | (Self::Draining, Self::Closed)
        )
    }

    /// Stable snake_case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::ContextLoading => "context_loading",
            Self::Ready => "ready",
            Self::Active => "active",
            Self::Draining => "draining",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionState::*;

    #[test]
    fn only_active_serves() {
        for state in [Created, ContextLoading, Ready, Draining, Closed] {
            assert!(!state.can_serve(), "{state} should not serve");
        }
        assert!(Active.can_serve());
    }

    #[test]
    fn happy_path_transitions_are_legal() {
        assert!(Created.can_transition_to(ContextLoading));
        assert!(ContextLoading.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Active));
        assert!(Active.can_transition_to(Draining));
        assert!(Draining.can_transition_to(Closed));
    }

    #[test]
    fn no_transition_back_into_ready_from_active() {
        assert!(!Active.can_transition_to(Ready));
        assert!(!Active.can_transition_to(ContextLoading));
    }

    #[test]
    fn closed_is_terminal() {
        assert!(Closed.is_terminal());
        for next in [Created, ContextLoading, Ready, Active, Draining, Closed] {
            assert!(!Closed.can_transition_to(next));
        }
    }

    #[test]
    fn fatal_init_short_circuits_to_closed() {
        assert!(ContextLoading.can_transition_to(Closed));
    }
}
