//! Delegation error taxonomy.

/// Typed failure of one delegated reasoning call.
///
/// These never carry a panic or an unstructured error across the boundary.
/// The client makes exactly one attempt; retry policy, if any, belongs to
/// the caller.
#[derive(Debug, thiserror::Error)]
pub enum DelegateError {
    /// The reasoning subsystem could not be reached or failed internally.
    #[error("reasoning subsystem unavailable: {message}")]
    Unavailable {
        /// Internal detail, for logs only; never shown to the user.
        message: String,
    },

    /// The call exceeded its end-to-end time budget and was abandoned.
    ///
    /// Whether the downstream call is actually aborted is a property of the
    /// reasoning subsystem, not guaranteed here.
    #[error("delegated call exceeded its {budget_ms}ms budget")]
    Timeout {
        /// The budget that was exceeded, in milliseconds.
        budget_ms: u64,
    },

    /// The request was rejected before or by the subsystem (bad input).
    #[error("delegated call rejected: {message}")]
    Rejected {
        /// Internal detail, for logs only; never shown to the user.
        message: String,
    },
}

impl DelegateError {
    /// Stable label for metrics and log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "unavailable",
            Self::Timeout { .. } => "timeout",
            Self::Rejected { .. } => "rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        let e = DelegateError::Timeout { budget_ms: 2000 };
        assert_eq!(e.kind(), "timeout");
        assert!(e.to_string().contains("2000ms"));
    }
}
