//! Capability invocation errors.

use spotter_delegate::DelegateError;

/// Typed failure of one capability invocation.
///
/// All variants are recoverable: they are reported for that call only and
/// never affect concurrently in-flight or subsequent calls.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The capability name is not in the dispatch table.
    #[error("unknown capability: {name}")]
    UnknownCapability {
        /// The name that was requested.
        name: String,
    },

    /// The arguments did not validate. The message is safe to surface.
    #[error("{message}")]
    InvalidArguments {
        /// User-facing guidance, e.g. "Missing required parameter: reps".
        message: String,
    },

    /// A delegated call failed. Translated to the fixed fallback reply
    /// before it can reach the user.
    #[error(transparent)]
    Delegate(#[from] DelegateError),
}

impl ToolError {
    /// Shorthand for an [`InvalidArguments`](Self::InvalidArguments) error.
    #[must_use]
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }

    /// Stable label for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownCapability { .. } => "unknown_capability",
            Self::InvalidArguments { .. } => "invalid_arguments",
            Self::Delegate(_) => "delegate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_args_message_is_the_display() {
        let e = ToolError::invalid_args("Missing required parameter: reps");
        assert_eq!(e.to_string(), "Missing required parameter: reps");
    }

    #[test]
    fn delegate_errors_convert() {
        let e: ToolError = DelegateError::Timeout { budget_ms: 2000 }.into();
        assert_eq!(e.kind(), "delegate");
    }
}
