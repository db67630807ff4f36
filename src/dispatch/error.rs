//! Failures raised by command bodies.

use thiserror::Error;

/// A command body did not complete successfully.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The body returned an error.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),

    /// The body panicked.
    #[error("the command panicked: {0}")]
    Panicked(String),

    /// The dispatch future was dropped while the body was still running.
    #[error("the command was cancelled before it finished")]
    Cancelled,
}

impl ExecutionError {
    /// Whether the body panicked rather than returning an error.
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }

    /// Whether the body never completed because its future was dropped.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Failed(_) => "error",
            Self::Panicked(_) => "panic",
            Self::Cancelled => "cancelled",
        }
    }
}
