//! Error type for denied invocations.

use serde_json::Value;
use thiserror::Error;

use crate::identifiers::Identifier;

/// A precondition denied the invocation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct PreconditionError {
    /// Name of the denying precondition.
    pub precondition: String,
    /// Machine-readable failure kind.
    pub identifier: Identifier,
    /// Message meant for the user who triggered the command.
    pub message: String,
    /// Extra data, e.g. the missing permissions or the remaining cooldown.
    pub context: Value,
}

impl PreconditionError {
    /// Create a new precondition error.
    pub fn new(precondition: impl Into<String>, identifier: Identifier, message: impl Into<String>) -> Self {
        Self {
            precondition: precondition.into(),
            identifier,
            message: message.into(),
            context: Value::Null,
        }
    }

    /// Attach extra context.
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    /// Whether this is a configuration defect rather than a legitimate denial.
    pub fn is_configuration_defect(&self) -> bool {
        self.identifier.is_configuration_defect()
    }
}

/// Outcome of a precondition check.
pub type PreconditionResult = Result<(), PreconditionError>;
