//! Error types for argument reading.

use serde_json::Value;
use thiserror::Error;

use crate::identifiers::Identifier;

/// A resolver could not turn a parameter into a value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ArgumentError {
    /// Name of the resolver that failed.
    pub argument: String,
    /// The raw parameter that was rejected.
    pub parameter: String,
    /// Machine-readable failure kind.
    pub identifier: Identifier,
    /// Message meant for the user who triggered the command.
    pub message: String,
    /// Extra data, e.g. the bounds that were violated.
    pub context: Value,
}

impl ArgumentError {
    /// Create a new argument error.
    pub fn new(
        argument: impl Into<String>,
        parameter: impl Into<String>,
        identifier: Identifier,
        message: impl Into<String>,
    ) -> Self {
        Self {
            argument: argument.into(),
            parameter: parameter.into(),
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
}

/// Errors returned by [`Args`](super::Args) reads.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgsError {
    /// A resolver rejected the parameter.
    #[error(transparent)]
    Resolution(#[from] ArgumentError),

    /// No token was left to read.
    #[error("There are no more arguments.")]
    MissingArguments,

    /// No resolver is registered under the requested name.
    #[error("The argument \"{name}\" was not found.")]
    UnavailableArgument {
        /// The requested resolver name.
        name: String,
    },

    /// The resolver produced a different kind of value than requested.
    #[error("The argument \"{argument}\" resolved to a {found} value, which is not the requested type.")]
    UnexpectedType {
        /// Name of the resolver.
        argument: String,
        /// Kind of value it produced.
        found: &'static str,
    },
}

impl ArgsError {
    /// Machine-readable failure kind.
    pub fn identifier(&self) -> Identifier {
        match self {
            Self::Resolution(error) => error.identifier.clone(),
            Self::MissingArguments => Identifier::MissingArguments,
            Self::UnavailableArgument { .. } => Identifier::UnavailableArgument,
            Self::UnexpectedType { .. } => Identifier::UnexpectedArgumentType,
        }
    }

    /// The rejected raw parameter, for resolution failures.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::Resolution(error) => Some(&error.parameter),
            _ => None,
        }
    }

    /// Whether this is a configuration defect rather than bad input.
    pub fn is_configuration_defect(&self) -> bool {
        self.identifier().is_configuration_defect()
    }
}

/// Result type for argument reads.
pub type ArgumentResult<T> = Result<T, ArgsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(ArgsError::MissingArguments.to_string(), "There are no more arguments.");
        assert_eq!(
            ArgsError::UnavailableArgument { name: "colour".to_string() }.to_string(),
            "The argument \"colour\" was not found."
        );

        let error = ArgumentError::new("number", "abc", Identifier::ArgumentNumberError, "nope");
        let error = ArgsError::from(error);
        assert_eq!(error.to_string(), "nope");
        assert_eq!(error.parameter(), Some("abc"));
        assert_eq!(error.identifier(), Identifier::ArgumentNumberError);
        assert!(!error.is_configuration_defect());
        assert!(ArgsError::UnavailableArgument { name: "x".into() }.is_configuration_defect());
    }
}
