//! Error types for piece registries.

use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A piece with the same name is already registered.
    #[error("{kind} '{name}' already registered")]
    Conflict {
        /// Kind of piece stored in the registry.
        kind: &'static str,
        /// Name of the conflicting piece.
        name: String,
    },

    /// An alias is already claimed by another piece.
    #[error("{kind} alias '{alias}' already points at '{owner}'")]
    AliasConflict {
        /// Kind of piece stored in the registry.
        kind: &'static str,
        /// The contested alias.
        alias: String,
        /// Name of the piece currently owning the alias.
        owner: String,
    },

    /// The piece name is invalid (empty or contains whitespace).
    #[error("Invalid {kind} name '{name}': must be non-empty and contain no whitespace")]
    InvalidName {
        /// Kind of piece stored in the registry.
        kind: &'static str,
        /// The rejected name.
        name: String,
    },

    /// The requested piece was not found.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Kind of piece stored in the registry.
        kind: &'static str,
        /// The requested name.
        name: String,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::Conflict {
            kind: "argument",
            name: "number".to_string(),
        };
        assert!(err.to_string().contains("number"));
        assert!(err.to_string().contains("argument"));

        let err = RegistryError::AliasConflict {
            kind: "command",
            alias: "b".to_string(),
            owner: "ban".to_string(),
        };
        assert!(err.to_string().contains("'b'"));
        assert!(err.to_string().contains("ban"));

        let err = RegistryError::InvalidName {
            kind: "command",
            name: "bad name".to_string(),
        };
        assert!(err.to_string().contains("bad name"));
    }
}
