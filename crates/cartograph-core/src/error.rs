//! Error taxonomy for graph registry operations.
//!
//! Every failure a store operation can raise is a [`GraphError`]. Callers that
//! need to translate failures into structured responses use
//! [`GraphError::kind`] to get a stable [`ErrorKind`] tag alongside the
//! human-readable message produced by `Display`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The main error type for graph registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A referenced graph, node, edge or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A kind is not permitted for the owning graph, or is not recognized.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A node or resource name collides within the same graph.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// An edge with the same (source, target, kind) triple already exists.
    #[error("duplicate relationship: {0}")]
    DuplicateRelationship(String),

    /// The graph is archived, or the target is a protected root node.
    #[error("immutable state: {0}")]
    ImmutableState(String),

    /// An argument is malformed or missing.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The persistence gateway could not read or write.
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

impl GraphError {
    /// Returns the tag identifying which kind of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::TypeMismatch(_) => ErrorKind::TypeMismatch,
            Self::DuplicateName(_) => ErrorKind::DuplicateName,
            Self::DuplicateRelationship(_) => ErrorKind::DuplicateRelationship,
            Self::ImmutableState(_) => ErrorKind::ImmutableState,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::PersistenceFailure(_) => ErrorKind::PersistenceFailure,
        }
    }

    /// Returns the message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg)
            | Self::TypeMismatch(msg)
            | Self::DuplicateName(msg)
            | Self::DuplicateRelationship(msg)
            | Self::ImmutableState(msg)
            | Self::InvalidInput(msg)
            | Self::PersistenceFailure(msg) => msg,
        }
    }

    /// Convenience constructor for persistence failures caused by another error.
    pub fn persistence(context: &str, err: impl fmt::Display) -> Self {
        Self::PersistenceFailure(format!("{context}: {err}"))
    }
}

/// Stable tag for each [`GraphError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    TypeMismatch,
    DuplicateName,
    DuplicateRelationship,
    ImmutableState,
    InvalidInput,
    PersistenceFailure,
}

impl ErrorKind {
    /// Returns the snake_case name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::TypeMismatch => "type_mismatch",
            Self::DuplicateName => "duplicate_name",
            Self::DuplicateRelationship => "duplicate_relationship",
            Self::ImmutableState => "immutable_state",
            Self::InvalidInput => "invalid_input",
            Self::PersistenceFailure => "persistence_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        let err = GraphError::DuplicateRelationship("a -> b".to_string());
        assert_eq!(err.kind(), ErrorKind::DuplicateRelationship);
        assert_eq!(err.message(), "a -> b");
        assert_eq!(err.to_string(), "duplicate relationship: a -> b");
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::ImmutableState.to_string(), "immutable_state");
        assert_eq!(
            serde_json::to_string(&ErrorKind::PersistenceFailure).unwrap(),
            "\"persistence_failure\""
        );
    }

    #[test]
    fn test_persistence_constructor() {
        let io = std::io::Error::other("disk full");
        let err = GraphError::persistence("failed to write snapshot", io);
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert!(err.message().contains("disk full"));
    }
}
