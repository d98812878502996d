//! Error types for Trellis.

use alloc::string::String;
use core::fmt;

/// Result type alias for Trellis operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for change application and view construction.
///
/// Apart from `InvalidSchema` and `Spawn`, every variant describes a change
/// the upstream engine should never have emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A remove, edit or child change addressed a row that is not present.
    NodeNotFound {
        relationship: String,
    },
    /// A second, different row was added to an occupied singular slot.
    SingularConflict {
        relationship: String,
    },
    /// A node or change named a relationship the schema does not declare.
    UnknownRelationship {
        name: String,
    },
    /// A slot's singular/plural shape disagrees with its format.
    ShapeMismatch {
        relationship: String,
    },
    /// Invalid schema definition.
    InvalidSchema {
        message: String,
    },
    /// The executor refused to run the query-completion continuation.
    Spawn {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NodeNotFound { relationship } => {
                write!(f, "Node does not exist in relationship '{}'", relationship)
            }
            Error::SingularConflict { relationship } => {
                write!(
                    f,
                    "Singular relationship '{}' should not have multiple rows. \
                     You may need to declare this relationship as many instead of one",
                    relationship
                )
            }
            Error::UnknownRelationship { name } => {
                write!(f, "Relationship not declared in schema: {}", name)
            }
            Error::ShapeMismatch { relationship } => {
                write!(
                    f,
                    "Relationship '{}' does not match its singular/plural format",
                    relationship
                )
            }
            Error::InvalidSchema { message } => {
                write!(f, "Invalid schema: {}", message)
            }
            Error::Spawn { message } => {
                write!(f, "Failed to spawn completion task: {}", message)
            }
        }
    }
}

impl Error {
    /// Creates a node not found error.
    pub fn node_not_found(relationship: impl Into<String>) -> Self {
        Error::NodeNotFound {
            relationship: relationship.into(),
        }
    }

    /// Creates a singular conflict error.
    pub fn singular_conflict(relationship: impl Into<String>) -> Self {
        Error::SingularConflict {
            relationship: relationship.into(),
        }
    }

    /// Creates an unknown relationship error.
    pub fn unknown_relationship(name: impl Into<String>) -> Self {
        Error::UnknownRelationship { name: name.into() }
    }

    /// Creates a shape mismatch error.
    pub fn shape_mismatch(relationship: impl Into<String>) -> Self {
        Error::ShapeMismatch {
            relationship: relationship.into(),
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates a spawn error.
    pub fn spawn(message: impl Into<String>) -> Self {
        Error::Spawn {
            message: message.into(),
        }
    }

    /// Returns true if this error reports a malformed change from the engine.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::NodeNotFound { .. }
                | Error::SingularConflict { .. }
                | Error::UnknownRelationship { .. }
                | Error::ShapeMismatch { .. }
        )
    }
}
