//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent violations of the document tree rules.
/// All of them are recoverable: the tree passed in is never modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("parent not found or not a container: {0}")]
    ParentNotFound(NodeId),

    #[error("cannot move node {node} into itself or its descendant {parent}")]
    Cycle { node: NodeId, parent: NodeId },

    #[error("unsupported element kind: {0}")]
    UnsupportedKind(String),

    #[error("columns layout must have 2 or 3 slots, got {0}")]
    InvalidColumnCount(usize),

    #[error("column {0} can only live inside its columns layout")]
    ColumnPlacement(NodeId),

    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("invalid content for {kind} node: {message}")]
    InvalidContent { kind: String, message: String },

    #[error("malformed template: {0}")]
    Malformed(String),

    #[error("template format version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
