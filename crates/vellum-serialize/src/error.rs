//! Serializer error types

use thiserror::Error;

/// Errors raised while serializing a tree back to markup.
///
/// A missing handler is a composition error (the schema knows a type the
/// serializer was never taught), not a property of the document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializeError {
    /// No serializer handler is registered for a node type in the tree
    #[error("no serializer handler for node type '{0}'")]
    UnhandledNode(String),

    /// No serializer handler is registered for a mark type in the tree
    #[error("no serializer handler for mark type '{0}'")]
    UnhandledMark(String),
}

/// Specialized Result for serialize operations
pub type SerializeResult<T> = Result<T, SerializeError>;
