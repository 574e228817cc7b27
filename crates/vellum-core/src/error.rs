//! Schema and document-tree error types

use thiserror::Error;

/// Errors raised while merging schema fragments or compiling the final schema.
///
/// All of these indicate a programming error by an extension author and are
/// surfaced eagerly at editor-construction time, never at first parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two different node types were declared under the same name
    #[error("node type '{0}' is declared more than once")]
    DuplicateNode(String),

    /// Two different mark types were declared under the same name
    #[error("mark type '{0}' is declared more than once")]
    DuplicateMark(String),

    /// A single type declared the same attribute twice
    #[error("attribute '{attr}' on type '{type_name}' is declared more than once")]
    DuplicateAttribute { type_name: String, attr: String },

    /// Two extensions both added the same attribute to the same existing type
    #[error("attribute '{attr}' on type '{type_name}' was added by more than one extension")]
    AttributeCollision { type_name: String, attr: String },

    /// A content-model expression referenced a name no declaration resolves
    #[error("content model of '{type_name}' references unknown type or group '{referenced}'")]
    UnknownContentReference {
        type_name: String,
        referenced: String,
    },

    /// A type requires content but no declared type can legally fill it
    #[error("content model of '{0}' cannot be satisfied")]
    UnsatisfiableContent(String),

    /// An extension tried to extend a type that does not exist
    #[error("extension tried to extend unknown type '{0}'")]
    UnknownExtendTarget(String),

    /// The declared top-level node type is missing
    #[error("top node type '{0}' is not declared")]
    MissingTopNode(String),
}

/// Specialized Result for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised by checked node construction.
///
/// These fail loudly: a caller constructing an invalid node gets an error,
/// never a silently coerced tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The requested node or mark type is not in the schema
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// An attribute not declared on the type was supplied
    #[error("type '{type_name}' has no attribute '{attr}'")]
    UnknownAttribute { type_name: String, attr: String },

    /// A required attribute (one without a default) was not supplied
    #[error("type '{type_name}' requires attribute '{attr}'")]
    MissingAttribute { type_name: String, attr: String },

    /// An attribute value failed its declared validator
    #[error("invalid value '{value}' for attribute '{attr}' on type '{type_name}'")]
    InvalidAttribute {
        type_name: String,
        attr: String,
        value: String,
    },

    /// The child sequence does not satisfy the type's content model
    #[error("children of '{type_name}' violate its content model: {detail}")]
    ContentModelViolation { type_name: String, detail: String },

    /// Text content supplied for a non-text node, or children for a text node
    #[error("type '{0}' cannot carry the supplied content shape")]
    InvalidContentShape(String),
}

/// Specialized Result for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

impl TreeError {
    /// Create a content-model violation with a human-readable detail
    pub fn content_violation(type_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ContentModelViolation {
            type_name: type_name.into(),
            detail: detail.into(),
        }
    }
}
