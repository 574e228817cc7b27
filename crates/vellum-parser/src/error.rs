//! Parser error types

use thiserror::Error;
use vellum_core::TreeError;

/// Errors raised while building a tree from a token stream.
///
/// These never reach the editor surface: the public [`crate::MarkupParser::parse`]
/// entry point converts any of them into a degraded-but-valid tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A tokenizer rule emitted a token for a type the schema doesn't know.
    /// This is a contract violation by the rule's author.
    #[error("token '{token_kind}' targets unknown type '{type_name}'")]
    UnknownType {
        token_kind: String,
        type_name: String,
    },

    /// No handler is registered for a token kind present in the stream
    #[error("no handler registered for token kind '{0}'")]
    UnhandledToken(String),

    /// Open/close tokens did not balance
    #[error("unbalanced token stream: {0}")]
    UnbalancedStream(String),

    /// Checked node construction failed mid-build
    #[error("tree construction failed: {0}")]
    Tree(#[from] TreeError),
}

/// Specialized Result for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised while freezing a rule chain from insertion directives
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RulerError {
    /// An insertion directive referenced a rule name that does not exist
    #[error("rule '{rule}' wants to insert {position} unknown rule '{anchor}'")]
    UnknownAnchor {
        rule: String,
        anchor: String,
        position: &'static str,
    },

    /// Two rules were registered under the same name
    #[error("rule '{0}' is registered more than once")]
    DuplicateRule(String),
}
