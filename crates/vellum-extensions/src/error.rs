//! Composition error types
//!
//! Every variant is a configuration error by an extension author, detected
//! eagerly at compose time. Last-registration-wins is deliberately not an
//! option: order-dependent silent shadowing is harder to debug than an
//! upfront failure.

use thiserror::Error;
use vellum_core::SchemaError;
use vellum_parser::RulerError;

#[derive(Debug, Error)]
pub enum ComposeError {
    /// Schema fragments collided or produced an invalid vocabulary
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A tokenizer rule injection referenced an unknown anchor or reused a name
    #[error(transparent)]
    Ruler(#[from] RulerError),

    /// Two contributions registered a parser handler for the same token kind
    #[error("extensions '{first}' and '{second}' both handle token kind '{kind}'")]
    DuplicateTokenHandler {
        kind: String,
        first: String,
        second: String,
    },

    /// Two contributions registered a serializer for the same node type
    #[error("extensions '{first}' and '{second}' both serialize node type '{type_name}'")]
    DuplicateNodeSerializer {
        type_name: String,
        first: String,
        second: String,
    },

    /// Two contributions registered a serializer for the same mark type
    #[error("extensions '{first}' and '{second}' both serialize mark type '{type_name}'")]
    DuplicateMarkSerializer {
        type_name: String,
        first: String,
        second: String,
    },

    /// A token handler targets a node or mark type the finalized schema lacks
    #[error("token handler for kind '{kind}' targets unknown type '{type_name}'")]
    UnknownHandlerTarget { kind: String, type_name: String },

    /// A UI hook referenced a node or mark type the finalized schema lacks
    #[error("UI hook '{hook}' from extension '{extension}' references unknown type '{type_name}'")]
    UnknownUiHookType {
        hook: String,
        extension: String,
        type_name: String,
    },
}

pub type ComposeResult<T> = Result<T, ComposeError>;
