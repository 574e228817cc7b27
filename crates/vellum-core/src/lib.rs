//! Vellum document model
//!
//! The foundation of the editor core:
//! - An immutable [`Schema`] describing the document vocabulary (node types,
//!   mark types, attributes, content models)
//! - A validated document tree ([`Node`]) with fail-fast checked construction
//! - The schema merge protocol that folds extension-contributed fragments
//!   into one finalized vocabulary
//!
//! Parsing and serialization live in `vellum-parser` and `vellum-serialize`;
//! both consume the types defined here.

pub mod error;
pub mod schema;
pub mod tree;

pub use error::{SchemaError, SchemaResult, TreeError, TreeResult};
pub use schema::{
    AttributeSpec, ContentExpr, MarkSpec, MarkType, NodeSpec, NodeType, Schema, SchemaFragment,
    SchemaSpec, TypeExtension, MARKUP_ATTR,
};
pub use tree::{Attrs, Mark, Node};
