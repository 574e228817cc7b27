//! Document tree to markup serialization
//!
//! The inverse of parsing, to the extent the original syntax variant was
//! recorded in `markup` provenance attributes; trees built programmatically
//! serialize to canonical markdown. Handlers for each node and mark type
//! are registered at composition time and drive shared writing primitives
//! on [`SerializerState`].

pub mod error;
pub mod escape;
pub mod serializer;
pub mod state;

pub use error::{SerializeError, SerializeResult};
pub use escape::escape_text;
pub use serializer::{MarkBoundary, MarkHandler, MarkupSerializer, NodeHandler};
pub use state::{ReferenceCatalogue, SerializerState};
