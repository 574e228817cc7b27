//! Extension composition for the vellum editor core
//!
//! Ships the base markdown contribution, the multi-language snippet
//! extension, and the composition machinery that folds any set of
//! contributions into one frozen [`Editor`].
//!
//! ```
//! use vellum_extensions::base::{base_extension, TOP_NODE};
//! use vellum_extensions::compose::EditorBuilder;
//! use vellum_extensions::snippet::snippet_extension;
//!
//! let editor = EditorBuilder::new(TOP_NODE, base_extension())
//!     .extension(snippet_extension())
//!     .compose()
//!     .unwrap();
//! let parsed = editor.parse("# Hello").unwrap();
//! assert_eq!(editor.serialize(&parsed.doc).unwrap(), "# Hello");
//! ```

pub mod base;
pub mod compose;
pub mod contribution;
pub mod error;
pub mod snippet;

pub use base::{base_extension, TOP_NODE};
pub use compose::{Editor, EditorBuilder};
pub use contribution::{EditorExtension, UiHook};
pub use error::{ComposeError, ComposeResult};
pub use snippet::snippet_extension;
