//! The extension contribution bundle
//!
//! An extension is a pure data bundle supplied once at editor construction:
//! schema fragments, token handlers, serializer handlers, tokenizer rule
//! injections, and opaque UI hooks. Contributions are additive; conflicts
//! are detected during composition, never resolved by shadowing.

use std::sync::Arc;
use vellum_core::schema::SchemaFragment;
use vellum_parser::builder::TokenHandler;
use vellum_parser::{BlockRule, CoreRule, InlineRule, RuleInsertion};
use vellum_serialize::{MarkHandler, NodeHandler};

/// A menu item, key hint, or similar contribution for the view layer.
/// The core stores and forwards the payload without interpreting it, but
/// does check that the referenced type name exists once the schema is
/// finalized.
#[derive(Debug, Clone)]
pub struct UiHook {
    pub name: String,
    /// Node or mark type this hook operates on
    pub type_name: String,
    /// Opaque descriptor for the view layer
    pub payload: serde_json::Value,
}

/// Everything one extension contributes to the composed editor
#[derive(Default)]
pub struct EditorExtension {
    pub name: String,
    pub schema: SchemaFragment,
    /// Token kind -> tree building instruction
    pub token_handlers: Vec<(String, TokenHandler)>,
    /// Node type -> markup emission handler
    pub node_serializers: Vec<(String, NodeHandler)>,
    /// Mark type -> markup emission handler
    pub mark_serializers: Vec<(String, MarkHandler)>,
    pub block_rules: Vec<RuleInsertion<Arc<dyn BlockRule>>>,
    pub inline_rules: Vec<RuleInsertion<Arc<dyn InlineRule>>>,
    pub core_rules: Vec<RuleInsertion<Arc<dyn CoreRule>>>,
    pub ui_hooks: Vec<UiHook>,
}

impl EditorExtension {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
