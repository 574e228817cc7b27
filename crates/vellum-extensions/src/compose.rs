//! Editor composition
//!
//! Folds the base contribution and any number of extensions into one
//! frozen [`Editor`]: a finalized schema, a parser with the full rule
//! chains and handler table, and a serializer with the full emission
//! tables. Composition happens exactly once; every conflict (colliding
//! type names, duplicate handlers, unknown rule anchors, dangling UI
//! hooks) fails eagerly with the names of the offending extensions.

use std::collections::BTreeMap;
use std::sync::Arc;
use vellum_core::schema::{Schema, SchemaSpec};
use vellum_core::tree::Node;
use vellum_parser::builder::{TokenHandler, TokenHandlers};
use vellum_parser::{
    BlockRule, CoreRule, InlineRule, LinkValidator, MarkupParser, MarkupTokenizer, Parsed,
    ParseResult, RuleChain, RuleInsertion,
};
use vellum_serialize::{MarkHandler, MarkupSerializer, NodeHandler, SerializeResult};

use crate::contribution::{EditorExtension, UiHook};
use crate::error::{ComposeError, ComposeResult};

/// A fully composed, immutable editor core
pub struct Editor {
    schema: Schema,
    parser: MarkupParser,
    serializer: MarkupSerializer,
    ui_hooks: Vec<UiHook>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("schema", &self.schema)
            .field("ui_hooks", &self.ui_hooks)
            .finish_non_exhaustive()
    }
}

impl Editor {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn ui_hooks(&self) -> &[UiHook] {
        &self.ui_hooks
    }

    /// Parse markup with the degraded-tree guarantee
    pub fn parse(&self, src: &str) -> ParseResult<Parsed> {
        self.parser.parse(src)
    }

    /// Parse markup, surfacing tokenizer and schema errors
    pub fn parse_strict(&self, src: &str) -> ParseResult<Parsed> {
        self.parser.parse_strict(src)
    }

    /// Serialize a document tree back to markup
    pub fn serialize(&self, doc: &Node) -> SerializeResult<String> {
        self.serializer.serialize(doc)
    }

    /// JSON rendering of a document tree, for tooling and tests
    pub fn to_json(&self, doc: &Node) -> serde_json::Result<String> {
        serde_json::to_string_pretty(doc)
    }

    pub fn parser(&self) -> &MarkupParser {
        &self.parser
    }

    pub fn serializer(&self) -> &MarkupSerializer {
        &self.serializer
    }
}

/// Builder accumulating contributions before the single freeze step
pub struct EditorBuilder {
    top_node: String,
    extensions: Vec<EditorExtension>,
    link_validator: LinkValidator,
}

impl EditorBuilder {
    /// Start from the base contribution with the given document root type
    pub fn new(top_node: impl Into<String>, base: EditorExtension) -> Self {
        Self {
            top_node: top_node.into(),
            extensions: vec![base],
            link_validator: MarkupTokenizer::permissive_validator(),
        }
    }

    pub fn extension(mut self, extension: EditorExtension) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Gate link and autolink destinations. Rejected hrefs degrade to
    /// literal text during tokenization.
    pub fn link_validator(mut self, validator: LinkValidator) -> Self {
        self.link_validator = validator;
        self
    }

    /// Merge, validate, and freeze everything into an [`Editor`]
    pub fn compose(self) -> ComposeResult<Editor> {
        let fragments: Vec<_> = self.extensions.iter().map(|e| e.schema.clone()).collect();
        let spec = SchemaSpec::new(&self.top_node).merge(&fragments)?;
        let schema = Schema::compile(&spec)?;

        let mut token_handlers: TokenHandlers = BTreeMap::new();
        let mut token_owners: BTreeMap<String, String> = BTreeMap::new();
        let mut node_handlers: BTreeMap<String, NodeHandler> = BTreeMap::new();
        let mut node_owners: BTreeMap<String, String> = BTreeMap::new();
        let mut mark_handlers: BTreeMap<String, MarkHandler> = BTreeMap::new();
        let mut mark_owners: BTreeMap<String, String> = BTreeMap::new();

        let mut block_rules: Vec<RuleInsertion<Arc<dyn BlockRule>>> = Vec::new();
        let mut inline_rules: Vec<RuleInsertion<Arc<dyn InlineRule>>> = Vec::new();
        let mut core_rules: Vec<RuleInsertion<Arc<dyn CoreRule>>> = Vec::new();
        let mut ui_hooks: Vec<UiHook> = Vec::new();

        for extension in self.extensions {
            for (kind, handler) in extension.token_handlers {
                if let Some(first) = token_owners.get(&kind) {
                    return Err(ComposeError::DuplicateTokenHandler {
                        kind,
                        first: first.clone(),
                        second: extension.name,
                    });
                }
                token_owners.insert(kind.clone(), extension.name.clone());
                token_handlers.insert(kind, handler);
            }
            for (type_name, handler) in extension.node_serializers {
                if let Some(first) = node_owners.get(&type_name) {
                    return Err(ComposeError::DuplicateNodeSerializer {
                        type_name,
                        first: first.clone(),
                        second: extension.name,
                    });
                }
                node_owners.insert(type_name.clone(), extension.name.clone());
                node_handlers.insert(type_name, handler);
            }
            for (type_name, handler) in extension.mark_serializers {
                if let Some(first) = mark_owners.get(&type_name) {
                    return Err(ComposeError::DuplicateMarkSerializer {
                        type_name,
                        first: first.clone(),
                        second: extension.name,
                    });
                }
                mark_owners.insert(type_name.clone(), extension.name.clone());
                mark_handlers.insert(type_name, handler);
            }
            for hook in extension.ui_hooks {
                if schema.node(&hook.type_name).is_none() && schema.mark(&hook.type_name).is_none()
                {
                    return Err(ComposeError::UnknownUiHookType {
                        hook: hook.name,
                        extension: extension.name,
                        type_name: hook.type_name,
                    });
                }
                ui_hooks.push(hook);
            }
            block_rules.extend(extension.block_rules);
            inline_rules.extend(extension.inline_rules);
            core_rules.extend(extension.core_rules);
        }

        for (kind, handler) in &token_handlers {
            check_handler_target(&schema, kind, handler)?;
        }

        let tokenizer = MarkupTokenizer::new(
            Arc::new(RuleChain::build(block_rules)?),
            Arc::new(RuleChain::build(inline_rules)?),
            Arc::new(RuleChain::build(core_rules)?),
            self.link_validator,
        );
        let parser = MarkupParser::new(tokenizer, schema.clone(), token_handlers);
        let serializer = MarkupSerializer::new(node_handlers, mark_handlers);

        tracing::debug!(
            block_rules = ?parser.tokenizer().block_rule_names(),
            inline_rules = ?parser.tokenizer().inline_rule_names(),
            "editor composed"
        );
        Ok(Editor {
            schema,
            parser,
            serializer,
            ui_hooks,
        })
    }
}

/// A handler pointing at a type the merged schema never declared is a
/// composition error, caught here rather than at first parse.
fn check_handler_target(
    schema: &Schema,
    kind: &str,
    handler: &TokenHandler,
) -> ComposeResult<()> {
    match handler {
        TokenHandler::Block { node_type }
        | TokenHandler::Leaf { node_type }
        | TokenHandler::ContentBlock { node_type } => {
            if schema.node(node_type).is_none() {
                return Err(ComposeError::UnknownHandlerTarget {
                    kind: kind.to_string(),
                    type_name: node_type.clone(),
                });
            }
        }
        TokenHandler::Mark { mark_type } => {
            if schema.mark(mark_type).is_none() {
                return Err(ComposeError::UnknownHandlerTarget {
                    kind: kind.to_string(),
                    type_name: mark_type.clone(),
                });
            }
        }
        TokenHandler::Text | TokenHandler::Ignore => {}
    }
    Ok(())
}
