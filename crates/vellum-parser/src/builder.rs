//! Token stream to document tree
//!
//! Every token kind must have a registered handler describing how it maps
//! onto the tree: a container node, a leaf, a verbatim block, a mark toggle,
//! or text. The handler table is assembled at composition time, so an
//! unhandled kind is a wiring error surfaced as [`ParseError::UnhandledToken`]
//! rather than a silently dropped token.

use crate::error::{ParseError, ParseResult};
use crate::token::{Nesting, Token};
use std::collections::BTreeMap;
use vellum_core::schema::Schema;
use vellum_core::tree::{Attrs, Mark, Node};

/// How a token kind maps onto the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenHandler {
    /// Open/close pair becomes a container node; the open token's attribute
    /// bag becomes the node's attributes
    Block { node_type: String },
    /// Standalone token becomes a childless leaf node (hr, image)
    Leaf { node_type: String },
    /// Standalone token becomes a node whose content payload is its single
    /// text child (code blocks, raw HTML blocks)
    ContentBlock { node_type: String },
    /// Open/close pair toggles a mark on the text between them
    Mark { mark_type: String },
    /// Standalone token becomes a text node carrying the active marks
    Text,
    /// Token is dropped
    Ignore,
}

impl TokenHandler {
    pub fn block(node_type: impl Into<String>) -> Self {
        Self::Block {
            node_type: node_type.into(),
        }
    }

    pub fn leaf(node_type: impl Into<String>) -> Self {
        Self::Leaf {
            node_type: node_type.into(),
        }
    }

    pub fn content_block(node_type: impl Into<String>) -> Self {
        Self::ContentBlock {
            node_type: node_type.into(),
        }
    }

    pub fn mark(mark_type: impl Into<String>) -> Self {
        Self::Mark {
            mark_type: mark_type.into(),
        }
    }
}

/// Token-kind to handler table, frozen at composition time
pub type TokenHandlers = BTreeMap<String, TokenHandler>;

struct Frame {
    type_name: String,
    token_kind: String,
    attrs: Attrs,
    children: Vec<Node>,
}

/// Builds a validated tree from a token stream against one schema
pub struct TreeBuilder<'a> {
    schema: &'a Schema,
    handlers: &'a TokenHandlers,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(schema: &'a Schema, handlers: &'a TokenHandlers) -> Self {
        Self { schema, handlers }
    }

    /// Consume the stream and produce the document root. Fails on unhandled
    /// kinds, unbalanced opens/closes, and any schema violation the node
    /// constructors detect.
    pub fn build(&self, tokens: &[Token]) -> ParseResult<Node> {
        let mut stack = vec![Frame {
            type_name: self.schema.top_node().name.clone(),
            token_kind: String::new(),
            attrs: Attrs::new(),
            children: Vec::new(),
        }];
        let mut marks: Vec<Mark> = Vec::new();

        for token in tokens {
            let handler = self
                .handlers
                .get(&token.kind)
                .ok_or_else(|| ParseError::UnhandledToken(token.kind.clone()))?;
            match handler {
                TokenHandler::Block { node_type } => match token.nesting {
                    Nesting::Open => stack.push(Frame {
                        type_name: node_type.clone(),
                        token_kind: token.kind.clone(),
                        attrs: token.attrs.clone(),
                        children: Vec::new(),
                    }),
                    Nesting::Close => {
                        let frame = stack.pop().ok_or_else(|| {
                            ParseError::UnbalancedStream(format!(
                                "close '{}' with no open construct",
                                token.kind
                            ))
                        })?;
                        if stack.is_empty() || frame.token_kind != token.kind {
                            return Err(ParseError::UnbalancedStream(format!(
                                "close '{}' does not match open '{}'",
                                token.kind, frame.token_kind
                            )));
                        }
                        let node =
                            self.make_node(&token.kind, &frame.type_name, frame.attrs, frame.children)?;
                        self.attach(&mut stack, node);
                    }
                    Nesting::Closed => {
                        // A childless container written in self-closing form
                        let node =
                            self.make_node(&token.kind, node_type, token.attrs.clone(), Vec::new())?;
                        self.attach(&mut stack, node);
                    }
                },
                TokenHandler::Leaf { node_type } => {
                    let node =
                        self.make_node(&token.kind, node_type, token.attrs.clone(), Vec::new())?;
                    self.attach(&mut stack, node);
                }
                TokenHandler::ContentBlock { node_type } => {
                    let children = if token.content.is_empty() {
                        Vec::new()
                    } else {
                        vec![Node::text(token.content.clone())]
                    };
                    let node = self.make_node(&token.kind, node_type, token.attrs.clone(), children)?;
                    self.attach(&mut stack, node);
                }
                TokenHandler::Mark { mark_type } => match token.nesting {
                    Nesting::Open => {
                        marks.push(Mark::with_attrs(mark_type.clone(), token.attrs.clone()));
                    }
                    Nesting::Close => {
                        let at = marks
                            .iter()
                            .rposition(|m| m.type_name == *mark_type)
                            .ok_or_else(|| {
                                ParseError::UnbalancedStream(format!(
                                    "mark '{mark_type}' closed but never opened"
                                ))
                            })?;
                        marks.remove(at);
                    }
                    Nesting::Closed => {
                        return Err(ParseError::UnbalancedStream(format!(
                            "mark token '{}' must be an open/close pair",
                            token.kind
                        )))
                    }
                },
                TokenHandler::Text => {
                    let node =
                        Node::text_checked(self.schema, token.content.clone(), marks.clone())?;
                    self.attach(&mut stack, node);
                }
                TokenHandler::Ignore => {}
            }
        }

        if stack.len() != 1 {
            return Err(ParseError::UnbalancedStream(
                "document ended with unclosed constructs".to_string(),
            ));
        }
        if !marks.is_empty() {
            return Err(ParseError::UnbalancedStream(
                "document ended with unclosed marks".to_string(),
            ));
        }
        let root = stack.pop().expect("length checked");
        self.make_node("", &root.type_name, root.attrs, root.children)
    }

    fn make_node(
        &self,
        token_kind: &str,
        type_name: &str,
        attrs: Attrs,
        children: Vec<Node>,
    ) -> ParseResult<Node> {
        if self.schema.node(type_name).is_none() {
            return Err(ParseError::UnknownType {
                token_kind: token_kind.to_string(),
                type_name: type_name.to_string(),
            });
        }
        Ok(Node::new_checked(self.schema, type_name, attrs, children)?)
    }

    fn attach(&self, stack: &mut [Frame], node: Node) {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Span;
    use vellum_core::schema::{AttributeSpec, MarkSpec, NodeSpec, SchemaSpec, MARKUP_ATTR};

    fn schema() -> Schema {
        let mut spec = SchemaSpec::new("doc");
        spec.add_node(
            "doc",
            NodeSpec {
                content: Some("block+".into()),
                ..Default::default()
            },
        );
        spec.add_node(
            "paragraph",
            NodeSpec {
                content: Some("inline*".into()),
                group: Some("block".into()),
                attrs: vec![(MARKUP_ATTR.into(), AttributeSpec::with_default(""))],
                ..Default::default()
            },
        );
        spec.add_node(
            "code_block",
            NodeSpec {
                content: Some("text*".into()),
                group: Some("block".into()),
                attrs: vec![
                    (MARKUP_ATTR.into(), AttributeSpec::with_default("")),
                    ("info".into(), AttributeSpec::with_default("")),
                ],
                ..Default::default()
            },
        );
        spec.add_node(
            "horizontal_rule",
            NodeSpec {
                group: Some("block".into()),
                attrs: vec![(MARKUP_ATTR.into(), AttributeSpec::with_default(""))],
                ..Default::default()
            },
        );
        spec.add_node(
            "text",
            NodeSpec {
                group: Some("inline".into()),
                ..Default::default()
            },
        );
        spec.add_mark(
            "em",
            MarkSpec {
                attrs: vec![(MARKUP_ATTR.into(), AttributeSpec::with_default(""))],
                ..Default::default()
            },
        );
        Schema::compile(&spec).unwrap()
    }

    fn handlers() -> TokenHandlers {
        let mut table = TokenHandlers::new();
        table.insert("paragraph".into(), TokenHandler::block("paragraph"));
        table.insert("code_block".into(), TokenHandler::content_block("code_block"));
        table.insert("horizontal_rule".into(), TokenHandler::leaf("horizontal_rule"));
        table.insert("em".into(), TokenHandler::mark("em"));
        table.insert("text".into(), TokenHandler::Text);
        table
    }

    fn span() -> Span {
        Span::default()
    }

    #[test]
    fn test_paragraph_with_marked_text() {
        let schema = schema();
        let handlers = handlers();
        let tokens = vec![
            Token::open("paragraph", span()),
            Token::text("plain ", span()),
            Token::open("em", span()).with_attr("markup", "*"),
            Token::text("emphasized", span()),
            Token::close("em", span()),
            Token::close("paragraph", span()),
        ];
        let doc = TreeBuilder::new(&schema, &handlers).build(&tokens).unwrap();
        let para = &doc.children[0];
        assert_eq!(para.type_name, "paragraph");
        assert_eq!(para.children.len(), 2);
        assert!(!para.children[0].has_mark("em"));
        assert!(para.children[1].has_mark("em"));
        assert_eq!(para.children[1].marks[0].markup(), Some("*"));
    }

    #[test]
    fn test_content_block_and_leaf() {
        let schema = schema();
        let handlers = handlers();
        let tokens = vec![
            Token::standalone("code_block", span()).with_content("let x = 1;"),
            Token::standalone("horizontal_rule", span()).with_attr("markup", "---"),
        ];
        let doc = TreeBuilder::new(&schema, &handlers).build(&tokens).unwrap();
        assert_eq!(doc.children[0].text_content(), "let x = 1;");
        assert_eq!(doc.children[1].markup(), Some("---"));
    }

    #[test]
    fn test_unhandled_kind_is_an_error() {
        let schema = schema();
        let handlers = handlers();
        let tokens = vec![Token::standalone("mystery", span())];
        let err = TreeBuilder::new(&schema, &handlers).build(&tokens).unwrap_err();
        assert_eq!(err, ParseError::UnhandledToken("mystery".into()));
    }

    #[test]
    fn test_unbalanced_stream_is_an_error() {
        let schema = schema();
        let handlers = handlers();
        let tokens = vec![Token::open("paragraph", span())];
        let err = TreeBuilder::new(&schema, &handlers).build(&tokens).unwrap_err();
        assert!(matches!(err, ParseError::UnbalancedStream(_)));
    }

    #[test]
    fn test_schema_violation_propagates() {
        let schema = schema();
        let handlers = handlers();
        // doc requires block+, an empty stream leaves it empty
        let err = TreeBuilder::new(&schema, &handlers).build(&[]).unwrap_err();
        assert!(matches!(err, ParseError::Tree(_)));
    }
}
