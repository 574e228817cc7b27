//! The base markdown contribution
//!
//! Supplies the core vocabulary (document, blocks, inline marks), the
//! default tokenizer rule chains, the token handler table, and the
//! serializer handlers. Everything else — including the snippet grammar —
//! is an ordinary extension layered on top of this one.

mod serialize;

use crate::contribution::EditorExtension;
use vellum_core::schema::{AttributeSpec, MarkSpec, NodeSpec, SchemaFragment, MARKUP_ATTR};
use vellum_parser::builder::TokenHandler;
use vellum_parser::rules_block::default_block_rules;
use vellum_parser::rules_core::default_core_rules;
use vellum_parser::rules_inline::default_inline_rules;

/// Name of the document root node type
pub const TOP_NODE: &str = "doc";

fn markup_attr() -> (String, AttributeSpec) {
    (MARKUP_ATTR.to_string(), AttributeSpec::with_default(""))
}

fn is_bool(value: &str) -> bool {
    value == "true" || value == "false"
}

fn is_heading_level(value: &str) -> bool {
    matches!(value, "1" | "2" | "3" | "4" | "5" | "6")
}

fn is_ref_type(value: &str) -> bool {
    matches!(value, "" | "full" | "collapsed" | "shortcut")
}

fn base_nodes() -> Vec<(String, NodeSpec)> {
    let block = || Some("block".to_string());
    let inline_content = || Some("inline*".to_string());
    vec![
        (
            "doc".into(),
            NodeSpec {
                content: Some("block+".into()),
                ..Default::default()
            },
        ),
        (
            "paragraph".into(),
            NodeSpec {
                content: inline_content(),
                group: block(),
                attrs: vec![markup_attr()],
                ..Default::default()
            },
        ),
        (
            "heading".into(),
            NodeSpec {
                content: inline_content(),
                group: block(),
                attrs: vec![
                    (
                        "level".into(),
                        AttributeSpec::required().validated(is_heading_level),
                    ),
                    markup_attr(),
                ],
                ..Default::default()
            },
        ),
        (
            "blockquote".into(),
            NodeSpec {
                content: Some("block+".into()),
                group: block(),
                attrs: vec![markup_attr()],
                ..Default::default()
            },
        ),
        (
            "code_block".into(),
            NodeSpec {
                content: Some("text*".into()),
                group: block(),
                attrs: vec![markup_attr(), ("info".into(), AttributeSpec::with_default(""))],
                ..Default::default()
            },
        ),
        (
            "horizontal_rule".into(),
            NodeSpec {
                group: block(),
                attrs: vec![markup_attr()],
                ..Default::default()
            },
        ),
        (
            "html_block".into(),
            NodeSpec {
                content: Some("text*".into()),
                group: block(),
                attrs: vec![markup_attr()],
                ..Default::default()
            },
        ),
        (
            "bullet_list".into(),
            NodeSpec {
                content: Some("list_item+".into()),
                group: block(),
                attrs: vec![
                    markup_attr(),
                    (
                        "tight".into(),
                        AttributeSpec::with_default("true").validated(is_bool),
                    ),
                ],
                ..Default::default()
            },
        ),
        (
            "ordered_list".into(),
            NodeSpec {
                content: Some("list_item+".into()),
                group: block(),
                attrs: vec![
                    markup_attr(),
                    ("start".into(), AttributeSpec::with_default("1")),
                    (
                        "tight".into(),
                        AttributeSpec::with_default("true").validated(is_bool),
                    ),
                ],
                ..Default::default()
            },
        ),
        (
            "list_item".into(),
            NodeSpec {
                content: Some("block+".into()),
                ..Default::default()
            },
        ),
        (
            "table".into(),
            NodeSpec {
                content: Some("table_row+".into()),
                group: block(),
                ..Default::default()
            },
        ),
        (
            "table_row".into(),
            NodeSpec {
                content: Some("table_cell+".into()),
                ..Default::default()
            },
        ),
        (
            "table_cell".into(),
            NodeSpec {
                content: inline_content(),
                attrs: vec![(
                    "header".into(),
                    AttributeSpec::with_default("false").validated(is_bool),
                )],
                ..Default::default()
            },
        ),
        (
            "image".into(),
            NodeSpec {
                group: Some("inline".into()),
                attrs: vec![
                    ("src".into(), AttributeSpec::required()),
                    ("alt".into(), AttributeSpec::with_default("")),
                    ("title".into(), AttributeSpec::with_default("")),
                    ("refLabel".into(), AttributeSpec::with_default("")),
                    (
                        "refType".into(),
                        AttributeSpec::with_default("").validated(is_ref_type),
                    ),
                    markup_attr(),
                ],
                ..Default::default()
            },
        ),
        (
            "hard_break".into(),
            NodeSpec {
                group: Some("inline".into()),
                attrs: vec![markup_attr()],
                ..Default::default()
            },
        ),
        (
            "text".into(),
            NodeSpec {
                group: Some("inline".into()),
                ..Default::default()
            },
        ),
        (
            "warning_banner".into(),
            NodeSpec {
                content: Some("text*".into()),
                group: block(),
                ..Default::default()
            },
        ),
    ]
}

fn base_marks() -> Vec<(String, MarkSpec)> {
    let plain = || MarkSpec {
        attrs: vec![markup_attr()],
        ..Default::default()
    };
    vec![
        ("em".into(), plain()),
        ("strong".into(), plain()),
        ("code".into(), plain()),
        (
            "link".into(),
            MarkSpec {
                attrs: vec![
                    ("href".into(), AttributeSpec::required()),
                    ("title".into(), AttributeSpec::with_default("")),
                    ("refLabel".into(), AttributeSpec::with_default("")),
                    (
                        "refType".into(),
                        AttributeSpec::with_default("").validated(is_ref_type),
                    ),
                    markup_attr(),
                ],
                ..Default::default()
            },
        ),
    ]
}

fn base_token_handlers() -> Vec<(String, TokenHandler)> {
    vec![
        ("paragraph".into(), TokenHandler::block("paragraph")),
        ("heading".into(), TokenHandler::block("heading")),
        ("blockquote".into(), TokenHandler::block("blockquote")),
        ("code_block".into(), TokenHandler::content_block("code_block")),
        ("horizontal_rule".into(), TokenHandler::leaf("horizontal_rule")),
        ("html_block".into(), TokenHandler::content_block("html_block")),
        ("bullet_list".into(), TokenHandler::block("bullet_list")),
        ("ordered_list".into(), TokenHandler::block("ordered_list")),
        ("list_item".into(), TokenHandler::block("list_item")),
        ("table".into(), TokenHandler::block("table")),
        ("table_row".into(), TokenHandler::block("table_row")),
        ("table_cell".into(), TokenHandler::block("table_cell")),
        ("image".into(), TokenHandler::leaf("image")),
        ("hard_break".into(), TokenHandler::leaf("hard_break")),
        ("text".into(), TokenHandler::Text),
        ("em".into(), TokenHandler::mark("em")),
        ("strong".into(), TokenHandler::mark("strong")),
        ("code".into(), TokenHandler::mark("code")),
        ("link".into(), TokenHandler::mark("link")),
    ]
}

/// The complete base contribution
pub fn base_extension() -> EditorExtension {
    EditorExtension {
        name: "base".into(),
        schema: SchemaFragment {
            nodes: base_nodes(),
            marks: base_marks(),
            extends: Vec::new(),
        },
        token_handlers: base_token_handlers(),
        node_serializers: serialize::node_serializers(),
        mark_serializers: serialize::mark_serializers(),
        block_rules: default_block_rules(),
        inline_rules: default_inline_rules(),
        core_rules: default_core_rules(),
        ui_hooks: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::schema::{Schema, SchemaSpec};

    #[test]
    fn test_base_schema_compiles() {
        let spec = SchemaSpec::new(TOP_NODE)
            .merge(&[base_extension().schema])
            .unwrap();
        let schema = Schema::compile(&spec).unwrap();
        assert!(schema.node("doc").is_some());
        assert!(schema.node("warning_banner").is_some());
        assert!(schema.mark("link").is_some());
        assert!(schema.in_group("image", "inline"));
    }

    #[test]
    fn test_every_handled_token_kind_targets_a_known_type() {
        let spec = SchemaSpec::new(TOP_NODE)
            .merge(&[base_extension().schema])
            .unwrap();
        let schema = Schema::compile(&spec).unwrap();
        for (kind, handler) in base_token_handlers() {
            let target = match &handler {
                TokenHandler::Block { node_type }
                | TokenHandler::Leaf { node_type }
                | TokenHandler::ContentBlock { node_type } => {
                    assert!(schema.node(node_type).is_some(), "kind {kind}");
                    continue;
                }
                TokenHandler::Mark { mark_type } => mark_type.clone(),
                _ => continue,
            };
            assert!(schema.mark(&target).is_some(), "kind {kind}");
        }
    }
}
