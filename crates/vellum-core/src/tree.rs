//! The document tree
//!
//! A strict tree of typed nodes validated against a [`Schema`]. Construction
//! is fail-fast: [`Node::new_checked`] rejects unknown types, ill-shaped
//! attributes, and content-model violations instead of producing an invalid
//! tree. Mutation is whole-subtree replacement; nodes are plain values with
//! no parent pointers or aliasing.

use crate::error::{TreeError, TreeResult};
use crate::schema::{Schema, MARKUP_ATTR};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute bag: attribute name to string value, deterministically ordered
pub type Attrs = BTreeMap<String, String>;

/// A mark applied to an inline text span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attrs,
}

impl Mark {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attrs(type_name: impl Into<String>, attrs: Attrs) -> Self {
        Self {
            type_name: type_name.into(),
            attrs,
        }
    }

    /// Attribute value, if set
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// The recorded original syntax, if any was captured at parse time
    pub fn markup(&self) -> Option<&str> {
        self.attr(MARKUP_ATTR).filter(|m| !m.is_empty())
    }
}

/// One node of the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl Node {
    /// Build a validated container or leaf node.
    ///
    /// Validates the attribute shape (unknown attributes rejected, defaults
    /// filled, required attributes enforced, validators run) and the child
    /// sequence against the type's content model. Fails loudly on any
    /// violation; callers constructing nodes programmatically should treat a
    /// failure as "this construction is not actually valid" and fall back
    /// rather than crash.
    pub fn new_checked(
        schema: &Schema,
        type_name: &str,
        attrs: Attrs,
        children: Vec<Node>,
    ) -> TreeResult<Node> {
        let node_type = schema
            .node(type_name)
            .ok_or_else(|| TreeError::UnknownType(type_name.to_string()))?;

        if node_type.is_text() {
            return Err(TreeError::InvalidContentShape(type_name.to_string()));
        }

        let attrs = Self::check_attrs(type_name, &node_type.attrs, attrs)?;

        match &node_type.content {
            None => {
                if !children.is_empty() {
                    return Err(TreeError::content_violation(
                        type_name,
                        "leaf type cannot have children",
                    ));
                }
            }
            Some(expr) => {
                expr.check(children.len(), |term, idx| {
                    schema.term_matches(term, &children[idx].type_name)
                })
                .map_err(|detail| TreeError::content_violation(type_name, detail))?;
            }
        }

        Ok(Node {
            type_name: type_name.to_string(),
            attrs,
            children,
            text: None,
            marks: Vec::new(),
        })
    }

    /// Build a plain text node (no marks). Text nodes are schema-implicit
    /// leaves; their only payload is the string content.
    pub fn text(content: impl Into<String>) -> Node {
        Node {
            type_name: "text".to_string(),
            attrs: Attrs::new(),
            children: Vec::new(),
            text: Some(content.into()),
            marks: Vec::new(),
        }
    }

    /// Build a text node with marks, validating each mark against the schema
    /// (unknown types, duplicate marks, and exclusivity conflicts rejected).
    pub fn text_checked(
        schema: &Schema,
        content: impl Into<String>,
        marks: Vec<Mark>,
    ) -> TreeResult<Node> {
        for (i, mark) in marks.iter().enumerate() {
            let mark_type = schema
                .mark(&mark.type_name)
                .ok_or_else(|| TreeError::UnknownType(mark.type_name.clone()))?;
            let attrs = Self::check_attrs(&mark.type_name, &mark_type.attrs, mark.attrs.clone())?;
            let _ = attrs;
            for other in &marks[..i] {
                if other.type_name == mark.type_name {
                    return Err(TreeError::content_violation(
                        "text",
                        format!("mark '{}' applied twice", mark.type_name),
                    ));
                }
                let excluded = mark_type.excludes.contains(&other.type_name)
                    || schema
                        .mark(&other.type_name)
                        .is_some_and(|t| t.excludes.contains(&mark.type_name));
                if excluded {
                    return Err(TreeError::content_violation(
                        "text",
                        format!(
                            "marks '{}' and '{}' cannot overlap",
                            other.type_name, mark.type_name
                        ),
                    ));
                }
            }
        }
        let mut node = Node::text(content);
        node.marks = marks;
        Ok(node)
    }

    fn check_attrs(
        type_name: &str,
        declared: &BTreeMap<String, crate::schema::AttributeSpec>,
        supplied: Attrs,
    ) -> TreeResult<Attrs> {
        let mut attrs = Attrs::new();
        for (name, value) in supplied {
            let spec = declared
                .get(&name)
                .ok_or_else(|| TreeError::UnknownAttribute {
                    type_name: type_name.to_string(),
                    attr: name.clone(),
                })?;
            if let Some(validator) = spec.validator {
                if !validator(&value) {
                    return Err(TreeError::InvalidAttribute {
                        type_name: type_name.to_string(),
                        attr: name,
                        value,
                    });
                }
            }
            attrs.insert(name, value);
        }
        for (name, spec) in declared {
            if attrs.contains_key(name) {
                continue;
            }
            match &spec.default {
                Some(default) => {
                    attrs.insert(name.clone(), default.clone());
                }
                None => {
                    return Err(TreeError::MissingAttribute {
                        type_name: type_name.to_string(),
                        attr: name.clone(),
                    })
                }
            }
        }
        Ok(attrs)
    }

    /// Whether this is a text node
    pub fn is_text(&self) -> bool {
        self.type_name == "text"
    }

    /// Attribute value, if set
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// The recorded original syntax, if any was captured at parse time.
    /// Empty string means "no provenance, use canonical form".
    pub fn markup(&self) -> Option<&str> {
        self.attr(MARKUP_ATTR).filter(|m| !m.is_empty())
    }

    /// Whether a mark of the given type is applied
    pub fn has_mark(&self, type_name: &str) -> bool {
        self.marks.iter().any(|m| m.type_name == type_name)
    }

    /// Concatenated text content of this node and all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Serialize the tree to pretty JSON, for tooling and debugging
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeSpec, MarkSpec, NodeSpec, SchemaSpec};

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
            "heading",
            NodeSpec {
                content: Some("inline*".into()),
                group: Some("block".into()),
                attrs: vec![
                    ("level".into(), AttributeSpec::required()),
                    (MARKUP_ATTR.into(), AttributeSpec::with_default("")),
                ],
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
        spec.add_mark("em", MarkSpec::default());
        spec.add_mark(
            "code",
            MarkSpec {
                excludes: vec!["em".into()],
                ..Default::default()
            },
        );
        Schema::compile(&spec).unwrap()
    }

    #[test]
    fn test_checked_construction() {
        let schema = schema();
        let para = Node::new_checked(
            &schema,
            "paragraph",
            Attrs::new(),
            vec![Node::text("hello")],
        )
        .unwrap();
        assert_eq!(para.attr(MARKUP_ATTR), Some(""));
        let doc = Node::new_checked(&schema, "doc", Attrs::new(), vec![para]).unwrap();
        assert_eq!(doc.text_content(), "hello");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = Node::new_checked(&schema(), "nope", Attrs::new(), vec![]).unwrap_err();
        assert_eq!(err, TreeError::UnknownType("nope".into()));
    }

    #[test]
    fn test_missing_required_attribute_rejected() {
        let err = Node::new_checked(&schema(), "heading", Attrs::new(), vec![]).unwrap_err();
        assert_eq!(
            err,
            TreeError::MissingAttribute {
                type_name: "heading".into(),
                attr: "level".into(),
            }
        );
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let mut attrs = Attrs::new();
        attrs.insert("bogus".into(), "1".into());
        let err = Node::new_checked(&schema(), "paragraph", attrs, vec![]).unwrap_err();
        assert!(matches!(err, TreeError::UnknownAttribute { .. }));
    }

    #[test]
    fn test_content_model_enforced() {
        let schema = schema();
        // doc requires at least one block child
        let err = Node::new_checked(&schema, "doc", Attrs::new(), vec![]).unwrap_err();
        assert!(matches!(err, TreeError::ContentModelViolation { .. }));

        // paragraph cannot contain a paragraph
        let inner =
            Node::new_checked(&schema, "paragraph", Attrs::new(), vec![]).unwrap();
        let err =
            Node::new_checked(&schema, "paragraph", Attrs::new(), vec![inner]).unwrap_err();
        assert!(matches!(err, TreeError::ContentModelViolation { .. }));
    }

    #[test]
    fn test_mark_exclusivity() {
        let schema = schema();
        let ok = Node::text_checked(&schema, "x", vec![Mark::new("em")]);
        assert!(ok.is_ok());

        let err = Node::text_checked(&schema, "x", vec![Mark::new("em"), Mark::new("code")])
            .unwrap_err();
        assert!(matches!(err, TreeError::ContentModelViolation { .. }));

        let err = Node::text_checked(&schema, "x", vec![Mark::new("em"), Mark::new("em")])
            .unwrap_err();
        assert!(matches!(err, TreeError::ContentModelViolation { .. }));
    }

    #[test]
    fn test_json_round_trip() {
        let schema = schema();
        let mut attrs = Attrs::new();
        attrs.insert("level".into(), "2".into());
        let doc = Node::new_checked(
            &schema,
            "doc",
            Attrs::new(),
            vec![Node::new_checked(&schema, "heading", attrs, vec![Node::text("hi")]).unwrap()],
        )
        .unwrap();

        let json = doc.to_json().unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }
}
