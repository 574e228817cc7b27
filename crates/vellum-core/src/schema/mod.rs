//! Document schema: vocabulary declaration, merge, and compilation
//!
//! A [`SchemaSpec`] is the mutable declaration form: an ordered list of node
//! and mark specs, merged with extension-contributed [`SchemaFragment`]s.
//! [`Schema::compile`] turns the merged spec into an immutable, validated
//! [`Schema`] that the parser, serializer, and view layer all read without
//! synchronization. Compilation fails eagerly on any inconsistency so a
//! misconfigured extension can never produce a half-working editor.

mod content;

pub use content::{ContentExpr, ContentTerm, Multiplicity};

use crate::error::{SchemaError, SchemaResult};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Reserved attribute recording the literal source syntax of a construct
/// (`"#"` vs setext underline for a heading, `"*"` vs `"_"` for emphasis, an
/// original HTML tag name). Absent or empty means "serialize canonically".
pub const MARKUP_ATTR: &str = "markup";

/// Validator function for attribute values
pub type AttrValidator = fn(&str) -> bool;

/// Declaration of one attribute on a node or mark type
#[derive(Debug, Clone, Default)]
pub struct AttributeSpec {
    /// Default value; `None` makes the attribute required at construction
    pub default: Option<String>,
    /// Optional value validator, checked by `Node::new_checked`
    pub validator: Option<AttrValidator>,
}

impl AttributeSpec {
    /// An optional attribute with a default value
    pub fn with_default(value: impl Into<String>) -> Self {
        Self {
            default: Some(value.into()),
            validator: None,
        }
    }

    /// A required attribute (no default)
    pub fn required() -> Self {
        Self {
            default: None,
            validator: None,
        }
    }

    /// Attach a validator
    pub fn validated(mut self, validator: AttrValidator) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// Declaration of one node type
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    /// Content-model expression; `None` declares a leaf
    pub content: Option<String>,
    /// Group membership (e.g. `"block"`, `"inline"`)
    pub group: Option<String>,
    /// Attribute declarations, in declaration order
    pub attrs: Vec<(String, AttributeSpec)>,
    /// Opaque render descriptor, stored for the view layer and never
    /// interpreted by the core
    pub render: serde_json::Value,
}

/// Declaration of one mark type
#[derive(Debug, Clone, Default)]
pub struct MarkSpec {
    /// Attribute declarations, in declaration order
    pub attrs: Vec<(String, AttributeSpec)>,
    /// Mark type names this mark may not overlap with on the same span
    pub excludes: Vec<String>,
    /// Opaque render descriptor for the view layer
    pub render: serde_json::Value,
}

/// Attribute additions an extension makes to an existing type
#[derive(Debug, Clone)]
pub struct TypeExtension {
    pub type_name: String,
    pub attrs: Vec<(String, AttributeSpec)>,
}

/// A schema fragment contributed by one extension
#[derive(Debug, Clone, Default)]
pub struct SchemaFragment {
    /// New node types (must not collide with existing names)
    pub nodes: Vec<(String, NodeSpec)>,
    /// New mark types (must not collide with existing names)
    pub marks: Vec<(String, MarkSpec)>,
    /// Attribute additions to already-declared types
    pub extends: Vec<TypeExtension>,
}

impl SchemaFragment {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.marks.is_empty() && self.extends.is_empty()
    }
}

/// The declaration form of a schema: base vocabulary plus merged fragments
#[derive(Debug, Clone)]
pub struct SchemaSpec {
    pub nodes: Vec<(String, NodeSpec)>,
    pub marks: Vec<(String, MarkSpec)>,
    /// Name of the document root type
    pub top_node: String,
}

impl SchemaSpec {
    /// Create an empty spec with the given root type name
    pub fn new(top_node: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            marks: Vec::new(),
            top_node: top_node.into(),
        }
    }

    /// Append a node declaration
    pub fn add_node(&mut self, name: impl Into<String>, spec: NodeSpec) -> &mut Self {
        self.nodes.push((name.into(), spec));
        self
    }

    /// Append a mark declaration
    pub fn add_mark(&mut self, name: impl Into<String>, spec: MarkSpec) -> &mut Self {
        self.marks.push((name.into(), spec));
        self
    }

    /// Fold extension fragments into this spec, base-first, in registration
    /// order. Returns a new spec; the receiver is left untouched so other
    /// consumers of the base vocabulary stay valid.
    pub fn merge(&self, fragments: &[SchemaFragment]) -> SchemaResult<SchemaSpec> {
        let mut merged = self.clone();
        for fragment in fragments {
            for (name, spec) in &fragment.nodes {
                if merged.nodes.iter().any(|(n, _)| n == name) {
                    return Err(SchemaError::DuplicateNode(name.clone()));
                }
                merged.nodes.push((name.clone(), spec.clone()));
            }
            for (name, spec) in &fragment.marks {
                if merged.marks.iter().any(|(n, _)| n == name) {
                    return Err(SchemaError::DuplicateMark(name.clone()));
                }
                merged.marks.push((name.clone(), spec.clone()));
            }
            for ext in &fragment.extends {
                merged.apply_extension(ext)?;
            }
        }
        Ok(merged)
    }

    fn apply_extension(&mut self, ext: &TypeExtension) -> SchemaResult<()> {
        let target = self
            .nodes
            .iter_mut()
            .find(|(n, _)| *n == ext.type_name)
            .map(|(_, s)| &mut s.attrs)
            .or_else(|| {
                self.marks
                    .iter_mut()
                    .find(|(n, _)| *n == ext.type_name)
                    .map(|(_, s)| &mut s.attrs)
            })
            .ok_or_else(|| SchemaError::UnknownExtendTarget(ext.type_name.clone()))?;

        for (attr, spec) in &ext.attrs {
            // Redefining an attribute other code relies on is never allowed,
            // whether the original came from the base or another extension.
            if target.iter().any(|(a, _)| a == attr) {
                return Err(SchemaError::AttributeCollision {
                    type_name: ext.type_name.clone(),
                    attr: attr.clone(),
                });
            }
            target.push((attr.clone(), spec.clone()));
        }
        Ok(())
    }
}

/// A compiled node type
#[derive(Debug, Clone)]
pub struct NodeType {
    pub name: String,
    pub content: Option<ContentExpr>,
    pub group: Option<String>,
    pub attrs: BTreeMap<String, AttributeSpec>,
    pub render: serde_json::Value,
}

impl NodeType {
    /// Whether this type permits no children at all
    pub fn is_leaf(&self) -> bool {
        self.content.is_none()
    }

    /// Whether this is the special text type
    pub fn is_text(&self) -> bool {
        self.name == "text"
    }
}

/// A compiled mark type
#[derive(Debug, Clone)]
pub struct MarkType {
    pub name: String,
    pub attrs: BTreeMap<String, AttributeSpec>,
    pub excludes: BTreeSet<String>,
    pub render: serde_json::Value,
}

#[derive(Debug)]
struct SchemaInner {
    nodes: BTreeMap<String, NodeType>,
    marks: BTreeMap<String, MarkType>,
    /// group name -> member node type names, for content-model resolution
    groups: BTreeMap<String, BTreeSet<String>>,
    top_node: String,
}

/// The finalized, immutable document vocabulary.
///
/// Cheap to clone (`Arc` internally) and safe to read from any consumer for
/// the lifetime of one editor instance.
#[derive(Debug, Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

impl Schema {
    /// Compile a merged spec into a finalized schema, validating totality
    /// and satisfiability. Every error here is a configuration error that
    /// should abort editor construction.
    pub fn compile(spec: &SchemaSpec) -> SchemaResult<Schema> {
        let mut nodes = BTreeMap::new();
        let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for (name, node_spec) in &spec.nodes {
            let mut attrs = BTreeMap::new();
            for (attr, attr_spec) in &node_spec.attrs {
                if attrs.insert(attr.clone(), attr_spec.clone()).is_some() {
                    return Err(SchemaError::DuplicateAttribute {
                        type_name: name.clone(),
                        attr: attr.clone(),
                    });
                }
            }
            let compiled = NodeType {
                name: name.clone(),
                content: node_spec.content.as_deref().map(ContentExpr::parse),
                group: node_spec.group.clone(),
                attrs,
                render: node_spec.render.clone(),
            };
            if let Some(group) = &compiled.group {
                groups.entry(group.clone()).or_default().insert(name.clone());
            }
            if nodes.insert(name.clone(), compiled).is_some() {
                return Err(SchemaError::DuplicateNode(name.clone()));
            }
        }

        let mut marks = BTreeMap::new();
        for (name, mark_spec) in &spec.marks {
            let mut attrs = BTreeMap::new();
            for (attr, attr_spec) in &mark_spec.attrs {
                if attrs.insert(attr.clone(), attr_spec.clone()).is_some() {
                    return Err(SchemaError::DuplicateAttribute {
                        type_name: name.clone(),
                        attr: attr.clone(),
                    });
                }
            }
            let compiled = MarkType {
                name: name.clone(),
                attrs,
                excludes: mark_spec.excludes.iter().cloned().collect(),
                render: mark_spec.render.clone(),
            };
            if marks.insert(name.clone(), compiled).is_some() {
                return Err(SchemaError::DuplicateMark(name.clone()));
            }
        }

        if !nodes.contains_key(&spec.top_node) {
            return Err(SchemaError::MissingTopNode(spec.top_node.clone()));
        }

        // Totality: every content-model term resolves to a node type or a
        // non-empty group. Satisfiability: required terms must resolve to at
        // least one constructible type.
        for node in nodes.values() {
            let Some(content) = &node.content else { continue };
            for term in content.terms() {
                let resolves = nodes.contains_key(&term.name)
                    || groups.get(&term.name).is_some_and(|m| !m.is_empty());
                if !resolves {
                    return Err(SchemaError::UnknownContentReference {
                        type_name: node.name.clone(),
                        referenced: term.name.clone(),
                    });
                }
            }
            if content.requires_content() && content.terms().is_empty() {
                return Err(SchemaError::UnsatisfiableContent(node.name.clone()));
            }
        }

        Ok(Schema {
            inner: Arc::new(SchemaInner {
                nodes,
                marks,
                groups,
                top_node: spec.top_node.clone(),
            }),
        })
    }

    /// Look up a node type by name
    pub fn node(&self, name: &str) -> Option<&NodeType> {
        self.inner.nodes.get(name)
    }

    /// Look up a mark type by name
    pub fn mark(&self, name: &str) -> Option<&MarkType> {
        self.inner.marks.get(name)
    }

    /// The document root type
    pub fn top_node(&self) -> &NodeType {
        // Presence is guaranteed by compile()
        &self.inner.nodes[&self.inner.top_node]
    }

    /// All node type names, sorted
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.inner.nodes.keys().map(String::as_str)
    }

    /// All mark type names, sorted
    pub fn mark_names(&self) -> impl Iterator<Item = &str> {
        self.inner.marks.keys().map(String::as_str)
    }

    /// Whether `type_name` names a node type in `group`
    pub fn in_group(&self, type_name: &str, group: &str) -> bool {
        self.inner
            .groups
            .get(group)
            .is_some_and(|members| members.contains(type_name))
    }

    /// Whether a child of type `child` satisfies a content-model term `term`
    /// (either the exact type name or a group the type belongs to)
    pub fn term_matches(&self, term: &str, child: &str) -> bool {
        term == child || self.in_group(child, term)
    }
}

impl PartialEq for Schema {
    /// Structural equality on the compiled type tables (Arc identity is not
    /// required; two independent compilations of the same spec compare equal)
    fn eq(&self, other: &Self) -> bool {
        let a = &self.inner;
        let b = &other.inner;
        a.top_node == b.top_node
            && a.nodes.len() == b.nodes.len()
            && a.marks.len() == b.marks.len()
            && a.nodes.keys().eq(b.nodes.keys())
            && a.marks.keys().eq(b.marks.keys())
            && a.nodes.iter().zip(b.nodes.iter()).all(|((_, x), (_, y))| {
                x.group == y.group
                    && x.content == y.content
                    && x.attrs.keys().eq(y.attrs.keys())
            })
            && a.marks.iter().zip(b.marks.iter()).all(|((_, x), (_, y))| {
                x.excludes == y.excludes && x.attrs.keys().eq(y.attrs.keys())
            })
    }
}
