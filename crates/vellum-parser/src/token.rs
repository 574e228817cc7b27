//! The flat token stream produced by the markup tokenizer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Nesting delta of a token: does it open a construct, close one, or stand
/// alone (leaf/text)?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nesting {
    Open,
    Closed,
    Close,
}

impl Nesting {
    /// The numeric delta (+1 / 0 / -1)
    pub fn delta(self) -> i32 {
        match self {
            Nesting::Open => 1,
            Nesting::Closed => 0,
            Nesting::Close => -1,
        }
    }
}

/// Byte range in the source text, for diagnostics and position mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// One token of the flat stream.
///
/// `kind` is the registered token-type name (shared by the open and close
/// halves of a paired construct, distinguished by `nesting`). `attrs` is a
/// free-form string bag the tree builder derives node attributes from;
/// `content` carries raw text for leaf tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: String,
    pub nesting: Nesting,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    pub span: Span,
}

impl Token {
    pub fn open(kind: impl Into<String>, span: Span) -> Self {
        Self {
            kind: kind.into(),
            nesting: Nesting::Open,
            attrs: BTreeMap::new(),
            content: String::new(),
            span,
        }
    }

    pub fn close(kind: impl Into<String>, span: Span) -> Self {
        Self {
            kind: kind.into(),
            nesting: Nesting::Close,
            attrs: BTreeMap::new(),
            content: String::new(),
            span,
        }
    }

    /// A standalone (nesting 0) token, used for leaves and text
    pub fn standalone(kind: impl Into<String>, span: Span) -> Self {
        Self {
            kind: kind.into(),
            nesting: Nesting::Closed,
            attrs: BTreeMap::new(),
            content: String::new(),
            span,
        }
    }

    /// A text token with content payload
    pub fn text(content: impl Into<String>, span: Span) -> Self {
        let mut token = Self::standalone("text", span);
        token.content = content.into();
        token
    }

    /// Set an attribute (builder style)
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set the content payload (builder style)
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Side data shared across tokenizer passes within one parse call:
/// link reference definitions collected by the block pass and consumed by
/// the inline pass, plus diagnostics from custom rules that declined a
/// candidate (e.g. a malformed snippet envelope).
#[derive(Debug, Default, Clone)]
pub struct ParseEnv {
    /// Normalized reference label -> (href, optional title)
    pub references: BTreeMap<String, (String, Option<String>)>,
    /// Human-readable reasons custom rules rejected candidate regions.
    /// Purely diagnostic; rejection itself is a normal "no match".
    pub rejections: Vec<String>,
}

impl ParseEnv {
    /// Normalize a reference label the way the reference-definition rule
    /// stores it: trimmed, inner whitespace collapsed, lowercased.
    pub fn normalize_label(label: &str) -> String {
        label
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Register a definition; the first definition of a label wins.
    pub fn add_reference(&mut self, label: &str, href: String, title: Option<String>) {
        self.references
            .entry(Self::normalize_label(label))
            .or_insert((href, title));
    }

    /// Resolve a label against the collected definitions
    pub fn reference(&self, label: &str) -> Option<&(String, Option<String>)> {
        self.references.get(&Self::normalize_label(label))
    }
}
