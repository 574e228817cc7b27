//! Content-model expressions
//!
//! A content model is a whitespace-separated sequence of terms, each a node
//! type name or group name with an optional multiplicity suffix:
//!
//! - `inline*` — zero or more nodes in the `inline` group
//! - `block+` — one or more nodes in the `block` group
//! - `snippet_lang+` — one or more `snippet_lang` nodes
//! - `heading paragraph?` — a heading, then at most one paragraph
//!
//! Matching is greedy left to right, which is unambiguous for the shapes the
//! editor vocabulary uses (repetition terms never share member types with
//! their successor term).

use serde::{Deserialize, Serialize};

/// How many children a term may consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Multiplicity {
    /// Exactly one
    One,
    /// Zero or one (`?`)
    Optional,
    /// Zero or more (`*`)
    ZeroOrMore,
    /// One or more (`+`)
    OneOrMore,
}

/// One term of a content-model expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTerm {
    /// Node type name or group name
    pub name: String,
    pub multiplicity: Multiplicity,
}

impl ContentTerm {
    /// Whether this term must consume at least one child
    pub fn required(&self) -> bool {
        matches!(self.multiplicity, Multiplicity::One | Multiplicity::OneOrMore)
    }
}

/// A parsed content-model expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentExpr {
    terms: Vec<ContentTerm>,
}

impl ContentExpr {
    /// Parse an expression string. Empty input yields an empty (leaf-like)
    /// expression that matches only an empty child list.
    pub fn parse(expr: &str) -> Self {
        let terms = expr
            .split_whitespace()
            .map(|raw| {
                let (name, multiplicity) = match raw.as_bytes().last() {
                    Some(b'?') => (&raw[..raw.len() - 1], Multiplicity::Optional),
                    Some(b'*') => (&raw[..raw.len() - 1], Multiplicity::ZeroOrMore),
                    Some(b'+') => (&raw[..raw.len() - 1], Multiplicity::OneOrMore),
                    _ => (raw, Multiplicity::One),
                };
                ContentTerm {
                    name: name.to_string(),
                    multiplicity,
                }
            })
            .collect();
        Self { terms }
    }

    /// The terms, in order
    pub fn terms(&self) -> &[ContentTerm] {
        &self.terms
    }

    /// Whether a node with this content model can never be legally empty
    pub fn requires_content(&self) -> bool {
        self.terms.iter().any(ContentTerm::required)
    }

    /// Check a child sequence against this expression.
    ///
    /// `matches_term(term_name, child_index)` must report whether the child
    /// at `child_index` is the named type or belongs to the named group.
    /// Returns a human-readable violation description on mismatch.
    pub fn check<F>(&self, child_count: usize, matches_term: F) -> Result<(), String>
    where
        F: Fn(&str, usize) -> bool,
    {
        let mut pos = 0;
        for term in &self.terms {
            match term.multiplicity {
                Multiplicity::One => {
                    if pos < child_count && matches_term(&term.name, pos) {
                        pos += 1;
                    } else {
                        return Err(format!("expected '{}' at child {pos}", term.name));
                    }
                }
                Multiplicity::Optional => {
                    if pos < child_count && matches_term(&term.name, pos) {
                        pos += 1;
                    }
                }
                Multiplicity::ZeroOrMore => {
                    while pos < child_count && matches_term(&term.name, pos) {
                        pos += 1;
                    }
                }
                Multiplicity::OneOrMore => {
                    if pos >= child_count || !matches_term(&term.name, pos) {
                        return Err(format!("expected at least one '{}' at child {pos}", term.name));
                    }
                    while pos < child_count && matches_term(&term.name, pos) {
                        pos += 1;
                    }
                }
            }
        }
        if pos < child_count {
            return Err(format!("unexpected extra child at index {pos}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiplicities() {
        let expr = ContentExpr::parse("heading paragraph? inline* block+");
        let terms = expr.terms();
        assert_eq!(terms.len(), 4);
        assert_eq!(terms[0].multiplicity, Multiplicity::One);
        assert_eq!(terms[1].multiplicity, Multiplicity::Optional);
        assert_eq!(terms[2].multiplicity, Multiplicity::ZeroOrMore);
        assert_eq!(terms[3].multiplicity, Multiplicity::OneOrMore);
        assert_eq!(terms[3].name, "block");
    }

    #[test]
    fn test_requires_content() {
        assert!(ContentExpr::parse("block+").requires_content());
        assert!(ContentExpr::parse("heading inline*").requires_content());
        assert!(!ContentExpr::parse("inline*").requires_content());
        assert!(!ContentExpr::parse("").requires_content());
    }

    #[test]
    fn test_check_repetition() {
        let expr = ContentExpr::parse("inline*");
        let kinds = ["text", "text", "image"];
        let ok = expr.check(kinds.len(), |term, _| term == "inline");
        assert!(ok.is_ok());

        // Empty is fine for zero-or-more
        assert!(expr.check(0, |_, _| false).is_ok());
    }

    #[test]
    fn test_check_sequence_violation() {
        let expr = ContentExpr::parse("snippet_lang+");
        let err = expr.check(0, |_, _| false).unwrap_err();
        assert!(err.contains("at least one 'snippet_lang'"));
    }

    #[test]
    fn test_check_rejects_trailing_children() {
        let expr = ContentExpr::parse("heading");
        let err = expr.check(2, |term, _| term == "heading").unwrap_err();
        assert!(err.contains("extra child"));
    }
}
