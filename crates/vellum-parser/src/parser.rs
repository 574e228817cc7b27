//! The public parse boundary
//!
//! `parse` never fails on user input: anything the tokenizer and builder
//! cannot make sense of degrades to a valid tree that preserves the full
//! original text verbatim behind a warning banner. `parse_strict` exposes
//! the underlying error for callers (tests, tooling) that want it.

use crate::builder::{TokenHandlers, TreeBuilder};
use crate::error::{ParseError, ParseResult};
use crate::token::ParseEnv;
use crate::tokenizer::MarkupTokenizer;
use vellum_core::schema::Schema;
use vellum_core::tree::{Attrs, Node};

/// Message shown in the warning banner of a degraded tree
pub const DEGRADED_NOTICE: &str =
    "This document could not be fully parsed; its original text is preserved below.";

/// Outcome of a parse: the tree plus the side data collected on the way
pub struct Parsed {
    pub doc: Node,
    pub env: ParseEnv,
    /// True when the degraded-tree fallback was taken
    pub degraded: bool,
}

/// Schema-aware markup parser: tokenizer plus token handler table
pub struct MarkupParser {
    tokenizer: MarkupTokenizer,
    schema: Schema,
    handlers: TokenHandlers,
}

impl MarkupParser {
    pub fn new(tokenizer: MarkupTokenizer, schema: Schema, handlers: TokenHandlers) -> Self {
        Self {
            tokenizer,
            schema,
            handlers,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn tokenizer(&self) -> &MarkupTokenizer {
        &self.tokenizer
    }

    /// Parse, propagating any tokenizer contract violation or schema
    /// violation as an error
    pub fn parse_strict(&self, src: &str) -> ParseResult<Parsed> {
        let (tokens, env) = self.tokenizer.tokenize(src);
        let doc = TreeBuilder::new(&self.schema, &self.handlers).build(&tokens)?;
        Ok(Parsed {
            doc,
            env,
            degraded: false,
        })
    }

    /// Parse with the degraded-tree guarantee: user input never comes back
    /// as an error, at worst as a warning banner plus the verbatim text.
    pub fn parse(&self, src: &str) -> ParseResult<Parsed> {
        match self.parse_strict(src) {
            Ok(parsed) => Ok(parsed),
            Err(err) => {
                tracing::warn!(error = %err, "parse failed, emitting degraded tree");
                self.degraded(src)
            }
        }
    }

    /// The degraded tree: warning banner first, then the whole input as one
    /// verbatim code block. Only fails if the schema itself lacks the
    /// fallback types, which is a composition error.
    fn degraded(&self, src: &str) -> ParseResult<Parsed> {
        let banner = Node::new_checked(
            &self.schema,
            "warning_banner",
            Attrs::new(),
            vec![Node::text(DEGRADED_NOTICE)],
        )
        .map_err(ParseError::Tree)?;
        let verbatim = Node::new_checked(
            &self.schema,
            "code_block",
            Attrs::new(),
            vec![Node::text(src)],
        )
        .map_err(ParseError::Tree)?;
        let top = self.schema.top_node().name.clone();
        let doc = Node::new_checked(&self.schema, &top, Attrs::new(), vec![banner, verbatim])?;
        Ok(Parsed {
            doc,
            env: ParseEnv::default(),
            degraded: true,
        })
    }
}
