//! Block-level tokenizer state
//!
//! The block pass is line oriented: the source is split into lines once, and
//! block rules inspect lines at the cursor, either declaring a non-match
//! (leaving all state untouched) or consuming one or more lines and pushing
//! tokens. Rules run in chain order; the first match wins. In silent mode a
//! rule must only report whether it would match, which is how paragraph
//! interruption lookahead works.

use crate::ruler::RuleChain;
use crate::token::{ParseEnv, Span, Token};
use std::sync::Arc;

/// A block-level tokenizer rule.
///
/// Contract: when returning `false` (or running silently) the rule must
/// leave the cursor and token list exactly as it found them; when returning
/// `true` it must have advanced the cursor past every line it consumed.
pub trait BlockRule: Send + Sync {
    fn run(&self, state: &mut BlockState, silent: bool) -> bool;
}

/// Shared, frozen block rule chain
pub type BlockRules = Arc<RuleChain<Arc<dyn BlockRule>>>;

#[derive(Debug, Clone, Copy)]
struct Line {
    /// Byte offset of the first character of the line
    start: usize,
    /// Byte offset one past the last character (excluding the newline)
    end: usize,
    /// Leading whitespace width in columns (tab counts as 4)
    indent: usize,
    /// Leading whitespace length in bytes
    ws_bytes: usize,
}

/// Mutable state threaded through the block pass
pub struct BlockState<'a> {
    pub src: &'a str,
    lines: Vec<Line>,
    /// Cursor: index of the next unconsumed line
    pub line: usize,
    pub tokens: Vec<Token>,
    pub env: ParseEnv,
    /// The full block chain, available to rules for interruption lookahead
    pub rules: BlockRules,
}

impl<'a> BlockState<'a> {
    pub fn new(src: &'a str, rules: BlockRules) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for raw in src.split('\n') {
            let end = start + raw.len();
            let mut indent = 0;
            let mut ws_bytes = 0;
            for ch in raw.chars() {
                match ch {
                    ' ' => indent += 1,
                    '\t' => indent += 4,
                    _ => break,
                }
                ws_bytes += ch.len_utf8();
            }
            lines.push(Line {
                start,
                end,
                indent,
                ws_bytes,
            });
            start = end + 1;
        }
        Self {
            src,
            lines,
            line: 0,
            tokens: Vec::new(),
            env: ParseEnv::default(),
            rules,
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Full text of line `i`, including leading whitespace
    pub fn line_text(&self, i: usize) -> &'a str {
        let line = &self.lines[i];
        &self.src[line.start..line.end]
    }

    /// Text of line `i` with leading whitespace stripped
    pub fn line_trim(&self, i: usize) -> &'a str {
        let line = &self.lines[i];
        &self.src[line.start + line.ws_bytes..line.end]
    }

    /// Leading indentation of line `i` in columns
    pub fn indent(&self, i: usize) -> usize {
        self.lines[i].indent
    }

    pub fn is_blank(&self, i: usize) -> bool {
        i >= self.lines.len() || self.line_trim(i).is_empty()
    }

    /// Source span of line `i`
    pub fn line_span(&self, i: usize) -> Span {
        let line = &self.lines[i];
        Span::new(line.start, line.end)
    }

    /// Source span covering lines `first..last` (inclusive)
    pub fn span_lines(&self, first: usize, last: usize) -> Span {
        Span::new(self.lines[first].start, self.lines[last].end)
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Would any non-paragraph rule match at `at_line`? Used by the
    /// paragraph rule to decide where a paragraph ends. Runs the chain in
    /// silent mode, which must not mutate shared state.
    pub fn is_interrupted(&mut self, at_line: usize) -> bool {
        if at_line >= self.line_count() {
            return false;
        }
        let rules = self.rules.clone();
        let saved = self.line;
        self.line = at_line;
        let mut hit = false;
        for (name, rule) in rules.iter() {
            // Paragraphs don't interrupt themselves, and indented code
            // never interrupts a paragraph.
            if name == "paragraph" || name == "code" || name == "reference" {
                continue;
            }
            if rule.run(self, true) {
                hit = true;
                break;
            }
        }
        self.line = saved;
        hit
    }
}

/// Drive the rule chain over every line of the state's source
pub fn run_rules(state: &mut BlockState) {
    let rules = state.rules.clone();
    while state.line < state.line_count() {
        if state.is_blank(state.line) {
            state.line += 1;
            continue;
        }
        let before = state.line;
        for (_, rule) in rules.iter() {
            if rule.run(state, false) {
                break;
            }
        }
        if state.line == before {
            // Terminal paragraph rule always consumes, so this only fires
            // with a custom chain that dropped it. Skip the line rather
            // than loop forever.
            tracing::warn!(line = before, "no block rule consumed line, skipping");
            state.line += 1;
        }
    }
}

/// Tokenize nested block content (blockquote bodies, list items) with the
/// same rule chain, threading the environment through so reference
/// definitions inside containers are still collected.
pub fn tokenize_nested(src: &str, rules: BlockRules, env: ParseEnv) -> (Vec<Token>, ParseEnv) {
    let mut state = BlockState::new(src, rules);
    state.env = env;
    run_rules(&mut state);
    (state.tokens, state.env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruler::RuleChain;

    fn empty_rules() -> BlockRules {
        Arc::new(RuleChain::build(Vec::new()).unwrap())
    }

    #[test]
    fn test_line_scanning() {
        let state = BlockState::new("abc\n  def\n\n\tx", empty_rules());
        assert_eq!(state.line_count(), 4);
        assert_eq!(state.line_text(0), "abc");
        assert_eq!(state.line_trim(1), "def");
        assert_eq!(state.indent(1), 2);
        assert!(state.is_blank(2));
        assert_eq!(state.indent(3), 4);
        assert_eq!(state.line_trim(3), "x");
    }

    #[test]
    fn test_spans_are_byte_ranges() {
        let state = BlockState::new("ab\ncd", empty_rules());
        assert_eq!(state.line_span(0), Span::new(0, 2));
        assert_eq!(state.line_span(1), Span::new(3, 5));
        assert_eq!(state.span_lines(0, 1), Span::new(0, 5));
    }
}
