//! Inline-level tokenizer state
//!
//! The inline pass runs over the text content of each inline container
//! produced by the block pass. Rules are tried in chain order at the current
//! position; if none matches, the character joins a pending text buffer that
//! is flushed as a text token whenever a rule produces output.

use crate::ruler::RuleChain;
use crate::token::{ParseEnv, Span, Token};
use std::sync::Arc;

/// An inline-level tokenizer rule.
///
/// Same contract as block rules: side-effect-free on non-match, cursor left
/// at the first unconsumed byte on match.
pub trait InlineRule: Send + Sync {
    fn run(&self, state: &mut InlineState, silent: bool) -> bool;
}

/// Shared, frozen inline rule chain
pub type InlineRules = Arc<RuleChain<Arc<dyn InlineRule>>>;

/// Predicate gating which hrefs are recognized for autolinking
pub type LinkValidator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// An emphasis or HTML mark currently open at this point of the scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenMark {
    /// Mark type name ("em", "strong", "code", "link")
    pub kind: String,
    /// The literal delimiter or tag that opened it ("*", "__", "em", "b")
    pub marker: String,
}

/// Mutable state threaded through one inline tokenization run
pub struct InlineState<'a> {
    pub src: &'a str,
    pub pos: usize,
    pub tokens: Vec<Token>,
    pub env: &'a ParseEnv,
    pub rules: InlineRules,
    pub link_validator: LinkValidator,
    /// Marks opened by emphasis/HTML rules, awaiting their closers
    pub mark_stack: Vec<OpenMark>,
    /// Offset of `src` within the document, so spans stay document-relative
    base_offset: usize,
    pending: String,
    pending_start: usize,
}

impl<'a> InlineState<'a> {
    pub fn new(
        src: &'a str,
        base_offset: usize,
        env: &'a ParseEnv,
        rules: InlineRules,
        link_validator: LinkValidator,
    ) -> Self {
        Self {
            src,
            pos: 0,
            tokens: Vec::new(),
            env,
            rules,
            link_validator,
            mark_stack: Vec::new(),
            base_offset,
            pending: String::new(),
            pending_start: 0,
        }
    }

    /// Remaining unconsumed input
    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Next char, if any
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Char immediately before the cursor, if any
    pub fn prev_char(&self) -> Option<char> {
        self.src[..self.pos].chars().next_back()
    }

    /// Document-relative span for src byte range `start..end`
    pub fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.base_offset + start, self.base_offset + end)
    }

    /// Append a token, flushing any pending text first
    pub fn push(&mut self, token: Token) {
        self.flush_pending();
        self.tokens.push(token);
    }

    /// Append literal text to the pending buffer
    pub fn push_text(&mut self, text: &str) {
        if self.pending.is_empty() {
            self.pending_start = self.pos;
        }
        self.pending.push_str(text);
    }

    /// Number of spaces at the end of the pending text buffer
    pub fn pending_trailing_spaces(&self) -> usize {
        self.pending.len() - self.pending.trim_end_matches(' ').len()
    }

    /// Drop trailing spaces from the pending buffer, returning how many
    /// were removed (used by the hard-break rule)
    pub fn trim_pending_spaces(&mut self) -> usize {
        let count = self.pending_trailing_spaces();
        self.pending.truncate(self.pending.len() - count);
        count
    }

    /// Flush the pending text buffer as a text token
    pub fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let content = std::mem::take(&mut self.pending);
        let span = self.span(self.pending_start, self.pos);
        self.tokens.push(Token::text(content, span));
    }

    /// Run the full rule chain over the input and return the token list
    pub fn tokenize(mut self) -> Vec<Token> {
        let rules = self.rules.clone();
        while self.pos < self.src.len() {
            let mut matched = false;
            for (_, rule) in rules.iter() {
                if rule.run(&mut self, false) {
                    matched = true;
                    break;
                }
            }
            if !matched {
                // No rule claimed this character; it is literal text.
                let Some(ch) = self.peek() else { break };
                self.push_text(&ch.to_string());
                self.pos += ch.len_utf8();
            }
        }
        self.flush_pending();
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruler::RuleChain;
    use crate::token::Nesting;

    fn no_rules() -> InlineRules {
        Arc::new(RuleChain::build(Vec::new()).unwrap())
    }

    #[test]
    fn test_fallback_produces_single_text_token() {
        let env = ParseEnv::default();
        let state = InlineState::new("plain text", 10, &env, no_rules(), Arc::new(|_| true));
        let tokens = state.tokenize();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, "text");
        assert_eq!(tokens[0].nesting, Nesting::Closed);
        assert_eq!(tokens[0].content, "plain text");
        assert_eq!(tokens[0].span, Span::new(10, 20));
    }
}
