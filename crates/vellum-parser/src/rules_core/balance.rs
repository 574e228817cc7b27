//! Repair unbalanced open/close tokens
//!
//! Block rules emit balanced pairs by construction, but inline mark rules
//! can leave orphans (an emphasis opened whose closer turned out to be part
//! of a link label, an HTML tag closed in the wrong order). The stream
//! invariant is that every open has a matching close, so orphans are
//! demoted back to the literal source text they were tokenized from.

use crate::core::{CoreRule, CoreState};
use crate::token::{Nesting, Token};

pub struct BalanceRule;

impl BalanceRule {
    fn literalize(src: &str, token: &Token) -> Token {
        // Mark tokens record their literal delimiter in `content`. Spans of
        // tokens from blockquote and list bodies are relative to the
        // reassembled body text, not the document, so slicing the source is
        // only a fallback for tokens that never set a content payload.
        let text = if token.content.is_empty() {
            src.get(token.span.start..token.span.end)
                .unwrap_or_default()
                .to_string()
        } else {
            token.content.clone()
        };
        Token::text(text, token.span)
    }
}

impl CoreRule for BalanceRule {
    fn run(&self, state: &mut CoreState) {
        let mut open_stack: Vec<usize> = Vec::new();
        let mut demote: Vec<usize> = Vec::new();

        for i in 0..state.tokens.len() {
            match state.tokens[i].nesting {
                Nesting::Open => open_stack.push(i),
                Nesting::Close => {
                    // Pop mismatched opens as orphans until we find our pair
                    let mut matched = false;
                    while let Some(&top) = open_stack.last() {
                        if state.tokens[top].kind == state.tokens[i].kind {
                            open_stack.pop();
                            matched = true;
                            break;
                        }
                        demote.push(open_stack.pop().expect("peeked above"));
                    }
                    if !matched {
                        demote.push(i);
                    }
                }
                Nesting::Closed => {}
            }
        }
        demote.extend(open_stack);

        for i in demote {
            state.tokens[i] = Self::literalize(state.src, &state.tokens[i]);
        }
    }
}
