//! Merge runs of adjacent text tokens into one

use crate::core::{CoreRule, CoreState};
use crate::token::Nesting;

pub struct TextMergeRule;

impl CoreRule for TextMergeRule {
    fn run(&self, state: &mut CoreState) {
        let mut merged: Vec<crate::token::Token> = Vec::with_capacity(state.tokens.len());
        for token in state.tokens.drain(..) {
            if token.kind == "text" && token.nesting == Nesting::Closed {
                if let Some(last) = merged.last_mut() {
                    if last.kind == "text" && last.nesting == Nesting::Closed {
                        last.content.push_str(&token.content);
                        last.span.end = token.span.end;
                        continue;
                    }
                }
            }
            merged.push(token);
        }
        state.tokens = merged;
    }
}
