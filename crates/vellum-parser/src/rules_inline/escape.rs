//! Backslash escapes

use crate::inline::{InlineRule, InlineState};
use crate::token::Token;

pub struct EscapeRule;

impl InlineRule for EscapeRule {
    fn run(&self, state: &mut InlineState, silent: bool) -> bool {
        let rest = state.rest();
        if !rest.starts_with('\\') {
            return false;
        }
        let Some(next) = rest[1..].chars().next() else {
            return false;
        };
        if next == '\n' {
            if !silent {
                let span = state.span(state.pos, state.pos + 2);
                state.push(Token::standalone("hard_break", span).with_attr("markup", "\\"));
                state.pos += 2;
            }
            return true;
        }
        if !next.is_ascii_punctuation() {
            return false;
        }
        if silent {
            return true;
        }
        state.push_text(&next.to_string());
        state.pos += 1 + next.len_utf8();
        true
    }
}
