//! Hard breaks: two or more trailing spaces before a newline

use crate::inline::{InlineRule, InlineState};
use crate::token::Token;

pub struct NewlineRule;

impl InlineRule for NewlineRule {
    fn run(&self, state: &mut InlineState, silent: bool) -> bool {
        if !state.rest().starts_with('\n') {
            return false;
        }
        // Soft breaks stay literal text; only 2+ trailing spaces harden.
        if state.pending_trailing_spaces() < 2 {
            return false;
        }
        if silent {
            return true;
        }
        let spaces = state.trim_pending_spaces();
        let span = state.span(state.pos - spaces, state.pos + 1);
        state.push(Token::standalone("hard_break", span).with_attr("markup", "  "));
        state.pos += 1;
        true
    }
}
