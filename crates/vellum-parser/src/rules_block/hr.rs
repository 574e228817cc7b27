//! Thematic breaks, preserving the literal marker line

use crate::block::{BlockRule, BlockState};
use crate::token::Token;

pub struct HrRule;

impl BlockRule for HrRule {
    fn run(&self, state: &mut BlockState, silent: bool) -> bool {
        let line = state.line;
        if state.is_blank(line) || state.indent(line) >= 4 {
            return false;
        }
        let text = state.line_trim(line);
        let marker = match text.chars().next() {
            Some(c @ ('-' | '*' | '_')) => c,
            _ => return false,
        };
        let mut count = 0;
        for ch in text.chars() {
            if ch == marker {
                count += 1;
            } else if ch != ' ' && ch != '\t' {
                return false;
            }
        }
        if count < 3 {
            return false;
        }
        if silent {
            return true;
        }

        state.push(
            Token::standalone("horizontal_rule", state.line_span(line))
                .with_attr("markup", text.trim_end()),
        );
        state.line = line + 1;
        true
    }
}
