//! Blockquotes (`> quoted`), with nested block content

use crate::block::{tokenize_nested, BlockRule, BlockState};
use crate::token::Token;

pub struct BlockquoteRule;

impl BlockRule for BlockquoteRule {
    fn run(&self, state: &mut BlockState, silent: bool) -> bool {
        let first = state.line;
        if state.is_blank(first) || state.indent(first) >= 4 {
            return false;
        }
        if !state.line_trim(first).starts_with('>') {
            return false;
        }
        if silent {
            return true;
        }

        // Collect contiguous marker lines and strip the marker from each.
        let mut inner = Vec::new();
        let mut line = first;
        while line < state.line_count() {
            let text = state.line_trim(line);
            if !text.starts_with('>') {
                break;
            }
            inner.push(strip_marker(text));
            line += 1;
        }
        let last = line - 1;

        let span = state.span_lines(first, last);
        state.push(Token::open("blockquote", span).with_attr("markup", ">"));
        let env = std::mem::take(&mut state.env);
        let (tokens, env) = tokenize_nested(&inner.join("\n"), state.rules.clone(), env);
        state.env = env;
        state.tokens.extend(tokens);
        state.push(Token::close("blockquote", span));
        state.line = last + 1;
        true
    }
}

fn strip_marker(text: &str) -> &str {
    let rest = &text[1..];
    rest.strip_prefix(' ').unwrap_or(rest)
}
