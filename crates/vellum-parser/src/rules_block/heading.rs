//! ATX headings (`## Title`)

use crate::block::{BlockRule, BlockState};
use crate::token::Token;

pub struct HeadingRule;

impl BlockRule for HeadingRule {
    fn run(&self, state: &mut BlockState, silent: bool) -> bool {
        let line = state.line;
        if state.is_blank(line) || state.indent(line) >= 4 {
            return false;
        }
        let text = state.line_trim(line);
        let level = text.bytes().take_while(|b| *b == b'#').count();
        if level == 0 || level > 6 {
            return false;
        }
        let rest = &text[level..];
        // `#foo` is not a heading; `#` alone is
        if !rest.is_empty() && !rest.starts_with(' ') {
            return false;
        }
        if silent {
            return true;
        }

        // Strip optional trailing closing sequence (`## Title ##`)
        let mut content = rest.trim();
        let trimmed = content.trim_end_matches('#');
        if trimmed.len() < content.len() && (trimmed.is_empty() || trimmed.ends_with(' ')) {
            content = trimmed.trim_end();
        }

        let span = state.line_span(line);
        state.push(
            Token::open("heading", span)
                .with_attr("level", level.to_string())
                .with_attr("markup", "#".repeat(level)),
        );
        state.push(
            Token::standalone("inline", span).with_content(content),
        );
        state.push(Token::close("heading", span));
        state.line = line + 1;
        true
    }
}
