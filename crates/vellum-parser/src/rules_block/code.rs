//! Indented code blocks (4+ columns of leading whitespace)

use crate::block::{BlockRule, BlockState};
use crate::token::Token;

pub struct IndentedCodeRule;

impl BlockRule for IndentedCodeRule {
    fn run(&self, state: &mut BlockState, silent: bool) -> bool {
        let first = state.line;
        if state.is_blank(first) || state.indent(first) < 4 {
            return false;
        }
        if silent {
            return true;
        }

        let mut line = first;
        let mut last_content = first;
        let mut body: Vec<String> = Vec::new();
        while line < state.line_count() {
            if state.is_blank(line) {
                body.push(String::new());
                line += 1;
                continue;
            }
            if state.indent(line) < 4 {
                break;
            }
            body.push(strip_columns(state.line_text(line), 4));
            last_content = line;
            line += 1;
        }
        // Trailing blank lines belong to whatever follows
        body.truncate(body.len() - (line - last_content - 1));

        let mut content = body.join("\n");
        content.push('\n');
        state.push(
            Token::standalone("code_block", state.span_lines(first, last_content))
                .with_content(content)
                .with_attr("markup", "indented")
                .with_attr("info", ""),
        );
        state.line = last_content + 1;
        true
    }
}

/// Remove up to `cols` columns of leading whitespace (tab = 4 columns)
pub(crate) fn strip_columns(line: &str, cols: usize) -> String {
    let mut removed = 0;
    let mut rest = line;
    while removed < cols {
        match rest.chars().next() {
            Some(' ') => {
                removed += 1;
                rest = &rest[1..];
            }
            Some('\t') => {
                removed += 4;
                rest = &rest[1..];
            }
            _ => break,
        }
    }
    rest.to_string()
}
