//! Paragraphs — the terminal block rule
//!
//! Consumes lines until a blank line or a point where another block rule
//! would match (checked with the chain in silent mode). Also owns setext
//! heading detection: a paragraph followed by an `===`/`---` underline is a
//! heading, with the underline character recorded as provenance.

use crate::block::{BlockRule, BlockState};
use crate::token::Token;

pub struct ParagraphRule;

fn setext_marker(text: &str) -> Option<char> {
    let trimmed = text.trim_end();
    let marker = trimmed.chars().next()?;
    if (marker == '=' || marker == '-') && trimmed.chars().all(|c| c == marker) {
        Some(marker)
    } else {
        None
    }
}

impl BlockRule for ParagraphRule {
    fn run(&self, state: &mut BlockState, silent: bool) -> bool {
        let first = state.line;
        if state.is_blank(first) {
            return false;
        }
        if silent {
            return true;
        }

        let mut last = first;
        let mut underline: Option<char> = None;
        let mut next = first + 1;
        while next < state.line_count() && !state.is_blank(next) {
            if state.indent(next) < 4 {
                if let Some(marker) = setext_marker(state.line_trim(next)) {
                    underline = Some(marker);
                    break;
                }
            }
            if state.is_interrupted(next) {
                break;
            }
            last = next;
            next += 1;
        }

        let content: Vec<&str> = (first..=last).map(|i| state.line_trim(i)).collect();
        let content = content.join("\n");

        match underline {
            Some(marker) => {
                let span = state.span_lines(first, next);
                let level = if marker == '=' { 1 } else { 2 };
                state.push(
                    Token::open("heading", span)
                        .with_attr("level", level.to_string())
                        .with_attr("markup", marker.to_string()),
                );
                state.push(Token::standalone("inline", span).with_content(content));
                state.push(Token::close("heading", span));
                state.line = next + 1;
            }
            None => {
                let span = state.span_lines(first, last);
                state.push(Token::open("paragraph", span));
                state.push(Token::standalone("inline", span).with_content(content));
                state.push(Token::close("paragraph", span));
                state.line = last + 1;
            }
        }
        true
    }
}
