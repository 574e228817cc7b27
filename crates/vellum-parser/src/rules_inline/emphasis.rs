//! Emphasis and strong emphasis (`*` / `_`), recording the delimiter used
//!
//! Uses an open-mark stack on the inline state instead of a full delimiter
//! resolution pass: a delimiter run first tries to close marks it matches,
//! then opens new ones if a potential closer exists downstream. Unbalanced
//! leftovers are turned back into literal text by the core balance pass.

use crate::inline::{InlineRule, InlineState, OpenMark};
use crate::token::Token;

pub struct EmphasisRule;

impl InlineRule for EmphasisRule {
    fn run(&self, state: &mut InlineState, silent: bool) -> bool {
        let rest = state.rest();
        let marker = match rest.chars().next() {
            Some(c @ ('*' | '_')) => c,
            _ => return false,
        };
        let run: usize = rest.chars().take_while(|c| *c == marker).count();
        let after = rest[run..].chars().next();
        let before = state.prev_char();

        let can_open = after.is_some_and(|c| !c.is_whitespace());
        let can_close = before.is_some_and(|c| !c.is_whitespace());
        if !can_open && !can_close {
            return false;
        }
        if silent {
            return true;
        }

        let start = state.pos;
        let mut remaining = run;
        let mut consumed = 0usize;

        // Close as much as the stack allows
        if can_close {
            while remaining > 0 {
                let Some(top) = state.mark_stack.last() else { break };
                if !top.marker.starts_with(marker) {
                    break;
                }
                let width = if top.kind == "strong" { 2 } else { 1 };
                if remaining < width {
                    break;
                }
                let top = state.mark_stack.pop().expect("checked above");
                let span = state.span(start + consumed, start + consumed + width);
                state.push(
                    Token::close(top.kind.clone(), span)
                        .with_attr("markup", top.marker.clone())
                        .with_content(top.marker.clone()),
                );
                remaining -= width;
                consumed += width;
            }
        }

        // Open with whatever is left, if a closer can exist downstream
        if remaining > 0 && can_open && rest[run..].contains(marker) {
            while remaining > 0 {
                let (kind, width) = if remaining >= 2 {
                    ("strong", 2)
                } else {
                    ("em", 1)
                };
                let delim: String = std::iter::repeat(marker).take(width).collect();
                let span = state.span(start + consumed, start + consumed + width);
                state.push(
                    Token::open(kind, span)
                        .with_attr("markup", delim.clone())
                        .with_content(delim.clone()),
                );
                state.mark_stack.push(OpenMark {
                    kind: kind.to_string(),
                    marker: delim,
                });
                remaining -= width;
                consumed += width;
            }
        }

        if consumed == 0 {
            return false;
        }
        // Whatever is left of the run is literal
        if remaining > 0 {
            let literal: String = std::iter::repeat(marker).take(remaining).collect();
            state.push_text(&literal);
            consumed += remaining;
        }
        state.pos += consumed;
        true
    }
}
