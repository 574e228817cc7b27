//! Images. The alt text is kept raw rather than parsed as inline content,
//! so the node is a leaf.

use super::link::{parse_tail, scan_label, LinkTail};
use crate::inline::{InlineRule, InlineState};
use crate::token::Token;

pub struct ImageRule;

impl InlineRule for ImageRule {
    fn run(&self, state: &mut InlineState, silent: bool) -> bool {
        let rest = state.rest();
        if !rest.starts_with("![") {
            return false;
        }
        let Some(label_end) = scan_label(&rest[1..]) else {
            return false;
        };
        let label_end = label_end + 1;
        let alt = &rest[2..label_end];
        let tail = parse_tail(&rest[label_end + 1..]);

        let (src, title, tail_len, reference) = match tail {
            LinkTail::Inline { href, title, len } => (href, title, len, None),
            LinkTail::Reference { label, form, len } => {
                let lookup = label.as_deref().unwrap_or(alt);
                let Some((href, title)) = state.env.reference(lookup).cloned() else {
                    return false;
                };
                (href, title, len, Some((lookup.to_string(), form)))
            }
        };
        if !(state.link_validator)(&src) {
            return false;
        }
        if silent {
            return true;
        }

        let total = label_end + 1 + tail_len;
        let span = state.span(state.pos, state.pos + total);
        let mut token = Token::standalone("image", span)
            .with_attr("src", src)
            .with_attr("alt", alt);
        if let Some(title) = title {
            token = token.with_attr("title", title);
        }
        if let Some((label, form)) = reference {
            token = token
                .with_attr("markup", "reference")
                .with_attr("refLabel", label)
                .with_attr("refType", form);
        }
        state.push(token);
        state.pos += total;
        true
    }
}
