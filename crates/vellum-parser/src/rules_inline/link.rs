//! Inline and reference links
//!
//! Reference links (full, collapsed, shortcut) resolve against the
//! definitions the block pass collected into the parse environment. The
//! open token records which form was written so the serializer can emit
//! the same form back.

use crate::inline::{InlineRule, InlineState};
use crate::token::Token;

/// What follows the closing `]` of a link label
pub(crate) enum LinkTail {
    /// `(href "title")`
    Inline {
        href: String,
        title: Option<String>,
        len: usize,
    },
    /// `[label]`, `[]`, or nothing; `label` is None for collapsed/shortcut
    Reference {
        label: Option<String>,
        form: &'static str,
        len: usize,
    },
}

/// Find the `]` matching the `[` that `rest` starts with, honoring
/// backslash escapes and nested brackets. Returns its byte index.
pub(crate) fn scan_label(rest: &str) -> Option<usize> {
    debug_assert!(rest.starts_with('['));
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the tail after `]`. Never fails: anything unparseable degrades to
/// the shortcut form with zero bytes consumed.
pub(crate) fn parse_tail(after: &str) -> LinkTail {
    if let Some(body) = after.strip_prefix('(') {
        if let Some((href, title, used)) = parse_inline_tail(body) {
            return LinkTail::Inline {
                href,
                title,
                len: used + 1,
            };
        }
        return LinkTail::Reference {
            label: None,
            form: "shortcut",
            len: 0,
        };
    }
    if let Some(body) = after.strip_prefix('[') {
        if let Some(end) = body.find(']') {
            let label = &body[..end];
            let len = end + 2;
            if label.trim().is_empty() {
                return LinkTail::Reference {
                    label: None,
                    form: "collapsed",
                    len,
                };
            }
            return LinkTail::Reference {
                label: Some(label.to_string()),
                form: "full",
                len,
            };
        }
    }
    LinkTail::Reference {
        label: None,
        form: "shortcut",
        len: 0,
    }
}

/// Parse `href "title")` after the opening paren. Returns bytes consumed
/// including the closing paren.
fn parse_inline_tail(s: &str) -> Option<(String, Option<String>, usize)> {
    let mut i = skip_ws(s, 0);
    let href;
    if s[i..].starts_with('<') {
        let end = s[i + 1..].find('>')?;
        href = s[i + 1..i + 1 + end].to_string();
        i += end + 2;
    } else {
        let end = s[i..]
            .find(|c: char| c.is_whitespace() || c == ')')
            .unwrap_or(s.len() - i);
        href = s[i..i + end].to_string();
        i += end;
    }
    i = skip_ws(s, i);
    let mut title = None;
    if s[i..].starts_with('"') {
        let end = s[i + 1..].find('"')?;
        title = Some(s[i + 1..i + 1 + end].to_string());
        i += end + 2;
        i = skip_ws(s, i);
    }
    if !s[i..].starts_with(')') {
        return None;
    }
    Some((href, title, i + 1))
}

fn skip_ws(s: &str, mut i: usize) -> usize {
    while s[i..].starts_with([' ', '\n']) {
        i += 1;
    }
    i
}

pub struct LinkRule;

impl InlineRule for LinkRule {
    fn run(&self, state: &mut InlineState, silent: bool) -> bool {
        let rest = state.rest();
        if !rest.starts_with('[') {
            return false;
        }
        let Some(label_end) = scan_label(rest) else {
            return false;
        };
        let inner = &rest[1..label_end];
        let tail = parse_tail(&rest[label_end + 1..]);

        let (href, title, tail_len, reference) = match tail {
            LinkTail::Inline { href, title, len } => (href, title, len, None),
            LinkTail::Reference { label, form, len } => {
                let lookup = label.as_deref().unwrap_or(inner);
                let Some((href, title)) = state.env.reference(lookup).cloned() else {
                    return false;
                };
                (href, title, len, Some((lookup.to_string(), form)))
            }
        };
        if !(state.link_validator)(&href) {
            return false;
        }
        if silent {
            return true;
        }

        let total = label_end + 1 + tail_len;
        let open_span = state.span(state.pos, state.pos + 1);
        let close_span = state.span(state.pos + label_end, state.pos + total);

        let mut open = Token::open("link", open_span).with_attr("href", href);
        if let Some(title) = title {
            open = open.with_attr("title", title);
        }
        if let Some((label, form)) = reference {
            open = open
                .with_attr("markup", "reference")
                .with_attr("refLabel", label)
                .with_attr("refType", form);
        }
        state.push(open);

        // The label text is itself inline content
        let inner_abs = state.span(state.pos + 1, state.pos + 1).start;
        let inner_tokens = InlineState::new(
            inner,
            inner_abs,
            state.env,
            state.rules.clone(),
            state.link_validator.clone(),
        )
        .tokenize();
        for token in inner_tokens {
            state.push(token);
        }

        state.push(Token::close("link", close_span));
        state.pos += total;
        true
    }
}
