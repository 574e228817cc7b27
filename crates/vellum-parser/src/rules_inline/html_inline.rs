//! Inline HTML tags mapped onto the equivalent marks and leaves
//!
//! Only tags with a native equivalent are recognized; the markup attribute
//! keeps the tag name that was written so `<b>` survives a round trip as
//! `<b>` rather than `**`. Unknown tags are left to the text fallback.

use crate::inline::{InlineRule, InlineState, OpenMark};
use crate::token::Token;
use once_cell::sync::Lazy;
use regex::Regex;

static OPEN_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<(em|i|strong|b|code|a|br|img)((?:\s[^<>]*)?)\s*/?>").expect("valid regex")
});
static CLOSE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^</(em|i|strong|b|code|a)\s*>").expect("valid regex"));
static HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bhref\s*=\s*"([^"]*)""#).expect("valid regex"));
static SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bsrc\s*=\s*"([^"]*)""#).expect("valid regex"));
static ALT: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\balt\s*=\s*"([^"]*)""#).expect("valid regex"));
static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\btitle\s*=\s*"([^"]*)""#).expect("valid regex"));

fn mark_kind(tag: &str) -> Option<&'static str> {
    match tag {
        "em" | "i" => Some("em"),
        "strong" | "b" => Some("strong"),
        "code" => Some("code"),
        "a" => Some("link"),
        _ => None,
    }
}

pub struct HtmlInlineRule;

impl InlineRule for HtmlInlineRule {
    fn run(&self, state: &mut InlineState, silent: bool) -> bool {
        let rest = state.rest();
        if !rest.starts_with('<') {
            return false;
        }

        if let Some(caps) = CLOSE_TAG.captures(rest) {
            let tag = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let kind = mark_kind(tag).unwrap_or_default();
            // Only close a mark this same rule opened, and only in order
            let matches_top = state
                .mark_stack
                .last()
                .is_some_and(|top| top.kind == kind && top.marker == tag);
            if !matches_top {
                return false;
            }
            if silent {
                return true;
            }
            let total = caps.get(0).map(|m| m.len()).unwrap_or_default();
            let top = state.mark_stack.pop().expect("checked above");
            let span = state.span(state.pos, state.pos + total);
            state.push(
                Token::close(top.kind, span)
                    .with_attr("markup", top.marker)
                    .with_content(&rest[..total]),
            );
            state.pos += total;
            return true;
        }

        let Some(caps) = OPEN_TAG.captures(rest) else {
            return false;
        };
        let tag = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let attr_text = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let total = caps.get(0).map(|m| m.len()).unwrap_or_default();
        let tag_text = &rest[..total];
        let span = state.span(state.pos, state.pos + total);

        match tag {
            "br" => {
                if silent {
                    return true;
                }
                // Keep the exact tag text so <br> and <br/> both survive
                state.push(Token::standalone("hard_break", span).with_attr("markup", tag_text));
            }
            "img" => {
                let Some(src) = SRC.captures(attr_text).map(|c| c[1].to_string()) else {
                    return false;
                };
                if !(state.link_validator)(&src) {
                    return false;
                }
                if silent {
                    return true;
                }
                let alt = ALT
                    .captures(attr_text)
                    .map(|c| c[1].to_string())
                    .unwrap_or_default();
                let mut token = Token::standalone("image", span)
                    .with_attr("src", src)
                    .with_attr("alt", alt)
                    .with_attr("markup", "html");
                if let Some(title) = TITLE.captures(attr_text).map(|c| c[1].to_string()) {
                    token = token.with_attr("title", title);
                }
                state.push(token);
            }
            "a" => {
                let Some(href) = HREF.captures(attr_text).map(|c| c[1].to_string()) else {
                    return false;
                };
                if !(state.link_validator)(&href) {
                    return false;
                }
                if silent {
                    return true;
                }
                let mut token = Token::open("link", span)
                    .with_attr("href", href)
                    .with_attr("markup", "html")
                    .with_content(tag_text);
                if let Some(title) = TITLE.captures(attr_text).map(|c| c[1].to_string()) {
                    token = token.with_attr("title", title);
                }
                state.push(token);
                state.mark_stack.push(OpenMark {
                    kind: "link".to_string(),
                    marker: "a".to_string(),
                });
            }
            _ => {
                let kind = mark_kind(tag).unwrap_or_default();
                // An open tag with no closer downstream stays literal
                if !rest[total..].contains(&format!("</{tag}")) {
                    return false;
                }
                if silent {
                    return true;
                }
                state.push(
                    Token::open(kind, span)
                        .with_attr("markup", tag)
                        .with_content(tag_text),
                );
                state.mark_stack.push(OpenMark {
                    kind: kind.to_string(),
                    marker: tag.to_string(),
                });
            }
        }
        state.pos += total;
        true
    }
}
