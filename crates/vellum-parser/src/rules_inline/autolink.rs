//! Autolinks: `<scheme:target>`, gated by the configured link validator

use crate::inline::{InlineRule, InlineState};
use crate::token::Token;
use once_cell::sync::Lazy;
use regex::Regex;

static AUTOLINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<([A-Za-z][A-Za-z0-9+.\-]*:[^<>\s]+)>").expect("valid regex"));

pub struct AutolinkRule;

impl InlineRule for AutolinkRule {
    fn run(&self, state: &mut InlineState, silent: bool) -> bool {
        let Some(caps) = AUTOLINK.captures(state.rest()) else {
            return false;
        };
        let url = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if !(state.link_validator)(url) {
            return false;
        }
        if silent {
            return true;
        }
        let total = caps.get(0).map(|m| m.len()).unwrap_or_default();
        let open_span = state.span(state.pos, state.pos + 1);
        let text_span = state.span(state.pos + 1, state.pos + total - 1);
        let close_span = state.span(state.pos + total - 1, state.pos + total);
        state.push(
            Token::open("link", open_span)
                .with_attr("href", url)
                .with_attr("markup", "autolink"),
        );
        state.push(Token::text(url, text_span));
        state.push(Token::close("link", close_span));
        state.pos += total;
        true
    }
}
