//! HTML blocks, kept verbatim for byte-exact re-emission

use crate::block::{BlockRule, BlockState};
use crate::token::Token;
use once_cell::sync::Lazy;
use regex::Regex;

static HTML_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<(?:!--|/?[A-Za-z][A-Za-z0-9-]*(?:\s|/?>|$))").unwrap());

pub struct HtmlBlockRule;

impl BlockRule for HtmlBlockRule {
    fn run(&self, state: &mut BlockState, silent: bool) -> bool {
        let first = state.line;
        if state.is_blank(first) || state.indent(first) >= 4 {
            return false;
        }
        if !HTML_START.is_match(state.line_trim(first)) {
            return false;
        }
        if silent {
            return true;
        }

        // The block runs to the next blank line.
        let mut last = first;
        while last + 1 < state.line_count() && !state.is_blank(last + 1) {
            last += 1;
        }
        let body: Vec<&str> = (first..=last).map(|i| state.line_text(i)).collect();
        state.push(
            Token::standalone("html_block", state.span_lines(first, last))
                .with_content(body.join("\n"))
                .with_attr("markup", "html"),
        );
        state.line = last + 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockRules;
    use crate::ruler::RuleChain;
    use std::sync::Arc;

    fn rules() -> BlockRules {
        Arc::new(RuleChain::build(Vec::new()).unwrap())
    }

    #[test]
    fn test_html_block_verbatim() {
        let mut state = BlockState::new("<div class=\"x\">\n  <p>hi</p>\n</div>\n\nafter", rules());
        assert!(HtmlBlockRule.run(&mut state, false));
        assert_eq!(
            state.tokens[0].content,
            "<div class=\"x\">\n  <p>hi</p>\n</div>"
        );
        assert_eq!(state.line, 3);
    }

    #[test]
    fn test_comment_matches() {
        let mut state = BlockState::new("<!-- note -->", rules());
        assert!(HtmlBlockRule.run(&mut state, false));
    }

    #[test]
    fn test_plain_text_declines() {
        let mut state = BlockState::new("a < b", rules());
        assert!(!HtmlBlockRule.run(&mut state, false));
    }
}
