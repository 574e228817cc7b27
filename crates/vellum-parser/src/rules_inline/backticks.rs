//! Inline code spans, recording the backtick run length used

use crate::inline::{InlineRule, InlineState};
use crate::token::Token;

pub struct BacktickRule;

impl InlineRule for BacktickRule {
    fn run(&self, state: &mut InlineState, silent: bool) -> bool {
        let rest = state.rest();
        if !rest.starts_with('`') {
            return false;
        }
        let open_len = rest.bytes().take_while(|b| *b == b'`').count();

        // Closer must be a run of exactly the same length
        let mut search = open_len;
        let closer = loop {
            let Some(found) = rest[search..].find('`') else {
                break None;
            };
            let at = search + found;
            let run = rest[at..].bytes().take_while(|b| *b == b'`').count();
            if run == open_len {
                break Some(at);
            }
            search = at + run;
        };
        let Some(close_at) = closer else {
            return false;
        };
        if silent {
            return true;
        }

        let mut content = &rest[open_len..close_at];
        // One leading and trailing space are padding when the content has
        // any non-space character
        if content.starts_with(' ')
            && content.ends_with(' ')
            && content.len() >= 2
            && !content.trim().is_empty()
        {
            content = &content[1..content.len() - 1];
        }

        let ticks = "`".repeat(open_len);
        let open_span = state.span(state.pos, state.pos + open_len);
        let text_span = state.span(state.pos + open_len, state.pos + close_at);
        let close_span = state.span(state.pos + close_at, state.pos + close_at + open_len);
        state.push(Token::open("code", open_span).with_attr("markup", ticks.clone()));
        state.push(Token::text(content, text_span));
        state.push(Token::close("code", close_span).with_attr("markup", ticks));
        state.pos += close_at + open_len;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::InlineRules;
    use crate::ruler::RuleChain;
    use crate::token::{Nesting, ParseEnv};
    use std::sync::Arc;

    fn rules() -> InlineRules {
        Arc::new(RuleChain::build(super::super::default_inline_rules()).unwrap())
    }

    fn tokenize(src: &str) -> Vec<Token> {
        let env = ParseEnv::default();
        InlineState::new(src, 0, &env, rules(), Arc::new(|_| true)).tokenize()
    }

    #[test]
    fn test_simple_code_span() {
        let tokens = tokenize("`x + y`");
        assert_eq!(tokens[0].kind, "code");
        assert_eq!(tokens[0].nesting, Nesting::Open);
        assert_eq!(tokens[0].attr("markup"), Some("`"));
        assert_eq!(tokens[1].content, "x + y");
        assert_eq!(tokens[2].nesting, Nesting::Close);
    }

    #[test]
    fn test_double_backtick_protects_single() {
        let tokens = tokenize("`` a`b ``");
        assert_eq!(tokens[0].attr("markup"), Some("``"));
        assert_eq!(tokens[1].content, "a`b");
    }

    #[test]
    fn test_unclosed_backtick_is_literal() {
        let tokens = tokenize("`open");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].content, "`open");
    }

    #[test]
    fn test_markup_inside_code_is_not_parsed() {
        let tokens = tokenize("`*stars*`");
        assert_eq!(tokens[1].content, "*stars*");
        assert!(tokens.iter().all(|t| t.kind != "em"));
    }
}
