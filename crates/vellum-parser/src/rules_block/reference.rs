//! Link reference definitions (`[label]: href "title"`)
//!
//! Definitions are collected into the parse environment for the inline pass
//! and emit no tokens of their own.

use crate::block::{BlockRule, BlockState};
use once_cell::sync::Lazy;
use regex::Regex;

static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\[([^\]]+)\]:\s*(\S+)(?:\s+"([^"]*)")?\s*$"#).unwrap()
});

pub struct ReferenceRule;

impl BlockRule for ReferenceRule {
    fn run(&self, state: &mut BlockState, silent: bool) -> bool {
        let line = state.line;
        if state.is_blank(line) || state.indent(line) >= 4 {
            return false;
        }
        let Some(caps) = REFERENCE.captures(state.line_trim(line)) else {
            return false;
        };
        if silent {
            return true;
        }

        let label = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let href = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let title = caps.get(3).map(|m| m.as_str().to_string());
        state.env.add_reference(label, href.to_string(), title);
        state.line = line + 1;
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
    fn test_definition_collected() {
        let mut state = BlockState::new("[1]: https://example.com \"Example\"", rules());
        assert!(ReferenceRule.run(&mut state, false));
        assert!(state.tokens.is_empty());
        let (href, title) = state.env.reference("1").unwrap();
        assert_eq!(href, "https://example.com");
        assert_eq!(title.as_deref(), Some("Example"));
    }

    #[test]
    fn test_title_optional() {
        let mut state = BlockState::new("[apple]: /a", rules());
        assert!(ReferenceRule.run(&mut state, false));
        assert_eq!(state.env.reference("APPLE").unwrap().0, "/a");
    }

    #[test]
    fn test_plain_bracket_text_declines() {
        let mut state = BlockState::new("[not a def] just text", rules());
        assert!(!ReferenceRule.run(&mut state, false));
    }
}
