//! Fenced code blocks (``` and ~~~), recording the exact fence used

use crate::block::{BlockRule, BlockState};
use crate::token::Token;

pub struct FenceRule;

impl BlockRule for FenceRule {
    fn run(&self, state: &mut BlockState, silent: bool) -> bool {
        let first = state.line;
        if state.is_blank(first) || state.indent(first) >= 4 {
            return false;
        }
        let text = state.line_trim(first);
        let marker = match text.chars().next() {
            Some(c @ ('`' | '~')) => c,
            _ => return false,
        };
        let fence_len = text.chars().take_while(|c| *c == marker).count();
        if fence_len < 3 {
            return false;
        }
        let info = text[fence_len..].trim();
        // Info strings on backtick fences cannot contain backticks
        if marker == '`' && info.contains('`') {
            return false;
        }
        if silent {
            return true;
        }

        let fence: String = std::iter::repeat(marker).take(fence_len).collect();
        let mut body = Vec::new();
        let mut line = first + 1;
        let mut closed_at = None;
        while line < state.line_count() {
            let candidate = state.line_trim(line);
            let close_len = candidate.chars().take_while(|c| *c == marker).count();
            if close_len >= fence_len
                && candidate[close_len..].trim().is_empty()
                && state.indent(line) < 4
            {
                closed_at = Some(line);
                break;
            }
            body.push(state.line_text(line));
            line += 1;
        }

        let last = closed_at.unwrap_or(state.line_count() - 1);
        let mut content = body.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        let token = Token::standalone("code_block", state.span_lines(first, last))
            .with_content(content)
            .with_attr("markup", fence)
            .with_attr("info", info);
        state.push(token);
        state.line = closed_at.map(|l| l + 1).unwrap_or(state.line_count());
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
    fn test_backtick_fence_with_info() {
        let mut state = BlockState::new("```rust\nfn main() {}\n```", rules());
        assert!(FenceRule.run(&mut state, false));
        let token = &state.tokens[0];
        assert_eq!(token.kind, "code_block");
        assert_eq!(token.attr("markup"), Some("```"));
        assert_eq!(token.attr("info"), Some("rust"));
        assert_eq!(token.content, "fn main() {}\n");
        assert_eq!(state.line, 3);
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let mut state = BlockState::new("~~~~\ncode", rules());
        assert!(FenceRule.run(&mut state, false));
        assert_eq!(state.tokens[0].attr("markup"), Some("~~~~"));
        assert_eq!(state.tokens[0].content, "code\n");
        assert_eq!(state.line, 2);
    }

    #[test]
    fn test_short_run_is_not_a_fence() {
        let mut state = BlockState::new("``not a fence``", rules());
        assert!(!FenceRule.run(&mut state, false));
    }
}
