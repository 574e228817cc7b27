//! The three-pass markup tokenizer
//!
//! Pass one segments the source into block tokens; inline containers come
//! out as placeholder `inline` tokens carrying their raw text. Pass two
//! expands each placeholder into inline tokens in place. Pass three runs
//! the core rules over the whole stream.

use crate::block::{self, BlockRules, BlockState};
use crate::core::{self, CoreRules, CoreState};
use crate::inline::{InlineRules, InlineState, LinkValidator};
use crate::token::{ParseEnv, Token};
use std::sync::Arc;

/// A frozen tokenizer: base grammar plus every composed extension rule
pub struct MarkupTokenizer {
    block_rules: BlockRules,
    inline_rules: InlineRules,
    core_rules: CoreRules,
    link_validator: LinkValidator,
}

impl MarkupTokenizer {
    pub fn new(
        block_rules: BlockRules,
        inline_rules: InlineRules,
        core_rules: CoreRules,
        link_validator: LinkValidator,
    ) -> Self {
        Self {
            block_rules,
            inline_rules,
            core_rules,
            link_validator,
        }
    }

    /// Every tokenizer built without an explicit validator accepts all hrefs
    pub fn permissive_validator() -> LinkValidator {
        Arc::new(|_| true)
    }

    /// Tokenize one source text into a flat stream plus the side data
    /// (reference definitions, rule rejection diagnostics) collected on
    /// the way.
    pub fn tokenize(&self, src: &str) -> (Vec<Token>, ParseEnv) {
        let mut state = BlockState::new(src, self.block_rules.clone());
        block::run_rules(&mut state);
        let tokens = std::mem::take(&mut state.tokens);
        let env = std::mem::take(&mut state.env);

        let mut expanded = Vec::with_capacity(tokens.len());
        for token in tokens {
            if token.kind == "inline" {
                let inline = InlineState::new(
                    &token.content,
                    token.span.start,
                    &env,
                    self.inline_rules.clone(),
                    self.link_validator.clone(),
                );
                expanded.extend(inline.tokenize());
            } else {
                expanded.push(token);
            }
        }

        let mut core_state = CoreState {
            src,
            tokens: expanded,
            env,
        };
        core::run_rules(&mut core_state, &self.core_rules);
        (core_state.tokens, core_state.env)
    }

    pub fn block_rule_names(&self) -> Vec<&str> {
        self.block_rules.names()
    }

    pub fn inline_rule_names(&self) -> Vec<&str> {
        self.inline_rules.names()
    }
}
