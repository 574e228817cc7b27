//! Core-pass rules: whole-stream rewrites after block and inline tokenization
//!
//! Core rules see the complete token list and may rewrite it freely. The
//! built-in pass repairs unbalanced inline marks (turning orphaned open or
//! close tokens back into the literal text they came from) and merges
//! adjacent text tokens.

use crate::ruler::RuleChain;
use crate::token::{ParseEnv, Token};
use std::sync::Arc;

/// A core-pass rule, run once per parse over the whole token stream
pub trait CoreRule: Send + Sync {
    fn run(&self, state: &mut CoreState);
}

/// Shared, frozen core rule chain
pub type CoreRules = Arc<RuleChain<Arc<dyn CoreRule>>>;

/// The full token stream plus the source it was produced from
pub struct CoreState<'a> {
    pub src: &'a str,
    pub tokens: Vec<Token>,
    pub env: ParseEnv,
}

/// Run every core rule, in chain order, over the state
pub fn run_rules(state: &mut CoreState, rules: &CoreRules) {
    for (_, rule) in rules.iter() {
        rule.run(state);
    }
}
