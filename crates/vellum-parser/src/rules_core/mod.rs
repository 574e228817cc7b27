//! Built-in core-pass rules

mod balance;
mod text_merge;

pub use balance::BalanceRule;
pub use text_merge::TextMergeRule;

use crate::core::CoreRule;
use crate::ruler::RuleInsertion;
use std::sync::Arc;

/// The default core rule chain. Balance runs first so the literal text it
/// recovers from orphaned marks gets merged with its neighbors.
pub fn default_core_rules() -> Vec<RuleInsertion<Arc<dyn CoreRule>>> {
    vec![
        RuleInsertion::append("balance", Arc::new(BalanceRule) as Arc<dyn CoreRule>),
        RuleInsertion::append("text_merge", Arc::new(TextMergeRule)),
    ]
}
