//! Built-in block-level rules
//!
//! The default chain order matters: container and leaf-block rules run
//! before the paragraph rule, which is the terminal fallback. Extensions
//! splice their own rules into this chain by name (see `RuleInsertion`).

mod blockquote;
mod code;
mod fence;
mod heading;
mod hr;
mod html_block;
mod list;
mod paragraph;
mod reference;
mod table;

pub use blockquote::BlockquoteRule;
pub use code::IndentedCodeRule;
pub use fence::FenceRule;
pub use heading::HeadingRule;
pub use hr::HrRule;
pub use html_block::HtmlBlockRule;
pub use list::ListRule;
pub use paragraph::ParagraphRule;
pub use reference::ReferenceRule;
pub use table::TableRule;

use crate::block::BlockRule;
use crate::ruler::RuleInsertion;
use std::sync::Arc;

/// The default block rule chain, in execution order
pub fn default_block_rules() -> Vec<RuleInsertion<Arc<dyn BlockRule>>> {
    vec![
        RuleInsertion::append("table", Arc::new(TableRule) as Arc<dyn BlockRule>),
        RuleInsertion::append("code", Arc::new(IndentedCodeRule)),
        RuleInsertion::append("fence", Arc::new(FenceRule)),
        RuleInsertion::append("blockquote", Arc::new(BlockquoteRule)),
        RuleInsertion::append("hr", Arc::new(HrRule)),
        RuleInsertion::append("list", Arc::new(ListRule)),
        RuleInsertion::append("reference", Arc::new(ReferenceRule)),
        RuleInsertion::append("heading", Arc::new(HeadingRule)),
        RuleInsertion::append("html_block", Arc::new(HtmlBlockRule)),
        RuleInsertion::append("paragraph", Arc::new(ParagraphRule)),
    ]
}
