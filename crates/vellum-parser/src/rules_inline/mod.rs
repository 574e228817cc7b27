//! Built-in inline-level rules
//!
//! There is no explicit "text" rule: characters no rule claims are gathered
//! into pending text by the inline driver (see `InlineState::tokenize`).

mod autolink;
mod backticks;
mod emphasis;
mod escape;
mod html_inline;
mod image;
mod link;
mod newline;

pub use autolink::AutolinkRule;
pub use backticks::BacktickRule;
pub use emphasis::EmphasisRule;
pub use escape::EscapeRule;
pub use html_inline::HtmlInlineRule;
pub use image::ImageRule;
pub use link::LinkRule;
pub use newline::NewlineRule;

use crate::inline::InlineRule;
use crate::ruler::RuleInsertion;
use std::sync::Arc;

/// The default inline rule chain, in execution order
pub fn default_inline_rules() -> Vec<RuleInsertion<Arc<dyn InlineRule>>> {
    vec![
        RuleInsertion::append("escape", Arc::new(EscapeRule) as Arc<dyn InlineRule>),
        RuleInsertion::append("newline", Arc::new(NewlineRule)),
        RuleInsertion::append("backticks", Arc::new(BacktickRule)),
        RuleInsertion::append("autolink", Arc::new(AutolinkRule)),
        RuleInsertion::append("html_inline", Arc::new(HtmlInlineRule)),
        RuleInsertion::append("image", Arc::new(ImageRule)),
        RuleInsertion::append("link", Arc::new(LinkRule)),
        RuleInsertion::append("emphasis", Arc::new(EmphasisRule)),
    ]
}
