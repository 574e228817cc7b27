//! Markup tokenization and tree building
//!
//! Converts raw markup text into a validated document tree in two stages: a
//! three-pass tokenizer (block, inline, core) producing a flat token stream,
//! and a tree builder mapping token kinds onto schema types through a
//! handler table. Both stages are extensible: rule chains accept injected
//! rules at named positions, and the handler table is assembled at
//! composition time.

pub mod block;
pub mod builder;
pub mod core;
pub mod error;
pub mod inline;
pub mod parser;
pub mod ruler;
pub mod rules_block;
pub mod rules_core;
pub mod rules_inline;
pub mod token;
pub mod tokenizer;

pub use block::{BlockRule, BlockRules, BlockState};
pub use builder::{TokenHandler, TokenHandlers, TreeBuilder};
pub use core::{CoreRule, CoreRules, CoreState};
pub use error::{ParseError, ParseResult, RulerError};
pub use inline::{InlineRule, InlineRules, InlineState, LinkValidator};
pub use parser::{MarkupParser, Parsed, DEGRADED_NOTICE};
pub use ruler::{Insert, RuleChain, RuleInsertion};
pub use token::{Nesting, ParseEnv, Span, Token};
pub use tokenizer::MarkupTokenizer;
