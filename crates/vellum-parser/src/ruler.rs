//! Frozen, ordered rule chains
//!
//! Extensions inject tokenizer rules at named positions ("before `fence`",
//! "after `heading`"). Rather than keeping a mutable rule list that is
//! spliced imperatively at arbitrary times, the chain is built exactly once
//! during composition from a list of insertion directives and is immutable
//! afterwards; unknown anchors fail composition eagerly.

use crate::error::RulerError;

/// Where to insert a rule relative to the rules registered so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insert {
    /// Append at the end of the chain
    Append,
    /// Insert immediately before the named rule
    Before(String),
    /// Insert immediately after the named rule
    After(String),
}

/// One rule registration: a unique name, an insertion directive, and the
/// rule payload itself (a block rule, inline rule, or core rule object).
pub struct RuleInsertion<R> {
    pub name: String,
    pub insert: Insert,
    pub rule: R,
}

impl<R> RuleInsertion<R> {
    pub fn append(name: impl Into<String>, rule: R) -> Self {
        Self {
            name: name.into(),
            insert: Insert::Append,
            rule,
        }
    }

    pub fn before(name: impl Into<String>, anchor: impl Into<String>, rule: R) -> Self {
        Self {
            name: name.into(),
            insert: Insert::Before(anchor.into()),
            rule,
        }
    }

    pub fn after(name: impl Into<String>, anchor: impl Into<String>, rule: R) -> Self {
        Self {
            name: name.into(),
            insert: Insert::After(anchor.into()),
            rule,
        }
    }
}

/// A frozen ordered rule chain. Rules execute in chain order; the first
/// match wins at any given position.
#[derive(Debug)]
pub struct RuleChain<R> {
    rules: Vec<(String, R)>,
}

impl<R> RuleChain<R> {
    /// Resolve insertion directives into a frozen chain. Directives are
    /// processed in registration order, so an `After("x")` sees every rule
    /// registered before it.
    pub fn build(insertions: Vec<RuleInsertion<R>>) -> Result<Self, RulerError> {
        let mut rules: Vec<(String, R)> = Vec::with_capacity(insertions.len());
        for insertion in insertions {
            if rules.iter().any(|(n, _)| *n == insertion.name) {
                return Err(RulerError::DuplicateRule(insertion.name));
            }
            let idx = match &insertion.insert {
                Insert::Append => rules.len(),
                Insert::Before(anchor) => Self::position(&rules, anchor).ok_or_else(|| {
                    RulerError::UnknownAnchor {
                        rule: insertion.name.clone(),
                        anchor: anchor.clone(),
                        position: "before",
                    }
                })?,
                Insert::After(anchor) => Self::position(&rules, anchor)
                    .map(|i| i + 1)
                    .ok_or_else(|| RulerError::UnknownAnchor {
                        rule: insertion.name.clone(),
                        anchor: anchor.clone(),
                        position: "after",
                    })?,
            };
            rules.insert(idx, (insertion.name, insertion.rule));
        }
        Ok(Self { rules })
    }

    fn position(rules: &[(String, R)], name: &str) -> Option<usize> {
        rules.iter().position(|(n, _)| n == name)
    }

    /// Iterate rules in execution order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &R)> {
        self.rules.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in execution order, for diagnostics
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|(n, _)| n.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_order() {
        let chain = RuleChain::build(vec![
            RuleInsertion::append("a", 1),
            RuleInsertion::append("b", 2),
        ])
        .unwrap();
        assert_eq!(chain.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_before_and_after() {
        let chain = RuleChain::build(vec![
            RuleInsertion::append("heading", 1),
            RuleInsertion::append("paragraph", 2),
            RuleInsertion::before("snippet", "paragraph", 3),
            RuleInsertion::after("fence", "heading", 4),
        ])
        .unwrap();
        assert_eq!(chain.names(), vec!["heading", "fence", "snippet", "paragraph"]);
    }

    #[test]
    fn test_unknown_anchor_rejected() {
        let err = RuleChain::build(vec![RuleInsertion::before("x", "missing", 1)]).unwrap_err();
        assert_eq!(
            err,
            RulerError::UnknownAnchor {
                rule: "x".into(),
                anchor: "missing".into(),
                position: "before",
            }
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = RuleChain::build(vec![
            RuleInsertion::append("a", 1),
            RuleInsertion::append("a", 2),
        ])
        .unwrap_err();
        assert_eq!(err, RulerError::DuplicateRule("a".into()));
    }
}
