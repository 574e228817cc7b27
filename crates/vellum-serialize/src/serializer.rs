//! The tree serializer: handler tables plus the inline mark-diffing walk

use crate::error::{SerializeError, SerializeResult};
use crate::state::SerializerState;
use std::collections::BTreeMap;
use std::sync::Arc;
use vellum_core::tree::{Mark, Node};

/// Emission handler for one node type. Receives the serializer itself so it
/// can recurse into children via `render_content` / `render_inline`.
pub type NodeHandler =
    Arc<dyn Fn(&MarkupSerializer, &Node, &mut SerializerState) -> SerializeResult<()> + Send + Sync>;

/// Text written at a mark boundary. Handlers receive the state so reference
/// links can register their labels in the catalogue.
pub type MarkBoundary = Arc<dyn Fn(&Mark, &mut SerializerState) -> String + Send + Sync>;

/// Emission handler for one mark type
pub struct MarkHandler {
    pub open: MarkBoundary,
    pub close: MarkBoundary,
    /// Whether text inside this mark is escaped (false for code spans)
    pub escape_content: bool,
}

impl MarkHandler {
    /// A mark written as the same delimiter on both sides, honoring a
    /// recorded `markup` attribute over the canonical delimiter
    pub fn symmetric(canonical: &'static str) -> Self {
        let delim = move |mark: &Mark, _: &mut SerializerState| {
            mark.markup().unwrap_or(canonical).to_string()
        };
        Self {
            open: Arc::new(delim),
            close: Arc::new(delim),
            escape_content: true,
        }
    }
}

/// Node/mark-type to handler tables, frozen at composition time
pub struct MarkupSerializer {
    node_handlers: BTreeMap<String, NodeHandler>,
    mark_handlers: BTreeMap<String, MarkHandler>,
}

impl MarkupSerializer {
    pub fn new(
        node_handlers: BTreeMap<String, NodeHandler>,
        mark_handlers: BTreeMap<String, MarkHandler>,
    ) -> Self {
        Self {
            node_handlers,
            mark_handlers,
        }
    }

    /// Serialize a document tree back to markup. Walks children in tree
    /// order, so emitted markup order always matches document order.
    pub fn serialize(&self, doc: &Node) -> SerializeResult<String> {
        let mut state = SerializerState::new();
        self.render(doc, &mut state)?;
        Ok(state.finish())
    }

    /// Dispatch one node to its handler
    pub fn render(&self, node: &Node, state: &mut SerializerState) -> SerializeResult<()> {
        let handler = self
            .node_handlers
            .get(&node.type_name)
            .ok_or_else(|| SerializeError::UnhandledNode(node.type_name.clone()))?;
        handler(self, node, state)
    }

    /// Render every child as a block
    pub fn render_content(&self, parent: &Node, state: &mut SerializerState) -> SerializeResult<()> {
        for child in &parent.children {
            self.render(child, state)?;
        }
        Ok(())
    }

    /// Render children as inline content, opening and closing marks at the
    /// boundaries where adjacent children's mark sets differ. Marks close in
    /// reverse order of opening.
    pub fn render_inline(&self, parent: &Node, state: &mut SerializerState) -> SerializeResult<()> {
        let mut active: Vec<Mark> = Vec::new();
        for child in &parent.children {
            self.transition_marks(&mut active, &child.marks, state)?;
            if child.is_text() {
                let handlers = active
                    .iter()
                    .map(|m| self.mark_handler(&m.type_name))
                    .collect::<SerializeResult<Vec<_>>>()?;
                let text = child.text.as_deref().unwrap_or("");
                if handlers.iter().all(|h| h.escape_content) {
                    // Characters that would close an enclosing mark early
                    // must stay escaped inside its text
                    let mut closers = String::new();
                    for (mark, handler) in active.iter().zip(&handlers) {
                        if let Some(c) = (handler.close)(mark, state).chars().next() {
                            closers.push(c);
                        }
                    }
                    state.marked_text(text, &closers);
                } else {
                    state.text_raw(text);
                }
            } else {
                self.render(child, state)?;
            }
        }
        self.transition_marks(&mut active, &[], state)?;
        Ok(())
    }

    fn transition_marks(
        &self,
        active: &mut Vec<Mark>,
        desired: &[Mark],
        state: &mut SerializerState,
    ) -> SerializeResult<()> {
        let keep = active
            .iter()
            .zip(desired.iter())
            .take_while(|(a, b)| a == b)
            .count();
        for mark in active.split_off(keep).iter().rev() {
            let text = (self.mark_handler(&mark.type_name)?.close)(mark, state);
            state.write(&text);
        }
        for mark in &desired[keep..] {
            let text = (self.mark_handler(&mark.type_name)?.open)(mark, state);
            state.write(&text);
            active.push(mark.clone());
        }
        Ok(())
    }

    fn mark_handler(&self, type_name: &str) -> SerializeResult<&MarkHandler> {
        self.mark_handlers
            .get(type_name)
            .ok_or_else(|| SerializeError::UnhandledMark(type_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::tree::Attrs;

    fn text_with(content: &str, marks: Vec<Mark>) -> Node {
        let mut node = Node::text(content);
        node.marks = marks;
        node
    }

    fn serializer() -> MarkupSerializer {
        let mut nodes: BTreeMap<String, NodeHandler> = BTreeMap::new();
        nodes.insert(
            "doc".into(),
            Arc::new(|s, node, state| s.render_content(node, state)),
        );
        nodes.insert(
            "paragraph".into(),
            Arc::new(|s, node, state| {
                s.render_inline(node, state)?;
                state.close_block();
                Ok(())
            }),
        );
        let mut marks = BTreeMap::new();
        marks.insert("em".into(), MarkHandler::symmetric("*"));
        marks.insert("strong".into(), MarkHandler::symmetric("**"));
        let mut code = MarkHandler::symmetric("`");
        code.escape_content = false;
        marks.insert("code".into(), code);
        MarkupSerializer::new(nodes, marks)
    }

    fn doc(children: Vec<Node>) -> Node {
        Node {
            type_name: "doc".into(),
            attrs: Attrs::new(),
            children: vec![Node {
                type_name: "paragraph".into(),
                attrs: Attrs::new(),
                children,
                text: None,
                marks: Vec::new(),
            }],
            text: None,
            marks: Vec::new(),
        }
    }

    #[test]
    fn test_mark_boundaries() {
        let tree = doc(vec![
            Node::text("a "),
            text_with("b", vec![Mark::new("em")]),
            Node::text(" c"),
        ]);
        assert_eq!(serializer().serialize(&tree).unwrap(), "a *b* c");
    }

    #[test]
    fn test_nested_marks_close_in_reverse_order() {
        let tree = doc(vec![
            text_with("a", vec![Mark::new("strong")]),
            text_with("b", vec![Mark::new("strong"), Mark::new("em")]),
        ]);
        assert_eq!(serializer().serialize(&tree).unwrap(), "**a*b***");
    }

    #[test]
    fn test_markup_attr_overrides_canonical_delimiter() {
        let mut attrs = Attrs::new();
        attrs.insert("markup".into(), "_".into());
        let tree = doc(vec![text_with("x", vec![Mark::with_attrs("em", attrs)])]);
        assert_eq!(serializer().serialize(&tree).unwrap(), "_x_");
    }

    #[test]
    fn test_delimiter_inside_matching_mark_stays_escaped() {
        let mut attrs = Attrs::new();
        attrs.insert("markup".into(), "_".into());
        let tree = doc(vec![text_with("a_b", vec![Mark::with_attrs("em", attrs)])]);
        assert_eq!(serializer().serialize(&tree).unwrap(), "_a\\_b_");
    }

    #[test]
    fn test_plain_intraword_underscore_not_escaped() {
        let tree = doc(vec![Node::text("use snake_case names")]);
        assert_eq!(
            serializer().serialize(&tree).unwrap(),
            "use snake_case names"
        );
    }

    #[test]
    fn test_code_content_not_escaped() {
        let tree = doc(vec![text_with("a*b", vec![Mark::new("code")])]);
        assert_eq!(serializer().serialize(&tree).unwrap(), "`a*b`");
    }

    #[test]
    fn test_unhandled_node_errors() {
        let tree = Node {
            type_name: "mystery".into(),
            attrs: Attrs::new(),
            children: Vec::new(),
            text: None,
            marks: Vec::new(),
        };
        let err = serializer().serialize(&tree).unwrap_err();
        assert_eq!(err, SerializeError::UnhandledNode("mystery".into()));
    }
}
