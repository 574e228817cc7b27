//! Bullet and ordered lists
//!
//! Records the bullet character (or the ordered delimiter and start number)
//! so the serializer can reproduce the original marker style. List items are
//! tokenized recursively with the full chain.

use crate::block::{tokenize_nested, BlockRule, BlockState};
use crate::rules_block::code::strip_columns;
use crate::token::Token;

pub struct ListRule;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ListKind {
    Bullet(char),
    /// start number and delimiter char
    Ordered(u64, char),
}

/// Parse a list marker at the start of a trimmed line. Returns the kind and
/// the marker's width in columns (marker plus one following space).
fn parse_marker(text: &str) -> Option<(ListKind, usize)> {
    let mut chars = text.chars();
    match chars.next()? {
        c @ ('-' | '*' | '+') => match chars.next() {
            Some(' ') => Some((ListKind::Bullet(c), 2)),
            None => Some((ListKind::Bullet(c), 2)),
            _ => None,
        },
        d if d.is_ascii_digit() => {
            let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
            if digits.len() > 9 {
                return None;
            }
            let rest = &text[digits.len()..];
            let delim = match rest.chars().next() {
                Some(c @ ('.' | ')')) => c,
                _ => return None,
            };
            match rest[1..].chars().next() {
                Some(' ') | None => {}
                _ => return None,
            }
            let start = digits.parse().ok()?;
            Some((ListKind::Ordered(start, delim), digits.len() + 2))
        }
        _ => None,
    }
}

impl BlockRule for ListRule {
    fn run(&self, state: &mut BlockState, silent: bool) -> bool {
        let first = state.line;
        if state.is_blank(first) || state.indent(first) >= 4 {
            return false;
        }
        let Some((kind, _)) = parse_marker(state.line_trim(first)) else {
            return false;
        };
        if silent {
            return true;
        }

        let base_indent = state.indent(first);
        let mut items: Vec<String> = Vec::new();
        let mut line = first;
        let mut last_line = first;
        let mut tight = true;
        let mut pending_blank = false;

        while line < state.line_count() {
            if state.is_blank(line) {
                pending_blank = true;
                line += 1;
                continue;
            }
            let indent = state.indent(line);
            let trimmed = state.line_trim(line);
            let marker = parse_marker(trimmed);
            let same_kind = marker.is_some_and(|(k, _)| kinds_match(kind, k));

            if indent <= base_indent && same_kind {
                // Next item of this list
                if pending_blank && !items.is_empty() {
                    tight = false;
                }
                pending_blank = false;
                let (_, width) = marker.expect("checked above");
                let mut content = vec![trimmed[width.min(trimmed.len())..].to_string()];
                let content_col = indent + width;
                line += 1;
                last_line = line - 1;
                // Continuation lines of this item
                while line < state.line_count() {
                    if state.is_blank(line) {
                        // Might end the item, might separate its paragraphs
                        let mut probe = line + 1;
                        while probe < state.line_count() && state.is_blank(probe) {
                            probe += 1;
                        }
                        if probe < state.line_count() && state.indent(probe) >= content_col {
                            for _ in line..probe {
                                content.push(String::new());
                            }
                            tight = false;
                            line = probe;
                            continue;
                        }
                        break;
                    }
                    if state.indent(line) < content_col {
                        break;
                    }
                    content.push(strip_columns(state.line_text(line), content_col));
                    last_line = line;
                    line += 1;
                }
                items.push(content.join("\n"));
            } else {
                break;
            }
        }

        if items.is_empty() {
            return false;
        }

        let span = state.span_lines(first, last_line);
        let (list_kind, mut open) = match kind {
            ListKind::Bullet(c) => (
                "bullet_list",
                Token::open("bullet_list", span).with_attr("markup", c.to_string()),
            ),
            ListKind::Ordered(start, delim) => (
                "ordered_list",
                Token::open("ordered_list", span)
                    .with_attr("start", start.to_string())
                    .with_attr("markup", delim.to_string()),
            ),
        };
        open = open.with_attr("tight", tight.to_string());
        state.push(open);

        for item in items {
            state.push(Token::open("list_item", span));
            let env = std::mem::take(&mut state.env);
            let (tokens, env) = tokenize_nested(&item, state.rules.clone(), env);
            state.env = env;
            state.tokens.extend(tokens);
            state.push(Token::close("list_item", span));
        }
        state.push(Token::close(list_kind, span));
        state.line = last_line + 1;
        true
    }
}

fn kinds_match(a: ListKind, b: ListKind) -> bool {
    matches!(
        (a, b),
        (ListKind::Bullet(_), ListKind::Bullet(_)) | (ListKind::Ordered(..), ListKind::Ordered(..))
    )
}
