//! Mutable output state threaded through one serialize call

use crate::escape::escape_text;

/// Accumulated link reference definitions, emitted once at end of document.
/// The first registration of a label wins; later duplicates are ignored.
#[derive(Debug, Default)]
pub struct ReferenceCatalogue {
    entries: Vec<(String, String, Option<String>)>,
}

impl ReferenceCatalogue {
    pub fn register(&mut self, label: &str, href: &str, title: Option<&str>) {
        if self.entries.iter().any(|(l, _, _)| l == label) {
            return;
        }
        self.entries.push((
            label.to_string(),
            href.to_string(),
            title.map(str::to_string),
        ));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The definition block: one `[label]: href "title"` line per label.
    /// Labels that parse as integers sort numerically ascending before all
    /// other labels, which sort lexicographically.
    pub fn emit(&self) -> String {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(
            |(a, _, _), (b, _, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                (Err(_), Err(_)) => a.cmp(b),
            },
        );
        let mut out = String::new();
        for (i, (label, href, title)) in entries.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("[{label}]: {href}"));
            if let Some(title) = title {
                out.push_str(&format!(" \"{title}\""));
            }
        }
        out
    }
}

/// Output accumulator with the shared writing primitives handlers use.
///
/// Tracks the current line prefix (blockquote markers, list indentation),
/// whether a block is pending its separator, and the reference catalogue.
/// Separators are written lazily by the next write, so the document never
/// ends with a separator it didn't need.
pub struct SerializerState {
    out: String,
    /// Prefix written at the start of every new line
    delim: String,
    /// A block just closed; the next write flushes its separator first
    closed: bool,
    /// Tightness of the enclosing lists, innermost last
    tight_stack: Vec<bool>,
    pub references: ReferenceCatalogue,
}

impl Default for SerializerState {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializerState {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            delim: String::new(),
            closed: false,
            tight_stack: Vec::new(),
            references: ReferenceCatalogue::default(),
        }
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn flush_close(&mut self) {
        if !self.closed {
            return;
        }
        self.closed = false;
        if !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        if self.in_tight_list() {
            return;
        }
        // The separating blank line carries the prefix minus trailing spaces
        let blank = self.delim.trim_end().to_string();
        self.out.push_str(&blank);
        self.out.push('\n');
    }

    /// Write raw output, flushing any pending block separator and the line
    /// prefix first
    pub fn write(&mut self, content: &str) {
        self.flush_close();
        if !self.delim.is_empty() && self.at_line_start() {
            let delim = self.delim.clone();
            self.out.push_str(&delim);
        }
        self.out.push_str(content);
    }

    /// Write literal inline text, escaped for its position
    pub fn text(&mut self, text: &str) {
        self.marked_text(text, "");
    }

    /// Write literal inline text that sits inside open marks. `closers`
    /// holds the leading characters of their closing delimiters so the
    /// escaper keeps them from ending a mark early.
    pub fn marked_text(&mut self, text: &str, closers: &str) {
        let lines: Vec<&str> = text.split('\n').collect();
        for (i, line) in lines.iter().enumerate() {
            let start = self.at_line_start() || self.closed;
            self.write(&escape_text(line, start, closers));
            if i + 1 < lines.len() {
                self.out.push('\n');
            }
        }
    }

    /// Write inline text with no escaping (code spans, verbatim blocks)
    pub fn text_raw(&mut self, text: &str) {
        let lines: Vec<&str> = text.split('\n').collect();
        for (i, line) in lines.iter().enumerate() {
            self.write(line);
            if i + 1 < lines.len() {
                self.out.push('\n');
            }
        }
    }

    /// End the current line if one is open
    pub fn ensure_new_line(&mut self) {
        if !self.at_line_start() {
            self.out.push('\n');
        }
    }

    /// Mark the current block closed. The newline and separating blank line
    /// are written lazily if and when another block follows.
    pub fn close_block(&mut self) {
        self.closed = true;
    }

    /// Render a sub-block with `delim` prefixed to every line. The first
    /// line gets `first_delim` instead (list item markers).
    pub fn wrap_block<E>(
        &mut self,
        delim: &str,
        first_delim: Option<&str>,
        f: impl FnOnce(&mut Self) -> Result<(), E>,
    ) -> Result<(), E> {
        self.write(first_delim.unwrap_or(delim));
        let old = std::mem::take(&mut self.delim);
        self.delim = format!("{old}{delim}");
        f(self)?;
        self.delim = old;
        self.close_block();
        Ok(())
    }

    /// Enter a list context with the given tightness
    pub fn push_tight(&mut self, tight: bool) {
        self.tight_stack.push(tight);
    }

    pub fn pop_tight(&mut self) {
        self.tight_stack.pop();
    }

    /// Tightness of the innermost list, if inside one
    pub fn in_tight_list(&self) -> bool {
        self.tight_stack.last().copied().unwrap_or(false)
    }

    /// Finish serialization: append the reference catalogue if any labels
    /// were registered and hand back the output
    pub fn finish(mut self) -> String {
        if !self.references.is_empty() {
            self.closed = true;
            self.delim.clear();
            self.flush_close();
            let catalogue = self.references.emit();
            self.out.push_str(&catalogue);
        }
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_separated_by_blank_line() {
        let mut state = SerializerState::new();
        state.write("one");
        state.close_block();
        state.write("two");
        state.close_block();
        assert_eq!(state.finish(), "one\n\ntwo");
    }

    #[test]
    fn test_no_trailing_separator() {
        let mut state = SerializerState::new();
        state.write("only");
        state.close_block();
        assert_eq!(state.finish(), "only");
    }

    #[test]
    fn test_wrap_block_prefixes_every_line() {
        let mut state = SerializerState::new();
        state
            .wrap_block::<()>("> ", None, |state| {
                state.write("a");
                state.ensure_new_line();
                state.write("b");
                Ok(())
            })
            .unwrap();
        assert_eq!(state.finish(), "> a\n> b");
    }

    #[test]
    fn test_nested_wrap_blank_line_has_trimmed_prefix() {
        let mut state = SerializerState::new();
        state
            .wrap_block::<()>("> ", None, |state| {
                state.write("a");
                state.close_block();
                state.write("b");
                Ok(())
            })
            .unwrap();
        assert_eq!(state.finish(), "> a\n>\n> b");
    }

    #[test]
    fn test_tight_list_items_single_newline() {
        let mut state = SerializerState::new();
        state.push_tight(true);
        for item in ["a", "b"] {
            state
                .wrap_block::<()>("  ", Some("- "), |state| {
                    state.write(item);
                    state.close_block();
                    Ok(())
                })
                .unwrap();
        }
        state.pop_tight();
        assert_eq!(state.finish(), "- a\n- b");
    }

    #[test]
    fn test_reference_catalogue_numeric_first_sort() {
        let mut catalogue = ReferenceCatalogue::default();
        for label in ["10", "2", "apple", "1"] {
            catalogue.register(label, "u", None);
        }
        let emitted = catalogue.emit();
        let labels: Vec<&str> = emitted
            .lines()
            .map(|l| l.split(']').next().unwrap().trim_start_matches('['))
            .collect();
        assert_eq!(labels, vec!["1", "2", "10", "apple"]);
    }

    #[test]
    fn test_reference_first_registration_wins() {
        let mut catalogue = ReferenceCatalogue::default();
        catalogue.register("x", "first", None);
        catalogue.register("x", "second", Some("t"));
        assert_eq!(catalogue.emit(), "[x]: first");
    }

    #[test]
    fn test_finish_appends_catalogue_after_blank_line() {
        let mut state = SerializerState::new();
        state.write("para");
        state.close_block();
        state.references.register("1", "https://a", None);
        assert_eq!(state.finish(), "para\n\n[1]: https://a");
    }
}
