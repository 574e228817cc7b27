//! Context-sensitive escaping of literal text
//!
//! A character is escaped only at positions where the tokenizer would
//! reinterpret it: an emphasis delimiter needs a non-space neighbor and a
//! partner elsewhere in the text, a backtick needs a matching backtick, a
//! bracket needs a link tail after its matching `]`. Block-introducer
//! characters are additionally escaped at the start of a line.

/// Escape one line (or line fragment) of literal inline text.
///
/// `start_of_line` enables the block-introducer escapes. `closers` holds
/// the leading characters of the closing delimiters of every mark open
/// around this text, so a delimiter that would end an enclosing mark early
/// stays escaped even without a partner inside the text itself.
pub fn escape_text(text: &str, start_of_line: bool, closers: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_start = start_of_line;
    let mut prev: Option<char> = None;
    let mut iter = text.char_indices().peekable();
    while let Some((i, c)) = iter.next() {
        let next = iter.peek().map(|(_, n)| *n);
        let after = &text[i + c.len_utf8()..];
        match c {
            '\\' if next.is_some_and(|n| n.is_ascii_punctuation()) => {
                out.push('\\');
                out.push(c);
            }
            '*' | '_' => {
                let opens = next.is_some_and(|n| !n.is_whitespace()) && after.contains(c);
                let closes_inner =
                    prev.is_some_and(|p| !p.is_whitespace()) && text[..i].contains(c);
                let closes_outer =
                    closers.contains(c) && prev.map_or(true, |p| !p.is_whitespace());
                if opens || closes_inner || closes_outer {
                    out.push('\\');
                }
                out.push(c);
            }
            '`' => {
                if text[..i].contains('`') || after.contains('`') || closers.contains('`') {
                    out.push('\\');
                }
                out.push(c);
            }
            '[' => {
                if link_tail_follows(after) || closers.contains(']') {
                    out.push('\\');
                }
                out.push(c);
            }
            ']' if closers.contains(']') => {
                out.push('\\');
                out.push(c);
            }
            '<' => {
                // Only a tag or autolink opener needs escaping
                if next.is_some_and(|n| n.is_ascii_alphabetic() || n == '/' || n == '!') {
                    out.push('\\');
                }
                out.push(c);
            }
            '#' | '>' | '-' | '+' | '=' | '~' if at_start => {
                out.push('\\');
                out.push(c);
            }
            '0'..='9' if at_start => {
                // "1. " at line start would open an ordered list
                out.push(c);
                while iter.peek().is_some_and(|(_, n)| n.is_ascii_digit()) {
                    let (_, digit) = iter.next().expect("peeked");
                    out.push(digit);
                }
                if iter.peek().is_some_and(|(_, n)| *n == '.' || *n == ')') {
                    out.push('\\');
                }
            }
            _ => out.push(c),
        }
        at_start = at_start && c == ' ';
        prev = Some(c);
    }
    out
}

/// A `[` is live only when a matching `]` follows and the text after that
/// `]` begins a link tail. Shortcut references resolve against definitions
/// the serializer cannot see, so a bare `[label]` is left alone.
fn link_tail_follows(after: &str) -> bool {
    match after.find(']') {
        Some(end) => matches!(after[end + 1..].chars().next(), Some('(' | '[')),
        None => false,
    }
}
