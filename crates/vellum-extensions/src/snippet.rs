//! The multi-language snippet block extension
//!
//! A snippet is an HTML-comment envelope holding one to three language
//! sections:
//!
//! ```text
//! <!-- begin snippet: js hide: false console: true babel: null babelPresetReact: false babelPresetTS: false -->
//!
//! <!-- language: lang-js -->
//!
//!     console.log("hi");
//!
//! <!-- end snippet -->
//! ```
//!
//! The tokenizer rule is a line-oriented state machine. Structural
//! violations (no sections, duplicate sections, markers out of order) make
//! the rule decline with a recorded rejection reason, so the text degrades
//! to ordinary block handling instead of failing the parse.

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use vellum_core::schema::{AttributeSpec, NodeSpec, SchemaFragment};
use vellum_parser::builder::TokenHandler;
use vellum_parser::{BlockRule, BlockState, RuleInsertion, Token};
use vellum_serialize::NodeHandler;

use crate::contribution::EditorExtension;

/// The five envelope flags, in marker order
pub const FLAGS: [&str; 5] = ["hide", "console", "babel", "babelPresetReact", "babelPresetTS"];

/// Rejection reasons recorded when a candidate envelope is structurally
/// invalid. Diagnostic only; rejection itself is a normal "no match".
pub const REJECT_NO_SECTION: &str = "No code block found";
pub const REJECT_DUPLICATE: [(&str, &str); 3] = [
    ("js", "Duplicate JS block"),
    ("css", "Duplicate CSS block"),
    ("html", "Duplicate HTML block"),
];
pub const REJECT_OUTSIDE: &str = "Language blocks not within begin/end blocks";
pub const REJECT_ORDER: &str = "Start/end not in correct order";

static BEGIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^<!-- begin snippet: js hide: (\S+) console: (\S+) babel: (\S+) babelPresetReact: (\S+) babelPresetTS: (\S+) -->$",
    )
    .expect("valid regex")
});
static LANGUAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<!-- language: lang-(css|html|js) -->$").expect("valid regex"));
static END: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<!-- end snippet -->$").expect("valid regex"));

/// Flags are validated by set membership, never truthiness: the literal
/// strings "false" and "null" are well-formed values, not missing ones.
fn is_flag_value(value: &str) -> bool {
    matches!(value, "true" | "false" | "null")
}

fn is_language(value: &str) -> bool {
    matches!(value, "js" | "css" | "html")
}

fn duplicate_reason(language: &str) -> &'static str {
    REJECT_DUPLICATE
        .iter()
        .find(|(l, _)| *l == language)
        .map(|(_, reason)| *reason)
        .unwrap_or(REJECT_NO_SECTION)
}

struct Section {
    language: String,
    body: Vec<String>,
}

/// Strip at most one leading 4-space indent; the indent is envelope
/// framing, not content.
fn strip_frame_indent(line: &str) -> String {
    line.strip_prefix("    ").unwrap_or(line).to_string()
}

/// Outcome of scanning a candidate envelope
enum Scan {
    Matched {
        flags: Vec<(usize, String)>,
        sections: Vec<Section>,
        last_line: usize,
    },
    Rejected(&'static str),
    NotOurs,
}

fn scan(state: &BlockState, first: usize) -> Scan {
    let first_text = state.line_trim(first);

    // A stray end or language marker means the envelope is malformed, not
    // merely absent.
    if END.is_match(first_text) {
        return Scan::Rejected(REJECT_ORDER);
    }
    if LANGUAGE.is_match(first_text) {
        return Scan::Rejected(REJECT_OUTSIDE);
    }
    let Some(caps) = BEGIN.captures(first_text) else {
        return Scan::NotOurs;
    };
    let flags: Vec<(usize, String)> = (1..=FLAGS.len())
        .map(|i| (i - 1, caps[i].to_string()))
        .collect();
    if flags.iter().any(|(_, v)| !is_flag_value(v)) {
        return Scan::NotOurs;
    }

    let mut sections: Vec<Section> = Vec::new();
    let mut line = first + 1;
    while line < state.line_count() {
        let text = state.line_trim(line);
        if END.is_match(text) {
            if sections.is_empty() {
                return Scan::Rejected(REJECT_NO_SECTION);
            }
            for section in &mut sections {
                trim_frame_blanks(&mut section.body);
            }
            return Scan::Matched {
                flags,
                sections,
                last_line: line,
            };
        }
        if let Some(caps) = LANGUAGE.captures(text) {
            let language = caps[1].to_string();
            if sections.iter().any(|s| s.language == language) {
                return Scan::Rejected(duplicate_reason(&language));
            }
            sections.push(Section {
                language,
                body: Vec::new(),
            });
            line += 1;
            continue;
        }
        if BEGIN.is_match(text) {
            // A second begin before the end
            return Scan::Rejected(REJECT_ORDER);
        }
        if let Some(section) = sections.last_mut() {
            section.body.push(strip_frame_indent(state.line_text(line)));
        } else if !text.is_empty() {
            // Content before any language marker
            return Scan::Rejected(REJECT_NO_SECTION);
        }
        line += 1;
    }
    // Ran off the end of input without an end marker
    Scan::Rejected(REJECT_ORDER)
}

/// Drop the single framing blank line each side of a section body
fn trim_frame_blanks(body: &mut Vec<String>) {
    if body.first().is_some_and(|l| l.trim().is_empty()) {
        body.remove(0);
    }
    if body.last().is_some_and(|l| l.trim().is_empty()) {
        body.pop();
    }
}

pub struct SnippetRule;

impl BlockRule for SnippetRule {
    fn run(&self, state: &mut BlockState, silent: bool) -> bool {
        let first = state.line;
        if state.is_blank(first) || state.indent(first) >= 4 {
            return false;
        }
        if !state.line_trim(first).starts_with("<!--") {
            return false;
        }
        match scan(state, first) {
            Scan::Matched {
                flags,
                sections,
                last_line,
            } => {
                if silent {
                    return true;
                }
                let span = state.span_lines(first, last_line);
                let mut open = Token::open("snippet", span);
                for (i, value) in flags {
                    open = open.with_attr(FLAGS[i], value);
                }
                state.push(open);
                for section in sections {
                    state.push(
                        Token::open("snippet_section", span)
                            .with_attr("language", section.language),
                    );
                    state.push(Token::text(section.body.join("\n"), span));
                    state.push(Token::close("snippet_section", span));
                }
                state.push(Token::close("snippet", span));
                state.line = last_line + 1;
                true
            }
            Scan::Rejected(reason) => {
                if !silent {
                    tracing::debug!(reason, line = first, "snippet envelope rejected");
                    state.env.rejections.push(reason.to_string());
                }
                false
            }
            Scan::NotOurs => false,
        }
    }
}

fn snippet_fragment() -> SchemaFragment {
    let flag = || AttributeSpec::required().validated(is_flag_value);
    SchemaFragment {
        nodes: vec![
            (
                "snippet".into(),
                NodeSpec {
                    content: Some("snippet_section+".into()),
                    group: Some("block".into()),
                    attrs: FLAGS.iter().map(|f| (f.to_string(), flag())).collect(),
                    ..Default::default()
                },
            ),
            (
                "snippet_section".into(),
                NodeSpec {
                    content: Some("text*".into()),
                    attrs: vec![(
                        "language".into(),
                        AttributeSpec::required().validated(is_language),
                    )],
                    ..Default::default()
                },
            ),
        ],
        marks: Vec::new(),
        extends: Vec::new(),
    }
}

/// Emit the envelope byte-exactly: the tokenizer rule depends on this exact
/// spacing to re-parse its own output.
fn serialize_snippet() -> NodeHandler {
    Arc::new(|s, node, state| {
        let flag = |name: &str| node.attr(name).unwrap_or("null").to_string();
        state.write(&format!(
            "<!-- begin snippet: js hide: {} console: {} babel: {} babelPresetReact: {} babelPresetTS: {} -->",
            flag("hide"),
            flag("console"),
            flag("babel"),
            flag("babelPresetReact"),
            flag("babelPresetTS"),
        ));
        for section in &node.children {
            state.ensure_new_line();
            state.write("\n");
            s.render(section, state)?;
        }
        state.ensure_new_line();
        state.write("\n");
        state.write("<!-- end snippet -->");
        state.close_block();
        Ok(())
    })
}

fn serialize_section() -> NodeHandler {
    Arc::new(|_, node, state| {
        let language = node.attr("language").unwrap_or("js");
        state.write(&format!("<!-- language: lang-{language} -->"));
        state.ensure_new_line();
        state.write("\n");
        let body = node.text_content();
        for (i, line) in body.split('\n').enumerate() {
            if i > 0 {
                state.write("\n");
            }
            // Blank body lines get no frame indent, to avoid trailing spaces
            if !line.is_empty() {
                state.write("    ");
                state.write(line);
            }
        }
        Ok(())
    })
}

/// The complete snippet contribution: schema fragment, tokenizer rule
/// (before the HTML block rule, which would otherwise swallow the
/// envelope comments), token handlers, and serializer handlers.
pub fn snippet_extension() -> EditorExtension {
    EditorExtension {
        name: "snippet".into(),
        schema: snippet_fragment(),
        token_handlers: vec![
            ("snippet".into(), TokenHandler::block("snippet")),
            (
                "snippet_section".into(),
                TokenHandler::block("snippet_section"),
            ),
        ],
        node_serializers: vec![
            ("snippet".into(), serialize_snippet()),
            ("snippet_section".into(), serialize_section()),
        ],
        mark_serializers: Vec::new(),
        block_rules: vec![RuleInsertion::before(
            "snippet",
            "html_block",
            Arc::new(SnippetRule) as Arc<dyn BlockRule>,
        )],
        inline_rules: Vec::new(),
        core_rules: Vec::new(),
        ui_hooks: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_parser::rules_block::default_block_rules;
    use vellum_parser::{block, BlockRules, RuleChain};

    fn rules() -> BlockRules {
        let mut insertions = default_block_rules();
        insertions.push(RuleInsertion::before(
            "snippet",
            "html_block",
            Arc::new(SnippetRule) as Arc<dyn BlockRule>,
        ));
        Arc::new(RuleChain::build(insertions).unwrap())
    }

    const VALID: &str = "<!-- begin snippet: js hide: false console: true babel: null babelPresetReact: false babelPresetTS: false -->\n\n<!-- language: lang-js -->\n\n    console.log(\"test\");\n\n<!-- end snippet -->";

    #[test]
    fn test_valid_envelope_tokenizes() {
        let mut state = BlockState::new(VALID, rules());
        block::run_rules(&mut state);
        let kinds: Vec<&str> = state.tokens.iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "snippet",
                "snippet_section",
                "text",
                "snippet_section",
                "snippet"
            ]
        );
        assert_eq!(state.tokens[0].attr("hide"), Some("false"));
        assert_eq!(state.tokens[0].attr("console"), Some("true"));
        assert_eq!(state.tokens[0].attr("babel"), Some("null"));
        assert_eq!(state.tokens[1].attr("language"), Some("js"));
        assert_eq!(state.tokens[2].content, "console.log(\"test\");");
    }

    #[test]
    fn test_no_sections_rejected() {
        let src = "<!-- begin snippet: js hide: false console: true babel: null babelPresetReact: false babelPresetTS: false -->\n\n<!-- end snippet -->";
        let mut state = BlockState::new(src, rules());
        block::run_rules(&mut state);
        assert!(state.tokens.iter().all(|t| t.kind != "snippet"));
        assert!(state.env.rejections.contains(&REJECT_NO_SECTION.to_string()));
    }

    #[test]
    fn test_duplicate_html_section_rejected() {
        let src = "<!-- begin snippet: js hide: false console: true babel: null babelPresetReact: false babelPresetTS: false -->\n\n<!-- language: lang-html -->\n\n    <p>one</p>\n\n<!-- language: lang-html -->\n\n    <p>two</p>\n\n<!-- end snippet -->";
        let mut state = BlockState::new(src, rules());
        block::run_rules(&mut state);
        assert!(state.tokens.iter().all(|t| t.kind != "snippet"));
        assert!(state
            .env
            .rejections
            .contains(&"Duplicate HTML block".to_string()));
    }

    #[test]
    fn test_language_before_begin_rejected() {
        let src = "<!-- language: lang-js -->\n\n<!-- begin snippet: js hide: false console: true babel: null babelPresetReact: false babelPresetTS: false -->";
        let mut state = BlockState::new(src, rules());
        block::run_rules(&mut state);
        assert!(state.tokens.iter().all(|t| t.kind != "snippet"));
        assert!(state.env.rejections.contains(&REJECT_OUTSIDE.to_string()));
    }

    #[test]
    fn test_end_before_begin_rejected() {
        let src = "<!-- end snippet -->\n\n<!-- begin snippet: js hide: false console: true babel: null babelPresetReact: false babelPresetTS: false -->";
        let mut state = BlockState::new(src, rules());
        block::run_rules(&mut state);
        assert!(state.tokens.iter().all(|t| t.kind != "snippet"));
        assert!(state.env.rejections.contains(&REJECT_ORDER.to_string()));
    }

    #[test]
    fn test_malformed_flags_fall_through_silently() {
        let src = "<!-- begin snippet: js hide: maybe console: true babel: null babelPresetReact: false babelPresetTS: false -->";
        let mut state = BlockState::new(src, rules());
        block::run_rules(&mut state);
        assert!(state.tokens.iter().all(|t| t.kind != "snippet"));
        assert!(state.env.rejections.is_empty());
    }

    #[test]
    fn test_rejected_envelope_degrades_to_html_block() {
        let src = "<!-- begin snippet: js hide: false console: true babel: null babelPresetReact: false babelPresetTS: false -->\n\n<!-- end snippet -->";
        let mut state = BlockState::new(src, rules());
        block::run_rules(&mut state);
        assert!(state.tokens.iter().any(|t| t.kind == "html_block"));
    }

    #[test]
    fn test_sections_preserve_source_order() {
        let src = "<!-- begin snippet: js hide: false console: true babel: null babelPresetReact: false babelPresetTS: false -->\n\n<!-- language: lang-css -->\n\n    body { margin: 0; }\n\n<!-- language: lang-js -->\n\n    run();\n\n<!-- end snippet -->";
        let mut state = BlockState::new(src, rules());
        block::run_rules(&mut state);
        let languages: Vec<&str> = state
            .tokens
            .iter()
            .filter_map(|t| t.attr("language"))
            .collect();
        assert_eq!(languages, vec!["css", "js"]);
    }
}
