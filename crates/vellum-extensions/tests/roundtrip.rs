//! End-to-end properties of the composed editor: parse/serialize
//! round-tripping, idempotence, snippet envelope handling, reference
//! catalogue ordering, and graceful degradation.

use test_case::test_case;
use vellum_core::tree::Node;
use vellum_extensions::base::{base_extension, TOP_NODE};
use vellum_extensions::compose::{Editor, EditorBuilder};
use vellum_extensions::snippet::snippet_extension;
use vellum_parser::DEGRADED_NOTICE;

fn editor() -> Editor {
    EditorBuilder::new(TOP_NODE, base_extension())
        .extension(snippet_extension())
        .compose()
        .expect("base + snippet compose")
}

fn roundtrip(editor: &Editor, src: &str) -> String {
    let parsed = editor.parse(src).expect("parse");
    assert!(!parsed.degraded, "unexpected degraded parse of {src:?}");
    editor.serialize(&parsed.doc).expect("serialize")
}

#[test_case("# Title\n\nHello *world* and **bold** and `code`." ; "atx heading and inline marks")]
#[test_case("Title\n===\n\nBody text." ; "setext heading")]
#[test_case("_under_ and __double under__" ; "underscore emphasis provenance")]
#[test_case("> quoted *text*" ; "blockquote")]
#[test_case("> a\n>\n> b" ; "blockquote with two paragraphs")]
#[test_case("```rust\nfn main() {}\n```" ; "backtick fence with info")]
#[test_case("~~~\ncode\n~~~" ; "tilde fence provenance")]
#[test_case("    indented code" ; "indented code block")]
#[test_case("---" ; "thematic break")]
#[test_case("***" ; "thematic break provenance")]
#[test_case("- one\n- two\n- three" ; "tight bullet list")]
#[test_case("* star bullet" ; "bullet char provenance")]
#[test_case("1. first\n2. second" ; "ordered list")]
#[test_case("3) third" ; "ordered list start and paren provenance")]
#[test_case("See [text](https://example.com)." ; "inline link")]
#[test_case("See [text](https://example.com \"A title\")." ; "inline link with title")]
#[test_case("Visit <https://example.com> now" ; "autolink provenance")]
#[test_case("Some <em>text</em> here." ; "html inline emphasis provenance")]
#[test_case("a<br/>b" ; "html hard break provenance")]
#[test_case("line one  \nline two" ; "two space hard break")]
#[test_case("![alt](img.png)" ; "inline image")]
#[test_case("<div>\n<p>hi</p>\n</div>" ; "html block verbatim")]
#[test_case("| a | b |\n| --- | --- |\n| c | d |" ; "pipe table")]
#[test_case("literal \\*not em\\*" ; "escaped asterisks")]
#[test_case("use snake_case names" ; "intraword underscore stays plain")]
#[test_case("- *a *b*" ; "unbalanced emphasis in list item")]
#[test_case("- *unclosed" ; "unclosed emphasis in list item")]
#[test_case("> *a *b*" ; "unbalanced emphasis in blockquote")]
fn test_roundtrip_is_byte_exact(src: &str) {
    let editor = editor();
    assert_eq!(roundtrip(&editor, src), src);
}

#[test]
fn test_reference_link_roundtrip() {
    let editor = editor();
    let src = "See [docs][1].\n\n[1]: https://example.com \"Docs\"";
    assert_eq!(roundtrip(&editor, src), src);
}

#[test]
fn test_shortcut_reference_roundtrip() {
    let editor = editor();
    let src = "See [docs].\n\n[docs]: https://example.com";
    assert_eq!(roundtrip(&editor, src), src);
}

#[test]
fn test_reference_catalogue_sorted_numeric_first() {
    let editor = editor();
    let src = "[a][10] [b][2] [c][apple] [d][1]\n\n\
               [10]: https://ten\n[2]: https://two\n[apple]: https://apple\n[1]: https://one";
    let out = roundtrip(&editor, src);
    assert_eq!(
        out,
        "[a][10] [b][2] [c][apple] [d][1]\n\n\
         [1]: https://one\n[2]: https://two\n[10]: https://ten\n[apple]: https://apple"
    );
}

const SNIPPET: &str = "<!-- begin snippet: js hide: false console: true babel: null babelPresetReact: false babelPresetTS: false -->\n\n<!-- language: lang-js -->\n\n    console.log(\"test\");\n\n<!-- end snippet -->";

#[test]
fn test_snippet_roundtrip_is_byte_exact() {
    let editor = editor();
    assert_eq!(roundtrip(&editor, SNIPPET), SNIPPET);
}

#[test]
fn test_snippet_tree_shape() {
    let editor = editor();
    let parsed = editor.parse(SNIPPET).unwrap();
    let snippet = &parsed.doc.children[0];
    assert_eq!(snippet.type_name, "snippet");
    assert_eq!(snippet.attr("console"), Some("true"));
    assert_eq!(snippet.attr("babel"), Some("null"));
    let section = &snippet.children[0];
    assert_eq!(section.type_name, "snippet_section");
    assert_eq!(section.attr("language"), Some("js"));
    assert_eq!(section.text_content(), "console.log(\"test\");");
}

#[test]
fn test_multi_section_snippet_roundtrip() {
    let editor = editor();
    let src = "<!-- begin snippet: js hide: true console: false babel: null babelPresetReact: null babelPresetTS: null -->\n\n<!-- language: lang-css -->\n\n    body { margin: 0; }\n\n<!-- language: lang-js -->\n\n    run();\n\n<!-- end snippet -->";
    assert_eq!(roundtrip(&editor, src), src);
}

#[test]
fn test_snippet_between_paragraphs_roundtrip() {
    let editor = editor();
    let src = format!("Before.\n\n{SNIPPET}\n\nAfter.");
    assert_eq!(roundtrip(&editor, &src), src);
}

#[test_case(
    "<!-- begin snippet: js hide: false console: true babel: null babelPresetReact: false babelPresetTS: false -->\n\n<!-- end snippet -->",
    "No code block found" ; "empty envelope")]
#[test_case(
    "<!-- begin snippet: js hide: false console: true babel: null babelPresetReact: false babelPresetTS: false -->\n\n<!-- language: lang-html -->\n\n    <b>a</b>\n\n<!-- language: lang-html -->\n\n    <b>b</b>\n\n<!-- end snippet -->",
    "Duplicate HTML block" ; "duplicate section")]
#[test_case(
    "<!-- language: lang-js -->\n\n    orphan();",
    "Language blocks not within begin/end blocks" ; "orphan language marker")]
#[test_case(
    "<!-- end snippet -->\n\n<!-- begin snippet: js hide: false console: true babel: null babelPresetReact: false babelPresetTS: false -->",
    "Start/end not in correct order" ; "end before begin")]
fn test_invalid_snippet_records_rejection(src: &str, reason: &str) {
    let editor = editor();
    let parsed = editor.parse(src).unwrap();
    assert!(!parsed.degraded);
    assert!(
        parsed.env.rejections.contains(&reason.to_string()),
        "expected {reason:?} in {:?}",
        parsed.env.rejections
    );
    // The malformed envelope still parses, just not as a snippet
    assert!(find_type(&parsed.doc, "snippet").is_none());
}

fn find_type<'a>(node: &'a Node, type_name: &str) -> Option<&'a Node> {
    if node.type_name == type_name {
        return Some(node);
    }
    node.children.iter().find_map(|c| find_type(c, type_name))
}

#[test_case("- loose item\n\n- another one" ; "loose list")]
#[test_case("1. a\n   1. nested\n2. b" ; "nested ordered list")]
#[test_case("> - quoted\n> - list" ; "list inside blockquote")]
#[test_case("Text with [unresolved][nope] reference" ; "unresolved reference stays text")]
#[test_case("*unclosed emphasis never ends" ; "unbalanced emphasis")]
#[test_case("> *a *b" ; "orphan delimiters in blockquote")]
#[test_case("- *a *b" ; "orphan delimiters in list item")]
fn test_double_roundtrip_is_idempotent(src: &str) {
    let editor = editor();
    let first = roundtrip(&editor, src);
    let second = roundtrip(&editor, &first);
    assert_eq!(first, second);
}

#[test]
fn test_single_html_section_keeps_literal_flag_strings() {
    let editor = editor();
    let src = "<!-- begin snippet: js hide: true console: true babel: null babelPresetReact: null babelPresetTS: null -->\n\n<!-- language: lang-html -->\n\n    <p>hello</p>\n\n<!-- end snippet -->";
    let parsed = editor.parse(src).unwrap();
    let snippet = find_type(&parsed.doc, "snippet").unwrap();
    assert_eq!(snippet.attr("hide"), Some("true"));
    assert_eq!(snippet.attr("console"), Some("true"));
    // "null" stays the literal string, never a missing value
    assert_eq!(snippet.attr("babel"), Some("null"));
    assert_eq!(snippet.attr("babelPresetReact"), Some("null"));
    assert_eq!(snippet.attr("babelPresetTS"), Some("null"));
    assert_eq!(snippet.children[0].attr("language"), Some("html"));
}

#[test_case("Title\n====\n\n1934\\. not a list" ; "partial provenance underline")]
#[test_case("*  wide  marker" ; "marker spacing normalizes")]
fn test_double_parse_yields_equal_trees(src: &str) {
    let editor = editor();
    let first = editor.parse(src).unwrap();
    let out = editor.serialize(&first.doc).unwrap();
    let second = editor.parse(&out).unwrap();
    assert_eq!(first.doc, second.doc);
}

#[test]
fn test_two_extensions_declaring_same_node_type_collide() {
    use vellum_core::schema::{NodeSpec, SchemaFragment};
    use vellum_extensions::{ComposeError, EditorExtension};

    let custom = |ext_name: &str| {
        let mut ext = EditorExtension::named(ext_name);
        ext.schema = SchemaFragment {
            nodes: vec![(
                "custom_block".into(),
                NodeSpec {
                    content: Some("text*".into()),
                    group: Some("block".into()),
                    ..Default::default()
                },
            )],
            ..Default::default()
        };
        ext
    };
    let err = EditorBuilder::new(TOP_NODE, base_extension())
        .extension(custom("first"))
        .extension(custom("second"))
        .compose()
        .unwrap_err();
    assert!(matches!(err, ComposeError::Schema(_)));
}

#[test]
fn test_schema_composition_is_deterministic() {
    let a = editor();
    let b = editor();
    let names_a: Vec<&str> = a.schema().node_names().collect();
    let names_b: Vec<&str> = b.schema().node_names().collect();
    assert_eq!(names_a, names_b);
    let marks_a: Vec<&str> = a.schema().mark_names().collect();
    let marks_b: Vec<&str> = b.schema().mark_names().collect();
    assert_eq!(marks_a, marks_b);
}

#[test]
fn test_link_validator_rejects_destinations() {
    let editor = EditorBuilder::new(TOP_NODE, base_extension())
        .link_validator(std::sync::Arc::new(|href: &str| {
            href.starts_with("https://")
        }))
        .compose()
        .unwrap();
    let parsed = editor.parse("[x](javascript:alert(1)) and [y](https://ok)").unwrap();
    let para = &parsed.doc.children[0];
    let links: Vec<_> = para
        .children
        .iter()
        .filter(|c| c.marks.iter().any(|m| m.type_name == "link"))
        .collect();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].marks[0].attr("href"), Some("https://ok"));
}

#[test]
fn test_missing_handler_degrades_instead_of_failing() {
    let mut base = base_extension();
    base.token_handlers.retain(|(kind, _)| kind != "table");
    let editor = EditorBuilder::new(TOP_NODE, base).compose().unwrap();

    let src = "| a |\n| --- |\n| b |";
    let parsed = editor.parse(src).unwrap();
    assert!(parsed.degraded);
    let banner = find_type(&parsed.doc, "warning_banner").unwrap();
    assert_eq!(banner.text_content(), DEGRADED_NOTICE);
    let verbatim = find_type(&parsed.doc, "code_block").unwrap();
    assert_eq!(verbatim.text_content(), src);
}

#[test]
fn test_parse_never_fails_on_noise() {
    let editor = editor();
    for src in [
        "",
        "\n\n\n",
        "][)(",
        "** ** __ __ `` <",
        "<!-- begin snippet: js hide: x",
        "|||\n|",
        "\u{0}\u{1}binary\u{2}",
    ] {
        let parsed = editor.parse(src).expect("total parse");
        editor.serialize(&parsed.doc).expect("total serialize");
    }
}
