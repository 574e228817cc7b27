//! Markup emission for the base vocabulary
//!
//! Each handler honors the `markup` provenance attribute where one was
//! recorded and falls back to canonical form otherwise. HTML-tag forms
//! re-emit their attributes in alphabetical order; original attribute
//! order is not preserved.

use std::sync::Arc;
use vellum_core::tree::{Mark, Node};
use vellum_serialize::{MarkHandler, NodeHandler, SerializerState};

fn is_tag_name(markup: &str) -> bool {
    !markup.is_empty() && markup.chars().all(|c| c.is_ascii_alphabetic())
}

/// A mark whose provenance may be a lightweight delimiter or an HTML tag
fn tag_aware(canonical: &'static str, escape_content: bool) -> MarkHandler {
    let open = move |mark: &Mark, _: &mut SerializerState| match mark.markup() {
        Some(m) if is_tag_name(m) => format!("<{m}>"),
        Some(m) => m.to_string(),
        None => canonical.to_string(),
    };
    let close = move |mark: &Mark, _: &mut SerializerState| match mark.markup() {
        Some(m) if is_tag_name(m) => format!("</{m}>"),
        Some(m) => m.to_string(),
        None => canonical.to_string(),
    };
    MarkHandler {
        open: Arc::new(open),
        close: Arc::new(close),
        escape_content,
    }
}

fn link_open(mark: &Mark, state: &mut SerializerState) -> String {
    let href = mark.attr("href").unwrap_or("");
    let title = mark.attr("title").filter(|t| !t.is_empty());
    match mark.markup() {
        Some("autolink") => "<".to_string(),
        Some("html") => {
            // Attributes in alphabetical order: href, then title
            let mut tag = format!("<a href=\"{href}\"");
            if let Some(title) = title {
                tag.push_str(&format!(" title=\"{title}\""));
            }
            tag.push('>');
            tag
        }
        Some("reference") => {
            let label = mark.attr("refLabel").unwrap_or("");
            state.references.register(label, href, title);
            "[".to_string()
        }
        _ => "[".to_string(),
    }
}

fn link_close(mark: &Mark, _: &mut SerializerState) -> String {
    let href = mark.attr("href").unwrap_or("");
    let title = mark.attr("title").filter(|t| !t.is_empty());
    match mark.markup() {
        Some("autolink") => ">".to_string(),
        Some("html") => "</a>".to_string(),
        Some("reference") => match mark.attr("refType") {
            Some("full") => format!("][{}]", mark.attr("refLabel").unwrap_or("")),
            Some("collapsed") => "][]".to_string(),
            _ => "]".to_string(),
        },
        _ => match title {
            Some(title) => format!("]({href} \"{title}\")"),
            None => format!("]({href})"),
        },
    }
}

pub(super) fn mark_serializers() -> Vec<(String, MarkHandler)> {
    vec![
        ("em".into(), tag_aware("*", true)),
        ("strong".into(), tag_aware("**", true)),
        ("code".into(), tag_aware("`", false)),
        (
            "link".into(),
            MarkHandler {
                open: Arc::new(link_open),
                close: Arc::new(link_close),
                escape_content: true,
            },
        ),
    ]
}

fn heading(
    s: &vellum_serialize::MarkupSerializer,
    node: &Node,
    state: &mut SerializerState,
) -> vellum_serialize::SerializeResult<()> {
    match node.markup() {
        Some(m @ ("=" | "-")) => {
            // Setext form: text line, then the underline
            s.render_inline(node, state)?;
            state.ensure_new_line();
            state.write(&m.repeat(3));
        }
        markup => {
            let level: usize = node.attr("level").and_then(|l| l.parse().ok()).unwrap_or(1);
            let hashes = markup
                .map(str::to_string)
                .unwrap_or_else(|| "#".repeat(level));
            if node.children.is_empty() {
                state.write(&hashes);
            } else {
                state.write(&format!("{hashes} "));
                s.render_inline(node, state)?;
            }
        }
    }
    state.close_block();
    Ok(())
}

fn code_block(
    _: &vellum_serialize::MarkupSerializer,
    node: &Node,
    state: &mut SerializerState,
) -> vellum_serialize::SerializeResult<()> {
    let content = node.text_content();
    match node.markup() {
        Some("indented") => {
            for (i, line) in content.trim_end_matches('\n').split('\n').enumerate() {
                if i > 0 {
                    state.write("\n");
                }
                // Blank lines inside the block stay blank, without the indent
                if !line.is_empty() {
                    state.write("    ");
                    state.write(line);
                }
            }
        }
        markup => {
            let fence = markup.unwrap_or("```").to_string();
            let info = node.attr("info").unwrap_or("");
            state.write(&format!("{fence}{info}"));
            state.ensure_new_line();
            state.text_raw(&content);
            state.write(&fence);
        }
    }
    state.close_block();
    Ok(())
}

fn list(
    s: &vellum_serialize::MarkupSerializer,
    node: &Node,
    state: &mut SerializerState,
    ordered: bool,
) -> vellum_serialize::SerializeResult<()> {
    let tight = node.attr("tight") == Some("true");
    let start: u64 = node.attr("start").and_then(|v| v.parse().ok()).unwrap_or(1);
    state.push_tight(tight);
    for (i, item) in node.children.iter().enumerate() {
        let marker = if ordered {
            let delim = node.markup().unwrap_or(".");
            format!("{}{delim} ", start + i as u64)
        } else {
            format!("{} ", node.markup().unwrap_or("-"))
        };
        let indent = " ".repeat(marker.len());
        state.wrap_block(&indent, Some(&marker), |state| s.render_content(item, state))?;
    }
    state.pop_tight();
    state.close_block();
    Ok(())
}

fn table(
    s: &vellum_serialize::MarkupSerializer,
    node: &Node,
    state: &mut SerializerState,
) -> vellum_serialize::SerializeResult<()> {
    for (i, row) in node.children.iter().enumerate() {
        state.write("|");
        for cell in &row.children {
            state.write(" ");
            s.render_inline(cell, state)?;
            state.write(" |");
        }
        state.ensure_new_line();
        if i == 0 {
            // Delimiter row after the header
            state.write("|");
            for _ in &row.children {
                state.write(" --- |");
            }
            state.ensure_new_line();
        }
    }
    state.close_block();
    Ok(())
}

fn image(node: &Node, state: &mut SerializerState) {
    let src = node.attr("src").unwrap_or("");
    let alt = node.attr("alt").unwrap_or("");
    let title = node.attr("title").filter(|t| !t.is_empty());
    match node.markup() {
        Some("html") => {
            // Attributes in alphabetical order: alt, src, title
            let mut tag = format!("<img alt=\"{alt}\" src=\"{src}\"");
            if let Some(title) = title {
                tag.push_str(&format!(" title=\"{title}\""));
            }
            tag.push_str("/>");
            state.write(&tag);
        }
        Some("reference") => {
            let label = node.attr("refLabel").unwrap_or("");
            state.references.register(label, src, title);
            let tail = match node.attr("refType") {
                Some("full") => format!("[{label}]"),
                Some("collapsed") => "[]".to_string(),
                _ => String::new(),
            };
            state.write(&format!("![{alt}]{tail}"));
        }
        _ => match title {
            Some(title) => state.write(&format!("![{alt}]({src} \"{title}\")")),
            None => state.write(&format!("![{alt}]({src})")),
        },
    }
}

pub(super) fn node_serializers() -> Vec<(String, NodeHandler)> {
    let mut handlers: Vec<(String, NodeHandler)> = Vec::new();
    handlers.push((
        "doc".into(),
        Arc::new(|s, node, state| s.render_content(node, state)),
    ));
    handlers.push((
        "paragraph".into(),
        Arc::new(|s, node, state| {
            s.render_inline(node, state)?;
            state.close_block();
            Ok(())
        }),
    ));
    handlers.push(("heading".into(), Arc::new(heading)));
    handlers.push((
        "blockquote".into(),
        Arc::new(|s, node, state| state.wrap_block("> ", None, |state| s.render_content(node, state))),
    ));
    handlers.push(("code_block".into(), Arc::new(code_block)));
    handlers.push((
        "horizontal_rule".into(),
        Arc::new(|_, node, state| {
            state.write(node.markup().unwrap_or("---"));
            state.close_block();
            Ok(())
        }),
    ));
    handlers.push((
        "html_block".into(),
        Arc::new(|_, node, state| {
            state.text_raw(&node.text_content());
            state.close_block();
            Ok(())
        }),
    ));
    handlers.push((
        "bullet_list".into(),
        Arc::new(|s, node, state| list(s, node, state, false)),
    ));
    handlers.push((
        "ordered_list".into(),
        Arc::new(|s, node, state| list(s, node, state, true)),
    ));
    handlers.push((
        "list_item".into(),
        Arc::new(|s, node, state| s.render_content(node, state)),
    ));
    handlers.push(("table".into(), Arc::new(table)));
    handlers.push((
        "image".into(),
        Arc::new(|_, node, state| {
            image(node, state);
            Ok(())
        }),
    ));
    handlers.push((
        "hard_break".into(),
        Arc::new(|_, node, state| {
            let markup = node.markup().unwrap_or("  ");
            state.write(markup);
            if !markup.starts_with('<') {
                state.ensure_new_line();
            }
            Ok(())
        }),
    ));
    handlers.push((
        "warning_banner".into(),
        Arc::new(|s, node, state| {
            state.write("**Warning:** ");
            s.render_inline(node, state)?;
            state.close_block();
            Ok(())
        }),
    ));
    handlers
}
