//! Block tree → XHTML.
//!
//! This module walks parsed blocks and emits XHTML fragments for packaging.
//! Heading anchors are injected from an id-by-block-index lookup supplied by
//! the caller (blocks themselves are never mutated), and code blocks are
//! decorated with a language tag: the fence's own language when present,
//! otherwise the classifier's best guess.

use std::collections::HashMap;
use std::fmt::Write;

use crate::classify::classify;

use super::{Alignment, Block, Inline, ListItem, slugify};

/// Render a run of top-level blocks to an XHTML body fragment.
///
/// # Arguments
///
/// * `blocks` - The blocks to render, a contiguous slice of the document
/// * `first_index` - Document index of `blocks[0]` (anchors are keyed by
///   document index, not slice offset)
/// * `heading_ids` - Anchor ids per top-level block index
pub fn render_blocks(
    blocks: &[Block],
    first_index: usize,
    heading_ids: &HashMap<usize, String>,
) -> String {
    let mut out = String::new();
    for (offset, block) in blocks.iter().enumerate() {
        let anchor = heading_ids.get(&(first_index + offset)).map(String::as_str);
        write_block(&mut out, block, anchor, 0);
    }
    out
}

/// Wrap a rendered body fragment in a complete XHTML document.
pub fn synthesize_chapter_document(title: &str, body: &str, stylesheet_href: Option<&str>) -> String {
    let mut doc = String::new();

    // XHTML 1.1 DOCTYPE (compatible with EPUB)
    doc.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
  <meta http-equiv="Content-Type" content="application/xhtml+xml; charset=utf-8"/>
  <title>"#,
    );
    doc.push_str(&escape_xml(title));
    doc.push_str("</title>\n");

    if let Some(href) = stylesheet_href {
        writeln!(
            doc,
            "  <link rel=\"stylesheet\" type=\"text/css\" href=\"{}\"/>",
            escape_xml(href)
        )
        .unwrap();
    }

    doc.push_str("</head>\n<body>\n");
    doc.push_str(body);
    doc.push_str("</body>\n</html>\n");

    doc
}

/// Collect the plain text of an inline run, whitespace-normalized.
///
/// Used for heading titles, navigation labels, and image alt attributes.
pub fn inline_text(inlines: &[Inline]) -> String {
    let mut raw = String::new();
    collect_text(inlines, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Emphasis(inner) | Inline::Strong(inner) | Inline::Strikethrough(inner) => {
                collect_text(inner, out);
            }
            Inline::Link { content, .. } => collect_text(content, out),
            Inline::Image { alt, .. } => collect_text(alt, out),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
            Inline::FootnoteReference(_) | Inline::Html(_) | Inline::TaskMarker(_) => {}
        }
    }
}

// ============================================================================
// Block rendering
// ============================================================================

fn write_block(out: &mut String, block: &Block, anchor: Option<&str>, indent: usize) {
    match block {
        Block::Paragraph(inlines) => {
            push_indent(out, indent);
            out.push_str("<p>");
            write_inlines(out, inlines);
            out.push_str("</p>\n");
        }
        Block::Plain(inlines) => {
            push_indent(out, indent);
            write_inlines(out, inlines);
            out.push('\n');
        }
        Block::Heading { level, content } => {
            let level = (*level).clamp(1, 6);
            push_indent(out, indent);
            match anchor {
                Some(id) => write!(out, "<h{} id=\"{}\">", level, escape_xml(id)).unwrap(),
                None => write!(out, "<h{}>", level).unwrap(),
            }
            write_inlines(out, content);
            writeln!(out, "</h{}>", level).unwrap();
        }
        Block::CodeBlock { language, code } => {
            let tag = match language {
                Some(lang) => lang.clone(),
                None => classify(code).to_string(),
            };
            push_indent(out, indent);
            write!(
                out,
                "<pre class=\"highlight\"><span class=\"code-lang\">{}</span><code class=\"language-{}\">",
                escape_xml(&tag.to_uppercase()),
                escape_xml(&tag)
            )
            .unwrap();
            out.push_str(&escape_xml(code));
            out.push_str("</code></pre>\n");
        }
        Block::BlockQuote(inner) => {
            push_indent(out, indent);
            out.push_str("<blockquote>\n");
            for block in inner {
                write_block(out, block, None, indent + 1);
            }
            push_indent(out, indent);
            out.push_str("</blockquote>\n");
        }
        Block::List { start, items } => {
            push_indent(out, indent);
            match start {
                Some(n) if *n != 1 => writeln!(out, "<ol start=\"{}\">", n).unwrap(),
                Some(_) => out.push_str("<ol>\n"),
                None => out.push_str("<ul>\n"),
            }
            for item in items {
                write_item(out, item, indent + 1);
            }
            push_indent(out, indent);
            out.push_str(if start.is_some() { "</ol>\n" } else { "</ul>\n" });
        }
        Block::Table(table) => {
            push_indent(out, indent);
            out.push_str("<table>\n");
            if !table.head.is_empty() {
                push_indent(out, indent + 1);
                out.push_str("<thead>\n");
                write_row(out, &table.head, &table.alignments, "th", indent + 2);
                push_indent(out, indent + 1);
                out.push_str("</thead>\n");
            }
            if !table.rows.is_empty() {
                push_indent(out, indent + 1);
                out.push_str("<tbody>\n");
                for row in &table.rows {
                    write_row(out, row, &table.alignments, "td", indent + 2);
                }
                push_indent(out, indent + 1);
                out.push_str("</tbody>\n");
            }
            push_indent(out, indent);
            out.push_str("</table>\n");
        }
        Block::Rule => {
            push_indent(out, indent);
            out.push_str("<hr/>\n");
        }
        Block::Html(html) => {
            out.push_str(html);
            if !html.ends_with('\n') {
                out.push('\n');
            }
        }
        Block::FootnoteDefinition { label, content } => {
            push_indent(out, indent);
            writeln!(
                out,
                "<aside class=\"footnote\" id=\"{}\">",
                escape_xml(&footnote_anchor(label))
            )
            .unwrap();
            for block in content {
                write_block(out, block, None, indent + 1);
            }
            push_indent(out, indent);
            out.push_str("</aside>\n");
        }
    }
}

fn write_item(out: &mut String, item: &ListItem, indent: usize) {
    push_indent(out, indent);

    // Tight items (a single bare inline run) stay on one line.
    if let [Block::Plain(inlines)] = item.blocks.as_slice() {
        out.push_str("<li>");
        write_inlines(out, inlines);
        out.push_str("</li>\n");
        return;
    }

    out.push_str("<li>\n");
    for block in &item.blocks {
        write_block(out, block, None, indent + 1);
    }
    push_indent(out, indent);
    out.push_str("</li>\n");
}

fn write_row(
    out: &mut String,
    cells: &[Vec<Inline>],
    alignments: &[Alignment],
    cell_tag: &str,
    indent: usize,
) {
    push_indent(out, indent);
    out.push_str("<tr>\n");
    for (i, cell) in cells.iter().enumerate() {
        push_indent(out, indent + 1);
        let alignment = alignments.get(i).copied().unwrap_or(Alignment::None);
        match align_style(alignment) {
            Some(style) => write!(out, "<{} style=\"{}\">", cell_tag, style).unwrap(),
            None => write!(out, "<{}>", cell_tag).unwrap(),
        }
        write_inlines(out, cell);
        writeln!(out, "</{}>", cell_tag).unwrap();
    }
    push_indent(out, indent);
    out.push_str("</tr>\n");
}

fn align_style(alignment: Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some("text-align: left"),
        Alignment::Center => Some("text-align: center"),
        Alignment::Right => Some("text-align: right"),
    }
}

// ============================================================================
// Inline rendering
// ============================================================================

fn write_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(&escape_xml(text)),
            Inline::Code(code) => {
                out.push_str("<code>");
                out.push_str(&escape_xml(code));
                out.push_str("</code>");
            }
            Inline::Emphasis(inner) => {
                out.push_str("<em>");
                write_inlines(out, inner);
                out.push_str("</em>");
            }
            Inline::Strong(inner) => {
                out.push_str("<strong>");
                write_inlines(out, inner);
                out.push_str("</strong>");
            }
            Inline::Strikethrough(inner) => {
                out.push_str("<del>");
                write_inlines(out, inner);
                out.push_str("</del>");
            }
            Inline::Link {
                href,
                title,
                content,
            } => {
                write!(out, "<a href=\"{}\"", escape_xml(href)).unwrap();
                if !title.is_empty() {
                    write!(out, " title=\"{}\"", escape_xml(title)).unwrap();
                }
                out.push('>');
                write_inlines(out, content);
                out.push_str("</a>");
            }
            Inline::Image { src, title, alt } => {
                write!(
                    out,
                    "<img src=\"{}\" alt=\"{}\"",
                    escape_xml(src),
                    escape_xml(&inline_text(alt))
                )
                .unwrap();
                if !title.is_empty() {
                    write!(out, " title=\"{}\"", escape_xml(title)).unwrap();
                }
                out.push_str("/>");
            }
            Inline::FootnoteReference(label) => {
                write!(
                    out,
                    "<sup class=\"footnote-ref\"><a href=\"#{}\">{}</a></sup>",
                    escape_xml(&footnote_anchor(label)),
                    escape_xml(label)
                )
                .unwrap();
            }
            Inline::Html(html) => out.push_str(html),
            Inline::SoftBreak => out.push('\n'),
            Inline::HardBreak => out.push_str("<br/>\n"),
            Inline::TaskMarker(checked) => {
                out.push_str(if *checked {
                    "<input type=\"checkbox\" disabled=\"disabled\" checked=\"checked\"/> "
                } else {
                    "<input type=\"checkbox\" disabled=\"disabled\"/> "
                });
            }
        }
    }
}

/// Anchor id shared by a footnote reference and its definition.
fn footnote_anchor(label: &str) -> String {
    let slug = slugify(label);
    if slug.is_empty() {
        format!("fn-{}", label)
    } else {
        format!("fn-{}", slug)
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

/// Escape special XML/HTML characters.
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

// ============================================================================
// Tests
// ============================================================================
