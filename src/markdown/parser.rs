//! Markdown text → block tree.
//!
//! Tokenization is delegated to `pulldown-cmark`; this module owns the
//! conversion from its event stream into the owned [`Block`]/[`Inline`] tree.
//! The builder is a recursive descent over the event iterator: every
//! `Start(...)` dispatches to a consumer that eats events up to the matching
//! `End`, so container nesting falls out of the call stack and no end-tag
//! bookkeeping is needed.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use super::{Alignment, Block, Document, Inline, ListItem, Table};

/// Parse Markdown text into a [`Document`].
///
/// Enabled extensions: pipe tables, footnotes, strikethrough, and task-list
/// markers. Parsing never fails; malformed syntax degrades to literal text
/// under CommonMark resolution rules.
pub fn parse(text: &str) -> Document {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut builder = TreeBuilder {
        events: Parser::new_ext(text, options),
    };
    Document::from_blocks(builder.blocks_until_end())
}

// ============================================================================
// Tree builder
// ============================================================================

struct TreeBuilder<I> {
    events: I,
}

impl<'a, I: Iterator<Item = Event<'a>>> TreeBuilder<I> {
    /// Build blocks until the current container closes.
    ///
    /// At the top level this runs until the event stream is exhausted; inside
    /// a container (blockquote, list item, footnote definition) it returns on
    /// the container's `End` event. Bare inline events are legal here: tight
    /// list items skip the paragraph wrapper, so their content arrives at
    /// block level and is collected into [`Block::Plain`] runs.
    fn blocks_until_end(&mut self) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut pending: Vec<Inline> = Vec::new();

        while let Some(event) = self.events.next() {
            match event {
                Event::Start(Tag::Paragraph) => {
                    flush_plain(&mut blocks, &mut pending);
                    blocks.push(Block::Paragraph(self.inlines_until_end()));
                }
                Event::Start(Tag::Heading { level, .. }) => {
                    flush_plain(&mut blocks, &mut pending);
                    blocks.push(Block::Heading {
                        level: level as u8,
                        content: self.inlines_until_end(),
                    });
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    flush_plain(&mut blocks, &mut pending);
                    blocks.push(Block::CodeBlock {
                        language: fence_language(&kind),
                        code: self.code_until_end(),
                    });
                }
                Event::Start(Tag::BlockQuote(_)) => {
                    flush_plain(&mut blocks, &mut pending);
                    blocks.push(Block::BlockQuote(self.blocks_until_end()));
                }
                Event::Start(Tag::List(start)) => {
                    flush_plain(&mut blocks, &mut pending);
                    blocks.push(Block::List {
                        start,
                        items: self.items_until_end(),
                    });
                }
                Event::Start(Tag::Table(alignments)) => {
                    flush_plain(&mut blocks, &mut pending);
                    blocks.push(Block::Table(self.table_until_end(alignments)));
                }
                Event::Start(Tag::FootnoteDefinition(label)) => {
                    flush_plain(&mut blocks, &mut pending);
                    blocks.push(Block::FootnoteDefinition {
                        label: label.to_string(),
                        content: self.blocks_until_end(),
                    });
                }
                Event::Start(Tag::HtmlBlock) => {
                    flush_plain(&mut blocks, &mut pending);
                    let html = self.raw_until_end();
                    if !html.is_empty() {
                        blocks.push(Block::Html(html));
                    }
                }
                Event::Start(
                    tag @ (Tag::Emphasis
                    | Tag::Strong
                    | Tag::Strikethrough
                    | Tag::Link { .. }
                    | Tag::Image { .. }),
                ) => {
                    if let Some(inline) = self.inline_event(Event::Start(tag)) {
                        pending.push(inline);
                    }
                }
                // Containers we don't model: consume the subtree as blocks
                // and splice the results into the current stream.
                Event::Start(_) => {
                    flush_plain(&mut blocks, &mut pending);
                    blocks.extend(self.blocks_until_end());
                }
                Event::Rule => {
                    flush_plain(&mut blocks, &mut pending);
                    blocks.push(Block::Rule);
                }
                Event::End(_) => break,
                other => {
                    if let Some(inline) = self.inline_event(other) {
                        pending.push(inline);
                    }
                }
            }
        }

        flush_plain(&mut blocks, &mut pending);
        blocks
    }

    /// Build inlines until the current container (paragraph, heading, table
    /// cell, inline span) closes.
    fn inlines_until_end(&mut self) -> Vec<Inline> {
        let mut inlines = Vec::new();
        while let Some(event) = self.events.next() {
            if matches!(event, Event::End(_)) {
                break;
            }
            if let Some(inline) = self.inline_event(event) {
                inlines.push(inline);
            }
        }
        inlines
    }

    /// Convert a single inline-level event, recursing into span containers.
    fn inline_event(&mut self, event: Event<'a>) -> Option<Inline> {
        match event {
            Event::Start(Tag::Emphasis) => Some(Inline::Emphasis(self.inlines_until_end())),
            Event::Start(Tag::Strong) => Some(Inline::Strong(self.inlines_until_end())),
            Event::Start(Tag::Strikethrough) => {
                Some(Inline::Strikethrough(self.inlines_until_end()))
            }
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) => Some(Inline::Link {
                href: dest_url.to_string(),
                title: title.to_string(),
                content: self.inlines_until_end(),
            }),
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => Some(Inline::Image {
                src: dest_url.to_string(),
                title: title.to_string(),
                alt: self.inlines_until_end(),
            }),
            Event::Text(text) => Some(Inline::Text(text.to_string())),
            Event::Code(code) => Some(Inline::Code(code.to_string())),
            Event::InlineHtml(html) | Event::Html(html) => Some(Inline::Html(html.to_string())),
            Event::FootnoteReference(label) => Some(Inline::FootnoteReference(label.to_string())),
            Event::SoftBreak => Some(Inline::SoftBreak),
            Event::HardBreak => Some(Inline::HardBreak),
            Event::TaskListMarker(checked) => Some(Inline::TaskMarker(checked)),
            _ => None,
        }
    }

    /// Collect code block text until the block closes.
    fn code_until_end(&mut self) -> String {
        let mut code = String::new();
        while let Some(event) = self.events.next() {
            match event {
                Event::Text(text) => code.push_str(&text),
                Event::End(_) => break,
                _ => {}
            }
        }
        code
    }

    /// Collect raw HTML text until the block closes.
    fn raw_until_end(&mut self) -> String {
        let mut html = String::new();
        while let Some(event) = self.events.next() {
            match event {
                Event::Html(chunk) | Event::Text(chunk) => html.push_str(&chunk),
                Event::End(_) => break,
                _ => {}
            }
        }
        html
    }

    /// Collect list items until the list closes.
    fn items_until_end(&mut self) -> Vec<ListItem> {
        let mut items = Vec::new();
        while let Some(event) = self.events.next() {
            match event {
                Event::Start(Tag::Item) => items.push(ListItem {
                    blocks: self.blocks_until_end(),
                }),
                Event::End(_) => break,
                _ => {}
            }
        }
        items
    }

    /// Collect a table until it closes.
    ///
    /// Head and row sections open their own containers, so their `End`
    /// events are tracked with a depth counter; cell contents are consumed
    /// recursively and never reach this loop.
    fn table_until_end(&mut self, alignments: Vec<pulldown_cmark::Alignment>) -> Table {
        let mut head: Vec<Vec<Inline>> = Vec::new();
        let mut rows: Vec<Vec<Vec<Inline>>> = Vec::new();
        let mut in_head = false;
        let mut depth = 0usize;

        while let Some(event) = self.events.next() {
            match event {
                Event::Start(Tag::TableHead) => {
                    in_head = true;
                    depth += 1;
                }
                Event::Start(Tag::TableRow) => {
                    rows.push(Vec::new());
                    depth += 1;
                }
                Event::Start(Tag::TableCell) => {
                    let cell = self.inlines_until_end();
                    if in_head {
                        head.push(cell);
                    } else if let Some(row) = rows.last_mut() {
                        row.push(cell);
                    }
                }
                Event::End(_) if depth > 0 => {
                    depth -= 1;
                    in_head = false;
                }
                Event::End(_) => break,
                _ => {}
            }
        }

        Table {
            alignments: alignments.into_iter().map(convert_alignment).collect(),
            head,
            rows,
        }
    }
}

/// Flush accumulated bare inlines as a [`Block::Plain`].
fn flush_plain(blocks: &mut Vec<Block>, pending: &mut Vec<Inline>) {
    if !pending.is_empty() {
        blocks.push(Block::Plain(std::mem::take(pending)));
    }
}

/// Extract the language from a fence info string ("rust", "python,no-run").
fn fence_language(kind: &CodeBlockKind) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => {
            let lang = info.split([',', ' ']).next().unwrap_or("").trim();
            if lang.is_empty() {
                None
            } else {
                Some(lang.to_string())
            }
        }
        CodeBlockKind::Indented => None,
    }
}

fn convert_alignment(alignment: pulldown_cmark::Alignment) -> Alignment {
    match alignment {
        pulldown_cmark::Alignment::None => Alignment::None,
        pulldown_cmark::Alignment::Left => Alignment::Left,
        pulldown_cmark::Alignment::Center => Alignment::Center,
        pulldown_cmark::Alignment::Right => Alignment::Right,
    }
}

// ============================================================================
// Tests
// ============================================================================
