//! Markdown parsing and XHTML rendering.
//!
//! This module turns raw Markdown text into an owned tree of block and inline
//! nodes, and renders that tree back out as XHTML fragments for packaging:
//!
//! - [`parse`]: Markdown text → [`Document`] (delegates tokenization to
//!   `pulldown-cmark`, owns the event → tree builder)
//! - [`render_blocks`]: block tree → XHTML body fragment
//! - [`synthesize_chapter_document`]: wraps a fragment in a complete XHTML
//!   document shell
//! - [`slugify`]: GitHub-style slug generation for file names and anchors
//!
//! The tree is deliberately flat at the top: a [`Document`] is an ordered
//! `Vec<Block>`, and downstream stages (outlining, chapter segmentation)
//! address blocks by their index in that vector. Blocks are immutable once
//! parsed; anything derived from them (heading anchors, language tags) is
//! carried in side tables keyed by block index.

mod parser;
mod slugify;
mod xhtml;

pub use parser::parse;
pub use slugify::slugify;
pub use xhtml::{escape_xml, inline_text, render_blocks, synthesize_chapter_document};

/// A parsed Markdown document: an ordered sequence of top-level blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub(crate) fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// All top-level blocks in document order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Get a top-level block by index.
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Number of top-level blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True if the document has no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// A block-level element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A regular paragraph.
    Paragraph(Vec<Inline>),
    /// An inline run without a paragraph wrapper (tight list items).
    Plain(Vec<Inline>),
    /// A heading with level 1-6.
    Heading { level: u8, content: Vec<Inline> },
    /// A fenced or indented code block. `language` is the first token of the
    /// fence info string, if any.
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    /// A blockquote containing nested blocks.
    BlockQuote(Vec<Block>),
    /// An ordered (`start` is `Some`) or unordered (`None`) list.
    List {
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    /// A pipe table.
    Table(Table),
    /// A thematic break.
    Rule,
    /// A raw HTML block, passed through unmodified.
    Html(String),
    /// A footnote definition (`[^label]: ...`).
    FootnoteDefinition { label: String, content: Vec<Block> },
}

impl Block {
    /// Heading level (1-6) if this block is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Block::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }
}

/// One item of an ordered or unordered list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItem {
    pub blocks: Vec<Block>,
}

/// A pipe table: one header row plus body rows of inline cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub alignments: Vec<Alignment>,
    pub head: Vec<Vec<Inline>>,
    pub rows: Vec<Vec<Vec<Inline>>>,
}

/// Column alignment from a table's delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

/// An inline-level element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link {
        href: String,
        title: String,
        content: Vec<Inline>,
    },
    Image {
        src: String,
        title: String,
        alt: Vec<Inline>,
    },
    /// A footnote reference (`[^label]`).
    FootnoteReference(String),
    /// Raw inline HTML, passed through unmodified.
    Html(String),
    SoftBreak,
    HardBreak,
    /// A task-list checkbox marker (`- [x]` / `- [ ]`).
    TaskMarker(bool),
}
