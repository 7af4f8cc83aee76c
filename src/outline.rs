//! Heading extraction and anchor assignment.
//!
//! Walks a parsed document's top-level blocks and records every heading with
//! a synthetic anchor id (`heading_<n>`, zero-based in document order, never
//! reused even for identical titles). Ids live in an id-by-block-index lookup
//! owned by the [`Outline`]; parsed blocks are never mutated. Headings nested
//! inside containers (e.g. blockquotes) are rendered but do not participate
//! in the outline.

use std::collections::HashMap;

use crate::markdown::{Block, Document, inline_text};

/// One extracted heading, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct HeadingRecord {
    /// Heading level, 1-6.
    pub level: u8,
    /// Plain text of the heading, whitespace-normalized (may be empty).
    pub title: String,
    /// Anchor id, unique within the document.
    pub id: String,
    /// Index of the heading's block in the document.
    pub block: usize,
}

/// All headings of a document plus the anchor lookup used at render time.
#[derive(Debug, Clone, Default)]
pub struct Outline {
    headings: Vec<HeadingRecord>,
    ids: HashMap<usize, String>,
}

impl Outline {
    /// Extracted headings in document order.
    pub fn headings(&self) -> &[HeadingRecord] {
        &self.headings
    }

    /// Anchor id for the block at `block_index`, if that block is a heading.
    pub fn id_for(&self, block_index: usize) -> Option<&str> {
        self.ids.get(&block_index).map(String::as_str)
    }

    /// The full id-by-block-index lookup, as consumed by the XHTML renderer.
    pub fn ids(&self) -> &HashMap<usize, String> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.headings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }
}

/// Extract every top-level heading from a parsed document.
pub fn extract(document: &Document) -> Outline {
    let mut headings = Vec::new();
    let mut ids = HashMap::new();

    for (index, block) in document.blocks().iter().enumerate() {
        let Block::Heading { level, content } = block else {
            continue;
        };

        let id = format!("heading_{}", headings.len());
        ids.insert(index, id.clone());
        headings.push(HeadingRecord {
            level: *level,
            title: inline_text(content),
            id,
            block: index,
        });
    }

    Outline { headings, ids }
}
