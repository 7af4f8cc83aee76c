//! Chapter segmentation over the flat block stream.
//!
//! Chapters are contiguous index ranges into the document's block vector,
//! split at boundary headings: level 1 when the document has any, level 2
//! otherwise. Documents with no boundary candidates collapse to a single
//! chapter titled "Body". Content ahead of the first boundary follows the
//! configured [`PreamblePolicy`].

use std::ops::Range;

use crate::markdown::Document;
use crate::outline::Outline;

/// Title used for the fallback chapter and the implicit preamble chapter.
pub const DEFAULT_CHAPTER_TITLE: &str = "Body";

/// One chapter: a disjoint, contiguous span of the document's blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Chapter {
    /// Zero-based position in the chapter list (drives output file names).
    pub index: usize,
    /// Chapter title, verbatim from the boundary heading's text.
    pub title: String,
    /// Block span, always non-empty.
    pub blocks: Range<usize>,
}

/// What to do with content that precedes the first boundary heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreamblePolicy {
    /// Drop it from the package entirely.
    #[default]
    Discard,
    /// Collect it into an implicit first chapter titled "Body".
    LeadingChapter,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentOptions {
    pub preamble: PreamblePolicy,
}

/// Partition a document into chapters at boundary headings.
///
/// Prefers level-1 headings as boundaries, falling back to level 2 when the
/// document has no level-1 headings at all. A chapter runs from its boundary
/// heading (inclusive) to the next heading at or above the boundary level;
/// lower headings stay nested inside. Documents whose outline offers no
/// boundary candidates become a single whole-document chapter.
pub fn segment(document: &Document, outline: &Outline, options: &SegmentOptions) -> Vec<Chapter> {
    let boundary = match boundary_level(outline) {
        Some(level) => level,
        None => return whole_document(document),
    };

    let mut chapters = Vec::new();

    let first_start = outline
        .headings()
        .iter()
        .find(|h| h.level == boundary)
        .map(|h| h.block)
        .unwrap_or(0);
    if first_start > 0 && options.preamble == PreamblePolicy::LeadingChapter {
        chapters.push(Chapter {
            index: 0,
            title: DEFAULT_CHAPTER_TITLE.to_string(),
            blocks: 0..first_start,
        });
    }

    for heading in outline.headings().iter().filter(|h| h.level == boundary) {
        let end = outline
            .headings()
            .iter()
            .find(|other| other.block > heading.block && other.level <= boundary)
            .map(|other| other.block)
            .unwrap_or(document.len());

        chapters.push(Chapter {
            index: chapters.len(),
            title: heading.title.clone(),
            blocks: heading.block..end,
        });
    }

    chapters
}

/// `Some(1)` if any level-1 heading exists, `Some(2)` if only level-2 and
/// below, `None` when nothing can serve as a boundary.
fn boundary_level(outline: &Outline) -> Option<u8> {
    for level in [1u8, 2] {
        if outline.headings().iter().any(|h| h.level == level) {
            return Some(level);
        }
    }
    None
}

fn whole_document(document: &Document) -> Vec<Chapter> {
    if document.is_empty() {
        return Vec::new();
    }
    vec![Chapter {
        index: 0,
        title: DEFAULT_CHAPTER_TITLE.to_string(),
        blocks: 0..document.len(),
    }]
}
