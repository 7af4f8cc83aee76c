//! # bindery
//!
//! A fast, lightweight library for converting flat Markdown documents into
//! structured EPUB ebooks.
//!
//! ## Features
//!
//! - CommonMark parsing with tables, footnotes, strikethrough, and task lists
//! - Automatic chapter segmentation from heading structure
//! - Heuristic language labels for untagged code blocks
//! - EPUB 3 output with an EPUB 2 NCX for older readers, assembled in memory
//!
//! ## Quick Start
//!
//! ```no_run
//! use bindery::{BookMeta, convert};
//!
//! let markdown = std::fs::read_to_string("notes.md")?;
//! let meta = BookMeta::new("Field Notes")
//!     .with_author("R. Author")
//!     .with_language("en");
//!
//! let package = convert(&markdown, &meta, None)?;
//! std::fs::write(&package.file_name, &package.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Working with the pipeline
//!
//! The stages behind [`convert`] are public and can be run individually:
//!
//! ```
//! use bindery::{markdown, outline, segment};
//!
//! let doc = markdown::parse("# One\n\nhello\n\n# Two\n\nworld");
//! let outline = outline::extract(&doc);
//! let chapters = segment::segment(&doc, &outline, &Default::default());
//!
//! assert_eq!(outline.headings().len(), 2);
//! assert_eq!(chapters[0].title, "One");
//! assert_eq!(chapters[1].title, "Two");
//! ```

pub mod classify;
pub mod convert;
pub mod epub;
pub mod error;
pub mod markdown;
pub mod outline;
pub mod segment;
pub(crate) mod util;

pub use convert::{BookMeta, CoverImage, Package, convert, convert_with_options};
pub use error::{Error, Result};
pub use segment::{PreamblePolicy, SegmentOptions};
pub use util::decode_text;
