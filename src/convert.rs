//! The conversion boundary: markup text and metadata in, package bytes out.
//!
//! This is the surface a shell (CLI, service handler) calls. Metadata is
//! validated before any parsing begins, then the pipeline runs strictly in
//! order: parse, extract headings, segment chapters, assemble the package.
//! The whole conversion is pure and synchronous; callers may simply retry the
//! call on failure.

use crate::epub;
use crate::error::{Error, Result};
use crate::markdown::{self, slugify};
use crate::outline;
use crate::segment::{self, SegmentOptions};

/// Book-level metadata, supplied once per conversion.
///
/// All three fields must be non-empty after trimming; [`convert`] rejects
/// anything else before touching the markup.
#[derive(Debug, Clone, Default)]
pub struct BookMeta {
    pub title: String,
    pub author: String,
    pub language: String,
}

impl BookMeta {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Cover image bytes plus a normalized file-extension.
///
/// The extension decides both the stored file name (`images/cover.<ext>`)
/// and the declared media type: png and gif are kept, anything else is
/// treated as jpeg. This mirrors the extension heuristic of typical upload
/// shells; no content sniffing happens here.
#[derive(Debug, Clone)]
pub struct CoverImage {
    data: Vec<u8>,
    extension: String,
}

impl CoverImage {
    pub fn new(data: Vec<u8>, extension_hint: &str) -> Self {
        let extension = match extension_hint
            .trim_start_matches('.')
            .to_ascii_lowercase()
            .as_str()
        {
            "png" => "png",
            "gif" => "gif",
            _ => "jpg",
        };
        Self {
            data,
            extension: extension.to_string(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Normalized extension: `png`, `gif`, or `jpg`.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn media_type(&self) -> &'static str {
        match self.extension.as_str() {
            "png" => "image/png",
            "gif" => "image/gif",
            _ => "image/jpeg",
        }
    }
}

/// A finished conversion: the package bytes and a suggested file name.
#[derive(Debug, Clone)]
pub struct Package {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

/// Convert Markdown text to an EPUB package with default segmentation.
///
/// # Example
///
/// ```
/// use bindery::{BookMeta, convert};
///
/// let meta = BookMeta::new("Field Notes")
///     .with_author("R. Author")
///     .with_language("en");
/// let package = convert("# Day One\n\nIt rained.", &meta, None)?;
/// assert_eq!(package.file_name, "field-notes.epub");
/// # Ok::<(), bindery::Error>(())
/// ```
pub fn convert(text: &str, meta: &BookMeta, cover: Option<&CoverImage>) -> Result<Package> {
    convert_with_options(text, meta, cover, &SegmentOptions::default())
}

/// Convert with explicit segmentation options (e.g. keeping preamble content
/// as a leading chapter).
pub fn convert_with_options(
    text: &str,
    meta: &BookMeta,
    cover: Option<&CoverImage>,
    options: &SegmentOptions,
) -> Result<Package> {
    validate(meta)?;

    let document = markdown::parse(text);
    log::debug!("parsed {} top-level blocks", document.len());

    let outline = outline::extract(&document);
    log::debug!("extracted {} headings", outline.len());

    let chapters = segment::segment(&document, &outline, options);
    log::debug!("segmented into {} chapters", chapters.len());

    let bytes = match epub::assemble(&document, &outline, &chapters, meta, cover) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::error!("{err}");
            return Err(err);
        }
    };

    Ok(Package {
        bytes,
        file_name: suggested_file_name(&meta.title),
    })
}

fn validate(meta: &BookMeta) -> Result<()> {
    if meta.title.trim().is_empty() {
        return Err(Error::MissingMetadata("title"));
    }
    if meta.author.trim().is_empty() {
        return Err(Error::MissingMetadata("author"));
    }
    if meta.language.trim().is_empty() {
        return Err(Error::MissingMetadata("language"));
    }
    Ok(())
}

/// Slugified title plus `.epub`, falling back to `book.epub` for titles that
/// slug to nothing.
fn suggested_file_name(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        "book.epub".to_string()
    } else {
        format!("{}.epub", slug)
    }
}
