//! EPUB container serialization.
//!
//! Builds the whole package in an in-memory buffer: `mimetype` first and
//! uncompressed, `META-INF/container.xml`, the EPUB 3 package document, the
//! EPUB 3 navigation document plus an EPUB 2 NCX, the shared stylesheet, one
//! XHTML document per chapter, and the optional cover image. Navigation, NCX,
//! and spine are all derived from one chapter-document list built here once,
//! so they cannot drift out of agreement.

use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::convert::{BookMeta, CoverImage};
use crate::error::Result;
use crate::markdown::{Document, render_blocks, synthesize_chapter_document};
use crate::outline::Outline;
use crate::segment::Chapter;
use crate::util::{format_utc_timestamp, time_seed_nanos};

use super::css::BOOK_CSS;

const STYLESHEET_HREF: &str = "style/book.css";

/// One rendered chapter document, the unit the manifest, spine, navigation
/// document, and NCX all iterate over.
struct ChapterDoc {
    id: String,
    href: String,
    title: String,
    document: String,
}

struct ManifestItem {
    id: String,
    href: String,
    media_type: String,
    properties: Option<&'static str>,
}

/// Assemble a complete EPUB package in memory.
///
/// The returned bytes are the finished container; nothing is written anywhere
/// on failure.
pub fn assemble(
    document: &Document,
    outline: &Outline,
    chapters: &[Chapter],
    meta: &BookMeta,
    cover: Option<&CoverImage>,
) -> Result<Vec<u8>> {
    let chapter_docs: Vec<ChapterDoc> = chapters
        .iter()
        .map(|chapter| {
            let body = render_blocks(
                &document.blocks()[chapter.blocks.clone()],
                chapter.blocks.start,
                outline.ids(),
            );
            ChapterDoc {
                id: format!("chapter_{}", chapter.index),
                href: format!("chapter_{}.xhtml", chapter.index),
                title: chapter.title.clone(),
                document: synthesize_chapter_document(&chapter.title, &body, Some(STYLESHEET_HREF)),
            }
        })
        .collect();

    log::debug!(
        "assembling package: {} chapters, cover: {}",
        chapter_docs.len(),
        cover.is_some()
    );

    let mut manifest = vec![
        ManifestItem {
            id: "nav".to_string(),
            href: "nav.xhtml".to_string(),
            media_type: "application/xhtml+xml".to_string(),
            properties: Some("nav"),
        },
        ManifestItem {
            id: "stylesheet".to_string(),
            href: STYLESHEET_HREF.to_string(),
            media_type: "text/css".to_string(),
            properties: None,
        },
    ];
    for doc in &chapter_docs {
        manifest.push(ManifestItem {
            id: doc.id.clone(),
            href: doc.href.clone(),
            media_type: "application/xhtml+xml".to_string(),
            properties: None,
        });
    }
    if let Some(cover) = cover {
        manifest.push(ManifestItem {
            id: "cover-image".to_string(),
            href: format!("images/cover.{}", cover.extension()),
            media_type: cover.media_type().to_string(),
            properties: Some("cover-image"),
        });
    }

    // The spine is the navigation document followed by the chapters, in the
    // same relative order the navigation resources list them.
    let spine_refs: Vec<&str> = std::iter::once("nav")
        .chain(chapter_docs.iter().map(|doc| doc.id.as_str()))
        .collect();

    let identifier = format!("urn:uuid:{}", uuid_v4());
    let modified = format_utc_timestamp(time_seed_nanos() / 1_000_000_000);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    // 1. Write mimetype (must be first, uncompressed)
    zip.start_file("mimetype", stored)?;
    zip.write_all(b"application/epub+zip")?;

    // 2. Write META-INF/container.xml
    zip.start_file("META-INF/container.xml", deflated)?;
    zip.write_all(CONTAINER_XML)?;

    // 3. Write content.opf
    let opf = generate_opf(meta, &identifier, &modified, &manifest, &spine_refs, cover.is_some());
    zip.start_file("OEBPS/content.opf", deflated)?;
    zip.write_all(opf.as_bytes())?;

    // 4. Write navigation resources
    let nav = generate_nav(&meta.title, &chapter_docs);
    zip.start_file("OEBPS/nav.xhtml", deflated)?;
    zip.write_all(nav.as_bytes())?;

    let ncx = generate_ncx(&meta.title, &identifier, &chapter_docs);
    zip.start_file("OEBPS/toc.ncx", deflated)?;
    zip.write_all(ncx.as_bytes())?;

    // 5. Write the shared stylesheet
    zip.start_file(format!("OEBPS/{}", STYLESHEET_HREF), deflated)?;
    zip.write_all(BOOK_CSS.as_bytes())?;

    // 6. Write chapter documents
    for doc in &chapter_docs {
        zip.start_file(format!("OEBPS/{}", doc.href), deflated)?;
        zip.write_all(doc.document.as_bytes())?;
    }

    // 7. Write the cover image
    if let Some(cover) = cover {
        zip.start_file(
            format!("OEBPS/images/cover.{}", cover.extension()),
            deflated,
        )?;
        zip.write_all(cover.data())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

const CONTAINER_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Generate the EPUB 3 package document.
fn generate_opf(
    meta: &BookMeta,
    identifier: &str,
    modified: &str,
    manifest: &[ManifestItem],
    spine_refs: &[&str],
    has_cover: bool,
) -> String {
    let mut opf = String::new();

    opf.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
"#,
    );

    opf.push_str(&format!(
        "    <dc:title>{}</dc:title>\n",
        escape_xml(&meta.title)
    ));

    opf.push_str(&format!(
        "    <dc:creator>{}</dc:creator>\n",
        escape_xml(&meta.author)
    ));

    let language = if meta.language.is_empty() {
        "en"
    } else {
        &meta.language
    };
    opf.push_str(&format!(
        "    <dc:language>{}</dc:language>\n",
        escape_xml(language)
    ));

    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\">{}</dc:identifier>\n",
        escape_xml(identifier)
    ));

    // dcterms:modified (required for EPUB3)
    opf.push_str(&format!(
        "    <meta property=\"dcterms:modified\">{}</meta>\n",
        escape_xml(modified)
    ));

    // Cover image meta for EPUB 2 readers
    if has_cover {
        opf.push_str("    <meta name=\"cover\" content=\"cover-image\"/>\n");
    }

    opf.push_str("  </metadata>\n  <manifest>\n");

    opf.push_str(
        "    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n",
    );

    for item in manifest {
        match item.properties {
            Some(properties) => opf.push_str(&format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"{}\" properties=\"{}\"/>\n",
                escape_xml(&item.id),
                escape_xml(&item.href),
                escape_xml(&item.media_type),
                properties
            )),
            None => opf.push_str(&format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"/>\n",
                escape_xml(&item.id),
                escape_xml(&item.href),
                escape_xml(&item.media_type)
            )),
        }
    }

    opf.push_str("  </manifest>\n  <spine toc=\"ncx\">\n");

    for idref in spine_refs {
        opf.push_str(&format!(
            "    <itemref idref=\"{}\"/>\n",
            escape_xml(idref)
        ));
    }

    opf.push_str("  </spine>\n</package>\n");
    opf
}

/// Generate the EPUB 3 navigation document (`nav.xhtml`).
fn generate_nav(title: &str, chapters: &[ChapterDoc]) -> String {
    let mut nav = String::new();

    nav.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
  <title>"#,
    );
    nav.push_str(&escape_xml(title));
    nav.push_str(
        r#"</title>
</head>
<body>
  <nav epub:type="toc" id="toc">
    <h1>"#,
    );
    nav.push_str(&escape_xml(title));
    nav.push_str("</h1>\n    <ol>\n");

    for chapter in chapters {
        nav.push_str(&format!(
            "      <li><a href=\"{}\">{}</a></li>\n",
            escape_xml(&chapter.href),
            escape_xml(&chapter.title)
        ));
    }

    nav.push_str("    </ol>\n  </nav>\n</body>\n</html>\n");
    nav
}

/// Generate the EPUB 2 table of contents (`toc.ncx`).
fn generate_ncx(title: &str, identifier: &str, chapters: &[ChapterDoc]) -> String {
    let mut ncx = String::new();

    ncx.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content=""#,
    );
    ncx.push_str(&escape_xml(identifier));
    ncx.push_str(
        r#""/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle>
    <text>"#,
    );
    ncx.push_str(&escape_xml(title));
    ncx.push_str(
        r#"</text>
  </docTitle>
  <navMap>
"#,
    );

    for (i, chapter) in chapters.iter().enumerate() {
        let play_order = i + 1;
        ncx.push_str(&format!(
            "    <navPoint id=\"navPoint-{}\" playOrder=\"{}\">\n",
            play_order, play_order
        ));
        ncx.push_str(&format!(
            "      <navLabel><text>{}</text></navLabel>\n",
            escape_xml(&chapter.title)
        ));
        ncx.push_str(&format!(
            "      <content src=\"{}\"/>\n",
            escape_xml(&chapter.href)
        ));
        ncx.push_str("    </navPoint>\n");
    }

    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

/// Escape XML special characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Generate a simple UUID v4 (random)
fn uuid_v4() -> String {
    // Simple PRNG for UUID generation (not cryptographically secure, but fine for identifiers)
    let mut state = time_seed_nanos();
    let mut bytes = [0u8; 16];
    for byte in &mut bytes {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        *byte = (state >> 33) as u8;
    }

    // Set version (4) and variant (2)
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0],
        bytes[1],
        bytes[2],
        bytes[3],
        bytes[4],
        bytes[5],
        bytes[6],
        bytes[7],
        bytes[8],
        bytes[9],
        bytes[10],
        bytes[11],
        bytes[12],
        bytes[13],
        bytes[14],
        bytes[15]
    )
}
