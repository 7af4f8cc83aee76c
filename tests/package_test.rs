//! Package container tests: ZIP discipline and OPF/navigation consistency.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::{CompressionMethod, ZipArchive};

use bindery::{BookMeta, CoverImage, convert};

const MARKDOWN: &str = "# First\n\nalpha\n\n## Inner\n\nbeta\n\n# Second\n\ngamma\n";

fn build_package(cover: Option<&CoverImage>) -> Vec<u8> {
    let meta = BookMeta::new("Container Book")
        .with_author("Tester")
        .with_language("en");
    convert(MARKDOWN, &meta, cover)
        .expect("conversion should succeed")
        .bytes
}

fn open(bytes: &[u8]) -> ZipArchive<Cursor<Vec<u8>>> {
    ZipArchive::new(Cursor::new(bytes.to_vec())).expect("package should be a valid zip")
}

fn read_entry(bytes: &[u8], name: &str) -> String {
    let mut archive = open(bytes);
    let mut file = archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("missing entry {name}"));
    let mut out = String::new();
    file.read_to_string(&mut out).expect("entry should be UTF-8");
    out
}

#[test]
fn test_mimetype_is_first_and_stored() {
    let bytes = build_package(None);
    let mut archive = open(&bytes);

    let mut first = archive.by_index(0).expect("first entry");
    assert_eq!(first.name(), "mimetype");
    assert_eq!(first.compression(), CompressionMethod::Stored);

    let mut contents = String::new();
    first.read_to_string(&mut contents).expect("mimetype text");
    assert_eq!(contents, "application/epub+zip");
}

#[test]
fn test_remaining_entries_are_deflated() {
    let bytes = build_package(None);
    let mut archive = open(&bytes);

    for i in 1..archive.len() {
        let entry = archive.by_index(i).expect("entry");
        assert_eq!(
            entry.compression(),
            CompressionMethod::Deflated,
            "entry {} should be deflated",
            entry.name()
        );
    }
}

#[test]
fn test_container_xml_points_at_package_document() {
    let bytes = build_package(None);
    let container = read_entry(&bytes, "META-INF/container.xml");

    assert_eq!(rootfile_path(&container), "OEBPS/content.opf");
    let names: Vec<String> = {
        let mut archive = open(&bytes);
        (0..archive.len())
            .map(|i| archive.by_index(i).expect("entry").name().to_string())
            .collect()
    };
    assert!(names.contains(&"OEBPS/content.opf".to_string()));
}

#[test]
fn test_spine_matches_navigation_order() {
    let bytes = build_package(None);
    let opf = read_entry(&bytes, "OEBPS/content.opf");
    let nav = read_entry(&bytes, "OEBPS/nav.xhtml");

    let idrefs = spine_idrefs(&opf);
    assert_eq!(idrefs.first().map(String::as_str), Some("nav"));

    let manifest = manifest_hrefs_by_id(&opf);
    let spine_chapter_hrefs: Vec<&str> = idrefs[1..]
        .iter()
        .map(|id| manifest.get(id).expect("spine idref must be in manifest").as_str())
        .collect();

    assert_eq!(spine_chapter_hrefs, nav_link_hrefs(&nav));
    assert_eq!(spine_chapter_hrefs, vec!["chapter_0.xhtml", "chapter_1.xhtml"]);
}

#[test]
fn test_ncx_mirrors_navigation() {
    let bytes = build_package(None);
    let nav = read_entry(&bytes, "OEBPS/nav.xhtml");
    let ncx = read_entry(&bytes, "OEBPS/toc.ncx");

    for href in nav_link_hrefs(&nav) {
        assert!(
            ncx.contains(&format!(r#"<content src="{href}"/>"#)),
            "ncx should reference {href}"
        );
    }
    assert!(ncx.contains(r#"playOrder="1""#));
    assert!(ncx.contains(r#"playOrder="2""#));
}

#[test]
fn test_manifest_covers_all_package_entries() {
    let cover = CoverImage::new(vec![1, 2, 3], "png");
    let bytes = build_package(Some(&cover));
    let opf = read_entry(&bytes, "OEBPS/content.opf");

    let manifest: Vec<String> = manifest_hrefs_by_id(&opf).into_values().collect();

    let mut archive = open(&bytes);
    for i in 0..archive.len() {
        let name = archive.by_index(i).expect("entry").name().to_string();
        // The package document describes everything under OEBPS/ except itself.
        let Some(href) = name.strip_prefix("OEBPS/") else {
            continue;
        };
        if href == "content.opf" {
            continue;
        }
        assert!(
            manifest.iter().any(|m| m == href),
            "manifest should list {href}"
        );
    }
}

#[test]
fn test_identifier_is_minted_uuid_urn() {
    let bytes = build_package(None);
    let opf = read_entry(&bytes, "OEBPS/content.opf");
    let ncx = read_entry(&bytes, "OEBPS/toc.ncx");

    let identifier = identifier_text(&opf);
    assert!(identifier.starts_with("urn:uuid:"));
    assert_eq!(identifier.len(), "urn:uuid:".len() + 36);

    // NCX must agree with the package document.
    assert!(ncx.contains(&format!(r#"<meta name="dtb:uid" content="{identifier}"/>"#)));
}

#[test]
fn test_dcterms_modified_timestamp_shape() {
    let bytes = build_package(None);
    let opf = read_entry(&bytes, "OEBPS/content.opf");

    let start = opf
        .find(r#"<meta property="dcterms:modified">"#)
        .expect("dcterms:modified present");
    let rest = &opf[start + r#"<meta property="dcterms:modified">"#.len()..];
    let end = rest.find("</meta>").expect("closing tag");
    let stamp = &rest[..end];

    assert_eq!(stamp.len(), 20, "expected CCYY-MM-DDThh:mm:ssZ, got {stamp}");
    assert_eq!(&stamp[4..5], "-");
    assert_eq!(&stamp[10..11], "T");
    assert!(stamp.ends_with('Z'));
}

// ============================================================================
// XML pulls
// ============================================================================

fn rootfile_path(container: &str) -> String {
    let mut reader = Reader::from_str(container);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"rootfile" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        return String::from_utf8(attr.value.to_vec()).expect("UTF-8 path");
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => panic!("container.xml parse error: {e}"),
            _ => {}
        }
    }
    panic!("no rootfile in container.xml");
}

fn spine_idrefs(opf: &str) -> Vec<String> {
    let mut reader = Reader::from_str(opf);
    reader.config_mut().trim_text(true);
    let mut idrefs = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"itemref" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"idref" {
                        idrefs.push(String::from_utf8(attr.value.to_vec()).expect("UTF-8 idref"));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => panic!("OPF parse error: {e}"),
            _ => {}
        }
    }
    idrefs
}

fn manifest_hrefs_by_id(opf: &str) -> HashMap<String, String> {
    let mut reader = Reader::from_str(opf);
    reader.config_mut().trim_text(true);
    let mut items = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"item" => {
                let mut id = None;
                let mut href = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"id" => id = Some(String::from_utf8_lossy(&attr.value).into_owned()),
                        b"href" => href = Some(String::from_utf8_lossy(&attr.value).into_owned()),
                        _ => {}
                    }
                }
                if let (Some(id), Some(href)) = (id, href) {
                    items.insert(id, href);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => panic!("OPF parse error: {e}"),
            _ => {}
        }
    }
    items
}

fn nav_link_hrefs(nav: &str) -> Vec<String> {
    let mut reader = Reader::from_str(nav);
    reader.config_mut().trim_text(true);
    let mut hrefs = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"a" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"href" {
                        hrefs.push(String::from_utf8_lossy(&attr.value).into_owned());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => panic!("nav parse error: {e}"),
            _ => {}
        }
    }
    hrefs
}

fn identifier_text(opf: &str) -> String {
    let mut reader = Reader::from_str(opf);
    reader.config_mut().trim_text(true);
    let mut in_identifier = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"dc:identifier" => in_identifier = true,
            Ok(Event::Text(e)) if in_identifier => {
                return String::from_utf8_lossy(e.as_ref()).into_owned();
            }
            Ok(Event::Eof) => break,
            Err(e) => panic!("OPF parse error: {e}"),
            _ => {}
        }
    }
    panic!("no dc:identifier in OPF");
}
