//! Benchmarks for the Markdown to EPUB pipeline.
//!
//! Run with: cargo bench

use std::fmt::Write;

use criterion::{Criterion, criterion_group, criterion_main};

use bindery::markdown::parse;
use bindery::outline::extract;
use bindery::segment::segment;
use bindery::{BookMeta, SegmentOptions, convert};

/// Build a synthetic book with `chapters` top-level chapters. Each chapter
/// carries the block shapes the renderer has to handle: paragraphs with
/// inline markup, a subsection, an untagged code fence (exercises the
/// classifier), a list, and a table.
fn sample_book(chapters: usize) -> String {
    let mut text = String::new();
    for i in 0..chapters {
        writeln!(text, "# Chapter {i}\n").unwrap();
        for p in 0..4 {
            writeln!(
                text,
                "Paragraph {p} of chapter {i} with *emphasis*, **strong text**, \
                 `inline code`, and a [link](https://example.com/{i}/{p}).\n"
            )
            .unwrap();
        }
        writeln!(text, "## Section {i}.1\n").unwrap();
        writeln!(
            text,
            "```\ndef measure(values):\n    return sum(values) / len(values)\n```\n"
        )
        .unwrap();
        writeln!(text, "- first point\n- second point\n- third point\n").unwrap();
        writeln!(
            text,
            "| Name | Value |\n| --- | ---: |\n| alpha | 1 |\n| beta | 2 |\n"
        )
        .unwrap();
    }
    text
}

fn sample_meta() -> BookMeta {
    BookMeta::new("Benchmark Book")
        .with_author("Bench Author")
        .with_language("en")
}

// ============================================================================
// Stage Benchmarks
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let text = sample_book(32);

    c.bench_function("parse", |b| {
        b.iter(|| parse(&text));
    });
}

fn bench_outline_and_segment(c: &mut Criterion) {
    let doc = parse(&sample_book(32));

    c.bench_function("outline_and_segment", |b| {
        b.iter(|| {
            let outline = extract(&doc);
            segment(&doc, &outline, &SegmentOptions::default())
        });
    });
}

// ============================================================================
// Full Pipeline Benchmarks
// ============================================================================

fn bench_convert_small(c: &mut Criterion) {
    let text = sample_book(4);
    let meta = sample_meta();

    c.bench_function("convert_small", |b| {
        b.iter(|| convert(&text, &meta, None).unwrap());
    });
}

fn bench_convert_large(c: &mut Criterion) {
    let text = sample_book(128);
    let meta = sample_meta();

    c.bench_function("convert_large", |b| {
        b.iter(|| convert(&text, &meta, None).unwrap());
    });
}

criterion_group!(
    benches,
    // Stages
    bench_parse,
    bench_outline_and_segment,
    // Full pipeline
    bench_convert_small,
    bench_convert_large,
);
criterion_main!(benches);
