//! Quote Anchoring Benchmarks
//!
//! Re-anchoring cost for text quotes on chapter-sized documents, with the
//! quote left in place and with the text shifted by an edit.
//!
//! Run with: `cargo bench --bench quote_anchoring`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use text_anchoring::anchors::{Anchor, PositionHint, TextPositionAnchor, TextQuoteAnchor};
use text_anchoring::{describe, resolve, AnchorContext, Selector, TextSpace};

const SENTENCE: &str = "The quick brown fox jumps over the lazy dog. ";

/// Build an XHTML chapter with `paragraphs` paragraphs of filler text and a
/// marked sentence in the middle
fn create_chapter(paragraphs: usize, edited: bool) -> String {
    let mut xml = String::from("<body>");
    for i in 0..paragraphs {
        xml.push_str("<p>");
        if edited && i == 0 {
            xml.push_str("An inserted opening line. ");
        }
        if i == paragraphs / 2 {
            xml.push_str("Somewhere in the middle a <em>remarkable</em> passage appears. ");
        }
        for _ in 0..4 {
            xml.push_str(SENTENCE);
        }
        xml.push_str("</p>");
    }
    xml.push_str("</body>");
    xml
}

/// Capture the marked passage in the unedited chapter
fn capture_selectors(paragraphs: usize) -> Vec<Selector> {
    let xml = create_chapter(paragraphs, false);
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let space = TextSpace::new(&doc, doc.root_element().id());
    let ctx = AnchorContext::new(space);

    let start = space.text().find("a remarkable passage").unwrap();
    let start = space.text()[..start].encode_utf16().count();
    let range = TextPositionAnchor::new(start, start + 20)
        .unwrap()
        .to_range(&ctx)
        .unwrap();
    describe(&ctx, &range).unwrap()
}

/// Benchmark quote resolution in chapters of increasing size
fn bench_quote_to_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("quote_to_range");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(30);

    for paragraphs in [10, 50, 200] {
        let selectors = capture_selectors(paragraphs);
        let quote = selectors
            .iter()
            .find(|s| matches!(s, Selector::TextQuote { .. }))
            .unwrap()
            .clone();
        let hint = selectors.iter().find_map(|s| match s {
            Selector::TextPosition { start, end } => Some(PositionHint {
                start: *start,
                end: *end,
            }),
            _ => None,
        });

        let xml = create_chapter(paragraphs, true);
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let ctx = AnchorContext::new(TextSpace::new(&doc, doc.root_element().id()));

        group.bench_with_input(
            BenchmarkId::from_parameter(paragraphs),
            &paragraphs,
            |b, _| {
                b.iter(|| {
                    let anchor =
                        TextQuoteAnchor::from_selector_with_hint(black_box(&quote), hint).unwrap();
                    black_box(anchor.to_range(&ctx))
                })
            },
        );
    }

    group.finish();
}

/// Benchmark the full cascade when structural selectors still match
fn bench_resolve_unchanged(c: &mut Criterion) {
    let selectors = capture_selectors(50);
    let xml = create_chapter(50, false);
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let ctx = AnchorContext::new(TextSpace::new(&doc, doc.root_element().id()));

    let mut group = c.benchmark_group("resolve");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("unchanged_50_paragraphs", |b| {
        b.iter(|| black_box(resolve(&ctx, black_box(&selectors))))
    });

    group.finish();
}

criterion_group!(benches, bench_quote_to_range, bench_resolve_unchanged);
criterion_main!(benches);
