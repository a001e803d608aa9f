//! Benchmarks for the parse and generation pipeline.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use lectern::{GenerateOptions, ParsedBook, SourceFormat, Translation};

/// Build a synthetic USFM book large enough to exercise the tokenizer's
/// scan loop and the builder's per-chapter state.
fn synthetic_usfm(chapters: u32, verses: u32) -> String {
    let mut out = String::from("\\id GEN - Synthetic Benchmark Text\n\\h Genesis\n\\mt1 Genesis\n");
    for c in 1..=chapters {
        out.push_str(&format!("\\c {c}\n\\s1 Section Heading\n\\p\n"));
        for v in 1..=verses {
            out.push_str(&format!(
                "\\v {v} In the beginning God created the heavens and the earth, \
                 and the Spirit of God was hovering over the surface of the waters."
            ));
            if v % 10 == 0 {
                out.push_str("\\f + \\fr 1:1 \\ft Or a note about the text\\f*");
            }
            out.push('\n');
        }
    }
    out
}

fn synthetic_usx(chapters: u32, verses: u32) -> String {
    let mut out = String::from(
        r#"<usx version="3.0"><book code="GEN" style="id">Synthetic</book><para style="h">Genesis</para>"#,
    );
    for c in 1..=chapters {
        out.push_str(&format!(r#"<chapter number="{c}" style="c"/>"#));
        for v in 1..=verses {
            out.push_str(&format!(
                r#"<para style="p"><verse number="{v}" style="v"/>In the beginning God created the heavens and the earth.</para>"#
            ));
        }
    }
    out.push_str("</usx>");
    out
}

// ============================================================================
// Parse Benchmarks
// ============================================================================

fn bench_parse_usfm(c: &mut Criterion) {
    let source = synthetic_usfm(50, 30);

    c.bench_function("parse_usfm", |b| {
        b.iter(|| lectern::parse(&source, SourceFormat::Usfm).unwrap());
    });
}

fn bench_parse_usx(c: &mut Criterion) {
    let source = synthetic_usx(50, 30);

    c.bench_function("parse_usx", |b| {
        b.iter(|| lectern::parse(&source, SourceFormat::Usx).unwrap());
    });
}

// ============================================================================
// Generation Benchmarks
// ============================================================================

fn bench_generate(c: &mut Criterion) {
    let translation = Translation::new("bsb", "Berean Standard Bible")
        .with_website("https://berean.bible")
        .with_license_url("https://berean.bible/terms.htm");
    let book = lectern::parse(&synthetic_usfm(50, 30), SourceFormat::Usfm)
        .unwrap()
        .book;
    let books = vec![ParsedBook { translation, book }];

    c.bench_function("generate", |b| {
        b.iter(|| lectern::generate(&books, &GenerateOptions::default()).unwrap());
    });
}

// ============================================================================
// Render Benchmarks
// ============================================================================

fn bench_render_usfm(c: &mut Criterion) {
    let book = lectern::parse(&synthetic_usfm(50, 30), SourceFormat::Usfm)
        .unwrap()
        .book;

    c.bench_function("render_usfm", |b| {
        b.iter(|| lectern::render::render_usfm(&book));
    });
}

criterion_group!(
    benches,
    // Parse
    bench_parse_usfm,
    bench_parse_usx,
    // Generation
    bench_generate,
    // Render
    bench_render_usfm,
);
criterion_main!(benches);
