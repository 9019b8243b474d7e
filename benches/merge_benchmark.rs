//! Benchmarks for reportmd merge and export performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic parsed documents.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use reportmd::model::{Element, Page, ParsedDocument, Table};
use reportmd::render::{serialize, ExportOptions, SerializationMode, TextCleaner};
use reportmd::{MergeOptions, ReportMerger, TableRendering};

/// Creates a synthetic report with a running header, body text and a table per page.
fn create_test_document(page_count: u32) -> ParsedDocument {
    let mut doc = ParsedDocument::new("benchmark");
    for n in 1..=page_count {
        let page = Page::new(n)
            .with_element(Element::paragraph("ACME Corp Annual Report 2023"))
            .with_element(Element::heading(format!("Section {}", n), 2))
            .with_element(Element::paragraph(
                "Revenue for the period grew by /one.tnum/two.tnum% com-\npared to the previous year, \
                 driven by strong demand in   all regions.",
            ))
            .with_element(Element::Table(create_test_table(8)))
            .with_element(Element::paragraph(format!("Page {} of {}", n, page_count)));
        doc.add_page(page);
    }
    doc
}

fn create_test_table(rows: usize) -> Table {
    let mut table = Table::from_rows([["Metric", "2022", "2023", "Change"]]);
    for i in 0..rows {
        table.add_row(vec![
            format!("Line item {}", i),
            format!("{}", i * 100),
            format!("{}", i * 110),
            "10%".to_string(),
        ]);
    }
    table
}

/// Benchmark text cleaning.
fn bench_text_cleaning(c: &mut Criterion) {
    let cleaner = TextCleaner::default();
    let text = "The ﬁnal /zero.tnum/period.tnum/five.tnum exam-\nple   text with  glyph<c=1,font=/X> noise.";

    c.bench_function("clean_text", |b| {
        b.iter(|| cleaner.clean(black_box(text), Default::default()));
    });
}

/// Benchmark table serialization.
fn bench_table_serialization(c: &mut Criterion) {
    let table = create_test_table(50);

    c.bench_function("serialize_markdown", |b| {
        b.iter(|| serialize(black_box(&table), SerializationMode::Markdown));
    });

    c.bench_function("serialize_natural_text", |b| {
        b.iter(|| serialize(black_box(&table), SerializationMode::NaturalText));
    });
}

/// Benchmark merging at various sizes.
fn bench_merging(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    let merger = ReportMerger::new(MergeOptions::new().with_table_rendering(TableRendering::Both));

    for page_count in [1, 10, 50].iter() {
        let doc = create_test_document(*page_count);

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| merger.merge(black_box(&doc)));
        });
    }

    group.finish();
}

/// Benchmark Markdown export.
fn bench_export(c: &mut Criterion) {
    let (merged, _) = ReportMerger::default().merge(&create_test_document(20));
    let options = ExportOptions::default();

    c.bench_function("export_20_pages", |b| {
        b.iter(|| reportmd::render::to_markdown(black_box(&merged), &options));
    });
}

criterion_group!(
    benches,
    bench_text_cleaning,
    bench_table_serialization,
    bench_merging,
    bench_export,
);
criterion_main!(benches);
