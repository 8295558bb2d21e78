//! Benchmarks for table reconciliation performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic pages with a grid of text elements.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use doctables::extract::{parse_payload, CellDescriptor, RowDescriptor, StaticExtractor, TableDescriptor};
use doctables::model::{BoundingBox, CellContent, Document, Page, Paragraph};
use doctables::tables::{reconcile, TableDetectionModule, TableDetectionOptions};
use doctables::CancellationToken;

const CELL_WIDTH: f32 = 50.0;
const CELL_HEIGHT: f32 = 14.0;

/// Creates a page holding a `rows` x `cols` grid of paragraphs under a heading line.
fn create_page(index: u32, rows: usize, cols: usize) -> Page {
    let mut page = Page::letter(index);
    page.add_element(Paragraph::with_text(BoundingBox::new(36.0, 20.0, 400.0, 16.0), "Title"));
    for r in 0..rows {
        for c in 0..cols {
            let bbox = BoundingBox::new(
                40.0 + c as f32 * CELL_WIDTH,
                60.0 + r as f32 * CELL_HEIGHT,
                CELL_WIDTH - 4.0,
                CELL_HEIGHT - 2.0,
            );
            page.add_element(Paragraph::with_text(bbox, format!("{}:{}", r, c)));
        }
    }
    page
}

/// Creates a descriptor covering the grid produced by [`create_page`].
fn create_descriptor(rows: usize, cols: usize) -> TableDescriptor {
    TableDescriptor {
        bounding_box: BoundingBox::new(36.0, 56.0, cols as f32 * CELL_WIDTH + 8.0, rows as f32 * CELL_HEIGHT + 8.0),
        rows: (0..rows)
            .map(|r| RowDescriptor {
                cells: (0..cols)
                    .map(|c| CellDescriptor {
                        content: Some(CellContent::Text(format!("{}:{}", r, c))),
                        ..Default::default()
                    })
                    .collect(),
                bounding_box: None,
            })
            .collect(),
    }
}

/// Benchmark reconciling one table into pages of various sizes.
fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let options = TableDetectionOptions::default();

    for (rows, cols) in [(5, 4), (20, 8), (60, 10)].iter() {
        let page = create_page(0, *rows, *cols);
        let descriptor = create_descriptor(*rows, *cols);

        group.bench_function(format!("{}x{}", rows, cols), |b| {
            b.iter(|| {
                let mut page = page.clone();
                reconcile(black_box(&mut page), vec![descriptor.clone()], &options)
            });
        });
    }

    group.finish();
}

/// Benchmark payload parsing.
fn bench_parse_payload(c: &mut Criterion) {
    let payload = serde_json::to_string(&vec![create_descriptor(60, 10)]).unwrap();

    c.bench_function("parse_payload_60x10", |b| {
        b.iter(|| parse_payload(black_box(&payload)).unwrap());
    });
}

/// Benchmark a whole document, sequential and parallel.
fn bench_document(c: &mut Criterion) {
    let mut doc = Document::new();
    for i in 0..32 {
        doc.add_page(create_page(i, 20, 8));
    }
    let payload = serde_json::to_string(&vec![create_descriptor(20, 8)]).unwrap();
    let module = TableDetectionModule::new(StaticExtractor::new(0, "", payload));
    let sequential = module.clone().with_options(TableDetectionOptions::default().sequential());

    let mut group = c.benchmark_group("document_32_pages");
    group.bench_function("parallel", |b| {
        b.iter(|| {
            let mut doc = doc.clone();
            module.detect(black_box(&mut doc), &CancellationToken::new()).unwrap()
        });
    });
    group.bench_function("sequential", |b| {
        b.iter(|| {
            let mut doc = doc.clone();
            sequential.detect(black_box(&mut doc), &CancellationToken::new()).unwrap()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_reconcile, bench_parse_payload, bench_document);
criterion_main!(benches);
