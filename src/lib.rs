//! # doctables
//!
//! Table detection and reconciliation for structured document trees.
//!
//! A [`Document`] is an ordered list of pages, each holding positioned
//! elements (paragraphs, headings, images, tables). The table detection
//! module asks a pluggable [`TableExtractor`] which tables a page holds and
//! rewrites the page so that every detected table becomes one [`Table`]
//! element in place of the elements it covers.
//!
//! ## Quick Start
//!
//! ```
//! use doctables::extract::StaticExtractor;
//! use doctables::model::{BoundingBox, Page, Paragraph};
//! use doctables::{detect_tables, Document, Table};
//!
//! let mut doc = Document::new();
//! let mut page = Page::letter(0);
//! page.add_element(Paragraph::with_text(BoundingBox::new(20.0, 110.0, 50.0, 10.0), "42"));
//! doc.add_page(page);
//!
//! let payload = r#"[{"boundingBox": {"left": 0, "top": 100, "width": 300, "height": 50},
//!                   "rows": [{"cells": [{"content": "42"}]}]}]"#;
//! let output = detect_tables(doc, StaticExtractor::new(0, "", payload))?;
//!
//! assert_eq!(output.document.elements_of::<Table>().len(), 1);
//! # Ok::<(), doctables::PipelineError>(())
//! ```
//!
//! ## Features
//!
//! - **Pluggable extractors**: external programs, recorded payloads, closures
//! - **Merged cells**: rowspan and colspan survive into the model
//! - **Failure isolation**: a failing page is left untouched and reported
//! - **Parallel processing**: pages run on a bounded Rayon pool
//! - **Sequential pipeline**: modules see each other's changes in order

pub mod error;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod tables;

// Re-export commonly used types
pub use error::{Error, ExtractionError, PipelineError, Result};
pub use extract::{CommandExtractor, StaticExtractor, TableDescriptor, TableExtractor};
pub use model::{
    BoundingBox, CellContent, Document, Element, ElementKind, ElementVariant, Metadata, Page,
    Table, TableCell, TableRow,
};
pub use pipeline::{CancellationToken, Diagnostic, Diagnostics, FailurePolicy, Module, Pipeline, PipelineOutput};
pub use render::JsonFormat;
pub use tables::{PageSelection, TableDetectionModule, TableDetectionOptions};

use std::path::Path;

/// Read a document from a JSON file.
///
/// # Example
///
/// ```no_run
/// let doc = doctables::load_document("document.json").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let json = std::fs::read_to_string(path)?;
    render::from_json(&json)
}

/// Run table detection over a document with default options.
///
/// Extraction failures do not fail the call; they come back as diagnostics
/// next to the document.
pub fn detect_tables(
    document: Document,
    extractor: impl TableExtractor + 'static,
) -> std::result::Result<PipelineOutput, PipelineError> {
    detect_tables_with_options(document, extractor, TableDetectionOptions::default())
}

/// Run table detection over a document with custom options.
///
/// # Example
///
/// ```no_run
/// use doctables::{detect_tables_with_options, CommandExtractor, TableDetectionOptions};
/// use std::time::Duration;
///
/// let doc = doctables::load_document("document.json")?;
/// let extractor = CommandExtractor::new("camelot-wrapper").arg("{source}").arg("{page}");
/// let options = TableDetectionOptions::new()
///     .with_timeout(Duration::from_secs(30))
///     .with_max_concurrent_extractions(4);
/// let output = detect_tables_with_options(doc, extractor, options)?;
/// for diagnostic in &output.diagnostics {
///     eprintln!("{}", diagnostic.message);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn detect_tables_with_options(
    document: Document,
    extractor: impl TableExtractor + 'static,
    options: TableDetectionOptions,
) -> std::result::Result<PipelineOutput, PipelineError> {
    Pipeline::new()
        .add(TableDetectionModule::new(extractor).with_options(options))
        .run(document)
}
