//! End-to-end tests driving an external extractor process.

#![cfg(unix)]

use std::path::PathBuf;
use std::time::Duration;

use doctables::extract::CommandExtractor;
use doctables::model::Table;
use doctables::pipeline::DiagnosticKind;
use doctables::tables::TableDetectionOptions;
use doctables::{detect_tables, detect_tables_with_options, load_document};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn shell(script: &str) -> CommandExtractor {
    CommandExtractor::new("sh").arg("-c").arg(script)
}

#[test]
fn test_process_payload_becomes_table() {
    let document = load_document(fixture("table-detection-page.json")).unwrap();
    let payload = fixture("table-detection-one-table.json");
    let extractor = shell(&format!("cat > /dev/null; cat '{}'", payload.display()));

    let output = detect_tables(document, extractor).unwrap();

    let tables = output.document.elements_of::<Table>();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].rows[0].cells[0].rowspan.get(), 2);
    assert_eq!(tables[0].rows[0].cells[4].colspan.get(), 2);
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_process_sees_source_and_page() {
    let document = load_document(fixture("table-detection-page.json")).unwrap();
    let extractor = CommandExtractor::new("sh")
        .arg("-c")
        .arg("cat > /dev/null; echo \"$0 $1\" >&2; exit 4")
        .arg("{source}")
        .arg("{page}");

    let output = detect_tables(document, extractor).unwrap();

    let diagnostic = output.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.status, Some(4));
    assert_eq!(diagnostic.stderr.as_deref(), Some("table-detection.pdf 1"));
}

#[test]
fn test_hanging_process_times_out() {
    let document = load_document(fixture("table-detection-page.json")).unwrap();
    let before = document.clone();
    let options = TableDetectionOptions::new().with_timeout(Duration::from_millis(200));

    let output = detect_tables_with_options(document, shell("sleep 5"), options).unwrap();

    assert_eq!(output.document, before);
    assert_eq!(output.diagnostics.of_kind(DiagnosticKind::ExtractionTimeout).len(), 1);
}

#[test]
fn test_output_held_open_by_background_job_is_reported() {
    let document = load_document(fixture("table-detection-page.json")).unwrap();
    let before = document.clone();
    let payload = fixture("table-detection-one-table.json");
    let extractor = shell(&format!("cat > /dev/null; cat '{}'; (sleep 8) &", payload.display()));

    let output = detect_tables(document, extractor).unwrap();

    assert_eq!(output.document, before);
    let failures = output.diagnostics.of_kind(DiagnosticKind::ExtractionProcessFailure);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].status, Some(-1));
}

#[test]
fn test_silent_process_is_parse_failure() {
    let document = load_document(fixture("table-detection-page.json")).unwrap();

    let output = detect_tables(document, shell("cat > /dev/null")).unwrap();

    assert_eq!(output.diagnostics.of_kind(DiagnosticKind::ExtractionParseFailure).len(), 1);
}
