//! Run-level diagnostics.

use crate::error::{Error, ExtractionError};
use serde::{Deserialize, Serialize};

/// Category of a recorded problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The extractor reported a failure status or could not be started
    ExtractionProcessFailure,
    /// The extractor exceeded its time budget
    ExtractionTimeout,
    /// The extractor output did not match the descriptor schema
    ExtractionParseFailure,
    /// The extractor call was interrupted by cancellation
    ExtractionCancelled,
    /// A module failed as a whole and the run continued
    ModuleFailure,
}

impl From<&ExtractionError> for DiagnosticKind {
    fn from(err: &ExtractionError) -> Self {
        match err {
            ExtractionError::Process { .. } | ExtractionError::Spawn(_) => {
                DiagnosticKind::ExtractionProcessFailure
            }
            ExtractionError::Timeout { .. } => DiagnosticKind::ExtractionTimeout,
            ExtractionError::Parse { .. } => DiagnosticKind::ExtractionParseFailure,
            ExtractionError::Cancelled => DiagnosticKind::ExtractionCancelled,
        }
    }
}

/// One recorded, non-fatal problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Module that recorded the problem
    pub module: String,

    /// Page index (0-based), for page-level problems
    pub page: Option<u32>,

    /// Problem category
    pub kind: DiagnosticKind,

    /// Human-readable description
    pub message: String,

    /// Exit status reported by an external extractor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,

    /// Diagnostic text captured from an external extractor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl Diagnostic {
    /// Build a diagnostic for a failed extraction on a page.
    pub fn extraction(module: impl Into<String>, page: u32, err: &ExtractionError) -> Self {
        Self {
            module: module.into(),
            page: Some(page),
            kind: DiagnosticKind::from(err),
            message: err.to_string(),
            status: err.status(),
            stderr: err.stderr().map(str::to_string),
        }
    }

    /// Build a diagnostic for a module that failed and was skipped.
    pub fn module_failure(module: impl Into<String>, err: &Error) -> Self {
        Self {
            module: module.into(),
            page: None,
            kind: DiagnosticKind::ModuleFailure,
            message: err.to_string(),
            status: None,
            stderr: None,
        }
    }
}

/// Ordered collection of diagnostics for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Append all diagnostics of `other`.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.entries.extend(other);
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in recording order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Diagnostics recorded for a page.
    pub fn for_page(&self, page: u32) -> Vec<&Diagnostic> {
        self.entries.iter().filter(|d| d.page == Some(page)).collect()
    }

    /// Diagnostics of a given kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> Vec<&Diagnostic> {
        self.entries.iter().filter(|d| d.kind == kind).collect()
    }

    /// Take the recorded diagnostics.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_extraction_diagnostic_carries_process_details() {
        let err = ExtractionError::Process {
            status: 127,
            stderr: "camelot: not found".into(),
        };
        let d = Diagnostic::extraction("table-detection", 4, &err);
        assert_eq!(d.kind, DiagnosticKind::ExtractionProcessFailure);
        assert_eq!(d.page, Some(4));
        assert_eq!(d.status, Some(127));
        assert_eq!(d.stderr.as_deref(), Some("camelot: not found"));
    }

    #[test]
    fn test_kind_mapping() {
        let timeout = ExtractionError::Timeout {
            after: Duration::from_secs(1),
        };
        assert_eq!(DiagnosticKind::from(&timeout), DiagnosticKind::ExtractionTimeout);
        let parse = ExtractionError::Parse {
            message: "x".into(),
        };
        assert_eq!(DiagnosticKind::from(&parse), DiagnosticKind::ExtractionParseFailure);
    }

    #[test]
    fn test_queries() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());
        diagnostics.push(Diagnostic::extraction("m", 0, &ExtractionError::Cancelled));
        diagnostics.push(Diagnostic::module_failure("n", &Error::Other("bad".into())));

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.for_page(0).len(), 1);
        assert_eq!(diagnostics.of_kind(DiagnosticKind::ModuleFailure).len(), 1);

        let json = serde_json::to_value(&diagnostics).unwrap();
        assert!(json.is_array());
        assert_eq!(json[1]["kind"], "module_failure");
    }
}
