//! In-process extractors.

use super::{CoordinateOrigin, ExtractContext, ExtractorOutput, TableDescriptor, TableExtractor};
use crate::error::{ExtractionError, Result};
use crate::model::Page;
use std::path::Path;

/// Replays one recorded extractor result for every page.
///
/// The triple goes through the same interpretation as a live process
/// result: a non-zero status is a failure whatever the payload.
#[derive(Debug, Clone)]
pub struct StaticExtractor {
    output: ExtractorOutput,
    origin: CoordinateOrigin,
}

impl StaticExtractor {
    /// Create an extractor from a `(status, stderr, payload)` triple.
    pub fn new(status: i32, stderr: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            output: ExtractorOutput::new(status, stderr, payload),
            origin: CoordinateOrigin::TopLeft,
        }
    }

    /// An extractor that never finds a table.
    pub fn empty() -> Self {
        Self::new(0, "", "[]")
    }

    /// An extractor that succeeds with the payload stored in `path`.
    pub fn from_payload_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let payload = std::fs::read_to_string(path)?;
        Ok(Self::new(0, "", payload))
    }

    /// Set the coordinate origin of the recorded payload.
    pub fn with_origin(mut self, origin: CoordinateOrigin) -> Self {
        self.origin = origin;
        self
    }
}

impl TableExtractor for StaticExtractor {
    fn name(&self) -> &str {
        "static"
    }

    fn extract(
        &self,
        page: &Page,
        _ctx: &ExtractContext<'_>,
    ) -> std::result::Result<Vec<TableDescriptor>, ExtractionError> {
        let descriptors = self.output.clone().into_descriptors()?;
        Ok(self.origin.normalize(descriptors, page))
    }
}

/// Wraps a closure as an extractor.
pub struct FnExtractor<F> {
    name: String,
    f: F,
}

impl<F> FnExtractor<F>
where
    F: Fn(&Page) -> std::result::Result<Vec<TableDescriptor>, ExtractionError> + Send + Sync,
{
    /// Create a named closure extractor.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> TableExtractor for FnExtractor<F>
where
    F: Fn(&Page) -> std::result::Result<Vec<TableDescriptor>, ExtractionError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(
        &self,
        page: &Page,
        _ctx: &ExtractContext<'_>,
    ) -> std::result::Result<Vec<TableDescriptor>, ExtractionError> {
        (self.f)(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Metadata;
    use crate::pipeline::CancellationToken;
    use std::io::Write;
    use std::time::Duration;

    fn run(extractor: &dyn TableExtractor) -> std::result::Result<Vec<TableDescriptor>, ExtractionError> {
        let metadata = Metadata::default();
        let cancel = CancellationToken::new();
        let ctx = ExtractContext::new(&metadata, Duration::from_secs(1), &cancel);
        extractor.extract(&Page::letter(0), &ctx)
    }

    #[test]
    fn test_static_empty() {
        assert!(run(&StaticExtractor::empty()).unwrap().is_empty());
    }

    #[test]
    fn test_static_failure() {
        let err = run(&StaticExtractor::new(1, "boom", "[]")).unwrap_err();
        assert_eq!(err.status(), Some(1));
    }

    #[test]
    fn test_static_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"boundingBox":{{"left":0,"top":0,"width":10,"height":10}},"rows":[{{"cells":[{{"content":"a"}}]}}]}}]"#
        )
        .unwrap();
        let extractor = StaticExtractor::from_payload_file(file.path()).unwrap();
        let tables = run(&extractor).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 1);
    }

    #[test]
    fn test_fn_extractor() {
        let extractor = FnExtractor::new("never", |_page: &Page| Ok(Vec::new()));
        assert_eq!(extractor.name(), "never");
        assert!(run(&extractor).unwrap().is_empty());
    }
}
