//! Table extractors: pluggable backends that infer table structure for a page.
//!
//! An extractor is injected into the table detection module at construction
//! time. The crate ships three:
//!
//! - [`CommandExtractor`] runs an external program per page (e.g. a Camelot
//!   wrapper) and reads descriptors from its standard output.
//! - [`StaticExtractor`] replays a recorded `(status, stderr, payload)`
//!   triple.
//! - [`FnExtractor`] wraps an in-process closure.

mod command;
mod descriptor;
mod fixed;

pub use command::{CommandExtractor, Flavor};
pub use descriptor::{
    parse_payload, CellDescriptor, ExtractorOutput, RowDescriptor, TableDescriptor,
};
pub use fixed::{FnExtractor, StaticExtractor};

use crate::error::ExtractionError;
use crate::model::{Metadata, Page};
use crate::pipeline::CancellationToken;
use std::time::Duration;

/// Trait for table structure backends.
///
/// Implementations must be deterministic: the same page and configuration
/// yield the same result. An empty vector means "no table on this page";
/// failures are reported as [`ExtractionError`] and never as an empty result.
pub trait TableExtractor: Send + Sync {
    /// Get the name of this extractor.
    fn name(&self) -> &str;

    /// Infer the tables on `page`.
    fn extract(
        &self,
        page: &Page,
        ctx: &ExtractContext<'_>,
    ) -> Result<Vec<TableDescriptor>, ExtractionError>;
}

/// Per-call context handed to an extractor.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    /// Metadata of the document the page belongs to
    pub metadata: &'a Metadata,

    /// Time allotted to this call
    pub timeout: Duration,

    /// Cancellation signal of the surrounding run
    pub cancel: &'a CancellationToken,
}

impl<'a> ExtractContext<'a> {
    /// Create a context.
    pub fn new(metadata: &'a Metadata, timeout: Duration, cancel: &'a CancellationToken) -> Self {
        Self {
            metadata,
            timeout,
            cancel,
        }
    }
}

/// Origin of the coordinates an extractor reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinateOrigin {
    /// Same space as the model: origin at the top-left corner
    #[default]
    TopLeft,
    /// PDF user space: origin at the bottom-left corner, `top` measured upwards
    BottomLeft,
}

impl CoordinateOrigin {
    /// Bring descriptors into the page's top-left coordinate space.
    pub fn normalize(self, mut descriptors: Vec<TableDescriptor>, page: &Page) -> Vec<TableDescriptor> {
        if self == CoordinateOrigin::BottomLeft {
            for descriptor in &mut descriptors {
                descriptor.map_boxes(|b| b.flip_vertical(page.height));
            }
        }
        descriptors
    }

    /// Parse a user-facing name ("top-left", "bottom-left").
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top-left" | "topleft" => Ok(CoordinateOrigin::TopLeft),
            "bottom-left" | "bottomleft" | "pdf" => Ok(CoordinateOrigin::BottomLeft),
            other => Err(format!("unknown coordinate origin: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    #[test]
    fn test_bottom_left_origin_is_flipped() {
        let page = Page::new(0, 600.0, 800.0);
        let descriptors = vec![TableDescriptor {
            bounding_box: BoundingBox::new(50.0, 700.0, 200.0, 50.0),
            rows: Vec::new(),
        }];

        let same = CoordinateOrigin::TopLeft.normalize(descriptors.clone(), &page);
        assert_eq!(same, descriptors);

        let flipped = CoordinateOrigin::BottomLeft.normalize(descriptors, &page);
        assert_eq!(flipped[0].bounding_box, BoundingBox::new(50.0, 50.0, 200.0, 50.0));
    }

    #[test]
    fn test_origin_parse() {
        assert_eq!(CoordinateOrigin::parse("Bottom-Left"), Ok(CoordinateOrigin::BottomLeft));
        assert_eq!(CoordinateOrigin::parse("top-left"), Ok(CoordinateOrigin::TopLeft));
        assert!(CoordinateOrigin::parse("center").is_err());
    }
}
