//! Document-level types.

use super::{ElementVariant, Page};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A structured document: the output of ingestion, mutated by pipeline
/// modules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (source, title, etc.)
    #[serde(default)]
    pub metadata: Metadata,

    /// Pages in the document
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document for the given source file.
    pub fn from_source(source: impl Into<PathBuf>) -> Self {
        Self {
            metadata: Metadata {
                source: Some(source.into()),
                ..Default::default()
            },
            pages: Vec::new(),
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by index (0-based).
    pub fn get_page(&self, index: u32) -> Option<&Page> {
        self.pages.get(index as usize)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Elements of a given variant across all pages, in document order.
    pub fn elements_of<T: ElementVariant>(&self) -> Vec<&T> {
        self.pages.iter().flat_map(|p| p.elements_of::<T>()).collect()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Check the structural preconditions modules rely on.
    ///
    /// Every page must have finite, non-negative dimensions and every
    /// element a valid bounding box.
    pub fn validate(&self) -> Result<()> {
        for page in &self.pages {
            if !(page.width.is_finite() && page.height.is_finite())
                || page.width < 0.0
                || page.height < 0.0
            {
                return Err(Error::InvalidDocument(format!(
                    "page {} has invalid dimensions {}x{}",
                    page.index, page.width, page.height
                )));
            }
            for (position, element) in page.elements.iter().enumerate() {
                let bbox = element.bbox();
                if !bbox.is_valid() {
                    return Err(Error::InvalidDocument(format!(
                        "page {} element {} ({}) has invalid bounding box {:?}",
                        page.index,
                        position,
                        element.kind(),
                        bbox
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Document metadata, as reported by ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Path of the source file
    #[serde(default)]
    pub source: Option<PathBuf>,

    /// Document title
    #[serde(default)]
    pub title: Option<String>,

    /// Producing application
    #[serde(default)]
    pub producer: Option<String>,

    /// Creation date
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
}
