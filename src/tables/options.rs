//! Table detection options and configuration.

use crate::error::{Error, Result};
use crate::model::BoundingBox;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Options for the table detection module.
#[derive(Debug, Clone)]
pub struct TableDetectionOptions {
    /// Rule deciding which existing elements a table subsumes
    pub containment: ContainmentRule,

    /// What to do with pages that already hold a table
    pub existing_tables: ExistingTablePolicy,

    /// Which pages to run detection on
    pub pages: PageSelection,

    /// Move subsumed elements into descriptor cells that have a box but no content
    pub fill_empty_cells: bool,

    /// Discard tables with no rows instead of inserting them
    pub drop_empty_tables: bool,

    /// Time allotted to one extractor call
    pub timeout: Duration,

    /// Upper bound on extractor calls in flight at once
    pub max_concurrent_extractions: usize,

    /// Whether to process pages in parallel
    pub parallel: bool,
}

impl TableDetectionOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the containment rule.
    pub fn with_containment(mut self, rule: ContainmentRule) -> Self {
        self.containment = rule;
        self
    }

    /// Subsume elements when at least `min_fraction` of their area is inside
    /// the table.
    pub fn with_overlap_threshold(mut self, min_fraction: f32) -> Self {
        self.containment = ContainmentRule::Overlap { min_fraction };
        self
    }

    /// Set the policy for pages that already hold a table.
    pub fn with_existing_tables(mut self, policy: ExistingTablePolicy) -> Self {
        self.existing_tables = policy;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Enable or disable filling empty cells with subsumed elements.
    pub fn with_fill_empty_cells(mut self, fill: bool) -> Self {
        self.fill_empty_cells = fill;
        self
    }

    /// Enable or disable dropping tables without rows.
    pub fn with_drop_empty_tables(mut self, drop: bool) -> Self {
        self.drop_empty_tables = drop;
        self
    }

    /// Set the per-call extractor timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the bound on concurrent extractor calls.
    pub fn with_max_concurrent_extractions(mut self, max: usize) -> Self {
        self.max_concurrent_extractions = max;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check that the options are usable.
    pub fn validate(&self) -> Result<()> {
        if let ContainmentRule::Overlap { min_fraction } = self.containment {
            if !(min_fraction > 0.0 && min_fraction <= 1.0) {
                return Err(Error::InvalidOptions(format!(
                    "overlap threshold must be in (0, 1], got {}",
                    min_fraction
                )));
            }
        }
        if self.max_concurrent_extractions == 0 {
            return Err(Error::InvalidOptions(
                "max_concurrent_extractions must be at least 1".into(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::InvalidOptions("timeout must be positive".into()));
        }
        Ok(())
    }
}

impl Default for TableDetectionOptions {
    fn default() -> Self {
        Self {
            containment: ContainmentRule::Full,
            existing_tables: ExistingTablePolicy::SkipPage,
            pages: PageSelection::All,
            fill_empty_cells: true,
            drop_empty_tables: false,
            timeout: Duration::from_secs(60),
            max_concurrent_extractions: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            parallel: true,
        }
    }
}

/// Rule deciding whether an existing element is subsumed by a new table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ContainmentRule {
    /// The element's box lies entirely inside the table box
    #[default]
    Full,
    /// At least `min_fraction` of the element's area lies inside the table box
    Overlap {
        /// Required fraction, in (0, 1]
        min_fraction: f32,
    },
}

impl ContainmentRule {
    /// Check whether `table` subsumes an element at `element`.
    pub fn subsumes(&self, table: &BoundingBox, element: &BoundingBox) -> bool {
        match *self {
            ContainmentRule::Full => table.contains(element),
            ContainmentRule::Overlap { min_fraction } => {
                element.overlap_fraction(table) >= min_fraction
            }
        }
    }
}

/// Policy for pages that already contain a table when detection runs.
///
/// Table elements are never removal candidates, whatever the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistingTablePolicy {
    /// Leave such pages alone (re-running the pipeline is a no-op)
    #[default]
    SkipPage,
    /// Run detection anyway, keeping the existing tables
    Preserve,
}

/// Page selection (1-indexed page numbers).
#[derive(Debug, Clone, Default)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        // Simple range (e.g., "1-10")
        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid start page")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid end page")?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        // Comma-separated list with possible ranges
        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid page number")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid page number")?;
                pages.extend(start..=end);
            } else {
                let p: u32 = part.parse().map_err(|_| "Invalid page number")?;
                pages.push(p);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}
