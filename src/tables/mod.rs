//! Table detection module.
//!
//! For each selected page, the module asks its [`TableExtractor`] for table
//! descriptors, turns every descriptor into a [`Table`] element, and swaps
//! the elements the table subsumes for the table itself.
//!
//! Extraction failures never abort the run: the page is left untouched and
//! a [`Diagnostic`] is recorded. Pages are independent and may be processed
//! in parallel on a bounded worker pool; results are always merged back in
//! page order.
//!
//! [`Table`]: crate::model::Table

mod options;
mod reconcile;

pub use options::{ContainmentRule, ExistingTablePolicy, PageSelection, TableDetectionOptions};
pub use reconcile::{build_table, reconcile, ReconcileSummary};

use crate::error::{Error, ExtractionError, Result};
use crate::extract::{ExtractContext, TableExtractor};
use crate::model::{Document, Metadata, Page};
use crate::pipeline::{CancellationToken, Diagnostic, Module, ModuleContext};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

/// Name under which the module records diagnostics.
pub const MODULE_NAME: &str = "table-detection";

/// What happened to one page.
#[derive(Debug)]
pub enum PageOutcome {
    /// Not selected, or already holds a table under [`ExistingTablePolicy::SkipPage`]
    Skipped,
    /// The extractor found nothing
    NoTables,
    /// Tables were inserted
    Inserted(ReconcileSummary),
    /// The extractor failed; the page is unchanged
    Failed(ExtractionError),
    /// The run was cancelled before the page finished
    Cancelled,
}

/// Outcome of a page, keyed by page index.
#[derive(Debug)]
pub struct PageReport {
    /// Page index (0-based)
    pub page: u32,
    /// What happened
    pub outcome: PageOutcome,
}

/// Outcome of a detection pass over a document, in page order.
#[derive(Debug, Default)]
pub struct DetectionReport {
    /// One entry per page
    pub pages: Vec<PageReport>,
}

impl DetectionReport {
    /// Total number of tables inserted.
    pub fn tables_inserted(&self) -> usize {
        self.summaries().map(|s| s.tables_inserted).sum()
    }

    /// Total number of elements removed.
    pub fn elements_removed(&self) -> usize {
        self.summaries().map(|s| s.elements_removed).sum()
    }

    /// Pages whose extraction failed, with the error.
    pub fn failures(&self) -> impl Iterator<Item = (u32, &ExtractionError)> {
        self.pages.iter().filter_map(|r| match &r.outcome {
            PageOutcome::Failed(err) => Some((r.page, err)),
            _ => None,
        })
    }

    /// Pages that cancellation cut short.
    pub fn cancelled_pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages
            .iter()
            .filter(|r| matches!(r.outcome, PageOutcome::Cancelled))
            .map(|r| r.page)
    }

    /// Check whether any page was cut short by cancellation.
    pub fn was_cancelled(&self) -> bool {
        self.pages
            .iter()
            .any(|r| matches!(r.outcome, PageOutcome::Cancelled))
    }

    fn summaries(&self) -> impl Iterator<Item = &ReconcileSummary> {
        self.pages.iter().filter_map(|r| match &r.outcome {
            PageOutcome::Inserted(summary) => Some(summary),
            _ => None,
        })
    }
}

/// Pipeline module that turns extractor output into table elements.
#[derive(Clone)]
pub struct TableDetectionModule {
    extractor: Arc<dyn TableExtractor>,
    options: TableDetectionOptions,
}

impl TableDetectionModule {
    /// Create a module around an extractor, with default options.
    pub fn new(extractor: impl TableExtractor + 'static) -> Self {
        Self::from_shared(Arc::new(extractor))
    }

    /// Create a module around a shared extractor.
    pub fn from_shared(extractor: Arc<dyn TableExtractor>) -> Self {
        Self {
            extractor,
            options: TableDetectionOptions::default(),
        }
    }

    /// Set options.
    pub fn with_options(mut self, options: TableDetectionOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the options.
    pub fn options(&self) -> &TableDetectionOptions {
        &self.options
    }

    /// Get the extractor.
    pub fn extractor(&self) -> &dyn TableExtractor {
        self.extractor.as_ref()
    }

    /// Run detection over every page of `document`.
    ///
    /// Fails only on invalid options, an invalid document, or a worker pool
    /// that cannot be built. Page-level failures are in the report.
    pub fn detect(&self, document: &mut Document, cancel: &CancellationToken) -> Result<DetectionReport> {
        self.options.validate()?;
        document.validate()?;

        let Document { metadata, pages } = document;
        let metadata: &Metadata = metadata;

        let outcomes: Vec<PageOutcome> = if self.options.parallel && pages.len() > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.max_concurrent_extractions)
                .thread_name(|i| format!("table-extract-{}", i))
                .build()
                .map_err(|e| Error::Other(format!("failed to build worker pool: {}", e)))?;
            pool.install(|| {
                pages
                    .par_iter_mut()
                    .map(|page| self.detect_page(page, metadata, cancel))
                    .collect()
            })
        } else {
            pages
                .iter_mut()
                .map(|page| self.detect_page(page, metadata, cancel))
                .collect()
        };

        let report = DetectionReport {
            pages: pages
                .iter()
                .zip(outcomes)
                .map(|(page, outcome)| PageReport {
                    page: page.index,
                    outcome,
                })
                .collect(),
        };

        log::info!(
            "table detection via '{}': {} table(s) inserted, {} element(s) removed, {} page failure(s)",
            self.extractor.name(),
            report.tables_inserted(),
            report.elements_removed(),
            report.failures().count()
        );
        Ok(report)
    }

    /// Run detection on one page.
    ///
    /// The page is modified only when the extractor succeeds.
    pub fn detect_page(&self, page: &mut Page, metadata: &Metadata, cancel: &CancellationToken) -> PageOutcome {
        if !self.options.pages.includes(page.number()) {
            return PageOutcome::Skipped;
        }
        if self.options.existing_tables == ExistingTablePolicy::SkipPage && page.has_tables() {
            log::debug!("page {} already has tables, skipping", page.index);
            return PageOutcome::Skipped;
        }
        if cancel.is_cancelled() {
            return PageOutcome::Cancelled;
        }

        let ctx = ExtractContext::new(metadata, self.options.timeout, cancel);
        let started = Instant::now();
        let result = self.extractor.extract(page, &ctx);
        let elapsed = started.elapsed();

        let descriptors = match result {
            Ok(_) if elapsed > self.options.timeout => {
                let err = ExtractionError::Timeout {
                    after: self.options.timeout,
                };
                log::warn!("page {}: {} (took {:?})", page.index, err, elapsed);
                return PageOutcome::Failed(err);
            }
            Ok(descriptors) => descriptors,
            Err(ExtractionError::Cancelled) => return PageOutcome::Cancelled,
            Err(err) => {
                log::warn!("page {}: {}", page.index, err);
                return PageOutcome::Failed(err);
            }
        };

        if descriptors.is_empty() {
            log::debug!("page {}: no tables", page.index);
            return PageOutcome::NoTables;
        }

        log::debug!("page {}: {} table descriptor(s)", page.index, descriptors.len());
        PageOutcome::Inserted(reconcile(page, descriptors, &self.options))
    }
}

impl std::fmt::Debug for TableDetectionModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableDetectionModule")
            .field("extractor", &self.extractor.name())
            .field("options", &self.options)
            .finish()
    }
}

impl Module for TableDetectionModule {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn run(&self, document: &mut Document, ctx: &mut ModuleContext<'_>) -> Result<()> {
        let report = self.detect(document, ctx.cancel_token())?;
        for (page, err) in report.failures() {
            ctx.record(Diagnostic::extraction(MODULE_NAME, page, err));
        }
        for page in report.cancelled_pages() {
            ctx.record(Diagnostic::extraction(MODULE_NAME, page, &ExtractionError::Cancelled));
        }
        Ok(())
    }
}
