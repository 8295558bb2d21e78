//! Table descriptors: the wire format returned by extractors.
//!
//! A successful extractor call yields a JSON array shaped like
//!
//! ```json
//! [{ "boundingBox": {"left": 0, "top": 0, "width": 100, "height": 40},
//!    "rows": [ { "cells": [ { "content": "a", "rowspan": 2 }, { "content": "b" } ] } ] }]
//! ```
//!
//! Rows and cells may carry their own `boundingBox`. A cell's `content` is
//! a string, an array of elements, or absent.

use crate::error::ExtractionError;
use crate::model::{union_all, BoundingBox, CellContent};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Raw result of one extractor invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractorOutput {
    /// Exit status; 0 means success
    pub status: i32,
    /// Diagnostic text (standard error of process-based extractors)
    pub stderr: String,
    /// Payload text (standard output)
    pub payload: String,
}

impl ExtractorOutput {
    /// Create an output triple.
    pub fn new(status: i32, stderr: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            status,
            stderr: stderr.into(),
            payload: payload.into(),
        }
    }

    /// Check whether the status signals success.
    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    /// Interpret the triple: a failure status, or a parsed payload.
    pub fn into_descriptors(self) -> Result<Vec<TableDescriptor>, ExtractionError> {
        if !self.is_success() {
            return Err(ExtractionError::Process {
                status: self.status,
                stderr: self.stderr.trim().to_string(),
            });
        }
        if !self.stderr.trim().is_empty() {
            log::debug!("extractor succeeded with diagnostics: {}", self.stderr.trim());
        }
        parse_payload(&self.payload)
    }
}

/// One table reported by an extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescriptor {
    /// Region of the table on the page
    pub bounding_box: BoundingBox,

    /// Rows, in the order reported
    #[serde(default)]
    pub rows: Vec<RowDescriptor>,
}

/// One row of a [`TableDescriptor`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDescriptor {
    /// Cells, in the order reported
    #[serde(default)]
    pub cells: Vec<CellDescriptor>,

    /// Region of the row, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

/// One cell of a [`RowDescriptor`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellDescriptor {
    /// Cell payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<CellContent>,

    /// Rows spanned; 1 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rowspan: Option<NonZeroU32>,

    /// Columns spanned; 1 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colspan: Option<NonZeroU32>,

    /// Region of the cell, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl TableDescriptor {
    /// Every box in the descriptor: table, rows, cells.
    pub(crate) fn boxes(&self) -> impl Iterator<Item = &BoundingBox> {
        std::iter::once(&self.bounding_box).chain(self.rows.iter().flat_map(|row| {
            row.bounding_box
                .iter()
                .chain(row.cells.iter().filter_map(|c| c.bounding_box.as_ref()))
        }))
    }

    /// Smallest box enclosing the table box and every row and cell box.
    pub fn extent(&self) -> BoundingBox {
        union_all(self.boxes()).unwrap_or(self.bounding_box)
    }

    /// Apply `f` to every box in the descriptor.
    pub fn map_boxes(&mut self, f: impl Fn(&BoundingBox) -> BoundingBox) {
        self.bounding_box = f(&self.bounding_box);
        for row in &mut self.rows {
            if let Some(b) = row.bounding_box.as_mut() {
                *b = f(b);
            }
            for cell in &mut row.cells {
                if let Some(b) = cell.bounding_box.as_mut() {
                    *b = f(b);
                }
            }
        }
    }

    /// Number of cells across all rows.
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).sum()
    }
}

/// Parse a success payload into descriptors.
///
/// "No tables" is the empty array `[]`; an empty or whitespace-only payload
/// is a parse failure. Boxes must be finite and non-negative.
pub fn parse_payload(payload: &str) -> Result<Vec<TableDescriptor>, ExtractionError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(ExtractionError::Parse {
            message: "empty payload".into(),
        });
    }

    let descriptors: Vec<TableDescriptor> = serde_json::from_str(payload)?;

    for (n, descriptor) in descriptors.iter().enumerate() {
        if let Some(bad) = descriptor.boxes().find(|b| !b.is_valid()) {
            return Err(ExtractionError::Parse {
                message: format!("table {} has an invalid bounding box {:?}", n, bad),
            });
        }
    }

    Ok(descriptors)
}
