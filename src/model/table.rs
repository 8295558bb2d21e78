//! Table types.

use super::geometry::union_all;
use super::{BoundingBox, Element};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// A table structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Position on the page; encloses every row and cell box
    pub bbox: BoundingBox,

    /// Rows in the table, top to bottom
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table covering `bbox`.
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            rows: Vec::new(),
        }
    }

    /// Add a row to the table, growing the table box to enclose it.
    pub fn add_row(&mut self, row: TableRow) {
        if let Some(extent) = row.extent() {
            self.bbox = self.bbox.union(&extent);
        }
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of grid columns (widest row, counting colspans).
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.colspan.get() as usize).sum())
            .max()
            .unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the table has complex structure (merged cells).
    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .any(|c| c.is_merged())
    }

    /// Order rows top to bottom and cells left to right.
    ///
    /// Sorting is stable and only happens when every item of a level carries
    /// geometry; otherwise the given order is kept.
    pub fn sort_by_position(&mut self) {
        for row in &mut self.rows {
            if row.cells.iter().all(|c| c.bbox.is_some()) {
                row.cells.sort_by(|a, b| {
                    let (a, b) = (a.bbox.unwrap_or_default(), b.bbox.unwrap_or_default());
                    a.left.total_cmp(&b.left)
                });
            }
        }
        if self.rows.iter().all(|r| r.extent().is_some()) {
            self.rows.sort_by(|a, b| {
                let (a, b) = (a.extent().unwrap_or_default(), b.extent().unwrap_or_default());
                a.top.total_cmp(&b.top)
            });
        }
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row, left to right
    pub cells: Vec<TableCell>,

    /// Position of the row, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells, bbox: None }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Set the row position and return self.
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Box enclosing the row and all of its positioned cells.
    pub fn extent(&self) -> Option<BoundingBox> {
        union_all(self.bbox.iter().chain(self.cells.iter().filter_map(|c| c.bbox.as_ref())))
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content
    #[serde(default)]
    pub content: CellContent,

    /// Number of rows this cell spans
    #[serde(default = "single_span")]
    pub rowspan: NonZeroU32,

    /// Number of columns this cell spans
    #[serde(default = "single_span")]
    pub colspan: NonZeroU32,

    /// Position of the cell, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

fn single_span() -> NonZeroU32 {
    NonZeroU32::MIN
}

impl TableCell {
    /// Create a cell with the given content and single spans.
    pub fn new(content: CellContent) -> Self {
        Self {
            content,
            rowspan: NonZeroU32::MIN,
            colspan: NonZeroU32::MIN,
            bbox: None,
        }
    }

    /// Create a new cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(CellContent::Text(text.into()))
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::new(CellContent::default())
    }

    /// Set colspan and return self. A span of 0 is raised to 1.
    pub fn with_colspan(mut self, span: u32) -> Self {
        self.colspan = NonZeroU32::new(span).unwrap_or(NonZeroU32::MIN);
        self
    }

    /// Set rowspan and return self. A span of 0 is raised to 1.
    pub fn with_rowspan(mut self, span: u32) -> Self {
        self.rowspan = NonZeroU32::new(span).unwrap_or(NonZeroU32::MIN);
        self
    }

    /// Set the cell position and return self.
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Get plain text content.
    pub fn plain_text(&self) -> String {
        self.content.plain_text()
    }

    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Check if this cell spans multiple rows or columns.
    pub fn is_merged(&self) -> bool {
        self.rowspan.get() > 1 || self.colspan.get() > 1
    }
}

impl Default for TableCell {
    fn default() -> Self {
        Self::empty()
    }
}

/// Payload of a table cell: plain text or nested page elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellContent {
    /// Plain text
    Text(String),
    /// Elements that were moved into the cell
    Elements(Vec<Element>),
}

impl CellContent {
    /// Get plain text content.
    pub fn plain_text(&self) -> String {
        match self {
            CellContent::Text(text) => text.clone(),
            CellContent::Elements(elements) => elements
                .iter()
                .map(Element::plain_text)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Check if there is no visible content.
    pub fn is_empty(&self) -> bool {
        match self {
            CellContent::Text(text) => text.trim().is_empty(),
            CellContent::Elements(elements) => elements.is_empty(),
        }
    }
}

impl Default for CellContent {
    fn default() -> Self {
        CellContent::Text(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Paragraph;

    #[test]
    fn test_table_new() {
        let table = Table::new(BoundingBox::default());
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_column_count_counts_spans() {
        let mut table = Table::default();
        table.add_row(TableRow::new(vec![
            TableCell::text("Merged").with_colspan(2),
            TableCell::text("c"),
        ]));
        table.add_row(TableRow::from_strings(["a", "b"]));

        assert_eq!(table.column_count(), 3);
        assert!(table.has_merged_cells());
    }

    #[test]
    fn test_zero_span_is_raised_to_one() {
        let cell = TableCell::text("x").with_rowspan(0).with_colspan(0);
        assert_eq!(cell.rowspan.get(), 1);
        assert_eq!(cell.colspan.get(), 1);
        assert!(!cell.is_merged());
    }

    #[test]
    fn test_add_row_grows_table_box() {
        let mut table = Table::new(BoundingBox::new(10.0, 10.0, 100.0, 20.0));
        table.add_row(TableRow::new(vec![
            TableCell::text("wide").with_bbox(BoundingBox::new(10.0, 10.0, 150.0, 30.0))
        ]));
        assert_eq!(table.bbox, BoundingBox::new(10.0, 10.0, 150.0, 30.0));
        for cell in table.rows.iter().flat_map(|r| &r.cells) {
            assert!(table.bbox.contains(&cell.bbox.unwrap()));
        }
    }

    #[test]
    fn test_sort_by_position_needs_full_geometry() {
        let mut table = Table::default();
        table.add_row(TableRow::from_strings(["b"]).with_bbox(BoundingBox::new(0.0, 50.0, 10.0, 10.0)));
        table.add_row(TableRow::from_strings(["a"]).with_bbox(BoundingBox::new(0.0, 10.0, 10.0, 10.0)));
        table.sort_by_position();
        assert_eq!(table.rows[0].plain_text(), "a");

        let mut partial = Table::default();
        partial.add_row(TableRow::from_strings(["b"]).with_bbox(BoundingBox::new(0.0, 50.0, 10.0, 10.0)));
        partial.add_row(TableRow::from_strings(["a"]));
        partial.sort_by_position();
        assert_eq!(partial.rows[0].plain_text(), "b");
    }

    #[test]
    fn test_cell_with_elements() {
        let para = Paragraph::with_text(BoundingBox::default(), "inner");
        let cell = TableCell::new(CellContent::Elements(vec![Element::Paragraph(para)]));
        assert_eq!(cell.plain_text(), "inner");
        assert!(!cell.is_empty());
        assert!(TableCell::empty().is_empty());
    }

    #[test]
    fn test_cell_spans_default_when_missing() {
        let cell: TableCell = serde_json::from_str(r#"{"content":"x"}"#).unwrap();
        assert_eq!(cell.rowspan.get(), 1);
        assert_eq!(cell.colspan.get(), 1);
        assert!(serde_json::from_str::<TableCell>(r#"{"content":"x","rowspan":0}"#).is_err());
    }
}
