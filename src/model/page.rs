//! Page-level types.

use super::{BoundingBox, Element, ElementKind, ElementVariant, Table};
use serde::{Deserialize, Serialize};

/// A single page in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-based)
    pub index: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Elements on the page, in reading order
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Page {
    /// Create a new page with the given dimensions.
    pub fn new(index: u32, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(index: u32) -> Self {
        Self::new(index, 612.0, 792.0) // 8.5 * 72, 11 * 72
    }

    /// Create a new page with standard A4 size (210 x 297 mm).
    pub fn a4(index: u32) -> Self {
        Self::new(index, 595.0, 842.0)
    }

    /// Page number (1-indexed).
    pub fn number(&self) -> u32 {
        self.index + 1
    }

    /// Box covering the whole page.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(0.0, 0.0, self.width, self.height)
    }

    /// Append an element to the page.
    pub fn add_element(&mut self, element: impl Into<Element>) {
        self.elements.push(element.into());
    }

    /// Insert an element at the position its reading order dictates.
    ///
    /// The element goes after every element that starts above it (or at the
    /// same height and further left), and after equal positions so that
    /// insertion is stable. Returns the index it was inserted at.
    pub fn insert_in_reading_order(&mut self, element: impl Into<Element>) -> usize {
        let element = element.into();
        let position = reading_order_position(&self.elements, &element.bbox());
        self.elements.insert(position, element);
        position
    }

    /// Elements of a given variant, narrowed to the concrete type.
    pub fn elements_of<T: ElementVariant>(&self) -> Vec<&T> {
        self.elements.iter().filter_map(T::narrow).collect()
    }

    /// Elements carrying a given variant tag.
    pub fn elements_of_kind(&self, kind: ElementKind) -> Vec<&Element> {
        self.elements.iter().filter(|e| e.kind() == kind).collect()
    }

    /// Number of elements carrying a given variant tag.
    pub fn count_of(&self, kind: ElementKind) -> usize {
        self.elements.iter().filter(|e| e.kind() == kind).count()
    }

    /// Tables on the page.
    pub fn tables(&self) -> Vec<&Table> {
        self.elements_of::<Table>()
    }

    /// Check if the page holds at least one table.
    pub fn has_tables(&self) -> bool {
        self.elements.iter().any(Element::is_table)
    }

    /// Get plain text content of the page.
    pub fn plain_text(&self) -> String {
        self.elements
            .iter()
            .map(Element::plain_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Check if the page is empty (no elements).
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get the number of elements on the page.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

/// Index at which an element at `bbox` belongs in an ordered element list.
pub(crate) fn reading_order_position(elements: &[Element], bbox: &BoundingBox) -> usize {
    elements
        .iter()
        .position(|e| e.bbox().reading_order_cmp(bbox).is_gt())
        .unwrap_or(elements.len())
}

impl Default for Page {
    fn default() -> Self {
        Self::letter(0)
    }
}
