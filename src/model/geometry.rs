//! Page-local geometry.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// An axis-aligned rectangle in page-local coordinates.
///
/// The origin is the top-left corner of the page; `top` grows downwards.
/// All values are in points (1/72 inch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Distance from the left page edge
    pub left: f32,
    /// Distance from the top page edge
    pub top: f32,
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Create a bounding box from its two corners.
    pub fn from_corners(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(left, top, (right - left).max(0.0), (bottom - top).max(0.0))
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Area of the box.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Check that every component is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Check whether `other` lies entirely inside this box (edges inclusive).
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Area shared by both boxes.
    pub fn intersection_area(&self, other: &BoundingBox) -> f32 {
        let w = self.right().min(other.right()) - self.left.max(other.left);
        let h = self.bottom().min(other.bottom()) - self.top.max(other.top);
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }

    /// Fraction of this box's area that lies inside `container`.
    ///
    /// Degenerate (zero-area) boxes count as fully inside when their
    /// position is contained, and fully outside otherwise.
    pub fn overlap_fraction(&self, container: &BoundingBox) -> f32 {
        let area = self.area();
        if area <= 0.0 {
            return if container.contains(self) { 1.0 } else { 0.0 };
        }
        self.intersection_area(container) / area
    }

    /// Smallest box enclosing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::from_corners(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Reading-order comparison: top to bottom, then left to right.
    pub fn reading_order_cmp(&self, other: &BoundingBox) -> Ordering {
        self.top
            .total_cmp(&other.top)
            .then_with(|| self.left.total_cmp(&other.left))
    }

    /// Mirror the box vertically inside a page of the given height.
    ///
    /// Converts between a bottom-left origin (PDF user space) and the
    /// top-left origin used by the model. A part reaching above the page is
    /// clipped off, never shifted down.
    pub fn flip_vertical(&self, page_height: f32) -> BoundingBox {
        let top = page_height - self.top - self.height;
        if top >= 0.0 {
            BoundingBox::new(self.left, top, self.width, self.height)
        } else {
            BoundingBox::new(self.left, 0.0, self.width, (self.height + top).max(0.0))
        }
    }
}

/// Union of an iterator of boxes, or `None` if it is empty.
pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a BoundingBox>) -> Option<BoundingBox> {
    boxes.into_iter().fold(None, |acc, b| match acc {
        None => Some(*b),
        Some(u) => Some(u.union(b)),
    })
}
