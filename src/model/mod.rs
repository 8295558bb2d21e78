//! Document element model.
//!
//! A [`Document`] owns ordered [`Page`]s; a page owns [`Element`]s in
//! reading order. Elements are a closed set of variants sharing a bounding
//! box and a variant tag, queried with [`Page::elements_of`].

mod document;
mod element;
mod geometry;
mod page;
mod paragraph;
mod table;

pub use document::{Document, Metadata};
pub use element::{Element, ElementKind, ElementVariant, Image, OpaqueElement};
pub use geometry::{union_all, BoundingBox};
pub use page::Page;
pub(crate) use page::reading_order_position;
pub use paragraph::{Alignment, Heading, Paragraph, TextRun, TextStyle};
pub use table::{CellContent, Table, TableCell, TableRow};
