//! Page elements and the typed variant query.

use super::{BoundingBox, Heading, Paragraph, Table};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A positioned unit of content on a page.
///
/// The variant set is closed. Elements produced by modules this crate does
/// not know about travel as [`Element::Other`] and round-trip unchanged;
/// see [`OpaqueElement`] for the required wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// A heading
    Heading(Heading),

    /// An image
    Image(Image),

    /// A table
    Table(Table),

    /// Any other element kind, kept opaque
    Other(OpaqueElement),
}

impl Element {
    /// Bounding box of the element.
    pub fn bbox(&self) -> BoundingBox {
        match self {
            Element::Paragraph(p) => p.bbox,
            Element::Heading(h) => h.bbox,
            Element::Image(i) => i.bbox,
            Element::Table(t) => t.bbox,
            Element::Other(o) => o.bbox,
        }
    }

    /// Variant tag of the element.
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Paragraph(_) => ElementKind::Paragraph,
            Element::Heading(_) => ElementKind::Heading,
            Element::Image(_) => ElementKind::Image,
            Element::Table(_) => ElementKind::Table,
            Element::Other(_) => ElementKind::Other,
        }
    }

    /// Check if this element is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Element::Table(_))
    }

    /// Narrow the element to a concrete variant.
    pub fn as_variant<T: ElementVariant>(&self) -> Option<&T> {
        T::narrow(self)
    }

    /// Get plain text content of the element.
    pub fn plain_text(&self) -> String {
        match self {
            Element::Paragraph(p) => p.plain_text(),
            Element::Heading(h) => h.plain_text(),
            Element::Image(i) => i.alt_text.clone().unwrap_or_default(),
            Element::Table(t) => t.plain_text(),
            Element::Other(_) => String::new(),
        }
    }
}

/// Variant tag of an [`Element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// [`Element::Paragraph`]
    Paragraph,
    /// [`Element::Heading`]
    Heading,
    /// [`Element::Image`]
    Image,
    /// [`Element::Table`]
    Table,
    /// [`Element::Other`]
    Other,
}

impl ElementKind {
    /// All kinds, in declaration order.
    pub const ALL: [ElementKind; 5] = [
        ElementKind::Paragraph,
        ElementKind::Heading,
        ElementKind::Image,
        ElementKind::Table,
        ElementKind::Other,
    ];

    /// Lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Paragraph => "paragraph",
            ElementKind::Heading => "heading",
            ElementKind::Image => "image",
            ElementKind::Table => "table",
            ElementKind::Other => "other",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete element variant that can be narrowed from [`Element`].
pub trait ElementVariant: Sized {
    /// Tag of the variant.
    const KIND: ElementKind;

    /// Borrow the variant out of an element, if it matches.
    fn narrow(element: &Element) -> Option<&Self>;
}

macro_rules! element_variant {
    ($ty:ty, $variant:ident) => {
        impl ElementVariant for $ty {
            const KIND: ElementKind = ElementKind::$variant;

            fn narrow(element: &Element) -> Option<&Self> {
                match element {
                    Element::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Element {
            fn from(inner: $ty) -> Self {
                Element::$variant(inner)
            }
        }
    };
}

element_variant!(Paragraph, Paragraph);
element_variant!(Heading, Heading);
element_variant!(Image, Image);
element_variant!(Table, Table);
element_variant!(OpaqueElement, Other);

/// An image placed on the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Position on the page
    pub bbox: BoundingBox,

    /// Resource ID of the image data
    #[serde(default)]
    pub resource_id: Option<String>,

    /// Alternative text
    #[serde(default)]
    pub alt_text: Option<String>,
}

impl Image {
    /// Create an image block.
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            resource_id: None,
            alt_text: None,
        }
    }

    /// Set the resource ID and return self.
    pub fn with_resource(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }
}

/// An element kind owned by another module.
///
/// On the wire it must use the `other` tag and name its own kind in `kind`:
///
/// ```json
/// {"type": "other", "kind": "list", "bbox": {...}, "data": {...}}
/// ```
///
/// A bare `{"type": "list", ...}` is not a known tag and fails to
/// deserialize, which fails loading the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpaqueElement {
    /// Position on the page
    pub bbox: BoundingBox,

    /// Name of the element kind (e.g. "list", "header", "footer")
    pub kind: String,

    /// Payload, untouched by this crate
    #[serde(default)]
    pub data: serde_json::Value,
}

impl OpaqueElement {
    /// Create an opaque element.
    pub fn new(kind: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            bbox,
            kind: kind.into(),
            data: serde_json::Value::Null,
        }
    }
}
