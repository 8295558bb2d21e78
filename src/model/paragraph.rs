//! Paragraph and text-level types.

use super::BoundingBox;
use serde::{Deserialize, Serialize};

/// A paragraph of text content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Position on the page
    pub bbox: BoundingBox,

    /// Text runs in the paragraph
    pub runs: Vec<TextRun>,

    /// Text alignment
    #[serde(default)]
    pub alignment: Alignment,
}

impl Paragraph {
    /// Create a new empty paragraph at the given position.
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            runs: Vec::new(),
            alignment: Alignment::Left,
        }
    }

    /// Create a paragraph with plain text.
    pub fn with_text(bbox: BoundingBox, text: impl Into<String>) -> Self {
        let mut p = Self::new(bbox);
        p.add_text(text);
        p
    }

    /// Add plain text to the paragraph.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.runs.push(TextRun::new(text));
    }

    /// Add a styled text run.
    pub fn add_run(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if the paragraph is empty.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty() || self.plain_text().trim().is_empty()
    }
}

/// A heading detected by an upstream module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Position on the page
    pub bbox: BoundingBox,

    /// Heading level (1-6)
    pub level: u8,

    /// Text runs of the heading
    pub runs: Vec<TextRun>,
}

impl Heading {
    /// Create a heading with plain text.
    pub fn new(bbox: BoundingBox, text: impl Into<String>, level: u8) -> Self {
        Self {
            bbox,
            level: level.clamp(1, 6),
            runs: vec![TextRun::new(text)],
        }
    }

    /// Get plain text content of the heading.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Text styling
    #[serde(default)]
    pub style: TextStyle,
}

impl TextRun {
    /// Create a new text run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// Create a bold text run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle {
                bold: true,
                ..Default::default()
            },
        }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Text styling properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    #[serde(default)]
    pub bold: bool,

    /// Italic text
    #[serde(default)]
    pub italic: bool,

    /// Font name
    #[serde(default)]
    pub font_name: Option<String>,

    /// Font size in points
    #[serde(default)]
    pub font_size: Option<f32>,
}

/// Text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_plain_text() {
        let mut p = Paragraph::new(BoundingBox::default());
        p.add_text("Hello ");
        p.add_run(TextRun::bold("world"));
        p.add_text("!");

        assert_eq!(p.plain_text(), "Hello world!");
        assert!(!p.is_empty());
    }

    #[test]
    fn test_heading_level_is_clamped() {
        let h = Heading::new(BoundingBox::default(), "Title", 9);
        assert_eq!(h.level, 6);
        assert_eq!(h.plain_text(), "Title");
    }
}
