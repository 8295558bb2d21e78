//! Plain text rendering for documents.

use crate::model::Document;

/// Convert a document to plain text.
///
/// Pages are separated by a form feed; table rows come out one per line with
/// tab-separated cells.
pub fn to_text(doc: &Document) -> String {
    doc.pages
        .iter()
        .map(|page| page.plain_text())
        .collect::<Vec<_>>()
        .join("\n\u{c}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Page, Paragraph, Table, TableRow};

    #[test]
    fn test_to_text() {
        let mut doc = Document::new();
        let mut page = Page::letter(0);
        page.add_element(Paragraph::with_text(BoundingBox::new(0.0, 0.0, 10.0, 10.0), "Hello, world!"));
        let mut table = Table::new(BoundingBox::new(0.0, 20.0, 10.0, 10.0));
        table.add_row(TableRow::from_strings(["a", "b"]));
        table.add_row(TableRow::from_strings(["c", "d"]));
        page.add_element(table);
        doc.add_page(page);
        doc.add_page(Page::letter(1));

        let text = to_text(&doc);

        assert_eq!(text, "Hello, world!\n\na\tb\nc\td\n\u{c}\n");
    }

    #[test]
    fn test_to_text_empty() {
        assert_eq!(to_text(&Document::new()), "");
    }
}
