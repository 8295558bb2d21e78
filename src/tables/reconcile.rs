//! Merging extracted table descriptors into a page's element list.

use super::options::TableDetectionOptions;
use crate::extract::{CellDescriptor, TableDescriptor};
use crate::model::{reading_order_position, CellContent, Element, Page, Table, TableCell, TableRow};
use std::num::NonZeroU32;

/// What reconciliation did to one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Tables inserted
    pub tables_inserted: usize,
    /// Elements removed because a table subsumed them
    pub elements_removed: usize,
    /// Descriptors discarded because they had no rows
    pub tables_dropped: usize,
}

/// Apply `descriptors` to `page`.
///
/// Descriptors are applied in the order given. The new element list is
/// built aside and swapped in at the end, so the page is never observed
/// half-reconciled.
pub fn reconcile(
    page: &mut Page,
    descriptors: Vec<TableDescriptor>,
    options: &TableDetectionOptions,
) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();
    let mut elements = page.elements.clone();

    for descriptor in descriptors {
        if descriptor.rows.is_empty() && options.drop_empty_tables {
            log::debug!(
                "page {}: dropping table at {:?} with no rows",
                page.index,
                descriptor.bounding_box
            );
            summary.tables_dropped += 1;
            continue;
        }

        // Rows and cells may reach past the table box; the inserted table
        // grows to cover them, so subsumption is decided against the same area.
        let region = descriptor.extent();
        let mut kept = Vec::with_capacity(elements.len());
        let mut removed = Vec::new();
        let mut anchor = None;

        for element in elements {
            // Tables, including ones inserted by earlier descriptors, stay put.
            if !element.is_table() && options.containment.subsumes(&region, &element.bbox()) {
                anchor.get_or_insert(kept.len());
                removed.push(element);
            } else {
                kept.push(element);
            }
        }

        summary.elements_removed += removed.len();
        let table = build_table(descriptor, removed, options.fill_empty_cells);
        let position = anchor.unwrap_or_else(|| reading_order_position(&kept, &table.bbox));
        kept.insert(position, Element::Table(table));
        summary.tables_inserted += 1;
        elements = kept;
    }

    page.elements = elements;
    summary
}

/// Build a table from a descriptor.
///
/// With `fill_empty_cells`, a cell that reports a box but no content takes
/// the removed elements lying inside that box, each element going to the
/// first cell that claims it.
pub fn build_table(descriptor: TableDescriptor, removed: Vec<Element>, fill_empty_cells: bool) -> Table {
    let mut pool: Vec<Option<Element>> = if fill_empty_cells {
        removed.into_iter().map(Some).collect()
    } else {
        Vec::new()
    };

    let mut table = Table::new(descriptor.bounding_box);
    for row in descriptor.rows {
        let cells = row
            .cells
            .into_iter()
            .map(|cell| build_cell(cell, &mut pool))
            .collect();
        table.add_row(TableRow {
            cells,
            bbox: row.bounding_box,
        });
    }
    table.sort_by_position();
    table
}

fn build_cell(cell: CellDescriptor, pool: &mut [Option<Element>]) -> TableCell {
    let content = match (cell.content, cell.bounding_box) {
        (Some(content), _) => content,
        (None, Some(bbox)) => {
            let absorbed: Vec<Element> = pool
                .iter_mut()
                .filter(|slot| slot.as_ref().is_some_and(|e| bbox.contains(&e.bbox())))
                .filter_map(Option::take)
                .collect();
            if absorbed.is_empty() {
                CellContent::default()
            } else {
                CellContent::Elements(absorbed)
            }
        }
        (None, None) => CellContent::default(),
    };

    TableCell {
        content,
        rowspan: cell.rowspan.unwrap_or(NonZeroU32::MIN),
        colspan: cell.colspan.unwrap_or(NonZeroU32::MIN),
        bbox: cell.bounding_box,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RowDescriptor;
    use crate::model::{BoundingBox, Image, Paragraph};
    use crate::tables::ContainmentRule;

    fn para(left: f32, top: f32, text: &str) -> Paragraph {
        Paragraph::with_text(BoundingBox::new(left, top, 40.0, 10.0), text)
    }

    fn text_cell(text: &str) -> CellDescriptor {
        CellDescriptor {
            content: Some(CellContent::Text(text.into())),
            ..Default::default()
        }
    }

    fn descriptor(bbox: BoundingBox, rows: Vec<Vec<CellDescriptor>>) -> TableDescriptor {
        TableDescriptor {
            bounding_box: bbox,
            rows: rows
                .into_iter()
                .map(|cells| RowDescriptor {
                    cells,
                    bounding_box: None,
                })
                .collect(),
        }
    }

    fn sample_page() -> Page {
        let mut page = Page::letter(0);
        page.add_element(para(10.0, 10.0, "title"));
        page.add_element(para(10.0, 110.0, "a"));
        page.add_element(para(60.0, 110.0, "b"));
        page.add_element(para(10.0, 400.0, "footer"));
        page
    }

    #[test]
    fn test_table_replaces_contained_elements_in_place() {
        let mut page = sample_page();
        let d = descriptor(
            BoundingBox::new(0.0, 100.0, 200.0, 50.0),
            vec![vec![text_cell("a"), text_cell("b")]],
        );

        let summary = reconcile(&mut page, vec![d], &TableDetectionOptions::default());

        assert_eq!(summary.tables_inserted, 1);
        assert_eq!(summary.elements_removed, 2);
        let kinds: Vec<_> = page.elements.iter().map(|e| e.kind().as_str()).collect();
        assert_eq!(kinds, vec!["paragraph", "table", "paragraph"]);
        assert_eq!(page.tables()[0].plain_text(), "a\tb");
    }

    #[test]
    fn test_cells_past_table_box_subsume_their_elements() {
        let mut page = Page::letter(0);
        page.add_element(Paragraph::with_text(BoundingBox::new(120.0, 110.0, 20.0, 10.0), "inside cell"));
        let d = descriptor(
            BoundingBox::new(0.0, 100.0, 100.0, 50.0),
            vec![vec![CellDescriptor {
                bounding_box: Some(BoundingBox::new(0.0, 100.0, 200.0, 50.0)),
                ..Default::default()
            }]],
        );

        let summary = reconcile(&mut page, vec![d], &TableDetectionOptions::default());

        assert_eq!(summary.elements_removed, 1);
        assert_eq!(page.element_count(), 1);
        let table = page.tables()[0];
        assert_eq!(table.bbox, BoundingBox::new(0.0, 100.0, 200.0, 50.0));
        assert_eq!(table.plain_text(), "inside cell");
    }

    #[test]
    fn test_table_without_subsumed_elements_goes_in_reading_order() {
        let mut page = sample_page();
        let d = descriptor(
            BoundingBox::new(300.0, 200.0, 100.0, 50.0),
            vec![vec![text_cell("x")]],
        );

        reconcile(&mut page, vec![d], &TableDetectionOptions::default());

        assert_eq!(page.element_count(), 5);
        assert!(page.elements[3].is_table());
    }

    #[test]
    fn test_partial_overlap_needs_overlap_rule() {
        let region = BoundingBox::new(0.0, 105.0, 80.0, 50.0);
        let d = descriptor(region, vec![vec![text_cell("a")]]);

        let mut full = sample_page();
        reconcile(&mut full, vec![d.clone()], &TableDetectionOptions::default());
        // "a" is fully inside, "b" straddles the right edge.
        assert_eq!(full.element_count(), 4);

        let mut overlap = sample_page();
        let options = TableDetectionOptions::default()
            .with_containment(ContainmentRule::Overlap { min_fraction: 0.5 });
        reconcile(&mut overlap, vec![d], &options);
        assert_eq!(overlap.element_count(), 3);
    }

    #[test]
    fn test_existing_tables_are_never_removed() {
        let mut page = sample_page();
        let mut existing = Table::new(BoundingBox::new(10.0, 300.0, 50.0, 20.0));
        existing.add_row(TableRow::from_strings(["old"]));
        page.add_element(existing);

        let d = descriptor(BoundingBox::new(0.0, 290.0, 300.0, 200.0), vec![vec![text_cell("new")]]);
        reconcile(&mut page, vec![d], &TableDetectionOptions::default());

        assert_eq!(page.tables().len(), 2);
        assert!(page.plain_text().contains("old"));
        assert!(!page.plain_text().contains("footer"));
    }

    #[test]
    fn test_empty_cells_take_removed_elements() {
        let mut page = sample_page();
        page.add_element(Image::new(BoundingBox::new(62.0, 112.0, 5.0, 5.0)));
        let cell = |left: f32| CellDescriptor {
            bounding_box: Some(BoundingBox::new(left, 100.0, 50.0, 30.0)),
            ..Default::default()
        };
        let d = descriptor(BoundingBox::new(0.0, 100.0, 200.0, 50.0), vec![vec![cell(5.0), cell(55.0)]]);

        reconcile(&mut page, vec![d], &TableDetectionOptions::default());

        let table = page.tables()[0];
        let cells = &table.rows[0].cells;
        assert_eq!(cells[0].plain_text(), "a");
        match &cells[1].content {
            CellContent::Elements(elements) => assert_eq!(elements.len(), 2),
            other => panic!("expected elements, got {:?}", other),
        }
    }

    #[test]
    fn test_fill_disabled_leaves_cells_empty() {
        let mut page = sample_page();
        let d = descriptor(
            BoundingBox::new(0.0, 100.0, 200.0, 50.0),
            vec![vec![CellDescriptor {
                bounding_box: Some(BoundingBox::new(5.0, 100.0, 50.0, 30.0)),
                ..Default::default()
            }]],
        );
        let options = TableDetectionOptions::default().with_fill_empty_cells(false);

        reconcile(&mut page, vec![d], &options);

        assert!(page.tables()[0].rows[0].cells[0].is_empty());
        assert_eq!(page.element_count(), 3);
    }

    #[test]
    fn test_empty_descriptor_kept_unless_dropped() {
        let d = descriptor(BoundingBox::new(0.0, 100.0, 200.0, 50.0), Vec::new());

        let mut page = sample_page();
        reconcile(&mut page, vec![d.clone()], &TableDetectionOptions::default());
        assert!(page.tables()[0].is_empty());

        let mut page = sample_page();
        let options = TableDetectionOptions::default().with_drop_empty_tables(true);
        let summary = reconcile(&mut page, vec![d], &options);
        assert_eq!(summary.tables_dropped, 1);
        assert_eq!(page, sample_page());
    }

    #[test]
    fn test_spans_default_to_one() {
        let d = descriptor(
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            vec![vec![
                CellDescriptor {
                    rowspan: NonZeroU32::new(2),
                    ..text_cell("tall")
                },
                text_cell("plain"),
            ]],
        );
        let table = build_table(d, Vec::new(), true);
        let cells = &table.rows[0].cells;
        assert_eq!(cells[0].rowspan.get(), 2);
        assert_eq!(cells[0].colspan.get(), 1);
        assert_eq!(cells[1].rowspan.get(), 1);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_multiple_descriptors_apply_in_order() {
        let mut page = sample_page();
        let top = descriptor(BoundingBox::new(0.0, 0.0, 200.0, 30.0), vec![vec![text_cell("t")]]);
        let bottom = descriptor(BoundingBox::new(0.0, 390.0, 200.0, 30.0), vec![vec![text_cell("f")]]);

        let summary = reconcile(&mut page, vec![bottom, top], &TableDetectionOptions::default());

        assert_eq!(summary.tables_inserted, 2);
        assert_eq!(summary.elements_removed, 2);
        let texts: Vec<_> = page.elements.iter().map(Element::plain_text).collect();
        assert_eq!(texts, vec!["t", "a", "b", "f"]);
    }
}
