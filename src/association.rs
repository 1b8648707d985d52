use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::error::StructureError;
use crate::model::{Cell, DocOffset, Prediction};
use crate::table::CellTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

/// Two associations are equal when they carry the same label name and the
/// same set of cell ids, regardless of cell order.
#[derive(Debug, Clone)]
pub struct CellLabelAssociation {
    label: Prediction,
    cells: IndexMap<String, Cell>,
}

impl CellLabelAssociation {
    #[must_use]
    pub fn new(label: Prediction, cells: IndexMap<String, Cell>) -> Self {
        Self { label, cells }
    }

    #[must_use]
    pub fn label(&self) -> &Prediction {
        &self.label
    }

    #[must_use]
    pub fn cells_for_label(&self) -> &IndexMap<String, Cell> {
        &self.cells
    }

    #[must_use]
    pub fn label_text(&self) -> &str {
        &self.label.text
    }

    #[must_use]
    pub fn cell_details_by_index(&self, index: usize) -> Option<(&str, &Cell)> {
        self.cells
            .get_index(index)
            .map(|(cell_id, cell)| (cell_id.as_str(), cell))
    }

    #[must_use]
    pub fn cells_text(&self) -> String {
        self.cells
            .values()
            .map(|cell| cell.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn label_offset(&self) -> Result<DocOffset, StructureError> {
        self.label.span().ok_or_else(|| StructureError::MissingField {
            field: "start/end",
            context: format!("label '{}'", self.label.label),
        })
    }

    pub fn cell_offsets(&self) -> Result<Vec<DocOffset>, StructureError> {
        self.cells
            .iter()
            .map(|(cell_id, cell)| {
                cell.doc_offsets.ok_or_else(|| StructureError::MissingField {
                    field: "doc_offsets",
                    context: format!("cell '{cell_id}'"),
                })
            })
            .collect()
    }

    fn cell_keys(&self) -> BTreeSet<&str> {
        self.cells.keys().map(String::as_str).collect()
    }
}

impl PartialEq for CellLabelAssociation {
    fn eq(&self, other: &Self) -> bool {
        self.label.label == other.label.label && self.cell_keys() == other.cell_keys()
    }
}

impl CellTable {
    /// Returns `None` when no cell overlaps the label.
    pub fn associate_label(
        &self,
        label: Prediction,
        axis: Axis,
    ) -> Result<Option<CellLabelAssociation>, StructureError> {
        self.validate()?;
        let span = label.span().ok_or_else(|| StructureError::MissingField {
            field: "start/end",
            context: format!("label '{}'", label.label),
        })?;

        let indices_of = |cell: &Cell| -> Vec<usize> {
            match axis {
                Axis::Row => cell.rows.clone(),
                Axis::Column => cell.columns.clone(),
            }
        };

        let hit = self
            .cells()
            .values()
            .filter(|cell| {
                cell.doc_offsets
                    .is_some_and(|offsets| offsets.overlaps(span.start, span.end))
            })
            .flat_map(indices_of)
            .collect::<BTreeSet<_>>();

        if hit.is_empty() {
            return Ok(None);
        }

        let cells = self
            .cells()
            .iter()
            .filter(|&(_, cell)| indices_of(cell).iter().any(|index| hit.contains(index)))
            .map(|(cell_id, cell)| (cell_id.clone(), cell.clone()))
            .collect();

        Ok(Some(CellLabelAssociation::new(label, cells)))
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    use super::{Axis, CellLabelAssociation};
    use crate::error::StructureError;
    use crate::model::{Cell, DocOffset, Prediction};
    use crate::table::CellTable;

    // "Qty 4 6" laid out as a one-column table under a "Qty" header.
    fn quantity_table() -> CellTable {
        [
            ("h", Cell::new(vec![0], vec![0], "Qty").with_doc_offsets(0, 3)),
            ("r1", Cell::new(vec![1], vec![0], "4").with_doc_offsets(4, 5)),
            ("r2", Cell::new(vec![2], vec![0], "6").with_doc_offsets(6, 7)),
            ("p", Cell::new(vec![0], vec![1], "Price").with_doc_offsets(8, 13)),
        ]
        .into_iter()
        .map(|(id, cell)| (id.to_string(), cell))
        .collect()
    }

    #[test]
    fn associates_label_with_its_column() {
        let label = Prediction::new("quantity", "Qty", 0, 3);
        let association = quantity_table()
            .associate_label(label, Axis::Column)
            .expect("valid table")
            .expect("label overlaps the header cell");

        assert_eq!(association.label_text(), "Qty");
        assert_eq!(association.cells_text(), "Qty 4 6");
        assert_eq!(
            association.cell_details_by_index(1).map(|(id, cell)| (id, cell.text.as_str())),
            Some(("r1", "4"))
        );
        assert!(association.cell_details_by_index(3).is_none());
        assert_eq!(association.label_offset().expect("label has offsets"), DocOffset::new(0, 3));
        assert_eq!(
            association.cell_offsets().expect("cells have offsets"),
            vec![DocOffset::new(0, 3), DocOffset::new(4, 5), DocOffset::new(6, 7)]
        );
    }

    #[test]
    fn row_axis_collects_the_header_row() {
        let label = Prediction::new("quantity", "Qty", 0, 3);
        let association = quantity_table()
            .associate_label(label, Axis::Row)
            .expect("valid table")
            .expect("label overlaps the header cell");

        assert_eq!(association.cells_text(), "Qty Price");
    }

    #[test]
    fn unrelated_label_has_no_association() {
        let label = Prediction::new("total", "99", 40, 42);
        let association = quantity_table()
            .associate_label(label, Axis::Column)
            .expect("valid table");
        assert!(association.is_none());
    }

    #[test]
    fn equality_ignores_cell_order() {
        let a = Cell::new(vec![0], vec![0], "a");
        let b = Cell::new(vec![1], vec![0], "b");
        let forward: IndexMap<String, Cell> =
            [("a".to_string(), a.clone()), ("b".to_string(), b.clone())].into_iter().collect();
        let backward: IndexMap<String, Cell> =
            [("b".to_string(), b), ("a".to_string(), a)].into_iter().collect();

        let label = Prediction::new("x", "x", 0, 1);
        assert_eq!(
            CellLabelAssociation::new(label.clone(), forward.clone()),
            CellLabelAssociation::new(label, backward)
        );
        assert_ne!(
            CellLabelAssociation::new(Prediction::new("y", "x", 0, 1), forward.clone()),
            CellLabelAssociation::new(Prediction::new("x", "x", 0, 1), forward)
        );
    }

    #[test]
    fn missing_cell_offsets_fail_fast() {
        let cells: IndexMap<String, Cell> =
            [("a".to_string(), Cell::new(vec![0], vec![0], "a"))].into_iter().collect();
        let association = CellLabelAssociation::new(Prediction::new("x", "x", 0, 1), cells);

        let err = association.cell_offsets().expect_err("offsets are missing");
        assert!(matches!(err, StructureError::MissingField { field: "doc_offsets", .. }));
    }
}
