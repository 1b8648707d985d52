//! Sparse cell annotations to dense table grids.
//!
//! Indices are zero-based throughout this module. Exporters that need
//! another convention convert at their own boundary.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::StructureError;
use crate::model::Cell;

/// Upper bound on `rows × columns` for any dense rendering of a table.
pub const MAX_GRID_CELLS: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub cell_id: String,
    pub text: String,
    pub row_span: usize,
    pub col_span: usize,
}

/// Dense `rows × columns` grid. Positions covered by a span but not
/// anchoring it stay `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableGrid {
    pub rows: usize,
    pub columns: usize,
    pub cells: Vec<Vec<Option<GridCell>>>,
}

impl TableGrid {
    #[must_use]
    pub fn anchor(&self, row: usize, column: usize) -> Option<&GridCell> {
        self.cells.get(row)?.get(column)?.as_ref()
    }

    pub fn anchors(&self) -> impl Iterator<Item = (usize, usize, &GridCell)> {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(column, cell)| cell.as_ref().map(|cell| (row, column, cell)))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellTable {
    cells: IndexMap<String, Cell>,
}

impl CellTable {
    #[must_use]
    pub fn new(cells: IndexMap<String, Cell>) -> Self {
        Self { cells }
    }

    pub fn insert(&mut self, cell_id: impl Into<String>, cell: Cell) -> Option<Cell> {
        self.cells.insert(cell_id.into(), cell)
    }

    #[must_use]
    pub fn cells(&self) -> &IndexMap<String, Cell> {
        &self.cells
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Checks that every cell covers a non-empty, ascending, gap-free run of
    /// rows and of columns, and that the whole grid stays within
    /// [`MAX_GRID_CELLS`].
    pub fn validate(&self) -> Result<(), StructureError> {
        let (mut rows, mut columns) = (0_usize, 0_usize);
        for (cell_id, cell) in &self.cells {
            rows = rows.max(check_run(cell_id, "rows", &cell.rows)?);
            columns = columns.max(check_run(cell_id, "columns", &cell.columns)?);

            if rows.checked_mul(columns).is_none_or(|size| size > MAX_GRID_CELLS) {
                return Err(StructureError::MalformedCell {
                    cell_id: cell_id.clone(),
                    reason: format!(
                        "grid of {rows} x {columns} exceeds {MAX_GRID_CELLS} positions"
                    ),
                });
            }
        }
        Ok(())
    }

    /// `(max_row + 1, max_col + 1)`, or `(0, 0)` for an empty table.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        let rows = self
            .cells
            .values()
            .flat_map(|cell| cell.rows.iter().copied())
            .max()
            .map_or(0, |max| max.saturating_add(1));
        let columns = self
            .cells
            .values()
            .flat_map(|cell| cell.columns.iter().copied())
            .max()
            .map_or(0, |max| max.saturating_add(1));
        (rows, columns)
    }

    pub fn grid(&self) -> Result<TableGrid, StructureError> {
        self.validate()?;
        let (rows, columns) = self.shape();
        let mut cells = vec![vec![None; columns]; rows];

        for (cell_id, cell) in &self.cells {
            let (row, column) = (cell.rows[0], cell.columns[0]);
            if cells[row][column].is_some() {
                tracing::warn!(
                    cell_id = %cell_id,
                    row,
                    column,
                    "two cells anchor at the same grid position; keeping the later one"
                );
            }
            cells[row][column] = Some(GridCell {
                cell_id: cell_id.clone(),
                text: cell.text.clone(),
                row_span: cell.row_span(),
                col_span: cell.col_span(),
            });
        }

        Ok(TableGrid {
            rows,
            columns,
            cells,
        })
    }

    /// Single-valued `rows × columns` text table. Fails on the first merged
    /// cell since a flat table has no way to express spans.
    pub fn to_dense_table(&self) -> Result<Vec<Vec<String>>, StructureError> {
        self.validate()?;
        if let Some((cell_id, cell)) = self.cells.iter().find(|(_, cell)| cell.is_merged()) {
            return Err(StructureError::UnsupportedSpan {
                cell_id: cell_id.clone(),
                row_span: cell.row_span(),
                col_span: cell.col_span(),
            });
        }

        let grid = self.grid()?;
        Ok(grid
            .cells
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.map(|cell| cell.text).unwrap_or_default())
                    .collect()
            })
            .collect())
    }

    #[must_use]
    pub fn columns_text(&self) -> BTreeMap<usize, Vec<String>> {
        let mut columns: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for cell in self.cells.values() {
            for &column in &cell.columns {
                columns.entry(column).or_default().push(cell.text.clone());
            }
        }
        columns
    }

    #[must_use]
    pub fn rows_text(&self) -> BTreeMap<usize, Vec<String>> {
        let mut rows: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for cell in self.cells.values() {
            for &row in &cell.rows {
                rows.entry(row).or_default().push(cell.text.clone());
            }
        }
        rows
    }
}

impl FromIterator<(String, Cell)> for CellTable {
    fn from_iter<T: IntoIterator<Item = (String, Cell)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

fn check_run(cell_id: &str, axis: &str, indices: &[usize]) -> Result<usize, StructureError> {
    let malformed = |reason: String| StructureError::MalformedCell {
        cell_id: cell_id.to_string(),
        reason,
    };

    let Some(&last) = indices.last() else {
        return Err(malformed(format!("{axis} must not be empty")));
    };

    if indices
        .windows(2)
        .any(|pair| pair[0].checked_add(1) != Some(pair[1]))
    {
        return Err(malformed(format!(
            "{axis} {indices:?} are not a contiguous ascending run"
        )));
    }

    last.checked_add(1)
        .ok_or_else(|| malformed(format!("{axis} index {last} is out of range")))
}
