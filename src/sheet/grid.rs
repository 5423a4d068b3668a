//! In-memory sheet grid

use std::collections::BTreeMap;

use crate::error::GridError;

use super::address::{CellCoord, CellRange};

/// Type tag of a cell. Exports only ever write text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Text,
}

/// A written cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub value: String,
    pub kind: CellKind,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: CellKind::Text,
        }
    }
}

/// Coordinate-addressed table with a declared occupied range.
///
/// Cells are written with [`set_cell`](Self::set_cell); once every cell is
/// in place the occupied range is declared exactly once with
/// [`set_range`](Self::set_range), after which the grid is sealed.
#[derive(Debug, Clone, Default)]
pub struct SheetGrid {
    /// Keyed by `(row, col)` so iteration is row-major
    cells: BTreeMap<(u32, u32), Cell>,
    max_col: Option<u32>,
    max_row: Option<u32>,
    range: Option<CellRange>,
}

impl SheetGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a text cell at zero-based `(col, row)`
    pub fn set_cell(
        &mut self,
        col: u32,
        row: u32,
        value: impl Into<String>,
    ) -> Result<(), GridError> {
        if self.range.is_some() {
            return Err(GridError::Sealed { col, row });
        }
        if !CellCoord::new(col, row).in_bounds() {
            return Err(GridError::OutOfBounds { col, row });
        }

        self.cells.insert((row, col), Cell::text(value));
        self.max_col = Some(self.max_col.map_or(col, |c| c.max(col)));
        self.max_row = Some(self.max_row.map_or(row, |r| r.max(row)));
        Ok(())
    }

    /// Declare the occupied range
    ///
    /// May only be called once, and the rectangle must cover every written
    /// cell.
    pub fn set_range(
        &mut self,
        top_left: CellCoord,
        bottom_right: CellCoord,
    ) -> Result<(), GridError> {
        if self.range.is_some() {
            return Err(GridError::RangeAlreadySet);
        }

        let range = CellRange::new(top_left, bottom_right);
        if !range.is_ordered() {
            return Err(GridError::InvertedRange(range.to_a1()));
        }
        if !bottom_right.in_bounds() {
            return Err(GridError::OutOfBounds {
                col: bottom_right.col,
                row: bottom_right.row,
            });
        }
        if let Some(&(row, col)) = self
            .cells
            .keys()
            .find(|&&(row, col)| !range.contains(CellCoord::new(col, row)))
        {
            return Err(GridError::RangeTooSmall {
                range: range.to_a1(),
                col,
                row,
            });
        }

        self.range = Some(range);
        Ok(())
    }

    /// Read a written cell; unset cells are an error
    pub fn cell(&self, col: u32, row: u32) -> Result<&Cell, GridError> {
        self.cells
            .get(&(row, col))
            .ok_or(GridError::UnsetCell { col, row })
    }

    /// Declared occupied range, if any
    pub fn range(&self) -> Option<CellRange> {
        self.range
    }

    /// Whether the range has been declared
    pub fn is_sealed(&self) -> bool {
        self.range.is_some()
    }

    /// Highest written column plus one
    pub fn column_count(&self) -> u32 {
        self.max_col.map_or(0, |c| c + 1)
    }

    /// Highest written row plus one
    pub fn row_count(&self) -> u32 {
        self.max_row.map_or(0, |r| r + 1)
    }

    /// Number of written cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Written cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, &Cell)> {
        self.cells
            .iter()
            .map(|(&(row, col), cell)| (CellCoord::new(col, row), cell))
    }
}
