//! Coordinate-addressed sheet grid
//!
//! The grid is the crate's own contract for a single worksheet: cells are
//! written by zero-based `(column, row)` coordinates and the occupied range is
//! declared once when the grid is complete. Spreadsheet libraries only see
//! the grid through the persistence adapter in [`crate::export::writer`].

pub mod address;
pub mod grid;

pub use address::{CellCoord, CellRange, MAX_COLS, MAX_ROWS, cell_address, column_name};
pub use grid::{Cell, CellKind, SheetGrid};
