//! Sheet builder
//!
//! Lays out a [`ResultSet`] as a [`SheetGrid`]: the report fields form the
//! header row, every record becomes one dense row below it.

use tracing::debug;

use crate::error::{GridError, Result};
use crate::model::{FieldList, ResultSet};
use crate::sheet::{CellCoord, SheetGrid};

/// Build the sheet for `results`
///
/// Header cell `fields[i]` goes to `(i, 0)`, the value of field `i` for
/// record `j` to `(i, j + 1)`; absent values are written as empty strings so
/// no cell in the data rectangle is left unset. The occupied range is then
/// declared as `(0, 0)` to `(field_count, record_count + 1)`.
///
/// # Arguments
/// * `fields` - Report fields in column order
/// * `results` - Records in arrival order
///
/// # Returns
/// * `Result<SheetGrid>` - Sealed grid ready for a [`SheetWriter`](super::SheetWriter)
pub fn build_grid(fields: &FieldList, results: &ResultSet) -> Result<SheetGrid> {
    let field_count = grid_index(fields.len())?;
    let record_count = grid_index(results.len())?;

    let mut grid = SheetGrid::new();

    for (col, field) in (0u32..).zip(fields.iter()) {
        grid.set_cell(col, 0, field.as_str())?;
    }

    for (row, record) in (1u32..).zip(results.iter()) {
        for (col, field) in (0u32..).zip(fields.iter()) {
            grid.set_cell(col, row, record.get(field).unwrap_or(""))?;
        }
    }

    grid.set_range(
        CellCoord::new(0, 0),
        CellCoord::new(field_count, record_count.saturating_add(1)),
    )?;

    debug!(
        "Built sheet with {} columns and {} data rows, range {}",
        field_count,
        record_count,
        grid.range().map(|r| r.to_a1()).unwrap_or_default()
    );
    Ok(grid)
}

fn grid_index(count: usize) -> Result<u32> {
    u32::try_from(count).map_err(|_| {
        GridError::OutOfBounds {
            col: u32::MAX,
            row: u32::MAX,
        }
        .into()
    })
}
