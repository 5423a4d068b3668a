//! Sheet writers
//!
//! A [`SheetWriter`] receives a finished [`SheetGrid`] and persists it. The
//! grid is moved into the writer, so nothing can change it after hand-off.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook};
use tracing::debug;

use crate::error::{GridError, PersistError, Result};
use crate::sheet::{CellCoord, SheetGrid};

/// Trait for persisting a finished sheet
#[async_trait]
pub trait SheetWriter: Send {
    /// Persist `grid`
    ///
    /// # Arguments
    /// * `grid` - Sealed grid; ownership moves to the writer
    ///
    /// # Returns
    /// * `Result<u64>` - Number of bytes written
    async fn write_sheet(&mut self, grid: SheetGrid) -> Result<u64>;

    /// Where the sheet ends up, for reporting
    fn target(&self) -> String;
}

/// Writes a single-sheet `.xlsx` workbook
///
/// The workbook is encoded in memory and written through a temporary file
/// in the destination directory that is renamed over the target, so a
/// failed write never leaves a partial file behind.
pub struct XlsxWriter {
    path: PathBuf,
    sheet_name: String,
}

impl XlsxWriter {
    /// Create a writer for `path`
    ///
    /// # Arguments
    /// * `path` - Validated output path
    /// * `sheet_name` - Name of the single worksheet
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name.into(),
        }
    }
}

#[async_trait]
impl SheetWriter for XlsxWriter {
    async fn write_sheet(&mut self, grid: SheetGrid) -> Result<u64> {
        let bytes = encode_workbook(&grid, &self.sheet_name)?;
        drop(grid);
        debug!("Encoded workbook: {} bytes", bytes.len());

        let path = self.path.clone();
        let written = tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(|e| PersistError::Io {
                path: self.path.display().to_string(),
                source: io::Error::other(e),
            })??;

        debug!("Wrote {} ({} bytes)", self.path.display(), written);
        Ok(written)
    }

    fn target(&self) -> String {
        self.path.display().to_string()
    }
}

/// Encode `grid` as an `.xlsx` workbook with one sheet
///
/// Every written cell becomes a string cell. The bottom-right corner of the
/// declared range is stored as a blank cell when nothing was written there,
/// so the sheet's dimension matches the declared range.
pub fn encode_workbook(grid: &SheetGrid, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(PersistError::from)?;

    for (coord, cell) in grid.cells() {
        let (row, col) = excel_position(coord)?;
        worksheet
            .write_string(row, col, cell.value.as_str())
            .map_err(PersistError::from)?;
    }

    if let Some(range) = grid.range() {
        let corner = range.end;
        if grid.cell(corner.col, corner.row).is_err() {
            let (row, col) = excel_position(corner)?;
            worksheet
                .write_blank(row, col, &Format::new())
                .map_err(PersistError::from)?;
        }
    }

    Ok(workbook.save_to_buffer().map_err(PersistError::from)?)
}

fn excel_position(coord: CellCoord) -> Result<(RowNum, ColNum)> {
    let col = ColNum::try_from(coord.col).map_err(|_| GridError::OutOfBounds {
        col: coord.col,
        row: coord.row,
    })?;
    Ok((coord.row, col))
}

/// Write `bytes` to `path` through a sibling temporary file
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<u64> {
    let io_err = |source: io::Error| PersistError::Io {
        path: path.display().to_string(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".indexsheet-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(bytes.len() as u64)
}
