//! Export coordinator for orchestrating export operations
//!
//! This module brings together the bulk fetcher, the sheet builder and a
//! sheet writer to perform one export: fetch everything, lay it out, write it.

use std::time::Instant;

use tracing::{debug, info};

use crate::backend::SearchBackend;
use crate::error::Result;
use crate::fetcher::{BulkFetcher, FetchOptions};
use crate::model::QuerySpec;

use super::builder::build_grid;
use super::progress::ProgressTracker;
use super::writer::SheetWriter;

/// Result of an export operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Number of records exported
    pub records_exported: u64,
    /// Number of data columns
    pub columns: usize,
    /// Pages fetched from the backend
    pub pages: u64,
    /// Occupied range declared on the sheet, in A1 notation
    pub range: String,
    /// File size in bytes
    pub file_size_bytes: u64,
    /// Where the sheet was written
    pub target: String,
    /// Time taken for export
    pub elapsed_ms: u64,
}

/// Coordinator for export operations
///
/// Runs the three phases strictly in sequence. Each phase's error is
/// returned as-is; nothing is retried and nothing is written unless the
/// fetch completed.
pub struct ExportCoordinator {
    /// Search backend to drain
    backend: Box<dyn SearchBackend>,
    /// Writer for the finished sheet
    writer: Box<dyn SheetWriter>,
    /// Pagination settings
    options: FetchOptions,
    /// Whether to draw a progress bar
    show_progress: bool,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    pub fn new(
        backend: Box<dyn SearchBackend>,
        writer: Box<dyn SheetWriter>,
        options: FetchOptions,
    ) -> Self {
        Self {
            backend,
            writer,
            options,
            show_progress: false,
        }
    }

    /// Draw a progress bar while fetching
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Execute the export operation
    ///
    /// 1. Fetch every matching record
    /// 2. Build the sheet grid
    /// 3. Hand the grid to the writer
    ///
    /// # Arguments
    /// * `spec` - What to export
    ///
    /// # Returns
    /// * `Result<ExportResult>` - Export statistics or error
    pub async fn execute(&mut self, spec: &QuerySpec) -> Result<ExportResult> {
        let start_time = Instant::now();
        info!("Starting export of index '{}'", spec.index);

        let tracker = ProgressTracker::new(None, self.show_progress);
        let mut fetcher =
            BulkFetcher::new(self.backend.as_ref(), self.options.clone()).with_progress(&tracker);
        let fetched = fetcher.fetch(spec).await;
        tracker.finish();
        let results = fetched?;
        let pages = fetcher.pages();
        let records_exported = results.len() as u64;

        debug!("Building sheet for {} records", results.len());
        let grid = build_grid(&spec.fields, &results)?;
        let range = grid.range().map(|r| r.to_a1()).unwrap_or_default();
        drop(results);

        debug!("Writing sheet to {}", self.writer.target());
        let file_size_bytes = self.writer.write_sheet(grid).await?;

        let result = ExportResult {
            records_exported,
            columns: spec.fields.len(),
            pages,
            range,
            file_size_bytes,
            target: self.writer.target(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Export completed: {} records, {} bytes, {} ms",
            result.records_exported, result.file_size_bytes, result.elapsed_ms
        );
        Ok(result)
    }
}
