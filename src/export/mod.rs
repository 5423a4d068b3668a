//! Export pipeline from a search index to a spreadsheet file
//!
//! The export is built from three pieces:
//!
//! 1. **BulkFetcher** (in [`crate::fetcher`]) drains every matching record
//! 2. **build_grid** lays the records out as a header row plus one row per record
//! 3. **SheetWriter** persists the finished grid, [`XlsxWriter`] for `.xlsx`
//!
//! They are run in order by the [`ExportCoordinator`]. The output path is
//! checked up front with [`resolve_output_path`] so that a bad path never
//! costs a round-trip to the backend.
//!
//! # Example
//!
//! ```no_run
//! use indexsheet::backend::ElasticBackend;
//! use indexsheet::config::Config;
//! use indexsheet::export::{ExportCoordinator, XlsxWriter, resolve_output_path};
//! use indexsheet::model::{FieldList, QuerySpec};
//!
//! # async fn run() -> indexsheet::Result<()> {
//! let config = Config::default();
//! let path = resolve_output_path("crawl-report")?;
//! let backend = ElasticBackend::new(&config.backend)?;
//! let writer = XlsxWriter::new(path, "indexitems");
//!
//! let mut coordinator = ExportCoordinator::new(
//!     Box::new(backend),
//!     Box::new(writer),
//!     (&config.backend).into(),
//! );
//! let spec = QuerySpec::new("crawl", FieldList::default());
//! let result = coordinator.execute(&spec).await?;
//! println!("{} records", result.records_exported);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod coordinator;
pub mod path;
pub mod progress;
pub mod writer;

pub use builder::build_grid;
pub use coordinator::{ExportCoordinator, ExportResult};
pub use path::{XLSX_EXTENSION, normalize_output_path, resolve_output_path};
pub use progress::ProgressTracker;
pub use writer::{SheetWriter, XlsxWriter, encode_workbook};
