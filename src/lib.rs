//! indexsheet library
//!
//! Exports every document of a search index to a single-sheet `.xlsx`
//! workbook: one header row with the report fields, then one row per
//! document.
//!
//! # Modules
//!
//! - `backend`: Search engine access (Elasticsearch scroll API)
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and exit codes
//! - `export`: Sheet building, writing and the export coordinator
//! - `fetcher`: Paginated bulk fetch
//! - `model`: Field lists, records and queries
//! - `sheet`: Coordinate-addressed sheet grid
//!
//! # Example
//!
//! ```no_run
//! use indexsheet::{Config, ElasticBackend, ExportCoordinator, FieldList, QuerySpec, XlsxWriter};
//!
//! #[tokio::main]
//! async fn main() -> indexsheet::Result<()> {
//!     let config = Config::default();
//!     let backend = ElasticBackend::new(&config.backend)?;
//!     let writer = XlsxWriter::new("/tmp/crawl.xlsx", "indexitems");
//!
//!     let spec = QuerySpec::new("crawl", FieldList::parse("host,url")?)
//!         .with_host_filter(Some("example.com".to_string()));
//!     let options = (&config.backend).into();
//!     let result = ExportCoordinator::new(Box::new(backend), Box::new(writer), options)
//!         .execute(&spec)
//!         .await?;
//!
//!     println!("Exported {} records", result.records_exported);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod model;
pub mod sheet;

// Re-export commonly used types
pub use backend::{ElasticBackend, SearchBackend};
pub use config::Config;
pub use error::{IndexSheetError, Result};
pub use export::{ExportCoordinator, ExportResult, XlsxWriter};
pub use fetcher::BulkFetcher;
pub use model::{FieldList, QuerySpec, Record, ResultSet};
pub use sheet::SheetGrid;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
