//! Data model shared by the fetcher and the sheet builder
//!
//! - [`FieldList`]: the ordered, unique report fields; the single source of
//!   truth for column order
//! - [`QuerySpec`]: what to export from which index
//! - [`Record`] and [`ResultSet`]: projected hits in arrival order

pub mod fields;
pub mod record;

pub use fields::{DEFAULT_REPORT_FIELDS, FieldList};
pub use record::{Record, ResultSet, render_value};

/// Field the host filter is matched against.
pub const HOST_FIELD: &str = "host";

/// Parameters of a single export. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    /// Index to export
    pub index: String,
    /// Fields to project, in column order
    pub fields: FieldList,
    /// Optional equality predicate on [`HOST_FIELD`]
    pub host_filter: Option<String>,
}

impl QuerySpec {
    /// Create a query over `index` without a filter
    pub fn new(index: impl Into<String>, fields: FieldList) -> Self {
        Self {
            index: index.into(),
            fields,
            host_filter: None,
        }
    }

    /// Restrict the export to documents whose host equals `host`
    ///
    /// Blank hosts are treated as no filter.
    pub fn with_host_filter(mut self, host: Option<String>) -> Self {
        self.host_filter = host.filter(|h| !h.trim().is_empty());
        self
    }
}
