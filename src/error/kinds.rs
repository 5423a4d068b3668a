use std::{fmt, io};

/// Crate-wide `Result` type using [`IndexSheetError`] as the error.
pub type Result<T> = std::result::Result<T, IndexSheetError>;

/// Exit code for invalid configuration, including a bad output path.
pub const EXIT_CONFIG: i32 = 5;

/// Exit code for failures while fetching from the search backend.
pub const EXIT_FETCH: i32 = 10;

/// Exit code for failures while writing the workbook.
pub const EXIT_PERSIST: i32 = 20;

/// Top-level error type for indexsheet operations.
///
/// Each variant corresponds to one phase of an export, so the binary can
/// map it to a distinct exit code.
#[derive(Debug)]
pub enum IndexSheetError {
    /// Configuration or argument errors, detected before any I/O.
    Config(ConfigError),

    /// Errors raised while draining the search backend.
    Fetch(FetchError),

    /// Errors raised while building or writing the workbook.
    Persist(PersistError),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Output path has an extension other than the workbook's.
    InvalidExtension(String),

    /// Output path cannot be used (missing directory, not a file name).
    InvalidOutputPath(String),

    /// Report field list is empty, has blanks or duplicates.
    InvalidFields(String),

    /// Free-form configuration problem.
    Generic(String),
}

/// Errors raised while fetching records from the search backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network or protocol failure before a response was received.
    Transport(String),

    /// Backend answered with a non-success status.
    Backend { status: u16, reason: String },

    /// Response body could not be decoded.
    MalformedResponse(String),

    /// A page was returned without a cursor while more records were expected.
    MissingCursor { fetched: u64, total: u64 },

    /// The accumulated record count can no longer reach the reported total.
    TotalMismatch { fetched: u64, total: u64 },

    /// The fetch used up its page budget before completing.
    PageBudgetExceeded {
        pages: u64,
        fetched: u64,
        total: u64,
    },
}

/// Errors raised while building or persisting the sheet.
#[derive(Debug)]
pub enum PersistError {
    /// The grid was rejected while being built or read.
    Grid(GridError),

    /// The spreadsheet library failed to encode the workbook.
    Workbook(String),

    /// Writing the output file failed.
    Io { path: String, source: io::Error },
}

/// Sheet grid contract violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A cell was read before it was written.
    UnsetCell { col: u32, row: u32 },

    /// The occupied range was declared more than once.
    RangeAlreadySet,

    /// A cell write was attempted after the range was declared.
    Sealed { col: u32, row: u32 },

    /// The declared range does not cover every written cell.
    RangeTooSmall { range: String, col: u32, row: u32 },

    /// The range corners are out of order.
    InvertedRange(String),

    /// The grid exceeds what the target format can address.
    OutOfBounds { col: u32, row: u32 },
}

impl IndexSheetError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            IndexSheetError::Config(_) | IndexSheetError::Generic(_) => EXIT_CONFIG,
            IndexSheetError::Fetch(_) => EXIT_FETCH,
            IndexSheetError::Persist(_) => EXIT_PERSIST,
        }
    }

    /// Name of the export phase that produced this error.
    pub fn phase(&self) -> &'static str {
        match self {
            IndexSheetError::Config(_) | IndexSheetError::Generic(_) => "configuration",
            IndexSheetError::Fetch(_) => "fetch",
            IndexSheetError::Persist(_) => "write",
        }
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for IndexSheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSheetError::Config(e) => write!(f, "Configuration error: {e}"),
            IndexSheetError::Fetch(e) => write!(f, "Fetch error: {e}"),
            IndexSheetError::Persist(e) => write!(f, "Write error: {e}"),
            IndexSheetError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::InvalidExtension(ext) => {
                write!(f, "Extension, .{ext}, not allowed. Must end in xlsx")
            }
            ConfigError::InvalidOutputPath(msg) => write!(f, "Invalid output path: {msg}"),
            ConfigError::InvalidFields(msg) => write!(f, "Invalid report fields: {msg}"),
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "Request failed: {msg}"),
            FetchError::Backend { status, reason } => {
                write!(f, "Backend returned {status}: {reason}")
            }
            FetchError::MalformedResponse(msg) => write!(f, "Malformed response: {msg}"),
            FetchError::MissingCursor { fetched, total } => write!(
                f,
                "Backend returned no scroll id after {fetched} of {total} records"
            ),
            FetchError::TotalMismatch { fetched, total } => write!(
                f,
                "Backend stopped converging: fetched {fetched} records, reported total is {total}"
            ),
            FetchError::PageBudgetExceeded {
                pages,
                fetched,
                total,
            } => write!(
                f,
                "Gave up after {pages} pages with {fetched} of {total} records fetched"
            ),
        }
    }
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Grid(e) => write!(f, "Invalid sheet: {e}"),
            PersistError::Workbook(msg) => write!(f, "Failed to encode workbook: {msg}"),
            PersistError::Io { path, source } => write!(f, "Failed to write {path}: {source}"),
        }
    }
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::UnsetCell { col, row } => {
                write!(f, "Cell at column {col}, row {row} was never written")
            }
            GridError::RangeAlreadySet => write!(f, "Occupied range was already declared"),
            GridError::Sealed { col, row } => write!(
                f,
                "Cannot write column {col}, row {row} after the range was declared"
            ),
            GridError::RangeTooSmall { range, col, row } => write!(
                f,
                "Range {range} does not cover the cell at column {col}, row {row}"
            ),
            GridError::InvertedRange(range) => write!(f, "Range {range} is inverted"),
            GridError::OutOfBounds { col, row } => write!(
                f,
                "Cell at column {col}, row {row} is outside the worksheet limits"
            ),
        }
    }
}

impl std::error::Error for IndexSheetError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for FetchError {}
impl std::error::Error for GridError {}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Io { source, .. } => Some(source),
            PersistError::Grid(e) => Some(e),
            PersistError::Workbook(_) => None,
        }
    }
}

/* ========================= Conversions to IndexSheetError ========================= */

impl From<ConfigError> for IndexSheetError {
    fn from(err: ConfigError) -> Self {
        IndexSheetError::Config(err)
    }
}

impl From<FetchError> for IndexSheetError {
    fn from(err: FetchError) -> Self {
        IndexSheetError::Fetch(err)
    }
}

impl From<PersistError> for IndexSheetError {
    fn from(err: PersistError) -> Self {
        IndexSheetError::Persist(err)
    }
}

impl From<GridError> for PersistError {
    fn from(err: GridError) -> Self {
        PersistError::Grid(err)
    }
}

impl From<GridError> for IndexSheetError {
    fn from(err: GridError) -> Self {
        IndexSheetError::Persist(PersistError::Grid(err))
    }
}

impl From<rust_xlsxwriter::XlsxError> for PersistError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        PersistError::Workbook(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for IndexSheetError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        IndexSheetError::Persist(err.into())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::MalformedResponse(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl From<reqwest::Error> for IndexSheetError {
    fn from(err: reqwest::Error) -> Self {
        IndexSheetError::Fetch(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let config: IndexSheetError = ConfigError::InvalidExtension("csv".into()).into();
        let fetch: IndexSheetError = FetchError::Transport("refused".into()).into();
        let persist: IndexSheetError = GridError::RangeAlreadySet.into();

        assert_eq!(config.exit_code(), EXIT_CONFIG);
        assert_eq!(fetch.exit_code(), EXIT_FETCH);
        assert_eq!(persist.exit_code(), EXIT_PERSIST);
        assert_ne!(EXIT_CONFIG, EXIT_FETCH);
        assert_ne!(EXIT_FETCH, EXIT_PERSIST);
    }

    #[test]
    fn test_phase_names() {
        let fetch: IndexSheetError = FetchError::TotalMismatch {
            fetched: 3,
            total: 5,
        }
        .into();
        assert_eq!(fetch.phase(), "fetch");

        let persist: IndexSheetError = PersistError::Workbook("bad".into()).into();
        assert_eq!(persist.phase(), "write");
    }

    #[test]
    fn test_display_messages() {
        let err = ConfigError::InvalidExtension("csv".into());
        assert_eq!(
            err.to_string(),
            "Extension, .csv, not allowed. Must end in xlsx"
        );

        let err = FetchError::Backend {
            status: 404,
            reason: "no such index [crawl]".into(),
        };
        assert_eq!(
            err.to_string(),
            "Backend returned 404: no such index [crawl]"
        );

        let err = GridError::UnsetCell { col: 2, row: 7 };
        assert!(err.to_string().contains("column 2, row 7"));
    }
}
