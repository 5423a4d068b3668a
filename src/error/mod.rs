//! Error handling for index exports.
//!
//! This module provides:
//! - Application-specific error kinds, one per export phase
//! - Exit-code mapping so the binary can report the failing phase
//! - Structured extraction of error bodies returned by the search backend
//!
//! # Example
//!
//! ```rust,no_run
//! use indexsheet::error::{ConfigError, Result};
//!
//! fn check_fields(fields: &[String]) -> Result<()> {
//!     if fields.is_empty() {
//!         return Err(ConfigError::InvalidFields("no fields given".to_string()).into());
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod kinds;

// Re-export commonly used types
pub use backend::BackendErrorInfo;
pub use kinds::{
    ConfigError, FetchError, GridError, IndexSheetError, PersistError, Result, EXIT_CONFIG,
    EXIT_FETCH, EXIT_PERSIST,
};
