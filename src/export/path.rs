//! Output path validation
//!
//! Output files must carry the workbook extension. A missing extension is
//! appended, any other extension is rejected before the export starts.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, Result};

/// Extension of written workbooks
pub const XLSX_EXTENSION: &str = "xlsx";

/// Resolve the output path given on the command line
///
/// The path is made absolute against the current directory, normalized, and
/// given the workbook extension. The parent directory must exist.
///
/// # Arguments
/// * `path` - Output path as typed by the user
///
/// # Returns
/// * `Result<PathBuf>` - Absolute path ending in `.xlsx`
pub fn resolve_output_path(path: &str) -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| {
        ConfigError::InvalidOutputPath(format!("cannot determine current directory: {e}"))
    })?;
    let resolved = normalize_output_path(path, &cwd)?;
    validate_parent(&resolved)?;
    debug!("Output path resolved to {}", resolved.display());
    Ok(resolved)
}

/// Normalize `path` against `base` and enforce the workbook extension
///
/// Pure: touches no file system.
pub fn normalize_output_path(path: &str, base: &Path) -> Result<PathBuf> {
    if path.trim().is_empty() {
        let err = ConfigError::InvalidOutputPath("path is empty".to_string());
        return Err(err.into());
    }

    let joined = base.join(path);
    let mut normalized = normalize_lexically(&joined);

    if normalized.file_name().is_none() || path.ends_with(['/', '\\']) {
        let err = ConfigError::InvalidOutputPath(format!("{path} is not a file name"));
        return Err(err.into());
    }

    match normalized.extension() {
        Some(ext) if ext.eq_ignore_ascii_case(XLSX_EXTENSION) => {}
        Some(ext) => {
            let err = ConfigError::InvalidExtension(ext.to_string_lossy().into_owned());
            return Err(err.into());
        }
        None => {
            let mut name: OsString = normalized
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_default();
            name.push(".");
            name.push(XLSX_EXTENSION);
            normalized.set_file_name(name);
        }
    }

    Ok(normalized)
}

/// Collapse `.` and `..` components without touching the file system
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // never climb above the root
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Check that the directory the file goes into exists
fn validate_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(ConfigError::InvalidOutputPath(format!(
                "directory does not exist: {}",
                parent.display()
            ))
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexSheetError;

    fn base() -> PathBuf {
        PathBuf::from("/srv/reports")
    }

    #[test]
    fn test_extension_appended() {
        let path = normalize_output_path("report", &base()).unwrap();
        assert_eq!(path, PathBuf::from("/srv/reports/report.xlsx"));
    }

    #[test]
    fn test_extension_kept() {
        let path = normalize_output_path("report.xlsx", &base()).unwrap();
        assert_eq!(path, PathBuf::from("/srv/reports/report.xlsx"));

        let path = normalize_output_path("REPORT.XLSX", &base()).unwrap();
        assert_eq!(path, PathBuf::from("/srv/reports/REPORT.XLSX"));
    }

    #[test]
    fn test_wrong_extension_rejected() {
        let err = normalize_output_path("report.csv", &base()).unwrap_err();
        assert!(matches!(
            err,
            IndexSheetError::Config(ConfigError::InvalidExtension(ref ext)) if ext == "csv"
        ));
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }

    #[test]
    fn test_dot_segments_collapsed() {
        let path = normalize_output_path("./out/../report", &base()).unwrap();
        assert_eq!(path, PathBuf::from("/srv/reports/report.xlsx"));

        let path = normalize_output_path("../../../../x", &base()).unwrap();
        assert_eq!(path, PathBuf::from("/x.xlsx"));
    }

    #[test]
    fn test_absolute_path_ignores_base() {
        let path = normalize_output_path("/tmp/dump", &base()).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/dump.xlsx"));
    }

    #[test]
    fn test_not_a_file_name() {
        assert!(normalize_output_path("", &base()).is_err());
        assert!(normalize_output_path("out/", &base()).is_err());
        assert!(normalize_output_path("..", &PathBuf::from("/")).is_err());
    }

    #[test]
    fn test_resolve_checks_parent() {
        let dir = tempfile::tempdir().unwrap();
        let ok = dir.path().join("report");
        let resolved = resolve_output_path(ok.to_str().unwrap()).unwrap();
        assert_eq!(resolved, dir.path().join("report.xlsx"));

        let missing = dir.path().join("nope").join("report");
        let err = resolve_output_path(missing.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("directory does not exist"));
    }
}
