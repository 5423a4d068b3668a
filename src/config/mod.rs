//! Configuration management for indexsheet
//!
//! This module handles loading, parsing, and validating configuration from:
//! - Configuration files (TOML format)
//! - Command-line arguments (applied by the CLI layer)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::model::FieldList;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Search backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Export configuration
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Search backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the search server
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Scroll lease kept alive between pages (e.g. `1s`, `1m`)
    #[serde(default = "default_scroll")]
    pub scroll: String,

    /// Hits requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Maximum number of pages fetched before giving up
    #[serde(default = "default_max_pages")]
    pub max_pages: u64,
}

/// Export configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Fields exported when `--report-fields` is not given
    #[serde(default)]
    pub report_fields: FieldList,

    /// Name of the worksheet
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Show a progress bar while fetching
    #[serde(default = "default_progress")]
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_scroll() -> String {
    "1s".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_max_pages() -> u64 {
    100_000
}

fn default_sheet_name() -> String {
    "indexitems".to_string()
}

fn default_progress() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout: default_timeout(),
            scroll: default_scroll(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            report_fields: FieldList::default(),
            sheet_name: default_sheet_name(),
            progress: default_progress(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".indexsheet")
            .join("config.toml")
    }

    /// Load configuration from a file
    ///
    /// With no explicit path the default location is tried, and a missing
    /// default file yields the default configuration. An explicit path that
    /// does not exist is an error.
    ///
    /// # Arguments
    /// * `path` - Optional path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_config_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            ConfigError::InvalidFormat(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Serialize the configuration as TOML with a short header
    pub fn to_toml_with_comments(&self) -> Result<String> {
        let body = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        Ok(format!(
            "# indexsheet configuration\n# Location: {}\n\n{}",
            Self::default_config_path().display(),
            body
        ))
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        self.backend.validate()?;
        self.export.validate()?;
        Ok(())
    }
}

impl BackendConfig {
    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Validate backend settings
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(invalid("backend.url", &self.url));
        }
        if self.timeout == 0 {
            return Err(invalid("backend.timeout", "0"));
        }
        if self.page_size == 0 {
            return Err(invalid("backend.page_size", "0"));
        }
        if self.max_pages == 0 {
            return Err(invalid("backend.max_pages", "0"));
        }
        if !is_valid_lease(&self.scroll) {
            return Err(invalid("backend.scroll", &self.scroll));
        }
        Ok(())
    }
}

impl ExportConfig {
    /// Validate export settings
    pub fn validate(&self) -> Result<()> {
        if !is_valid_sheet_name(&self.sheet_name) {
            return Err(invalid("export.sheet_name", &self.sheet_name));
        }
        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn invalid(field: &str, value: &str) -> crate::error::IndexSheetError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

/// Whether `lease` is a backend time unit such as `1s`, `500ms` or `2m`
pub fn is_valid_lease(lease: &str) -> bool {
    let split = lease
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(lease.len());
    let (amount, unit) = lease.split_at(split);

    !amount.is_empty()
        && amount.chars().any(|c| c != '0')
        && matches!(unit, "d" | "h" | "m" | "s" | "ms" | "micros" | "nanos")
}

/// Whether `name` is accepted as a worksheet name
pub fn is_valid_sheet_name(name: &str) -> bool {
    const FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

    let len = name.chars().count();
    (1..=31).contains(&len)
        && !name.contains(FORBIDDEN)
        && !name.starts_with('\'')
        && !name.ends_with('\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.url, "http://localhost:9200");
        assert_eq!(config.backend.scroll, "1s");
        assert_eq!(config.backend.page_size, 100);
        assert_eq!(config.export.sheet_name, "indexitems");
        assert_eq!(config.export.report_fields, FieldList::default());
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [backend]
            url = "http://search.internal:9200"
            page_size = 500

            [export]
            report_fields = ["url", "title"]
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.url, "http://search.internal:9200");
        assert_eq!(config.backend.page_size, 500);
        assert_eq!(config.backend.scroll, "1s");
        assert_eq!(config.export.report_fields.as_slice(), &["url", "title"]);
        assert_eq!(config.export.sheet_name, "indexitems");
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.backend.max_pages = 42;
        config.logging.level = LogLevel::Debug;

        let text = config.to_toml_with_comments().unwrap();
        assert!(text.starts_with("# indexsheet configuration"));
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml("[backend\nurl=").is_err());
        assert!(Config::from_toml(r#"[export]
report_fields = []"#)
        .is_err());
    }

    #[test]
    fn test_explicit_missing_file() {
        let err = Config::load_from_file(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend]\nscroll = \"30s\"\n").unwrap();

        let config = Config::load_from_file(Some(&path)).unwrap();
        assert_eq!(config.backend.scroll, "30s");
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::default();
        config.backend.page_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.backend.scroll = "soon".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.export.sheet_name = "bad/name".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lease_format() {
        assert!(is_valid_lease("1s"));
        assert!(is_valid_lease("500ms"));
        assert!(is_valid_lease("2m"));
        assert!(!is_valid_lease("0s"));
        assert!(!is_valid_lease("s"));
        assert!(!is_valid_lease("10"));
        assert!(!is_valid_lease("1w"));
    }

    #[test]
    fn test_sheet_names() {
        assert!(is_valid_sheet_name("indexitems"));
        assert!(!is_valid_sheet_name(""));
        assert!(!is_valid_sheet_name("a:b"));
        assert!(!is_valid_sheet_name("'quoted'"));
        assert!(!is_valid_sheet_name(&"x".repeat(32)));
    }

    #[test]
    fn test_request_timeout() {
        let config = Config::default();
        assert_eq!(config.backend.request_timeout(), Duration::from_secs(30));
    }
}
