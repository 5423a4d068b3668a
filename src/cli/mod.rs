//! Command-line interface for indexsheet
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and merging with arguments
//! - The `config`, `completion` and `version` subcommands
//!
//! The `dump-index` export itself is driven from `main.rs`.

pub mod completion;

use clap::{Args, Parser, Subcommand};
use nu_ansi_term::Color;
use std::path::PathBuf;
use tracing::debug;

use crate::config::{Config, LogLevel};
use crate::error::Result;
use crate::model::{FieldList, QuerySpec};

/// Default search server host
pub const DEFAULT_SERVER: &str = "localhost";

/// Default search server port
pub const DEFAULT_PORT: u16 = 9200;

/// Export a search index to an Excel workbook
#[derive(Parser, Debug)]
#[command(
    name = "indexsheet",
    version,
    about = "Dump a search index to an xlsx spreadsheet",
    long_about = "Fetches every document of an Elasticsearch index with the scroll API and
writes the selected fields to a single-sheet .xlsx workbook."
)]
pub struct CliArgs {
    /// Search server host
    #[arg(long, value_name = "HOST", global = true)]
    pub server: Option<String>,

    /// Search server port
    #[arg(long, value_name = "PORT", global = true)]
    pub port: Option<u16>,

    /// Full base URL of the search server (overrides --server and --port)
    #[arg(long, value_name = "URL", global = true)]
    pub url: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    /// Do not draw a progress bar
    #[arg(long = "no-progress", global = true)]
    pub no_progress: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", global = true)]
    pub timeout: Option<u64>,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for indexsheet
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dump all records of an index to an Excel file
    #[command(visible_alias = "dumpindextoexcel")]
    DumpIndex(DumpIndexArgs),

    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// Arguments of `dump-index`
#[derive(Args, Debug, Clone)]
pub struct DumpIndexArgs {
    /// Name of the index to export
    #[arg(value_name = "INDEX")]
    pub index: String,

    /// Output file; `.xlsx` is appended when there is no extension
    #[arg(value_name = "OUTPUT")]
    pub output: String,

    /// Comma-separated fields to report, in column order
    #[arg(short = 'r', long, value_name = "FIELDS")]
    pub report_fields: Option<String>,

    /// Only export records whose host matches
    #[arg(short = 'f', long, value_name = "HOST")]
    pub host_filter: Option<String>,

    /// Hits requested per page
    #[arg(long, value_name = "N")]
    pub page_size: Option<u32>,

    /// Scroll lease, e.g. 1s or 1m
    #[arg(long, value_name = "LEASE")]
    pub scroll: Option<String>,

    /// Maximum number of pages before giving up
    #[arg(long, value_name = "N")]
    pub max_pages: Option<u64>,

    /// Name of the worksheet
    #[arg(long, value_name = "NAME")]
    pub sheet_name: Option<String>,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Effective configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// The merged result is validated, so an out-of-range value from
    /// either source is reported before any work starts.
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args)?;

        // `config --validate` reports problems itself
        if !matches!(args.command, Commands::Config { .. }) {
            config.validate()?;
        }
        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Whether colored output is enabled
    pub fn color_enabled(&self) -> bool {
        !self.args.no_color
    }

    /// Build the query for a `dump-index` invocation
    ///
    /// Fields come from `-r` when given, otherwise from the configuration.
    pub fn query_spec(&self, dump: &DumpIndexArgs) -> QuerySpec {
        QuerySpec::new(dump.index.clone(), self.config.export.report_fields.clone())
            .with_host_filter(dump.host_filter.clone())
    }

    /// Log the resolved export parameters
    pub fn log_parameters(&self, spec: &QuerySpec, output: &std::path::Path) {
        debug!("Index: {}", spec.index);
        debug!("Report fields: {}", spec.fields);
        debug!("Backend: {}", self.config.backend.url);
        match &spec.host_filter {
            Some(host) => debug!("Host filter: {}", host),
            None => debug!("Host filter: none"),
        }
        debug!("Output: {}", output.display());
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) -> Result<()> {
        Self::apply_logging_args(config, args);
        Self::apply_backend_args(config, args);
        if let Commands::DumpIndex(dump) = &args.command {
            Self::apply_dump_args(config, dump)?;
        }
        if args.no_progress || args.quiet {
            config.export.progress = false;
        }
        Ok(())
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Apply backend-related CLI arguments to configuration
    fn apply_backend_args(config: &mut Config, args: &CliArgs) {
        if let Some(url) = Self::backend_url(args) {
            config.backend.url = url;
        }
        if let Some(timeout) = args.timeout {
            config.backend.timeout = timeout;
        }
    }

    /// Apply `dump-index` options to configuration
    fn apply_dump_args(config: &mut Config, dump: &DumpIndexArgs) -> Result<()> {
        if let Some(fields) = &dump.report_fields {
            config.export.report_fields = FieldList::parse(fields)?;
        }
        if let Some(page_size) = dump.page_size {
            config.backend.page_size = page_size;
        }
        if let Some(scroll) = &dump.scroll {
            config.backend.scroll = scroll.clone();
        }
        if let Some(max_pages) = dump.max_pages {
            config.backend.max_pages = max_pages;
        }
        if let Some(sheet_name) = &dump.sheet_name {
            config.export.sheet_name = sheet_name.clone();
        }
        Ok(())
    }

    /// Backend URL requested on the command line, if any
    ///
    /// Priority:
    /// 1. `--url`
    /// 2. `--server` and/or `--port`, the other filled from defaults
    fn backend_url(args: &CliArgs) -> Option<String> {
        if let Some(url) = &args.url {
            return Some(url.clone());
        }
        if args.server.is_none() && args.port.is_none() {
            return None;
        }

        let server = args.server.as_deref().unwrap_or(DEFAULT_SERVER);
        let port = args.port.unwrap_or(DEFAULT_PORT);
        Some(format!("http://{}:{}", server, port))
    }

    /// Handle the subcommands that do not export anything
    ///
    /// # Returns
    /// * `Result<bool>` - True if a subcommand was handled, false for `dump-index`
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Commands::Version => {
                self.show_version();
                Ok(true)
            }
            Commands::Completion { shell } => {
                completion::generate_completion(shell)?;
                Ok(true)
            }
            Commands::Config { show, validate } => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            Commands::DumpIndex(_) => Ok(false),
        }
    }

    /// Show version information
    fn show_version(&self) {
        println!("indexsheet version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file()?;
        }

        if show || !validate {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            let notice = "Configuration file does not exist, defaults apply";
            println!("{}", self.paint(Color::Yellow, notice));
            return Ok(());
        }

        let outcome =
            Config::load_from_file(Some(path.as_path())).and_then(|config| config.validate());
        match outcome {
            Ok(()) => println!("{}", self.paint(Color::Green, "Configuration is valid")),
            Err(e) => {
                println!("{}", self.paint(Color::Red, "Configuration is invalid"));
                return Err(e);
            }
        }

        Ok(())
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("=== Effective Configuration ===");
        println!();
        println!("{}", self.config.to_toml_with_comments()?);
        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_config_path)
    }

    /// Print the final success line of an export
    pub fn print_success(&self, path: &std::path::Path) {
        if !self.args.quiet {
            println!(
                "{} {}",
                self.paint(Color::Green, "Results written to"),
                path.display()
            );
        }
    }

    /// Print a failure to stderr
    pub fn print_failure(&self, message: &str) {
        eprintln!("{}", self.paint(Color::Red, message));
    }

    fn paint(&self, color: Color, text: &str) -> String {
        if self.color_enabled() {
            color.paint(text).to_string()
        } else {
            text.to_string()
        }
    }
}
