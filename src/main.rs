//! indexsheet - dump a search index to an Excel workbook
//!
//! # Usage
//!
//! ```bash
//! # Default fields, local server
//! indexsheet dump-index crawl report
//!
//! # Selected fields, one host only
//! indexsheet --server es.internal dump-index crawl report.xlsx -r host,url -f example.com
//! ```

use std::process;

use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use indexsheet::backend::ElasticBackend;
use indexsheet::cli::{CliInterface, Commands, DumpIndexArgs};
use indexsheet::error::{IndexSheetError, Result};
use indexsheet::export::{ExportCoordinator, XlsxWriter, resolve_output_path};
use indexsheet::fetcher::FetchOptions;

/// Application entry point
#[tokio::main]
async fn main() {
    let cli = match CliInterface::new() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    };

    initialize_logging(&cli);

    if let Err(e) = run(&cli).await {
        cli.print_failure(&failure_message(&cli, &e));
        process::exit(e.exit_code());
    }
}

/// Main application logic
///
/// 1. Handle subcommands that do not export
/// 2. Otherwise run the `dump-index` export
async fn run(cli: &CliInterface) -> Result<()> {
    if cli.handle_subcommand()? {
        return Ok(());
    }

    match &cli.args().command {
        Commands::DumpIndex(dump) => dump_index(cli, dump).await,
        _ => Ok(()),
    }
}

/// Export one index to an xlsx file
///
/// The output path is resolved before the backend is contacted, so a bad
/// path or extension fails without any network traffic.
async fn dump_index(cli: &CliInterface, dump: &DumpIndexArgs) -> Result<()> {
    let config = cli.config();
    let path = resolve_output_path(&dump.output)?;
    let spec = cli.query_spec(dump);
    cli.log_parameters(&spec, &path);

    let backend = ElasticBackend::new(&config.backend)?;
    let writer = XlsxWriter::new(&path, config.export.sheet_name.clone());
    let mut coordinator = ExportCoordinator::new(
        Box::new(backend),
        Box::new(writer),
        FetchOptions::from(&config.backend),
    )
    .with_progress(config.export.progress);

    let result = coordinator.execute(&spec).await?;
    info!(
        "Wrote {} records ({} pages, range {}) to {}",
        result.records_exported, result.pages, result.range, result.target
    );

    cli.print_success(&path);
    Ok(())
}

/// Failure line naming the phase, and the index for exports
fn failure_message(cli: &CliInterface, error: &IndexSheetError) -> String {
    match &cli.args().command {
        Commands::DumpIndex(dump) => format!(
            "Export of index '{}' failed during {}: {}",
            dump.index,
            error.phase(),
            error
        ),
        _ => format!("Error: {}", error),
    }
}

/// Initialize logging system based on verbosity level
///
/// Logs go to stderr. `RUST_LOG` takes precedence over the configured level.
fn initialize_logging(cli: &CliInterface) {
    let level: Level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},hyper=warn,reqwest=warn",
            level.as_str().to_lowercase()
        ))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // Configure timestamps
    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
