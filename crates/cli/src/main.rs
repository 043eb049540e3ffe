//! # sheetseek-cli
//!
//! Command-line interface for finding records in remote spreadsheets.

mod output;
mod repl;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use sheetseek_config::{ConfigPatch, ConfigStore, FileConfigStore};
use sheetseek_core::{FieldConstraint, SeekError};
use sheetseek_session::{LoadOutcome, SearchSession};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use output::OutputFormat;

/// seek - find a single record in a remote spreadsheet
#[derive(Parser)]
#[command(name = "seek")]
#[command(
    author,
    version,
    about = "Find records in Google Sheets by column values",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short = 'c', long = "config", env = "SHEETSEEK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format (json, table)
    #[arg(short = 'f', long = "format", default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show or change the connection settings
    Configure {
        /// Spreadsheet identifier
        #[arg(long)]
        source: Option<String>,

        /// API key, or env:NAME to read it from the environment
        #[arg(long)]
        credential: Option<String>,

        /// Relay endpoint (empty string to stop using one)
        #[arg(long)]
        relay: Option<String>,

        /// Sheets API base URL (empty string for the default)
        #[arg(long = "api-base")]
        api_base: Option<String>,

        /// Default search fields, comma separated
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,

        /// Forget all stored settings
        #[arg(long, conflicts_with_all = ["source", "credential", "relay", "api_base", "fields"])]
        clear: bool,
    },

    /// List the sheets of the configured spreadsheet
    Sheets,

    /// Show the headers of a sheet and the detected search fields
    Fields {
        /// Sheet name
        #[arg(short, long)]
        sheet: String,
    },

    /// Find the first record matching every FIELD=VALUE constraint
    Find {
        /// Sheet name
        #[arg(short, long)]
        sheet: String,

        /// Constraints, e.g. "Full Name=Jane Roe"
        #[arg(value_name = "FIELD=VALUE", required_unless_present = "value")]
        constraints: Vec<FieldConstraint>,

        /// Search the first proposed field for this value
        #[arg(long, conflicts_with = "constraints")]
        value: Option<String>,
    },

    /// Interactive search (default)
    Repl,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let store: Arc<dyn ConfigStore> = Arc::new(open_store(cli.config)?);

    match cli.command.unwrap_or(Command::Repl) {
        Command::Configure {
            source,
            credential,
            relay,
            api_base,
            fields,
            clear,
        } => {
            if clear {
                store.clear_config().map_err(user_error)?;
                println!("{}", "Configuration cleared".green());
                return Ok(());
            }
            let patch = ConfigPatch {
                credential_ref: credential,
                source_id: source,
                last_selected_fields: fields,
                relay_url: relay,
                api_base,
            };
            let config = if patch.is_empty() {
                store.get_config()
            } else {
                store.set_config(patch)
            }
            .map_err(user_error)?;
            output::print_config(&config, cli.format)
        }
        Command::Sheets => {
            let session = SearchSession::connect(store).map_err(user_error)?;
            let sheets = session.list_sheets().await.map_err(user_error)?;
            output::print_sheets(&sheets, cli.format)
        }
        Command::Fields { sheet } => {
            let mut session = SearchSession::connect(store).map_err(user_error)?;
            load(&mut session, &sheet).await?;
            output::print_fields(&session, cli.format)
        }
        Command::Find {
            sheet,
            constraints,
            value,
        } => {
            let mut session = SearchSession::connect(store).map_err(user_error)?;
            load(&mut session, &sheet).await?;
            let constraints = match value {
                Some(v) => session.value_constraint(v.trim()).into_iter().collect(),
                None => constraints,
            };
            let outcome = session.search(&constraints).map_err(user_error)?;
            output::print_outcome(&outcome, &constraints, session.table(), cli.format)
        }
        Command::Repl => repl::run(store, cli.format).await,
    }
}

fn open_store(path: Option<PathBuf>) -> Result<FileConfigStore> {
    match path {
        Some(p) => Ok(FileConfigStore::new(p)),
        None => FileConfigStore::open_default().context("Failed to locate configuration file"),
    }
}

/// Convert a library error into the message shown to the user.
fn user_error(err: SeekError) -> anyhow::Error {
    tracing::debug!("{err}");
    anyhow::anyhow!(err.user_message())
}

/// Load a sheet, reporting a missing sheet without failing.
async fn load(session: &mut SearchSession, sheet: &str) -> Result<()> {
    match session.load_sheet(sheet).await.map_err(user_error)? {
        LoadOutcome::Unavailable { sheet } => {
            eprintln!(
                "{} {}",
                "Warning:".yellow().bold(),
                SeekError::not_found(sheet).user_message()
            );
        }
        LoadOutcome::Ready | LoadOutcome::Stale => {}
    }
    Ok(())
}
