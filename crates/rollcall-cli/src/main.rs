// crates/rollcall-cli/src/main.rs
// ============================================================================
// Module: Rollcall CLI Entry Point
// Description: Command dispatcher for serving and offline catalog tasks.
// Purpose: Provide a safe CLI for the server and scraped-resource imports.
// Dependencies: clap, rollcall-core, rollcall-server, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! The Rollcall CLI runs the HTTP server and performs offline catalog tasks:
//! initializing a store and importing scraped resources from a JSON file.
//! File inputs are untrusted and size-capped before parsing.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use rollcall_core::CatalogStore;
use rollcall_core::NewScrapedResource;
use rollcall_server::RollcallConfig;
use rollcall_server::RollcallServer;
use rollcall_server::build_catalog_store;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a scraped-resource import file in bytes.
const MAX_IMPORT_FILE_BYTES: usize = 8 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "rollcall", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the HTTP server.
    Serve(ServeCommand),
    /// Initializes the configured store and exits.
    InitStore(InitStoreCommand),
    /// Imports scraped resources from a JSON file.
    Import(ImportCommand),
}

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Path to the configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for the `init-store` command.
#[derive(Args, Debug)]
struct InitStoreCommand {
    /// Path to the configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for the `import` command.
#[derive(Args, Debug)]
struct ImportCommand {
    /// Path to the configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Path to a JSON array of scraped resources.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a printable message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::InitStore(command) => command_init_store(&command),
        Commands::Import(command) => command_import(&command),
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = RollcallConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    let server = RollcallServer::from_config(config)
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server
        .serve()
        .await
        .map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Store Commands
// ============================================================================

/// Executes the `init-store` command.
fn command_init_store(command: &InitStoreCommand) -> CliResult<ExitCode> {
    let config = RollcallConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    build_catalog_store(&config)
        .map_err(|err| CliError::new(format!("store init failed: {err}")))?;
    write_stdout_line("store initialized")
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `import` command.
fn command_import(command: &ImportCommand) -> CliResult<ExitCode> {
    let config = RollcallConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    let items = read_import_file(&command.input)?;
    if items.len() > config.catalog.max_import_items {
        return Err(CliError::new(format!(
            "import batch of {} exceeds limit {}",
            items.len(),
            config.catalog.max_import_items
        )));
    }
    let store = build_catalog_store(&config)
        .map_err(|err| CliError::new(format!("store init failed: {err}")))?;
    let imported = store
        .import_resources(items)
        .map_err(|err| CliError::new(format!("import failed: {err}")))?;
    write_stdout_line(&format!("imported {imported} resources"))
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Reads and parses a size-capped scraped-resource import file.
fn read_import_file(path: &Path) -> CliResult<Vec<NewScrapedResource>> {
    let bytes = fs::read(path)
        .map_err(|err| CliError::new(format!("input read failed: {err}")))?;
    if bytes.len() > MAX_IMPORT_FILE_BYTES {
        return Err(CliError::new(format!(
            "input file exceeds size limit of {MAX_IMPORT_FILE_BYTES} bytes"
        )));
    }
    serde_json::from_slice(&bytes)
        .map_err(|err| CliError::new(format!("input parse failed: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns the failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
