//! Binary entry point for tablegrid.
//!
//! Serves grid endpoints, renders grids from the command line and manages
//! grid configuration files.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tablegrid::cli::{self, FetchOptions, OutputFormat, ServeOptions};
use tablegrid::config::ServiceConfig;
use tablegrid::observability;

/// Tablegrid - paginated, sortable, searchable data grids.
#[derive(Parser)]
#[command(name = "tablegrid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "TABLEGRID_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the grid endpoint.
    Serve {
        /// Listen address, e.g. 127.0.0.1:8080.
        #[arg(short, long)]
        bind: Option<String>,

        /// `SQLite` database file.
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Fetch a grid page from a running endpoint and print it.
    Fetch {
        /// Grid endpoint URL.
        #[arg(short, long, default_value = "http://127.0.0.1:8080/api/table")]
        url: String,

        /// Table identifier.
        #[arg(short, long)]
        table: String,

        /// Grid config JSON file; fetched from the endpoint if omitted.
        #[arg(long)]
        grid_config: Option<PathBuf>,

        /// Page number.
        #[arg(short, long)]
        page: Option<i64>,

        /// Sort field.
        #[arg(short, long)]
        sort: Option<String>,

        /// Sort descending.
        #[arg(long)]
        desc: bool,

        /// Search text.
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Rows per page.
        #[arg(long)]
        per_page: Option<i64>,

        /// Output format: html or json.
        #[arg(short, long, default_value = "html")]
        output: String,
    },

    /// Manage configuration.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective server configuration.
    Show,

    /// Export a table's grid configuration as JSON.
    Export {
        /// Table identifier.
        #[arg(short, long)]
        table: String,

        /// Output file path.
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Import and validate an exported grid configuration.
    Import {
        /// Grid config JSON file.
        path: PathBuf,
    },
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match ServiceConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(
    command: Commands,
    config: ServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve { bind, database } => {
            cli::cmd_serve(config, ServeOptions { bind, database }).await?;
        },

        Commands::Fetch {
            url,
            table,
            grid_config,
            page,
            sort,
            desc,
            search,
            per_page,
            output,
        } => {
            let options = FetchOptions {
                url,
                table,
                grid_config,
                page,
                sort,
                desc,
                search,
                per_page,
                output: OutputFormat::parse(&output),
            };
            cli::cmd_fetch(options).await?;
        },

        Commands::Config { action } => match action {
            ConfigAction::Show => cli::cmd_config_show(&config)?,
            ConfigAction::Export { table, out } => {
                cli::cmd_config_export(&config, &table, &out)?;
            },
            ConfigAction::Import { path } => cli::cmd_config_import(&path)?,
        },
    }
    Ok(())
}
