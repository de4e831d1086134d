//! trek CLI
//!
//! Command-line interface for trek - a local travel journal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trek_core::{Config, Coordinates, Journal, JournalError};

mod commands;
mod device;
mod editor;
mod output;
mod tui;

use commands::entry::FieldArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "trek")]
#[command(about = "trek - a local travel journal")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Add a new entry
    #[command(alias = "create")]
    Add {
        /// Entry title
        #[arg(short = 'T', long)]
        title: String,
        /// Entry description
        #[arg(short, long)]
        description: Option<String>,
        /// Write the description in $EDITOR
        #[arg(short, long, conflicts_with = "description")]
        editor: bool,
        /// Photo to attach
        #[arg(short, long)]
        image: Option<PathBuf>,
        /// Latitude of the place
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude of the place
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
    /// List all entries, newest first
    #[command(alias = "ls")]
    List,
    /// Show entry details
    Show {
        /// Entry ID (full id or prefix)
        id: String,
    },
    /// Edit an entry (prompts when no field flags are given)
    Edit {
        /// Entry ID (full id or prefix)
        id: String,
        #[arg(short = 'T', long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Write the description in $EDITOR
        #[arg(short, long, conflicts_with = "description")]
        editor: bool,
        /// Photo to attach
        #[arg(short, long, conflicts_with = "clear_image")]
        image: Option<PathBuf>,
        /// Remove the photo
        #[arg(long)]
        clear_image: bool,
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        /// Remove the location
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        clear_location: bool,
    },
    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        /// Entry ID (full id or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Back up the stored journal and start empty
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show status (storage location, counts)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_file, location_precision)
        key: String,
        /// Value to set
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work without opening the journal
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    let command = match cli.command {
        None | Some(Commands::Tui) => return tui::run(config).await,
        Some(command) => command,
    };

    init_cli_logging();

    let journal = Journal::open(&config);
    let result = handle_command(command, &journal, &config, &output).await;

    if let Err(ref e) = result {
        if let Some(suggestion) = e
            .downcast_ref::<JournalError>()
            .and_then(JournalError::recovery_suggestion)
        {
            eprintln!("hint: {}", suggestion);
        }
    }

    result
}

/// Log to stderr, filtered by TREK_LOG (default: warn)
fn init_cli_logging() {
    let filter = EnvFilter::try_from_env("TREK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn handle_command(
    command: Commands,
    journal: &Journal,
    config: &Config,
    output: &Output,
) -> Result<()> {
    match command {
        Commands::Add {
            title,
            description,
            editor,
            image,
            lat,
            lon,
        } => {
            let fields = FieldArgs {
                title: Some(title),
                description,
                editor,
                image,
                position: position(lat, lon),
                ..FieldArgs::default()
            };
            commands::entry::add(journal, config, fields, output).await
        }
        Commands::List => commands::entry::list(journal, output).await,
        Commands::Show { id } => commands::entry::show(journal, id, output).await,
        Commands::Edit {
            id,
            title,
            description,
            editor,
            image,
            clear_image,
            lat,
            lon,
            clear_location,
        } => {
            let fields = FieldArgs {
                title,
                description,
                editor,
                image,
                clear_image,
                position: position(lat, lon),
                clear_location,
            };
            commands::entry::edit(journal, config, id, fields, output).await
        }
        Commands::Delete { id, yes } => commands::entry::delete(journal, id, yes, output).await,
        Commands::Reset { yes } => commands::entry::reset(journal, yes, output).await,
        Commands::Status => commands::status::show(journal, config, output).await,
        Commands::Tui | Commands::Config { .. } => Ok(()),
    }
}

fn position(lat: Option<f64>, lon: Option<f64>) -> Option<Coordinates> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
        _ => None,
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
