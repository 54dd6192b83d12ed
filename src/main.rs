mod config;
mod database;
mod entities;
mod error;
mod http_server;
mod logging;
mod ports;
mod services;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{config::Config, database::Database, logging::setup_logging};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "VENUE_BOOKING_CONFIG")]
    config: Option<PathBuf>,

    /// Console log level (default: info)
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "VENUE_BOOKING_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the GraphQL API
    Serve {
        /// The port to run the server on, overrides the config file
        #[arg(short, long, env = "VENUE_BOOKING_HTTP_PORT")]
        port: Option<u16>,
    },
    /// Load the sample genres, venues, artists and shows into an empty database
    Seed,
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

const DEFAULT_PORT: u16 = 3000;

async fn open_database(config: &Config) -> Result<Arc<Database>> {
    log::debug!("Opening database at: {}", config.database_path().display());
    let database = Database::open(&config.database_path()).await?;
    Ok(Arc::new(database))
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    log::debug!("Loading configuration");
    match path {
        Some(path) => Config::from_file(&path),
        None => Config::load(),
    }
    .wrap_err("Failed to load venue-booking config")
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("Venue booking starting");

    match args.command {
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                log::debug!("Creating default config");
                let path = Config::create_default()?;
                log::info!("Default config available at {}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
        Commands::Seed => {
            let config = load_config(args.config)?;
            let database = open_database(&config).await?;
            let seeded = services::seed::seed(&database)
                .await
                .wrap_err("Failed to seed database")?;
            if seeded {
                log::info!("Sample data loaded");
            }
        }
        Commands::Serve { port } => {
            let config = load_config(args.config)?;
            let database = open_database(&config).await?;
            let port = port.or(config.port()).unwrap_or(DEFAULT_PORT);

            log::info!("Starting HTTP server on port: {}", port);
            http_server::app::start(port, database).await?;
        }
    }

    Ok(())
}
