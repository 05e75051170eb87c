use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use registrar_infrastructure::{RegistrarConfig, SqliteStore};
use tracing_subscriber::EnvFilter;

mod commands;
mod console;

#[derive(Parser)]
#[command(name = "registrar")]
#[command(about = "Registrar - conversational student records intake", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Talk to the bot from the terminal
    Chat {
        /// Identity of the console user
        #[arg(long, default_value_t = 1)]
        id: i64,
        /// Display name of the console user
        #[arg(long, default_value = "Console")]
        name: String,
    },
    /// Create shell records from a .csv or .txt roster
    Import {
        file: PathBuf,
    },
    /// Write every student row to a CSV file
    Export,
    /// List filed admission applications
    Admissions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = RegistrarConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&config.logging.level);

    let store = SqliteStore::open(&config.database.path).with_context(|| {
        format!("Failed to open database {}", config.database.path.display())
    })?;
    tracing::debug!("[Bootstrap] Opened database {}", config.database.path.display());

    match cli.command.unwrap_or(Commands::Chat {
        id: 1,
        name: "Console".to_string(),
    }) {
        Commands::Chat { id, name } => commands::chat::run(&config, store, id, name).await?,
        Commands::Import { file } => commands::roster::import(store, &file).await?,
        Commands::Export => commands::roster::export(&config, store).await?,
        Commands::Admissions => commands::admissions::list(store).await?,
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
