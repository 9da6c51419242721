//! Lingohub CLI
//!
//! Command-line interface for over-the-air localization updates.

mod commands;
mod config;
mod display;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use lingohub_core::config::DEFAULT_BASE_URL;
use lingohub_core::Environment;
use tracing_subscriber::EnvFilter;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "lingohub")]
#[command(version, about = "Over-the-air localization updates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory (default: platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// API key of the Lingohub project
    #[arg(long, global = true, env = "LINGOHUB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Version of the application the translations belong to
    #[arg(long, global = true, env = "LINGOHUB_APP_VERSION")]
    app_version: Option<String>,

    /// Distribution environment (test, staging, development, production)
    #[arg(
        long,
        global = true,
        env = "LINGOHUB_ENVIRONMENT",
        default_value = "production"
    )]
    environment: Environment,

    /// Stable identifier reported as the client user
    #[arg(long, global = true, env = "LINGOHUB_DEVICE_ID")]
    device_id: Option<String>,

    /// Distribution service URL
    #[arg(
        long,
        global = true,
        env = "LINGOHUB_BASE_URL",
        default_value = DEFAULT_BASE_URL
    )]
    base_url: String,

    /// Language to use instead of the system language
    #[arg(long, global = true)]
    language: Option<String>,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Check for new translations and install them
    Update {
        /// Check even if the last check was less than a day ago
        #[arg(long)]
        force: bool,
    },

    /// Show the installed release and settings
    Status,

    /// Resolve a key through the installed translations
    Get {
        /// Key to look up
        key: String,

        /// Table name (default: Localizable)
        #[arg(long)]
        table: Option<String>,
    },

    /// Remove installed translations
    Reset,

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "lingohub_core=info",
        1 => "lingohub_core=debug",
        _ => "lingohub_core=trace",
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lingohub")
    });

    let config = CliConfig {
        data_dir,
        api_key: cli.api_key,
        app_version: cli.app_version,
        environment: cli.environment,
        device_id: cli.device_id,
        base_url: cli.base_url,
        language: cli.language,
    };

    match cli.command {
        Commands::Update { force } => commands::update::run(&config, force).await?,
        Commands::Status => commands::status::run(&config)?,
        Commands::Get { key, table } => commands::get::run(&config, &key, table.as_deref())?,
        Commands::Reset => commands::reset::run(&config)?,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "lingohub", &mut io::stdout());
        }
    }

    Ok(())
}
