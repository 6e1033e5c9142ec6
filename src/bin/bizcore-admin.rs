//! # bizcore Admin
//!
//! Command-line tool for checking configuration and connectivity, creating the core
//! tables, and printing the effective configuration.

use anyhow::Context;
use bizcore::config::{BizcoreConfig, ConfigLoader};
use bizcore::database::{DatabaseConnection, DatabaseMigrations};
use bizcore::logging::init_structured_logging;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "bizcore-admin")]
#[command(about = "Administer a bizcore database")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment whose override file is loaded (default: BIZCORE_ENV or development)
    #[arg(short, long)]
    environment: Option<String>,

    /// Configuration directory (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load and validate configuration, connect and run a health check
    Check,

    /// Create the running-number and trail tables
    Migrate,

    /// Print the effective configuration as JSON, password masked
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_structured_logging(&config.logging);

    match cli.command {
        Commands::Check => check(&config).await,
        Commands::Migrate => migrate(&config).await,
        Commands::ShowConfig => show_config(&config),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<BizcoreConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(environment) = &cli.environment {
        loader = loader.with_environment(environment.as_str());
    }
    if let Some(directory) = &cli.config_dir {
        loader = loader.with_directory(directory.clone());
    }
    loader
        .load()
        .with_context(|| format!("loading configuration for '{}'", loader.environment()))
}

async fn connect(config: &BizcoreConfig) -> anyhow::Result<DatabaseConnection> {
    config.validate().context("validating configuration")?;
    DatabaseConnection::from_config(&config.database)
        .await
        .with_context(|| format!("connecting to {}", config.database.masked_url()))
}

async fn check(config: &BizcoreConfig) -> anyhow::Result<()> {
    let db = connect(config).await?;
    let healthy = db.health_check().await.context("running health check")?;
    db.close().await;
    anyhow::ensure!(healthy, "health check returned an unexpected value");

    println!(
        "OK: {} ({} dialect on {})",
        config.database.masked_url(),
        db.dialect(),
        db.backend()
    );
    Ok(())
}

async fn migrate(config: &BizcoreConfig) -> anyhow::Result<()> {
    let db = connect(config).await?;
    DatabaseMigrations::run_core(&db)
        .await
        .context("creating core tables")?;
    info!(dialect = %db.dialect(), "Core tables created");
    db.close().await;
    println!("Core tables are in place");
    Ok(())
}

fn show_config(config: &BizcoreConfig) -> anyhow::Result<()> {
    let mut shown = config.clone();
    shown.database.url = config.database.masked_url();
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}
