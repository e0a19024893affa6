mod commands;
mod config;
mod views;

use clap::Parser;
use tracing::info;

use config::{Cli, Config};
use warbler_db::Database;

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging; stdout is reserved for JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warbler=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_cli_and_env(&cli)?;

    info!("Connecting to {}", config.database_url);
    let db = Database::connect(&config.database_url)?;

    let output = commands::run(&db, &config, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
