use anyhow::Context;
use axum::extract::FromRef;
use clap::{Parser, Subcommand};

mod config;
use config::Config;

mod db;
use db::Database;

mod error;
pub(crate) use error::ApiResult;

mod commands;
mod controllers;
mod html;
mod id;
mod models;
pub(crate) mod types;

/// Shared state handed to every request handler.
#[derive(Clone, FromRef)]
pub struct App {
    pub config: Config,
    pub database: Database,
}

#[derive(Debug, Parser)]
#[command(name = "litebin", about = "A minimal paste-sharing service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Create the database schema and exit.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // try to load .env, ignoring any errors
    _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = Config::load().context("failed to load config")?;

    let database = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let app = App { config, database };

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            app.database.migrate().await?;
            commands::serve::run(app).await
        }
        Command::Migrate => app.database.migrate().await,
    }
}
