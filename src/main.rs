mod app;
mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "activity-logger")]
#[command(about = "Log activities to your Google calendar and browse recent ones")]
struct Cli {
    /// Use this config file instead of ~/.config/activity-logger/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with Google, or grant missing permissions when signed in
    Auth,
    /// Grant the calendar permissions without signing out
    Authorize,
    SignOut,
    /// Show who is signed in and whether logging is possible
    Status,
    /// Log an activity at the current time
    Log { text: String },
    /// List recent activities
    Recent {
        /// Show each distinct activity once
        #[arg(short, long)]
        unique: bool,
    },
    /// Interactive mode (the default)
    App,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = app::load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::App) {
        Commands::Auth => commands::auth::run(&config).await,
        Commands::Authorize => commands::authorize::run(&config).await,
        Commands::SignOut => commands::sign_out::run(&config).await,
        Commands::Status => commands::status::run(&config).await,
        Commands::Log { text } => commands::log::run(&config, &text).await,
        Commands::Recent { unique } => commands::recent::run(&config, unique).await,
        Commands::App => commands::interactive::run(&config).await,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
