use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::{
    open_repository, ConfigCommand, ConsentCommand, SyncCommand, TaskCommand, UnreadCommand,
};
use erx_sync::config::Config;

#[derive(Parser)]
#[command(name = "erx-sync")]
#[command(version)]
#[command(about = "Keeps a local copy of your e-prescriptions in sync with the server", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize with the server
    Sync(SyncCommand),

    /// Inspect and delete tasks
    Task(TaskCommand),

    /// Count unread messages and charge items
    Unread(UnreadCommand),

    /// Manage consents
    Consent(ConsentCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "erx_sync=info".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Sync(cmd)) => {
            let repo = open_repository(&config).await?;
            cmd.run(&repo, &config).await?;
        }
        Some(Commands::Task(cmd)) => {
            let repo = open_repository(&config).await?;
            cmd.run(&repo).await?;
        }
        Some(Commands::Unread(cmd)) => {
            let repo = open_repository(&config).await?;
            cmd.run(&repo).await?;
        }
        Some(Commands::Consent(cmd)) => {
            let repo = open_repository(&config).await?;
            cmd.run(&repo).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
