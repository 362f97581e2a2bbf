//! Pulls everything new from the server into the local database.

use clap::Args;

use erx_sync::config::Config;
use erx_sync::ErxTaskRepository;

/// Synchronize tasks, communications, audit events and charge items
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Language for audit event texts (overrides the configured locale)
    #[arg(long)]
    locale: Option<String>,
}

impl SyncCommand {
    pub async fn run(
        &self,
        repo: &ErxTaskRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let locale = self.locale.as_deref().or(config.locale.value.as_deref());

        if let Some(base_url) = &config.remote.base_url {
            println!("Synchronizing with {}...", base_url);
        }
        let tasks = repo.load_remote_all(locale).await?;

        println!("Sync complete. {} task(s) stored locally.", tasks.len());
        Ok(())
    }
}
