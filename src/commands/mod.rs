mod config_cmd;
mod consent;
mod sync_cmd;
mod task;
mod unread;

pub use config_cmd::ConfigCommand;
pub use consent::ConsentCommand;
pub use sync_cmd::SyncCommand;
pub use task::TaskCommand;
pub use unread::UnreadCommand;

use clap::ValueEnum;
use std::sync::Arc;
use std::time::Duration;

use erx_sync::config::Config;
use erx_sync::db::SqliteStore;
use erx_sync::remote::{HttpRemoteStore, OfflineRemoteStore};
use erx_sync::store::RemoteStore;
use erx_sync::{ErxRepositoryError, ErxTaskRepository};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Opens the local database and connects to the configured server.
///
/// Without a configured server every remote operation fails as not implemented.
pub async fn open_repository(config: &Config) -> Result<ErxTaskRepository, ErxRepositoryError> {
    let local = SqliteStore::open(&config.database_path.value).await?;

    let remote: Arc<dyn RemoteStore> = match &config.remote.base_url {
        Some(base_url) => Arc::new(HttpRemoteStore::new(
            base_url.clone(),
            config.remote.access_token.clone(),
            Duration::from_secs(config.remote.timeout_secs),
        )?),
        None => {
            tracing::debug!("No remote configured, running offline");
            Arc::new(OfflineRemoteStore)
        }
    };

    Ok(ErxTaskRepository::new(Arc::new(local), remote)
        .with_insurance_type(config.insurance_type.value))
}
