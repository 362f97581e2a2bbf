//! SQLite implementation of [`LocalStore`].
//!
//! One repository per record type. Repositories speak `sqlx::Error`;
//! [`SqliteStore`] decides at each call site whether a failure is a read,
//! write or delete error.

mod audit_event_repo;
mod charge_item_repo;
mod communication_repo;
mod dispense_repo;
mod task_repo;

pub use audit_event_repo::AuditEventRepository;
pub use charge_item_repo::ChargeItemRepository;
pub use communication_repo::CommunicationRepository;
pub use dispense_repo::MedicationDispenseRepository;
pub use task_repo::TaskRepository;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

use crate::models::{
    AuditEvent, Communication, CommunicationProfile, MedicationDispense, PageRequest,
    SparseChargeItem, Task,
};
use crate::store::{LocalStore, LocalStoreError, ResourceType};

/// Opens (creating if needed) the database at `path` and runs migrations.
pub async fn init_db(path: &Path) -> Result<SqlitePool, LocalStoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            LocalStoreError::Initialization(format!(
                "Failed to create database directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(init_error)?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| LocalStoreError::Initialization(e.to_string()))?;

    Ok(pool)
}

fn init_error(e: sqlx::Error) -> LocalStoreError {
    LocalStoreError::Initialization(e.to_string())
}

fn read_error(e: sqlx::Error) -> LocalStoreError {
    LocalStoreError::Read(e.to_string())
}

fn write_error(e: sqlx::Error) -> LocalStoreError {
    LocalStoreError::Write(e.to_string())
}

fn delete_error(e: sqlx::Error) -> LocalStoreError {
    LocalStoreError::Delete(e.to_string())
}

pub struct SqliteStore {
    tasks: TaskRepository,
    communications: CommunicationRepository,
    audit_events: AuditEventRepository,
    dispenses: MedicationDispenseRepository,
    charge_items: ChargeItemRepository,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            tasks: TaskRepository::new(pool.clone()),
            communications: CommunicationRepository::new(pool.clone()),
            audit_events: AuditEventRepository::new(pool.clone()),
            dispenses: MedicationDispenseRepository::new(pool.clone()),
            charge_items: ChargeItemRepository::new(pool),
        }
    }

    pub async fn open(path: &Path) -> Result<Self, LocalStoreError> {
        Ok(Self::new(init_db(path).await?))
    }

    /// When a task save last refreshed the authentication marker (RFC 3339, UTC).
    pub async fn last_authenticated(&self) -> Result<Option<String>, LocalStoreError> {
        self.tasks.last_authenticated().await.map_err(read_error)
    }
}

#[async_trait]
impl LocalStore for SqliteStore {
    async fn latest_watermark(
        &self,
        resource: ResourceType,
    ) -> Result<Option<String>, LocalStoreError> {
        let latest = match resource {
            ResourceType::Task => self.tasks.latest_modified().await,
            ResourceType::Communication => self.communications.latest_timestamp().await,
            ResourceType::AuditEvent => self.audit_events.latest_timestamp().await,
            ResourceType::ChargeItem => self.charge_items.latest_entered_date().await,
        };
        latest.map_err(read_error)
    }

    async fn fetch_task(
        &self,
        id: &str,
        access_code: Option<&str>,
    ) -> Result<Option<Task>, LocalStoreError> {
        self.tasks.get_by_id(id, access_code).await.map_err(read_error)
    }

    async fn list_all_tasks(&self) -> Result<Vec<Task>, LocalStoreError> {
        self.tasks.list().await.map_err(read_error)
    }

    async fn save_tasks(
        &self,
        tasks: &[Task],
        update_last_authenticated: bool,
    ) -> Result<(), LocalStoreError> {
        self.tasks
            .save(tasks, update_last_authenticated)
            .await
            .map_err(write_error)
    }

    async fn delete_tasks(&self, tasks: &[Task]) -> Result<(), LocalStoreError> {
        self.tasks.delete(tasks).await.map_err(delete_error)
    }

    async fn list_communications(
        &self,
        profile: CommunicationProfile,
    ) -> Result<Vec<Communication>, LocalStoreError> {
        self.communications.list(profile).await.map_err(read_error)
    }

    async fn save_communications(
        &self,
        communications: &[Communication],
    ) -> Result<(), LocalStoreError> {
        self.communications
            .save(communications)
            .await
            .map_err(write_error)
    }

    async fn save_audit_events(&self, events: &[AuditEvent]) -> Result<(), LocalStoreError> {
        self.audit_events.save(events).await.map_err(write_error)
    }

    async fn list_audit_events(
        &self,
        task_id: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<AuditEvent>, LocalStoreError> {
        self.audit_events
            .list(task_id, page)
            .await
            .map_err(read_error)
    }

    async fn save_medication_dispenses(
        &self,
        dispenses: &[MedicationDispense],
    ) -> Result<(), LocalStoreError> {
        self.dispenses.save(dispenses).await.map_err(write_error)
    }

    async fn fetch_charge_item(
        &self,
        id: &str,
    ) -> Result<Option<SparseChargeItem>, LocalStoreError> {
        self.charge_items.get_by_id(id).await.map_err(read_error)
    }

    async fn list_charge_items(&self) -> Result<Vec<SparseChargeItem>, LocalStoreError> {
        self.charge_items.list().await.map_err(read_error)
    }

    async fn save_charge_items(&self, items: &[SparseChargeItem]) -> Result<(), LocalStoreError> {
        self.charge_items.save(items).await.map_err(write_error)
    }

    async fn delete_charge_items(
        &self,
        items: &[SparseChargeItem],
    ) -> Result<(), LocalStoreError> {
        self.charge_items.delete(items).await.map_err(delete_error)
    }
}
