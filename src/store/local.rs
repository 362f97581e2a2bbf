use async_trait::async_trait;
use thiserror::Error;

use super::ResourceType;
use crate::models::{
    AuditEvent, Communication, CommunicationProfile, MedicationDispense, PageRequest,
    SparseChargeItem, Task,
};

/// Failures raised by on-device persistence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocalStoreError {
    #[error("Local store operation is not implemented")]
    NotImplemented,

    #[error("Failed to initialize local store: {0}")]
    Initialization(String),

    #[error("Failed to write to local store: {0}")]
    Write(String),

    #[error("Failed to delete from local store: {0}")]
    Delete(String),

    #[error("Failed to read from local store: {0}")]
    Read(String),
}

impl LocalStoreError {
    pub fn code(&self) -> &'static str {
        match self {
            LocalStoreError::NotImplemented => "i-20301",
            LocalStoreError::Initialization(_) => "i-20302",
            LocalStoreError::Write(_) => "i-20303",
            LocalStoreError::Delete(_) => "i-20304",
            LocalStoreError::Read(_) => "i-20305",
        }
    }
}

/// On-device persistence for every synchronized record type.
///
/// Saves are upserts keyed by identifier. `latest_watermark` must return the
/// maximum watermark of all stored records of a type, or `None` when there are none.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn latest_watermark(
        &self,
        resource: ResourceType,
    ) -> Result<Option<String>, LocalStoreError>;

    /// Fetches a task by id. When `access_code` is given it must match as well.
    async fn fetch_task(
        &self,
        id: &str,
        access_code: Option<&str>,
    ) -> Result<Option<Task>, LocalStoreError>;

    async fn list_all_tasks(&self) -> Result<Vec<Task>, LocalStoreError>;

    /// Upserts tasks together with their nested communications and dispenses.
    ///
    /// `update_last_authenticated` refreshes the profile's last-authenticated marker.
    async fn save_tasks(
        &self,
        tasks: &[Task],
        update_last_authenticated: bool,
    ) -> Result<(), LocalStoreError>;

    async fn delete_tasks(&self, tasks: &[Task]) -> Result<(), LocalStoreError>;

    /// Lists communications, newest first. `CommunicationProfile::All` disables the filter.
    async fn list_communications(
        &self,
        profile: CommunicationProfile,
    ) -> Result<Vec<Communication>, LocalStoreError>;

    /// Upserts communications. An existing record only ever flips `is_read` to true.
    async fn save_communications(
        &self,
        communications: &[Communication],
    ) -> Result<(), LocalStoreError>;

    async fn save_audit_events(&self, events: &[AuditEvent]) -> Result<(), LocalStoreError>;

    /// Reads one page of audit events, newest first, optionally for a single task.
    async fn list_audit_events(
        &self,
        task_id: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<AuditEvent>, LocalStoreError>;

    async fn save_medication_dispenses(
        &self,
        dispenses: &[MedicationDispense],
    ) -> Result<(), LocalStoreError>;

    async fn fetch_charge_item(
        &self,
        id: &str,
    ) -> Result<Option<SparseChargeItem>, LocalStoreError>;

    async fn list_charge_items(&self) -> Result<Vec<SparseChargeItem>, LocalStoreError>;

    async fn save_charge_items(&self, items: &[SparseChargeItem]) -> Result<(), LocalStoreError>;

    async fn delete_charge_items(&self, items: &[SparseChargeItem])
        -> Result<(), LocalStoreError>;
}
