use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    AuditEvent, Communication, CommunicationProfile, Consent, ConsentCategory,
    MedicationDispense, PagedContent, SparseChargeItem, Task, TaskOrder,
};

/// Failures raised by the remote clinical-data service client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteStoreError {
    /// Transport, status or decoding failure.
    #[error("Remote service request failed: {0}")]
    Transport(String),

    #[error("Remote store operation is not implemented")]
    NotImplemented,
}

impl RemoteStoreError {
    pub fn code(&self) -> &'static str {
        match self {
            RemoteStoreError::Transport(_) => "i-20401",
            RemoteStoreError::NotImplemented => "i-20402",
        }
    }
}

/// The remote prescription service.
///
/// `*_after` listings return every record whose watermark is newer than the
/// given one, or everything when the watermark is `None`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetches a single task. `access_code` is needed for tasks the session does not own.
    async fn fetch_task(
        &self,
        id: &str,
        access_code: Option<&str>,
    ) -> Result<Option<Task>, RemoteStoreError>;

    async fn list_tasks_after(
        &self,
        watermark: Option<&str>,
    ) -> Result<PagedContent<Task>, RemoteStoreError>;

    async fn list_tasks_next_page(
        &self,
        next: &str,
    ) -> Result<PagedContent<Task>, RemoteStoreError>;

    async fn delete_tasks(&self, tasks: &[Task]) -> Result<(), RemoteStoreError>;

    async fn redeem(&self, order: &TaskOrder) -> Result<TaskOrder, RemoteStoreError>;

    async fn list_communications_after(
        &self,
        watermark: Option<&str>,
        profile: CommunicationProfile,
    ) -> Result<Vec<Communication>, RemoteStoreError>;

    async fn list_audit_events_after(
        &self,
        watermark: Option<&str>,
        locale: Option<&str>,
    ) -> Result<PagedContent<AuditEvent>, RemoteStoreError>;

    async fn list_audit_events_next_page(
        &self,
        next: &str,
        locale: Option<&str>,
    ) -> Result<PagedContent<AuditEvent>, RemoteStoreError>;

    async fn list_medication_dispenses(
        &self,
        task_id: &str,
    ) -> Result<Vec<MedicationDispense>, RemoteStoreError>;

    async fn list_charge_items_after(
        &self,
        watermark: Option<&str>,
    ) -> Result<Vec<SparseChargeItem>, RemoteStoreError>;

    async fn delete_charge_items(
        &self,
        items: &[SparseChargeItem],
    ) -> Result<(), RemoteStoreError>;

    async fn fetch_consents(&self) -> Result<Vec<Consent>, RemoteStoreError>;

    async fn grant_consent(&self, consent: &Consent) -> Result<Option<Consent>, RemoteStoreError>;

    async fn revoke_consent(&self, category: &ConsentCategory) -> Result<(), RemoteStoreError>;
}
