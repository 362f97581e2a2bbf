//! Implementations of [`crate::store::RemoteStore`].

mod http;

pub use http::HttpRemoteStore;

use async_trait::async_trait;

use crate::models::{
    AuditEvent, Communication, CommunicationProfile, Consent, ConsentCategory,
    MedicationDispense, PagedContent, SparseChargeItem, Task, TaskOrder,
};
use crate::store::{RemoteStore, RemoteStoreError};

impl From<reqwest::Error> for RemoteStoreError {
    fn from(e: reqwest::Error) -> Self {
        RemoteStoreError::Transport(e.to_string())
    }
}

/// Stand-in used when no server is configured. Every call fails with
/// [`RemoteStoreError::NotImplemented`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRemoteStore;

#[async_trait]
impl RemoteStore for OfflineRemoteStore {
    async fn fetch_task(
        &self,
        _id: &str,
        _access_code: Option<&str>,
    ) -> Result<Option<Task>, RemoteStoreError> {
        Err(RemoteStoreError::NotImplemented)
    }

    async fn list_tasks_after(
        &self,
        _watermark: Option<&str>,
    ) -> Result<PagedContent<Task>, RemoteStoreError> {
        Err(RemoteStoreError::NotImplemented)
    }

    async fn list_tasks_next_page(
        &self,
        _next: &str,
    ) -> Result<PagedContent<Task>, RemoteStoreError> {
        Err(RemoteStoreError::NotImplemented)
    }

    async fn delete_tasks(&self, _tasks: &[Task]) -> Result<(), RemoteStoreError> {
        Err(RemoteStoreError::NotImplemented)
    }

    async fn redeem(&self, _order: &TaskOrder) -> Result<TaskOrder, RemoteStoreError> {
        Err(RemoteStoreError::NotImplemented)
    }

    async fn list_communications_after(
        &self,
        _watermark: Option<&str>,
        _profile: CommunicationProfile,
    ) -> Result<Vec<Communication>, RemoteStoreError> {
        Err(RemoteStoreError::NotImplemented)
    }

    async fn list_audit_events_after(
        &self,
        _watermark: Option<&str>,
        _locale: Option<&str>,
    ) -> Result<PagedContent<AuditEvent>, RemoteStoreError> {
        Err(RemoteStoreError::NotImplemented)
    }

    async fn list_audit_events_next_page(
        &self,
        _next: &str,
        _locale: Option<&str>,
    ) -> Result<PagedContent<AuditEvent>, RemoteStoreError> {
        Err(RemoteStoreError::NotImplemented)
    }

    async fn list_medication_dispenses(
        &self,
        _task_id: &str,
    ) -> Result<Vec<MedicationDispense>, RemoteStoreError> {
        Err(RemoteStoreError::NotImplemented)
    }

    async fn list_charge_items_after(
        &self,
        _watermark: Option<&str>,
    ) -> Result<Vec<SparseChargeItem>, RemoteStoreError> {
        Err(RemoteStoreError::NotImplemented)
    }

    async fn delete_charge_items(
        &self,
        _items: &[SparseChargeItem],
    ) -> Result<(), RemoteStoreError> {
        Err(RemoteStoreError::NotImplemented)
    }

    async fn fetch_consents(&self) -> Result<Vec<Consent>, RemoteStoreError> {
        Err(RemoteStoreError::NotImplemented)
    }

    async fn grant_consent(
        &self,
        _consent: &Consent,
    ) -> Result<Option<Consent>, RemoteStoreError> {
        Err(RemoteStoreError::NotImplemented)
    }

    async fn revoke_consent(&self, _category: &ConsentCategory) -> Result<(), RemoteStoreError> {
        Err(RemoteStoreError::NotImplemented)
    }
}
