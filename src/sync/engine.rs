//! Delta synchronization from the remote service into the local store.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use super::pagination::{walk_pages, WalkSummary};
use crate::error::ErxRepositoryError;
use crate::models::{CommunicationProfile, InsuranceType, Task};
use crate::store::{LocalStore, RemoteStore, ResourceType};

/// Pulls everything newer than the local watermarks from the remote store.
///
/// Resource types are synchronized strictly one after another. Within the
/// task step, medication dispense fetches for completed tasks run
/// concurrently and are joined before the page is saved.
///
/// Dropping a returned future cancels the in-flight requests. Pages whose
/// save already completed stay persisted.
pub struct SyncEngine {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    insurance_type: InsuranceType,
}

impl SyncEngine {
    pub fn new(local: Arc<dyn LocalStore>, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            local,
            remote,
            insurance_type: InsuranceType::default(),
        }
    }

    /// Charge items are only synchronized for privately insured profiles.
    pub fn with_insurance_type(mut self, insurance_type: InsuranceType) -> Self {
        self.insurance_type = insurance_type;
        self
    }

    /// Synchronizes tasks, communications, audit events and (for private
    /// insurance) charge items, then returns all locally stored tasks.
    ///
    /// The first failing step aborts the remaining ones. Steps that finished
    /// before the failure keep their data.
    pub async fn synchronize_all(
        &self,
        locale: Option<&str>,
    ) -> Result<Vec<Task>, ErxRepositoryError> {
        self.sync_tasks().await?;
        self.sync_communications().await?;
        self.sync_audit_events(locale).await?;
        if self.insurance_type == InsuranceType::Pkv {
            self.sync_charge_items().await?;
        }

        let tasks = self.local.list_all_tasks().await?;
        info!(tasks = tasks.len(), "Synchronization complete");
        Ok(tasks)
    }

    pub async fn sync_tasks(&self) -> Result<WalkSummary, ErxRepositoryError> {
        let watermark = self.local.latest_watermark(ResourceType::Task).await?;
        debug!(watermark = ?watermark, "Listing remote tasks");

        let first = self.remote.list_tasks_after(watermark.as_deref()).await?;
        let remote = self.remote.as_ref();
        let summary = walk_pages(
            first,
            move |tasks| self.store_task_page(tasks),
            move |next| async move {
                remote
                    .list_tasks_next_page(&next)
                    .await
                    .map_err(ErxRepositoryError::from)
            },
        )
        .await?;

        info!(
            pages = summary.pages,
            tasks = summary.records,
            "Synchronized tasks"
        );
        Ok(summary)
    }

    pub async fn sync_communications(&self) -> Result<usize, ErxRepositoryError> {
        let watermark = self
            .local
            .latest_watermark(ResourceType::Communication)
            .await?;
        debug!(watermark = ?watermark, "Listing remote communications");

        let communications = self
            .remote
            .list_communications_after(watermark.as_deref(), CommunicationProfile::All)
            .await?;
        self.local.save_communications(&communications).await?;

        info!(
            communications = communications.len(),
            "Synchronized communications"
        );
        Ok(communications.len())
    }

    pub async fn sync_audit_events(
        &self,
        locale: Option<&str>,
    ) -> Result<WalkSummary, ErxRepositoryError> {
        let watermark = self.local.latest_watermark(ResourceType::AuditEvent).await?;
        debug!(watermark = ?watermark, locale = ?locale, "Listing remote audit events");

        let first = self
            .remote
            .list_audit_events_after(watermark.as_deref(), locale)
            .await?;
        let local = self.local.as_ref();
        let remote = self.remote.as_ref();
        let summary = walk_pages(
            first,
            move |events| async move {
                local
                    .save_audit_events(&events)
                    .await
                    .map_err(ErxRepositoryError::from)
            },
            move |next| async move {
                remote
                    .list_audit_events_next_page(&next, locale)
                    .await
                    .map_err(ErxRepositoryError::from)
            },
        )
        .await?;

        info!(
            pages = summary.pages,
            audit_events = summary.records,
            "Synchronized audit events"
        );
        Ok(summary)
    }

    pub async fn sync_charge_items(&self) -> Result<usize, ErxRepositoryError> {
        let watermark = self.local.latest_watermark(ResourceType::ChargeItem).await?;
        debug!(watermark = ?watermark, "Listing remote charge items");

        let items = self
            .remote
            .list_charge_items_after(watermark.as_deref())
            .await?;
        self.local.save_charge_items(&items).await?;

        info!(charge_items = items.len(), "Synchronized charge items");
        Ok(items.len())
    }

    async fn store_task_page(&self, tasks: Vec<Task>) -> Result<(), ErxRepositoryError> {
        let tasks = self.reconcile_cancelled(tasks).await?;
        let tasks = try_join_all(
            tasks
                .into_iter()
                .map(|task| self.attach_medication_dispenses(task)),
        )
        .await?;

        self.local.save_tasks(&tasks, true).await?;
        Ok(())
    }

    /// Cancelled tasks come back from the server without their details, so
    /// the locally known version is marked cancelled instead. Unknown ones are dropped.
    async fn reconcile_cancelled(&self, tasks: Vec<Task>) -> Result<Vec<Task>, ErxRepositoryError> {
        let (cancelled, mut tasks): (Vec<Task>, Vec<Task>) =
            tasks.into_iter().partition(|task| task.status.is_cancelled());
        if cancelled.is_empty() {
            return Ok(tasks);
        }

        let known = try_join_all(cancelled.into_iter().map(|remote_task| async move {
            let local_task = self.local.fetch_task(&remote_task.identifier, None).await?;
            if local_task.is_none() {
                warn!(task_id = %remote_task.identifier, "Cancelled task is unknown locally, skipping");
            }
            Ok::<_, ErxRepositoryError>(
                local_task.map(|task| task.cancelled(remote_task.last_modified.clone())),
            )
        }))
        .await?;

        tasks.extend(known.into_iter().flatten());
        Ok(tasks)
    }

    async fn attach_medication_dispenses(&self, task: Task) -> Result<Task, ErxRepositoryError> {
        if !task.status.is_completed() {
            return Ok(task);
        }

        let dispenses = self
            .remote
            .list_medication_dispenses(&task.identifier)
            .await?;
        debug!(
            task_id = %task.identifier,
            dispenses = dispenses.len(),
            "Fetched medication dispenses"
        );
        self.local.save_medication_dispenses(&dispenses).await?;

        Ok(task.with_medication_dispenses(dispenses))
    }
}
