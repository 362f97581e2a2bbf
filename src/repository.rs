//! The single entry point callers use for prescription data.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::ErxRepositoryError;
use crate::models::{
    unique_communications, AuditEvent, Communication, CommunicationProfile, Consent,
    ConsentCategory, InsuranceType, PageRequest, SparseChargeItem, Task, TaskOrder,
};
use crate::store::{LocalStore, RemoteStore};
use crate::sync::SyncEngine;

/// Combines the local and remote stores behind one error type.
///
/// Every store failure is wrapped exactly once into [`ErxRepositoryError`].
pub struct ErxTaskRepository {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    engine: SyncEngine,
}

impl ErxTaskRepository {
    pub fn new(local: Arc<dyn LocalStore>, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            engine: SyncEngine::new(local.clone(), remote.clone()),
            local,
            remote,
        }
    }

    pub fn with_insurance_type(mut self, insurance_type: InsuranceType) -> Self {
        self.engine = self.engine.with_insurance_type(insurance_type);
        self
    }

    /// Synchronizes everything newer than the local watermarks and returns all local tasks.
    pub async fn load_remote_all(
        &self,
        locale: Option<&str>,
    ) -> Result<Vec<Task>, ErxRepositoryError> {
        self.engine.synchronize_all(locale).await
    }

    /// Fetches one task from the server when an access code is given and
    /// stores it locally. Without an access code only the local store is read.
    pub async fn load_remote(
        &self,
        id: &str,
        access_code: Option<&str>,
    ) -> Result<Option<Task>, ErxRepositoryError> {
        let code = match access_code {
            Some(code) => code,
            None => return self.load_local(id, None).await,
        };

        let task = self.remote.fetch_task(id, Some(code)).await?;
        if let Some(task) = &task {
            self.local
                .save_tasks(std::slice::from_ref(task), false)
                .await?;
        }
        Ok(task)
    }

    pub async fn load_local(
        &self,
        id: &str,
        access_code: Option<&str>,
    ) -> Result<Option<Task>, ErxRepositoryError> {
        Ok(self.local.fetch_task(id, access_code).await?)
    }

    pub async fn load_local_all(&self) -> Result<Vec<Task>, ErxRepositoryError> {
        Ok(self.local.list_all_tasks().await?)
    }

    pub async fn save_tasks(&self, tasks: &[Task]) -> Result<(), ErxRepositoryError> {
        Ok(self.local.save_tasks(tasks, false).await?)
    }

    /// Deletes tasks. A batch made up only of scanned tasks never reaches the
    /// server. Otherwise the server deletes first and the local delete is
    /// skipped when that fails.
    pub async fn delete_tasks(&self, tasks: &[Task]) -> Result<(), ErxRepositoryError> {
        if tasks.iter().all(Task::is_scanned) {
            debug!(tasks = tasks.len(), "Deleting scanned tasks locally");
            return Ok(self.local.delete_tasks(tasks).await?);
        }

        self.remote.delete_tasks(tasks).await?;
        self.local.delete_tasks(tasks).await?;
        info!(tasks = tasks.len(), "Deleted tasks");
        Ok(())
    }

    /// Sends an order to a pharmacy. Nothing is stored locally.
    pub async fn redeem(&self, order: &TaskOrder) -> Result<TaskOrder, ErxRepositoryError> {
        Ok(self.remote.redeem(order).await?)
    }

    pub async fn load_local_communications(
        &self,
        profile: CommunicationProfile,
    ) -> Result<Vec<Communication>, ErxRepositoryError> {
        Ok(self.local.list_communications(profile).await?)
    }

    /// Stores local changes to communications, in practice marking them read.
    pub async fn save_local_communications(
        &self,
        communications: &[Communication],
    ) -> Result<(), ErxRepositoryError> {
        Ok(self.local.save_communications(communications).await?)
    }

    /// Unread communications of `profile` (duplicates counted once) plus
    /// unread charge items that one of those communications refers to.
    pub async fn count_all_unread_communications_and_charge_items(
        &self,
        profile: CommunicationProfile,
    ) -> Result<usize, ErxRepositoryError> {
        let communications =
            unique_communications(self.local.list_communications(profile).await?);
        let unread_communications = communications.iter().filter(|c| !c.is_read).count();

        let charge_items = self.local.list_charge_items().await?;
        let unread_charge_items = charge_items
            .iter()
            .filter(|item| !item.is_read)
            .filter(|item| {
                communications
                    .iter()
                    .any(|c| c.task_id == item.identifier)
            })
            .count();

        Ok(unread_communications + unread_charge_items)
    }

    /// Synchronizes charge items alone and returns the local list.
    pub async fn load_remote_charge_items(
        &self,
    ) -> Result<Vec<SparseChargeItem>, ErxRepositoryError> {
        self.engine.sync_charge_items().await?;
        self.load_local_charge_items().await
    }

    pub async fn load_local_charge_item(
        &self,
        id: &str,
    ) -> Result<Option<SparseChargeItem>, ErxRepositoryError> {
        Ok(self.local.fetch_charge_item(id).await?)
    }

    pub async fn load_local_charge_items(
        &self,
    ) -> Result<Vec<SparseChargeItem>, ErxRepositoryError> {
        Ok(self.local.list_charge_items().await?)
    }

    pub async fn save_charge_items(
        &self,
        items: &[SparseChargeItem],
    ) -> Result<(), ErxRepositoryError> {
        Ok(self.local.save_charge_items(items).await?)
    }

    /// Charge items always live on the server, so the remote delete comes first.
    pub async fn delete_charge_items(
        &self,
        items: &[SparseChargeItem],
    ) -> Result<(), ErxRepositoryError> {
        self.remote.delete_charge_items(items).await?;
        self.local.delete_charge_items(items).await?;
        Ok(())
    }

    pub async fn delete_local_charge_items(
        &self,
        items: &[SparseChargeItem],
    ) -> Result<(), ErxRepositoryError> {
        Ok(self.local.delete_charge_items(items).await?)
    }

    /// One page of locally stored audit events, newest first.
    pub async fn load_local_audit_events(
        &self,
        task_id: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<AuditEvent>, ErxRepositoryError> {
        Ok(self.local.list_audit_events(task_id, page).await?)
    }

    pub async fn fetch_consents(&self) -> Result<Vec<Consent>, ErxRepositoryError> {
        Ok(self.remote.fetch_consents().await?)
    }

    pub async fn grant_consent(
        &self,
        consent: &Consent,
    ) -> Result<Option<Consent>, ErxRepositoryError> {
        Ok(self.remote.grant_consent(consent).await?)
    }

    pub async fn revoke_consent(
        &self,
        category: &ConsentCategory,
    ) -> Result<(), ErxRepositoryError> {
        Ok(self.remote.revoke_consent(category).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RedeemOption, TaskSource, TaskStatus};
    use crate::store::{LocalStoreError, RemoteStoreError};
    use crate::test_support::{fake_stores, CallLog, FakeLocalStore, FakeRemoteStore};

    struct TestContext {
        local: Arc<FakeLocalStore>,
        remote: Arc<FakeRemoteStore>,
        log: CallLog,
        repo: ErxTaskRepository,
    }

    fn setup() -> TestContext {
        let (local, remote, log) = fake_stores();
        let repo = ErxTaskRepository::new(local.clone(), remote.clone());
        TestContext {
            local,
            remote,
            log,
            repo,
        }
    }

    fn scanned(id: &str) -> Task {
        Task::new(id, TaskStatus::Ready, TaskSource::Scanner)
    }

    fn server(id: &str) -> Task {
        Task::new(id, TaskStatus::Ready, TaskSource::Server)
    }

    fn communication(id: &str, task_id: &str, is_read: bool) -> Communication {
        Communication::new(
            id,
            CommunicationProfile::Reply,
            task_id,
            "2026-03-01T10:00:00Z",
        )
        .with_read(is_read)
    }

    #[tokio::test]
    async fn test_delete_scanned_tasks_stays_local() {
        let ctx = setup();
        let tasks = vec![scanned("s-1"), scanned("s-2")];
        ctx.local.seed_tasks(tasks.clone());

        ctx.repo.delete_tasks(&tasks).await.unwrap();

        assert_eq!(ctx.log.entries(), vec!["local.delete_tasks"]);
        assert!(ctx.local.task_ids().is_empty());
    }

    #[tokio::test]
    async fn test_delete_mixed_batch_deletes_remote_first() {
        let ctx = setup();
        let tasks = vec![scanned("s-1"), server("r-1")];
        ctx.local.seed_tasks(tasks.clone());

        ctx.repo.delete_tasks(&tasks).await.unwrap();

        let remote = ctx.log.position("remote.delete_tasks").unwrap();
        let local = ctx.log.position("local.delete_tasks").unwrap();
        assert!(remote < local);
        assert!(ctx.local.task_ids().is_empty());
    }

    #[tokio::test]
    async fn test_failed_remote_delete_keeps_local_tasks() {
        let ctx = setup();
        let tasks = vec![server("r-1")];
        ctx.local.seed_tasks(tasks.clone());
        ctx.remote.fail(
            "delete_tasks",
            RemoteStoreError::Transport("401".to_string()),
        );

        let err = ctx.repo.delete_tasks(&tasks).await.unwrap_err();

        assert!(err.is_remote());
        assert_eq!(ctx.log.count("local.delete_tasks"), 0);
        assert_eq!(ctx.local.task_ids(), vec!["r-1"]);
    }

    #[tokio::test]
    async fn test_delete_charge_items_is_remote_then_local() {
        let ctx = setup();
        let items = vec![SparseChargeItem::new("charge-1", "2026-03-01")];
        ctx.repo.save_charge_items(&items).await.unwrap();

        ctx.repo.delete_charge_items(&items).await.unwrap();

        let remote = ctx.log.position("remote.delete_charge_items").unwrap();
        let local = ctx.log.position("local.delete_charge_items").unwrap();
        assert!(remote < local);
        assert!(ctx.repo.load_local_charge_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unread_count_dedups_communications() {
        let ctx = setup();
        ctx.local.seed_communications(vec![
            communication("c-1", "task-1", false),
            communication("c-1", "task-1", true),
            communication("c-2", "task-2", false),
        ]);

        let count = ctx
            .repo
            .count_all_unread_communications_and_charge_items(CommunicationProfile::Reply)
            .await
            .unwrap();

        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_unread_count_includes_referenced_charge_items() {
        let ctx = setup();
        ctx.local.seed_communications(vec![
            communication("c-1", "charge-1", true),
            communication("c-2", "task-2", false),
        ]);
        ctx.repo
            .save_charge_items(&[
                SparseChargeItem::new("charge-1", "2026-03-01"),
                SparseChargeItem::new("charge-2", "2026-03-01"),
                SparseChargeItem::new("task-2", "2026-03-01").with_read(true),
            ])
            .await
            .unwrap();

        let count = ctx
            .repo
            .count_all_unread_communications_and_charge_items(CommunicationProfile::All)
            .await
            .unwrap();

        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_load_remote_without_access_code_is_local_only() {
        let ctx = setup();
        ctx.local.seed_tasks(vec![server("task-1")]);

        let task = ctx.repo.load_remote("task-1", None).await.unwrap();

        assert!(task.is_some());
        assert_eq!(ctx.log.count("remote."), 0);
    }

    #[tokio::test]
    async fn test_load_remote_with_access_code_saves_without_auth_marker() {
        let ctx = setup();
        ctx.remote.state.lock().unwrap().tasks = vec![server("task-1")];

        let task = ctx
            .repo
            .load_remote("task-1", Some("secret"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(task.access_code.as_deref(), Some("secret"));
        assert_eq!(ctx.local.task_ids(), vec!["task-1"]);
        assert_eq!(ctx.local.state.lock().unwrap().last_authenticated_updates, 0);
    }

    #[tokio::test]
    async fn test_load_remote_unknown_task_saves_nothing() {
        let ctx = setup();

        let task = ctx.repo.load_remote("missing", Some("secret")).await.unwrap();

        assert!(task.is_none());
        assert_eq!(ctx.log.count("local.save_tasks"), 0);
    }

    #[tokio::test]
    async fn test_local_read_failure_is_tagged_local() {
        let ctx = setup();
        ctx.local
            .fail("list_all_tasks", LocalStoreError::Read("corrupt".to_string()));

        let err = ctx.repo.load_local_all().await.unwrap_err();

        assert_eq!(
            err,
            ErxRepositoryError::Local(LocalStoreError::Read("corrupt".to_string()))
        );
    }

    #[tokio::test]
    async fn test_remote_transport_failure_is_tagged_remote() {
        let ctx = setup();
        ctx.remote.fail(
            "fetch_consents",
            RemoteStoreError::Transport("timeout".to_string()),
        );

        let err = ctx.repo.fetch_consents().await.unwrap_err();

        assert!(err.is_remote());
        assert_eq!(err.code_list(), vec!["i-20002", "i-20401"]);
    }

    #[tokio::test]
    async fn test_redeem_does_not_touch_local_store() {
        let ctx = setup();
        let order = TaskOrder::new("task-1", "code", "3-pharmacy", RedeemOption::OnPremise);

        let accepted = ctx.repo.redeem(&order).await.unwrap();

        assert_eq!(accepted.identifier, order.identifier);
        assert_eq!(ctx.log.count("local."), 0);
    }

    #[tokio::test]
    async fn test_consents_pass_through() {
        let ctx = setup();
        let consent = Consent::new(ConsentCategory::ChargeItems, "X110");

        ctx.repo.grant_consent(&consent).await.unwrap();
        assert_eq!(ctx.repo.fetch_consents().await.unwrap(), vec![consent]);

        ctx.repo
            .revoke_consent(&ConsentCategory::ChargeItems)
            .await
            .unwrap();
        assert!(ctx.repo.fetch_consents().await.unwrap().is_empty());
        assert_eq!(ctx.log.count("local."), 0);
    }

    #[tokio::test]
    async fn test_load_remote_charge_items_returns_local_list() {
        let ctx = setup();
        ctx.remote.state.lock().unwrap().charge_items =
            vec![SparseChargeItem::new("charge-1", "2026-03-01T10:00:00Z")];

        let items = ctx.repo.load_remote_charge_items().await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(
            ctx.repo.load_local_charge_item("charge-1").await.unwrap(),
            Some(items[0].clone())
        );
    }

    #[tokio::test]
    async fn test_audit_events_paged_newest_first() {
        let ctx = setup();
        ctx.local
            .save_audit_events(&[
                AuditEvent::new("a-1", "2026-03-01T10:00:00Z"),
                AuditEvent::new("a-2", "2026-03-02T10:00:00Z"),
                AuditEvent::new("a-3", "2026-03-03T10:00:00Z"),
            ])
            .await
            .unwrap();

        let page = ctx
            .repo
            .load_local_audit_events(None, PageRequest::nth(1, 2))
            .await
            .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page[0].identifier, "a-1");
    }
}
