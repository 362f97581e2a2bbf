//! In-memory stores with call logs and failure injection for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::models::{
    AuditEvent, Communication, CommunicationProfile, Consent, ConsentCategory,
    MedicationDispense, PageRequest, PagedContent, SparseChargeItem, Task, TaskOrder,
};
use crate::store::{LocalStore, LocalStoreError, RemoteStore, RemoteStoreError, ResourceType};

/// Ordered record of store calls, shared between fakes.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Number of entries starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .count()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.lock().unwrap().iter().position(|e| e == entry)
    }
}

fn upsert<T: Clone>(stored: &mut Vec<T>, incoming: &[T], key: impl Fn(&T) -> String) {
    for item in incoming {
        match stored.iter_mut().find(|s| key(&**s) == key(item)) {
            Some(existing) => *existing = item.clone(),
            None => stored.push(item.clone()),
        }
    }
}

fn newer_than(value: &str, watermark: Option<&str>) -> bool {
    watermark.map_or(true, |watermark| value > watermark)
}

#[derive(Debug, Default)]
pub struct LocalState {
    pub tasks: Vec<Task>,
    pub communications: Vec<Communication>,
    pub audit_events: Vec<AuditEvent>,
    pub dispenses: Vec<MedicationDispense>,
    pub charge_items: Vec<SparseChargeItem>,
    pub last_authenticated_updates: usize,
}

pub struct FakeLocalStore {
    pub state: Mutex<LocalState>,
    log: CallLog,
    failures: Mutex<HashMap<&'static str, LocalStoreError>>,
}

impl FakeLocalStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            state: Mutex::new(LocalState::default()),
            log,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Makes every call of `operation` fail with `error`.
    pub fn fail(&self, operation: &'static str, error: LocalStoreError) {
        self.failures.lock().unwrap().insert(operation, error);
    }

    /// Stores communications verbatim, duplicates included.
    pub fn seed_communications(&self, communications: Vec<Communication>) {
        self.state.lock().unwrap().communications.extend(communications);
    }

    pub fn seed_tasks(&self, tasks: Vec<Task>) {
        self.state.lock().unwrap().tasks.extend(tasks);
    }

    pub fn task_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .state
            .lock()
            .unwrap()
            .tasks
            .iter()
            .map(|t| t.identifier.clone())
            .collect();
        ids.sort();
        ids
    }

    fn enter(&self, operation: &'static str) -> Result<(), LocalStoreError> {
        self.log.push(format!("local.{}", operation));
        match self.failures.lock().unwrap().get(operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LocalStore for FakeLocalStore {
    async fn latest_watermark(
        &self,
        resource: ResourceType,
    ) -> Result<Option<String>, LocalStoreError> {
        self.enter("latest_watermark")?;
        let state = self.state.lock().unwrap();
        let latest = match resource {
            ResourceType::Task => state
                .tasks
                .iter()
                .filter_map(|t| t.last_modified.clone())
                .max(),
            ResourceType::Communication => {
                state.communications.iter().map(|c| c.timestamp.clone()).max()
            }
            ResourceType::AuditEvent => {
                state.audit_events.iter().map(|e| e.timestamp.clone()).max()
            }
            ResourceType::ChargeItem => state
                .charge_items
                .iter()
                .map(|i| i.entered_date.clone())
                .max(),
        };
        Ok(latest)
    }

    async fn fetch_task(
        &self,
        id: &str,
        access_code: Option<&str>,
    ) -> Result<Option<Task>, LocalStoreError> {
        self.enter("fetch_task")?;
        let state = self.state.lock().unwrap();
        Ok(state
            .tasks
            .iter()
            .find(|t| {
                t.identifier == id
                    && access_code.map_or(true, |code| t.access_code.as_deref() == Some(code))
            })
            .cloned())
    }

    async fn list_all_tasks(&self) -> Result<Vec<Task>, LocalStoreError> {
        self.enter("list_all_tasks")?;
        Ok(self.state.lock().unwrap().tasks.clone())
    }

    async fn save_tasks(
        &self,
        tasks: &[Task],
        update_last_authenticated: bool,
    ) -> Result<(), LocalStoreError> {
        self.enter("save_tasks")?;
        let mut state = self.state.lock().unwrap();
        upsert(&mut state.tasks, tasks, |t| t.identifier.clone());
        if update_last_authenticated {
            state.last_authenticated_updates += 1;
        }
        Ok(())
    }

    async fn delete_tasks(&self, tasks: &[Task]) -> Result<(), LocalStoreError> {
        self.enter("delete_tasks")?;
        let mut state = self.state.lock().unwrap();
        state
            .tasks
            .retain(|stored| !tasks.iter().any(|t| t.identifier == stored.identifier));
        Ok(())
    }

    async fn list_communications(
        &self,
        profile: CommunicationProfile,
    ) -> Result<Vec<Communication>, LocalStoreError> {
        self.enter("list_communications")?;
        let state = self.state.lock().unwrap();
        Ok(state
            .communications
            .iter()
            .filter(|c| profile.is_all() || c.profile == profile)
            .cloned()
            .collect())
    }

    async fn save_communications(
        &self,
        communications: &[Communication],
    ) -> Result<(), LocalStoreError> {
        self.enter("save_communications")?;
        let mut state = self.state.lock().unwrap();
        for communication in communications {
            match state
                .communications
                .iter_mut()
                .find(|c| c.identifier == communication.identifier)
            {
                Some(existing) => existing.is_read |= communication.is_read,
                None => state.communications.push(communication.clone()),
            }
        }
        Ok(())
    }

    async fn save_audit_events(&self, events: &[AuditEvent]) -> Result<(), LocalStoreError> {
        self.enter("save_audit_events")?;
        let mut state = self.state.lock().unwrap();
        upsert(&mut state.audit_events, events, |e| e.identifier.clone());
        Ok(())
    }

    async fn list_audit_events(
        &self,
        task_id: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<AuditEvent>, LocalStoreError> {
        self.enter("list_audit_events")?;
        let state = self.state.lock().unwrap();
        let mut events: Vec<AuditEvent> = state
            .audit_events
            .iter()
            .filter(|e| task_id.map_or(true, |id| e.task_id.as_deref() == Some(id)))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(events.into_iter().skip(page.offset).take(page.size).collect())
    }

    async fn save_medication_dispenses(
        &self,
        dispenses: &[MedicationDispense],
    ) -> Result<(), LocalStoreError> {
        self.enter("save_medication_dispenses")?;
        let mut state = self.state.lock().unwrap();
        upsert(&mut state.dispenses, dispenses, |d| {
            format!("{}/{}", d.task_id, d.identifier)
        });
        Ok(())
    }

    async fn fetch_charge_item(
        &self,
        id: &str,
    ) -> Result<Option<SparseChargeItem>, LocalStoreError> {
        self.enter("fetch_charge_item")?;
        let state = self.state.lock().unwrap();
        Ok(state.charge_items.iter().find(|i| i.identifier == id).cloned())
    }

    async fn list_charge_items(&self) -> Result<Vec<SparseChargeItem>, LocalStoreError> {
        self.enter("list_charge_items")?;
        Ok(self.state.lock().unwrap().charge_items.clone())
    }

    async fn save_charge_items(&self, items: &[SparseChargeItem]) -> Result<(), LocalStoreError> {
        self.enter("save_charge_items")?;
        let mut state = self.state.lock().unwrap();
        upsert(&mut state.charge_items, items, |i| i.identifier.clone());
        Ok(())
    }

    async fn delete_charge_items(
        &self,
        items: &[SparseChargeItem],
    ) -> Result<(), LocalStoreError> {
        self.enter("delete_charge_items")?;
        let mut state = self.state.lock().unwrap();
        state
            .charge_items
            .retain(|stored| !items.iter().any(|i| i.identifier == stored.identifier));
        Ok(())
    }
}

/// Explicit page chain: the first page plus pages reachable by their `next` link.
pub type PageChain<T> = (PagedContent<T>, HashMap<String, PagedContent<T>>);

#[derive(Debug, Default)]
pub struct RemoteState {
    pub tasks: Vec<Task>,
    pub task_pages: Option<PageChain<Task>>,
    pub communications: Vec<Communication>,
    pub audit_events: Vec<AuditEvent>,
    pub audit_event_pages: Option<PageChain<AuditEvent>>,
    pub dispenses: HashMap<String, Vec<MedicationDispense>>,
    pub charge_items: Vec<SparseChargeItem>,
    pub consents: Vec<Consent>,
}

pub struct FakeRemoteStore {
    pub state: Mutex<RemoteState>,
    log: CallLog,
    failures: Mutex<HashMap<&'static str, RemoteStoreError>>,
}

impl FakeRemoteStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            state: Mutex::new(RemoteState::default()),
            log,
            failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn fail(&self, operation: &'static str, error: RemoteStoreError) {
        self.failures.lock().unwrap().insert(operation, error);
    }

    fn enter(&self, entry: String, operation: &'static str) -> Result<(), RemoteStoreError> {
        self.log.push(entry);
        match self.failures.lock().unwrap().get(operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn next_page<T: Clone>(
        chain: &Option<PageChain<T>>,
        next: &str,
    ) -> Result<PagedContent<T>, RemoteStoreError> {
        chain
            .as_ref()
            .and_then(|(_, pages)| pages.get(next).cloned())
            .ok_or_else(|| RemoteStoreError::Transport(format!("unknown page {}", next)))
    }
}

#[async_trait]
impl RemoteStore for FakeRemoteStore {
    async fn fetch_task(
        &self,
        id: &str,
        access_code: Option<&str>,
    ) -> Result<Option<Task>, RemoteStoreError> {
        self.enter(format!("remote.fetch_task:{}", id), "fetch_task")?;
        let state = self.state.lock().unwrap();
        Ok(state
            .tasks
            .iter()
            .find(|t| t.identifier == id)
            .cloned()
            .map(|task| match access_code {
                Some(code) => task.with_access_code(code),
                None => task,
            }))
    }

    async fn list_tasks_after(
        &self,
        watermark: Option<&str>,
    ) -> Result<PagedContent<Task>, RemoteStoreError> {
        self.enter("remote.list_tasks_after".to_string(), "list_tasks_after")?;
        let state = self.state.lock().unwrap();
        if let Some((first, _)) = &state.task_pages {
            return Ok(first.clone());
        }
        Ok(PagedContent::last(
            state
                .tasks
                .iter()
                .filter(|t| newer_than(t.last_modified.as_deref().unwrap_or(""), watermark))
                .cloned()
                .collect(),
        ))
    }

    async fn list_tasks_next_page(
        &self,
        next: &str,
    ) -> Result<PagedContent<Task>, RemoteStoreError> {
        self.enter(
            format!("remote.list_tasks_next_page:{}", next),
            "list_tasks_next_page",
        )?;
        let state = self.state.lock().unwrap();
        Self::next_page(&state.task_pages, next)
    }

    async fn delete_tasks(&self, tasks: &[Task]) -> Result<(), RemoteStoreError> {
        self.enter("remote.delete_tasks".to_string(), "delete_tasks")?;
        let mut state = self.state.lock().unwrap();
        state
            .tasks
            .retain(|stored| !tasks.iter().any(|t| t.identifier == stored.identifier));
        Ok(())
    }

    async fn redeem(&self, order: &TaskOrder) -> Result<TaskOrder, RemoteStoreError> {
        self.enter(format!("remote.redeem:{}", order.task_id), "redeem")?;
        Ok(order.clone())
    }

    async fn list_communications_after(
        &self,
        watermark: Option<&str>,
        profile: CommunicationProfile,
    ) -> Result<Vec<Communication>, RemoteStoreError> {
        self.enter(
            format!("remote.list_communications_after:{}", profile),
            "list_communications_after",
        )?;
        let state = self.state.lock().unwrap();
        Ok(state
            .communications
            .iter()
            .filter(|c| {
                (profile.is_all() || c.profile == profile) && newer_than(&c.timestamp, watermark)
            })
            .cloned()
            .collect())
    }

    async fn list_audit_events_after(
        &self,
        watermark: Option<&str>,
        _locale: Option<&str>,
    ) -> Result<PagedContent<AuditEvent>, RemoteStoreError> {
        self.enter(
            "remote.list_audit_events_after".to_string(),
            "list_audit_events_after",
        )?;
        let state = self.state.lock().unwrap();
        if let Some((first, _)) = &state.audit_event_pages {
            return Ok(first.clone());
        }
        Ok(PagedContent::last(
            state
                .audit_events
                .iter()
                .filter(|e| newer_than(&e.timestamp, watermark))
                .cloned()
                .collect(),
        ))
    }

    async fn list_audit_events_next_page(
        &self,
        next: &str,
        _locale: Option<&str>,
    ) -> Result<PagedContent<AuditEvent>, RemoteStoreError> {
        self.enter(
            format!("remote.list_audit_events_next_page:{}", next),
            "list_audit_events_next_page",
        )?;
        let state = self.state.lock().unwrap();
        Self::next_page(&state.audit_event_pages, next)
    }

    async fn list_medication_dispenses(
        &self,
        task_id: &str,
    ) -> Result<Vec<MedicationDispense>, RemoteStoreError> {
        self.enter(
            format!("remote.list_medication_dispenses:{}", task_id),
            "list_medication_dispenses",
        )?;
        let state = self.state.lock().unwrap();
        Ok(state.dispenses.get(task_id).cloned().unwrap_or_default())
    }

    async fn list_charge_items_after(
        &self,
        watermark: Option<&str>,
    ) -> Result<Vec<SparseChargeItem>, RemoteStoreError> {
        self.enter(
            "remote.list_charge_items_after".to_string(),
            "list_charge_items_after",
        )?;
        let state = self.state.lock().unwrap();
        Ok(state
            .charge_items
            .iter()
            .filter(|i| newer_than(&i.entered_date, watermark))
            .cloned()
            .collect())
    }

    async fn delete_charge_items(
        &self,
        items: &[SparseChargeItem],
    ) -> Result<(), RemoteStoreError> {
        self.enter(
            "remote.delete_charge_items".to_string(),
            "delete_charge_items",
        )?;
        let mut state = self.state.lock().unwrap();
        state
            .charge_items
            .retain(|stored| !items.iter().any(|i| i.identifier == stored.identifier));
        Ok(())
    }

    async fn fetch_consents(&self) -> Result<Vec<Consent>, RemoteStoreError> {
        self.enter("remote.fetch_consents".to_string(), "fetch_consents")?;
        Ok(self.state.lock().unwrap().consents.clone())
    }

    async fn grant_consent(&self, consent: &Consent) -> Result<Option<Consent>, RemoteStoreError> {
        self.enter(
            format!("remote.grant_consent:{}", consent.category),
            "grant_consent",
        )?;
        let mut state = self.state.lock().unwrap();
        state.consents.push(consent.clone());
        Ok(Some(consent.clone()))
    }

    async fn revoke_consent(&self, category: &ConsentCategory) -> Result<(), RemoteStoreError> {
        self.enter(
            format!("remote.revoke_consent:{}", category),
            "revoke_consent",
        )?;
        let mut state = self.state.lock().unwrap();
        state.consents.retain(|c| &c.category != category);
        Ok(())
    }
}

/// Local and remote fakes sharing one call log.
pub fn fake_stores() -> (Arc<FakeLocalStore>, Arc<FakeRemoteStore>, CallLog) {
    let log = CallLog::default();
    (
        Arc::new(FakeLocalStore::new(log.clone())),
        Arc::new(FakeRemoteStore::new(log.clone())),
        log,
    )
}
