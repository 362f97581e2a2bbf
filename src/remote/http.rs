use async_trait::async_trait;
use reqwest::{header, IntoUrl, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::models::{
    AuditEvent, Communication, CommunicationProfile, Consent, ConsentCategory,
    MedicationDispense, PagedContent, SparseChargeItem, Task, TaskOrder,
};
use crate::store::{RemoteStore, RemoteStoreError};

const ACCESS_CODE_HEADER: &str = "X-AccessCode";

/// JSON client for the prescription service.
///
/// Every request carries the bearer token when one is configured and is
/// bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl HttpRemoteStore {
    pub fn new(
        base_url: impl Into<String>,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteStoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                RemoteStoreError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Base URL extended by `segments`, each percent-encoded as one path segment.
    fn segment_url(&self, segments: &[&str]) -> Result<Url, RemoteStoreError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            RemoteStoreError::Transport(format!("Invalid base URL {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                RemoteStoreError::Transport(format!("Base URL {} cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Next-page links are followed as given when absolute, else relative to the base URL.
    fn resolve(&self, next: &str) -> String {
        if next.starts_with("http://") || next.starts_with("https://") {
            next.to_string()
        } else {
            self.url(next.trim_start_matches('/'))
        }
    }

    fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteStoreError> {
        let response = request.send().await?;
        debug!(status = %response.status(), url = %response.url(), "Remote response");
        Ok(response.error_for_status()?)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RemoteStoreError> {
        Ok(self.send(request).await?.json().await?)
    }
}

/// `gt` prefixed watermark query parameter, omitted without a watermark.
fn newer_than(name: &'static str, watermark: Option<&str>) -> Vec<(&'static str, String)> {
    watermark
        .map(|value| vec![(name, format!("gt{}", value))])
        .unwrap_or_default()
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch_task(
        &self,
        id: &str,
        access_code: Option<&str>,
    ) -> Result<Option<Task>, RemoteStoreError> {
        let mut request = self.request(Method::GET, self.segment_url(&["Task", id])?);
        if let Some(code) = access_code {
            request = request.header(ACCESS_CODE_HEADER, code);
        }

        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let task: Task = response.error_for_status()?.json().await?;

        Ok(Some(match (access_code, &task.access_code) {
            (Some(code), None) => task.with_access_code(code),
            _ => task,
        }))
    }

    async fn list_tasks_after(
        &self,
        watermark: Option<&str>,
    ) -> Result<PagedContent<Task>, RemoteStoreError> {
        let request = self
            .request(Method::GET, &self.url("Task"))
            .query(&newer_than("modified", watermark));
        self.send_json(request).await
    }

    async fn list_tasks_next_page(
        &self,
        next: &str,
    ) -> Result<PagedContent<Task>, RemoteStoreError> {
        self.send_json(self.request(Method::GET, &self.resolve(next)))
            .await
    }

    async fn delete_tasks(&self, tasks: &[Task]) -> Result<(), RemoteStoreError> {
        for task in tasks {
            let url = self.segment_url(&["Task", task.identifier.as_str(), "$abort"])?;
            let mut request = self.request(Method::POST, url);
            if let Some(code) = &task.access_code {
                request = request.header(ACCESS_CODE_HEADER, code);
            }
            self.send(request).await?;
        }
        Ok(())
    }

    async fn redeem(&self, order: &TaskOrder) -> Result<TaskOrder, RemoteStoreError> {
        let request = self
            .request(Method::POST, &self.url("Communication"))
            .json(order);
        self.send_json(request).await
    }

    async fn list_communications_after(
        &self,
        watermark: Option<&str>,
        profile: CommunicationProfile,
    ) -> Result<Vec<Communication>, RemoteStoreError> {
        let mut query = newer_than("sent", watermark);
        query.push(("profile", profile.to_string()));
        let request = self
            .request(Method::GET, &self.url("Communication"))
            .query(&query);
        self.send_json(request).await
    }

    async fn list_audit_events_after(
        &self,
        watermark: Option<&str>,
        locale: Option<&str>,
    ) -> Result<PagedContent<AuditEvent>, RemoteStoreError> {
        let mut request = self
            .request(Method::GET, &self.url("AuditEvent"))
            .query(&newer_than("date", watermark));
        if let Some(locale) = locale {
            request = request.header(header::ACCEPT_LANGUAGE, locale);
        }
        self.send_json(request).await
    }

    async fn list_audit_events_next_page(
        &self,
        next: &str,
        locale: Option<&str>,
    ) -> Result<PagedContent<AuditEvent>, RemoteStoreError> {
        let mut request = self.request(Method::GET, &self.resolve(next));
        if let Some(locale) = locale {
            request = request.header(header::ACCEPT_LANGUAGE, locale);
        }
        self.send_json(request).await
    }

    async fn list_medication_dispenses(
        &self,
        task_id: &str,
    ) -> Result<Vec<MedicationDispense>, RemoteStoreError> {
        let request = self
            .request(Method::GET, &self.url("MedicationDispense"))
            .query(&[("identifier", task_id)]);
        self.send_json(request).await
    }

    async fn list_charge_items_after(
        &self,
        watermark: Option<&str>,
    ) -> Result<Vec<SparseChargeItem>, RemoteStoreError> {
        let request = self
            .request(Method::GET, &self.url("ChargeItem"))
            .query(&newer_than("entered-date", watermark));
        self.send_json(request).await
    }

    async fn delete_charge_items(
        &self,
        items: &[SparseChargeItem],
    ) -> Result<(), RemoteStoreError> {
        for item in items {
            let url = self.segment_url(&["ChargeItem", item.identifier.as_str()])?;
            self.send(self.request(Method::DELETE, url)).await?;
        }
        Ok(())
    }

    async fn fetch_consents(&self) -> Result<Vec<Consent>, RemoteStoreError> {
        self.send_json(self.request(Method::GET, &self.url("Consent")))
            .await
    }

    async fn grant_consent(&self, consent: &Consent) -> Result<Option<Consent>, RemoteStoreError> {
        let request = self
            .request(Method::POST, &self.url("Consent"))
            .json(consent);
        let body = self.send(request).await?.bytes().await?;
        if body.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| RemoteStoreError::Transport(format!("Invalid consent response: {}", e)))
    }

    async fn revoke_consent(&self, category: &ConsentCategory) -> Result<(), RemoteStoreError> {
        let request = self
            .request(Method::DELETE, &self.url("Consent"))
            .query(&[("category", category.to_string())]);
        self.send(request).await?;
        Ok(())
    }
}
