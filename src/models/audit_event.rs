use serde::{Deserialize, Serialize};

/// Append-only protocol entry written by the server whenever a task is touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub identifier: String,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub timestamp: String,
    /// Language the server rendered `text` in.
    #[serde(default)]
    pub locale: Option<String>,
}

impl AuditEvent {
    pub fn new(identifier: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            task_id: None,
            title: None,
            text: None,
            timestamp: timestamp.into(),
            locale: None,
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}
