use serde::{Deserialize, Serialize};

/// Billing summary for a privately insured prescription.
///
/// Only the fields needed for listing and bookkeeping are kept; the full
/// invoice bundle stays on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseChargeItem {
    pub identifier: String,
    #[serde(default)]
    pub task_id: Option<String>,
    /// Watermark used for delta synchronization.
    pub entered_date: String,
    #[serde(default)]
    pub medication_name: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

impl SparseChargeItem {
    pub fn new(identifier: impl Into<String>, entered_date: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            task_id: None,
            entered_date: entered_date.into(),
            medication_name: None,
            is_read: false,
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn with_read(mut self, is_read: bool) -> Self {
        self.is_read = is_read;
        self
    }
}
