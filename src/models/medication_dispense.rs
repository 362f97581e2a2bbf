use serde::{Deserialize, Serialize};

/// What the pharmacy actually handed over for a completed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDispense {
    pub identifier: String,
    pub task_id: String,
    #[serde(default)]
    pub telematik_id: Option<String>,
    #[serde(default)]
    pub when_handed_over: Option<String>,
    #[serde(default)]
    pub medication_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
}

impl MedicationDispense {
    pub fn new(identifier: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            task_id: task_id.into(),
            telematik_id: None,
            when_handed_over: None,
            medication_name: None,
            quantity: None,
        }
    }

    pub fn with_when_handed_over(mut self, date: impl Into<String>) -> Self {
        self.when_handed_over = Some(date.into());
        self
    }

    pub fn with_medication_name(mut self, name: impl Into<String>) -> Self {
        self.medication_name = Some(name.into());
        self
    }
}
