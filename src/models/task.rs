use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::communication::Communication;
use super::medication_dispense::MedicationDispense;

const ERROR_PREFIX: &str = "error: ";

/// Lifecycle state of a prescription task.
///
/// Serialized as its raw string value (`"in-progress"`, `"error: <message>"`, ...)
/// so the same representation is used on the wire and in the local database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TaskStatus {
    Draft,
    Ready,
    InProgress,
    Completed,
    Cancelled,
    /// Computed on device, carries a diagnostic message.
    Error(String),
    /// Any status outside the known subset, kept verbatim.
    Other(String),
}

impl TaskStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskStatus::Cancelled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Draft => write!(f, "draft"),
            TaskStatus::Ready => write!(f, "ready"),
            TaskStatus::InProgress => write!(f, "in-progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Cancelled => write!(f, "cancelled"),
            TaskStatus::Error(message) => write!(f, "{}{}", ERROR_PREFIX, message),
            TaskStatus::Other(raw) => write!(f, "{}", raw),
        }
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "draft" => TaskStatus::Draft,
            "ready" => TaskStatus::Ready,
            "in-progress" => TaskStatus::InProgress,
            "completed" => TaskStatus::Completed,
            "cancelled" => TaskStatus::Cancelled,
            _ => match raw.strip_prefix(ERROR_PREFIX) {
                Some(message) => TaskStatus::Error(message.to_string()),
                None => TaskStatus::Other(raw),
            },
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.to_string()
    }
}

/// Where a task came from. Decides whether deleting it needs a server round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskSource {
    /// Scanned from a printed code; the server does not know about it.
    Scanner,
    Server,
}

impl fmt::Display for TaskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskSource::Scanner => write!(f, "scanner"),
            TaskSource::Server => write!(f, "server"),
        }
    }
}

impl FromStr for TaskSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scanner" => Ok(TaskSource::Scanner),
            "server" => Ok(TaskSource::Server),
            _ => Err(format!(
                "Invalid task source '{}'. Valid options: scanner, server",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub identifier: String,
    pub status: TaskStatus,
    pub source: TaskSource,
    #[serde(default)]
    pub access_code: Option<String>,
    /// Watermark used for delta synchronization.
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub authored_on: Option<String>,
    #[serde(default)]
    pub expires_on: Option<String>,
    /// Set locally when a scanned task is marked as redeemed.
    #[serde(default)]
    pub redeemed_on: Option<String>,
    #[serde(default)]
    pub prescription_id: Option<String>,
    #[serde(default)]
    pub medication_name: Option<String>,
    #[serde(default)]
    pub communications: Vec<Communication>,
    #[serde(default)]
    pub medication_dispenses: Vec<MedicationDispense>,
}

impl Task {
    pub fn new(identifier: impl Into<String>, status: TaskStatus, source: TaskSource) -> Self {
        Self {
            identifier: identifier.into(),
            status,
            source,
            access_code: None,
            last_modified: None,
            authored_on: None,
            expires_on: None,
            redeemed_on: None,
            prescription_id: None,
            medication_name: None,
            communications: Vec::new(),
            medication_dispenses: Vec::new(),
        }
    }

    pub fn with_access_code(mut self, access_code: impl Into<String>) -> Self {
        self.access_code = Some(access_code.into());
        self
    }

    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }

    pub fn with_authored_on(mut self, authored_on: impl Into<String>) -> Self {
        self.authored_on = Some(authored_on.into());
        self
    }

    pub fn with_medication_name(mut self, name: impl Into<String>) -> Self {
        self.medication_name = Some(name.into());
        self
    }

    pub fn with_medication_dispenses(mut self, dispenses: Vec<MedicationDispense>) -> Self {
        self.medication_dispenses = dispenses;
        self
    }

    pub fn is_scanned(&self) -> bool {
        self.source == TaskSource::Scanner
    }

    /// Marks the task as redeemed on `redeemed_on`, or resets it to ready when `None`.
    pub fn update_redeemed_on(&mut self, redeemed_on: Option<String>) {
        match redeemed_on {
            Some(date) => {
                self.redeemed_on = Some(date);
                self.status = TaskStatus::Completed;
            }
            None => {
                self.redeemed_on = None;
                self.status = TaskStatus::Ready;
            }
        }
    }

    /// Returns a copy of this task cancelled as of `last_modified`.
    pub fn cancelled(&self, last_modified: Option<String>) -> Self {
        Self {
            status: TaskStatus::Cancelled,
            last_modified,
            ..self.clone()
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.identifier,
            self.status,
            self.medication_name.as_deref().unwrap_or("-")
        )?;
        if self.is_scanned() {
            write!(f, " (scanned)")?;
        }
        Ok(())
    }
}
