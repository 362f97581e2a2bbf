use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Kind of message exchanged between patient and pharmacy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommunicationProfile {
    #[serde(rename = "reply")]
    Reply,
    #[serde(rename = "dispense-request")]
    DispenseRequest,
    #[serde(rename = "info-request")]
    InfoRequest,
    #[serde(rename = "representative")]
    Representative,
    /// Query-only profile matching every other profile.
    #[serde(rename = "all")]
    All,
    #[serde(rename = "none")]
    None,
}

impl CommunicationProfile {
    pub fn is_all(&self) -> bool {
        *self == CommunicationProfile::All
    }
}

impl fmt::Display for CommunicationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommunicationProfile::Reply => write!(f, "reply"),
            CommunicationProfile::DispenseRequest => write!(f, "dispense-request"),
            CommunicationProfile::InfoRequest => write!(f, "info-request"),
            CommunicationProfile::Representative => write!(f, "representative"),
            CommunicationProfile::All => write!(f, "all"),
            CommunicationProfile::None => write!(f, "none"),
        }
    }
}

impl FromStr for CommunicationProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reply" => Ok(CommunicationProfile::Reply),
            "dispense-request" => Ok(CommunicationProfile::DispenseRequest),
            "info-request" => Ok(CommunicationProfile::InfoRequest),
            "representative" => Ok(CommunicationProfile::Representative),
            "all" => Ok(CommunicationProfile::All),
            "none" => Ok(CommunicationProfile::None),
            _ => Err(format!(
                "Invalid communication profile '{}'. Valid options: reply, dispense-request, \
                 info-request, representative, all, none",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    pub identifier: String,
    pub profile: CommunicationProfile,
    /// Task this message refers to. Lookup only, the task does not own it.
    pub task_id: String,
    #[serde(default)]
    pub insurance_id: String,
    #[serde(default)]
    pub telematik_id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    pub timestamp: String,
    /// The only field that may change locally without a server round-trip.
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub payload_json: String,
}

impl Communication {
    pub fn new(
        identifier: impl Into<String>,
        profile: CommunicationProfile,
        task_id: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            profile,
            task_id: task_id.into(),
            insurance_id: String::new(),
            telematik_id: String::new(),
            order_id: None,
            timestamp: timestamp.into(),
            is_read: false,
            payload_json: String::new(),
        }
    }

    pub fn with_read(mut self, is_read: bool) -> Self {
        self.is_read = is_read;
        self
    }
}

/// Drops communications whose identifier was already seen. The first occurrence wins.
pub fn unique_communications(communications: Vec<Communication>) -> Vec<Communication> {
    let mut seen = HashSet::new();
    communications
        .into_iter()
        .filter(|communication| seen.insert(communication.identifier.clone()))
        .collect()
}
