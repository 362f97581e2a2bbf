use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ConsentCategory {
    /// Permission to store charge items on the server.
    ChargeItems,
    Other(String),
}

impl fmt::Display for ConsentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsentCategory::ChargeItems => write!(f, "CHARGCONS"),
            ConsentCategory::Other(code) => write!(f, "{}", code),
        }
    }
}

impl From<String> for ConsentCategory {
    fn from(code: String) -> Self {
        if code.eq_ignore_ascii_case("CHARGCONS") {
            ConsentCategory::ChargeItems
        } else {
            ConsentCategory::Other(code)
        }
    }
}

impl From<ConsentCategory> for String {
    fn from(category: ConsentCategory) -> Self {
        category.to_string()
    }
}

impl FromStr for ConsentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("Consent category must not be empty".to_string());
        }
        Ok(ConsentCategory::from(s.trim().to_string()))
    }
}

/// A consent is granted while it exists on the server and revoked by deleting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
    #[serde(default)]
    pub identifier: Option<String>,
    pub category: ConsentCategory,
    pub insurance_id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Consent {
    pub fn new(category: ConsentCategory, insurance_id: impl Into<String>) -> Self {
        Self {
            identifier: None,
            category,
            insurance_id: insurance_id.into(),
            timestamp: None,
        }
    }
}
