mod audit_event;
mod charge_item;
mod communication;
mod consent;
mod medication_dispense;
mod order;
mod page;
mod task;

pub use audit_event::AuditEvent;
pub use charge_item::SparseChargeItem;
pub use communication::{unique_communications, Communication, CommunicationProfile};
pub use consent::{Consent, ConsentCategory};
pub use medication_dispense::MedicationDispense;
pub use order::{RedeemOption, TaskOrder};
pub use page::{PageRequest, PagedContent};
pub use task::{Task, TaskSource, TaskStatus};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Insurance type of the active profile. Charge items only exist for private insurance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsuranceType {
    /// Statutory health insurance.
    #[default]
    Gkv,
    /// Private health insurance.
    Pkv,
}

impl fmt::Display for InsuranceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsuranceType::Gkv => write!(f, "gkv"),
            InsuranceType::Pkv => write!(f, "pkv"),
        }
    }
}

impl FromStr for InsuranceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gkv" => Ok(InsuranceType::Gkv),
            "pkv" => Ok(InsuranceType::Pkv),
            _ => Err(format!(
                "Invalid insurance type '{}'. Valid options: gkv, pkv",
                s
            )),
        }
    }
}
