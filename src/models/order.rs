use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RedeemOption {
    OnPremise,
    Delivery,
    Shipment,
}

impl fmt::Display for RedeemOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedeemOption::OnPremise => write!(f, "onPremise"),
            RedeemOption::Delivery => write!(f, "delivery"),
            RedeemOption::Shipment => write!(f, "shipment"),
        }
    }
}

impl FromStr for RedeemOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "onpremise" | "on-premise" => Ok(RedeemOption::OnPremise),
            "delivery" => Ok(RedeemOption::Delivery),
            "shipment" => Ok(RedeemOption::Shipment),
            _ => Err(format!(
                "Invalid redeem option '{}'. Valid options: on-premise, delivery, shipment",
                s
            )),
        }
    }
}

/// Request to a pharmacy to dispense a task.
///
/// The server acknowledging an order does not mean the pharmacy accepted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOrder {
    pub identifier: Uuid,
    pub task_id: String,
    pub access_code: String,
    pub pharmacy_telematik_id: String,
    pub redeem_type: RedeemOption,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl TaskOrder {
    pub fn new(
        task_id: impl Into<String>,
        access_code: impl Into<String>,
        pharmacy_telematik_id: impl Into<String>,
        redeem_type: RedeemOption,
    ) -> Self {
        Self {
            identifier: Uuid::new_v4(),
            task_id: task_id.into(),
            access_code: access_code.into(),
            pharmacy_telematik_id: pharmacy_telematik_id.into(),
            redeem_type,
            name: None,
            phone: None,
        }
    }
}
