//! Capability traits for the two stores the sync engine reconciles.
//!
//! The engine never knows which backing technology sits behind a store:
//! [`crate::db::SqliteStore`] implements [`LocalStore`] and
//! [`crate::remote::HttpRemoteStore`] implements [`RemoteStore`].

mod local;
mod remote;

pub use local::{LocalStore, LocalStoreError};
pub use remote::{RemoteStore, RemoteStoreError};

use std::fmt;

/// Record types that carry a delta-sync watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// Watermark is `last_modified`.
    Task,
    /// Watermark is `timestamp`.
    Communication,
    /// Watermark is `timestamp`.
    AuditEvent,
    /// Watermark is `entered_date`.
    ChargeItem,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Task => write!(f, "tasks"),
            ResourceType::Communication => write!(f, "communications"),
            ResourceType::AuditEvent => write!(f, "audit events"),
            ResourceType::ChargeItem => write!(f, "charge items"),
        }
    }
}
