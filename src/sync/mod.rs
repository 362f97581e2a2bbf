//! Synchronization of the local store with the remote prescription service.
//!
//! # Order of steps
//!
//! [`SyncEngine::synchronize_all`] runs, one after another:
//! 1. tasks (paginated; completed tasks fan out to their medication dispenses)
//! 2. communications
//! 3. audit events (paginated, each page saved as it arrives)
//! 4. charge items, for privately insured profiles only
//!
//! and finally reads the full local task list.
//!
//! Every step starts from the local watermark of its record type, so a rerun
//! without new remote data writes nothing new.

mod engine;
mod pagination;

pub use engine::SyncEngine;
pub use pagination::{walk_pages, WalkSummary};
