//! Delta synchronization between an on-device prescription store and the
//! remote e-prescription service.
//!
//! [`repository::ErxTaskRepository`] is the entry point. It runs the
//! [`sync::SyncEngine`] over a [`store::LocalStore`] (SQLite, see [`db`]) and
//! a [`store::RemoteStore`] (HTTP, see [`remote`]).

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod remote;
pub mod repository;
pub mod store;
pub mod sync;

#[cfg(test)]
mod test_support;

pub use error::ErxRepositoryError;
pub use repository::ErxTaskRepository;
