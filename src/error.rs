//! Error taxonomy surfaced by [`crate::repository::ErxTaskRepository`].
//!
//! Every store failure is tagged exactly once, either as `Local` or as
//! `Remote`. Callers branch on the tag: remote failures usually mean the
//! session needs to re-authenticate, local failures abort the operation.

use thiserror::Error;

use crate::store::{LocalStoreError, RemoteStoreError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErxRepositoryError {
    #[error("Local store error: {0}")]
    Local(LocalStoreError),

    #[error("Remote store error: {0}")]
    Remote(RemoteStoreError),
}

impl ErxRepositoryError {
    pub fn is_local(&self) -> bool {
        matches!(self, ErxRepositoryError::Local(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ErxRepositoryError::Remote(_))
    }

    pub fn code(&self) -> &'static str {
        match self {
            ErxRepositoryError::Local(_) => "i-20001",
            ErxRepositoryError::Remote(_) => "i-20002",
        }
    }

    /// Outer code followed by the code of the wrapped store error.
    pub fn code_list(&self) -> Vec<&'static str> {
        let inner = match self {
            ErxRepositoryError::Local(e) => e.code(),
            ErxRepositoryError::Remote(e) => e.code(),
        };
        vec![self.code(), inner]
    }
}

impl From<LocalStoreError> for ErxRepositoryError {
    fn from(e: LocalStoreError) -> Self {
        ErxRepositoryError::Local(e)
    }
}

impl From<RemoteStoreError> for ErxRepositoryError {
    fn from(e: RemoteStoreError) -> Self {
        ErxRepositoryError::Remote(e)
    }
}
