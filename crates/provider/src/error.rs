//! Error types for the dock provider.

use crate::entry::EntryId;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors reported across the provider boundary.
#[derive(Debug, Error)]
pub enum DockError {
    /// The entry is not a member of the dock.
    #[error("entry {0} is not in the dock")]
    NotFound(EntryId),

    /// The launcher store could not materialize a launcher.
    #[error("launcher store error: {0}")]
    Launcher(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Serialize for DockError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<serde_json::Error> for DockError {
    fn from(e: serde_json::Error) -> Self {
        DockError::InvalidConfig(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DockError>;
