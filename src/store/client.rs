use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Read-only access to the objects an upstream batch job wrote.
///
/// Keys are relative to the store's root. A table is addressed by a prefix;
/// `list` expands it into the data objects (part files) beneath it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the sorted keys of every data object under `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Reads a whole object.
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Human-readable location of `key`, used in logs and errors.
    fn location(&self, key: &str) -> String;
}

/// Marker and hidden objects that upstream writers leave next to data files.
pub(crate) fn is_marker(name: &str) -> bool {
    name.is_empty() || name.starts_with('_') || name.starts_with('.')
}
