use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use super::client::{ObjectStore, is_marker};
use crate::error::{DashboardError, Result};

/// An [`ObjectStore`] backed by a directory on the local filesystem.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let base = self.root.join(prefix.trim_end_matches('/'));

        if base.is_file() {
            return Ok(vec![prefix.trim_end_matches('/').to_string()]);
        }
        if !base.is_dir() {
            debug!(path = %base.display(), "Table path does not exist");
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        collect_files(&self.root, &base, &mut keys)
            .map_err(|e| DashboardError::storage(base.display().to_string(), e))?;
        keys.sort();
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.root.join(key);
        let data =
            std::fs::read(&path).map_err(|e| DashboardError::storage(self.location(key), e))?;
        Ok(Bytes::from(data))
    }

    fn location(&self, key: &str) -> String {
        self.root.join(key).display().to_string()
    }
}

fn collect_files(root: &Path, dir: &Path, keys: &mut Vec<String>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        if is_marker(name.to_str().unwrap_or("")) {
            continue;
        }

        if entry.file_type()?.is_dir() {
            collect_files(root, &path, keys)?;
        } else if let Ok(rel) = path.strip_prefix(root) {
            // Keys always use forward slashes, matching object-store keys.
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            keys.push(key);
        }
    }
    Ok(())
}
