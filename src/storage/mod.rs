//! Persistent storage
//!
//! Decision Room posts and the client-side key/value cache, each behind a
//! trait with an in-memory and a sled-backed implementation.

pub mod kv;
pub mod persistence;
mod sled_store;

pub use kv::{InMemoryKv, KvStore, SledKv};
pub use persistence::{InMemoryPostStore, PostStore};
pub use sled_store::SledPostStore;

use std::path::Path;
use std::sync::Arc;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("record not found")]
    NotFound,
    #[error("record already exists: {0}")]
    Conflict(String),
}

impl From<sled::Error> for StorageError {
    fn from(e: sled::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Open backends for the configured storage mode.
///
/// `in_memory` skips the data directory entirely.
pub fn open_backends(
    data_dir: &Path,
    in_memory: bool,
) -> Result<(Arc<dyn PostStore>, Arc<dyn KvStore>), StorageError> {
    if in_memory {
        tracing::info!("Storage running in-memory; posts are not persisted");
        return Ok((Arc::new(InMemoryPostStore::new()), Arc::new(InMemoryKv::default())));
    }

    std::fs::create_dir_all(data_dir)
        .map_err(|e| StorageError::Database(format!("create {}: {e}", data_dir.display())))?;
    let db = sled::open(data_dir.join("sentinel.sled"))?;
    tracing::info!(path = %data_dir.display(), "Storage opened");

    let posts = SledPostStore::from_db(db.clone())?;
    let kv = SledKv::from_db(&db)?;
    Ok((Arc::new(posts), Arc::new(kv)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_backends_in_memory() {
        let (posts, _) = open_backends(Path::new("/nonexistent"), true).unwrap();
        assert_eq!(posts.backend_name(), "InMemory");
    }

    #[test]
    fn test_open_backends_sled() {
        let dir = tempfile::tempdir().unwrap();
        let (posts, kv) = open_backends(dir.path(), false).unwrap();
        assert_eq!(posts.backend_name(), "Sled");
        kv.put("k", b"v").unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some(&b"v"[..]));
    }
}
