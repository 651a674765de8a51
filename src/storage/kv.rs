//! Small key/value cache for client-side state (session token, view-as
//! selection, cached company list).

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{de::DeserializeOwned, Serialize};

use super::StorageError;

const KV_TREE: &str = "kv";

pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed JSON helpers over any [`KvStore`].
pub fn get_json<T: DeserializeOwned>(kv: &dyn KvStore, key: &str) -> Result<Option<T>, StorageError> {
    match kv.get(key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

pub fn put_json<T: Serialize>(kv: &dyn KvStore, key: &str, value: &T) -> Result<(), StorageError> {
    kv.put(key, &serde_json::to_vec(value)?)
}

#[derive(Default)]
pub struct InMemoryKv {
    map: RwLock<HashMap<String, Vec<u8>>>,
}

impl KvStore for InMemoryKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self
            .map
            .read()
            .map_err(|e| StorageError::Database(e.to_string()))?
            .get(key)
            .cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.map
            .write()
            .map_err(|e| StorageError::Database(e.to_string()))?
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.map
            .write()
            .map_err(|e| StorageError::Database(e.to_string()))?
            .remove(key);
        Ok(())
    }
}

/// Named `kv` tree in a shared sled database.
pub struct SledKv {
    tree: sled::Tree,
}

impl SledKv {
    pub fn from_db(db: &sled::Db) -> Result<Self, StorageError> {
        Ok(Self {
            tree: db.open_tree(KV_TREE)?,
        })
    }
}

impl KvStore for SledKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.tree.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.tree.insert(key.as_bytes(), value)?;
        self.tree.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.tree.remove(key.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }
}
