//! PostStore trait: pluggable Decision Room persistence
//!
//! - `InMemoryPostStore`: tests and `--in-memory` runs
//! - `SledPostStore` (see `sled_store.rs`): durable default

use std::collections::HashMap;
use std::sync::RwLock;

use super::StorageError;
use crate::types::{Post, PostCategory};

/// Storage backend for posts and their attachment bytes.
///
/// Implementations must be `Send + Sync` for shared access from handlers.
pub trait PostStore: Send + Sync {
    /// Insert a new post; fails if the id already exists.
    fn insert(&self, post: &Post) -> Result<(), StorageError>;

    fn get(&self, category: PostCategory, id: &str) -> Result<Option<Post>, StorageError>;

    /// Look a post up by id in any category.
    fn find(&self, id: &str) -> Result<Option<Post>, StorageError>;

    /// All posts of a category, most recent first.
    fn list(&self, category: PostCategory) -> Result<Vec<Post>, StorageError>;

    /// Replace an existing post; fails with `NotFound` if absent.
    fn replace(&self, post: &Post) -> Result<(), StorageError>;

    /// Returns whether a post was removed. Its attachments go with it.
    fn delete(&self, category: PostCategory, id: &str) -> Result<bool, StorageError>;

    fn put_attachment(&self, attachment_id: &str, bytes: &[u8]) -> Result<(), StorageError>;

    fn get_attachment(&self, attachment_id: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

pub(crate) fn sort_recent_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// In-memory post store. Not durable; data is lost on restart.
pub struct InMemoryPostStore {
    posts: RwLock<HashMap<String, Post>>,
    attachments: RwLock<HashMap<String, Vec<u8>>>,
    max_posts_per_category: usize,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::with_limit(crate::config::defaults::IN_MEMORY_MAX_POSTS)
    }

    pub fn with_limit(max_posts_per_category: usize) -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
            attachments: RwLock::new(HashMap::new()),
            max_posts_per_category,
        }
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PostStore for InMemoryPostStore {
    fn insert(&self, post: &Post) -> Result<(), StorageError> {
        let mut store = self
            .posts
            .write()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        if store.contains_key(&post.id) {
            return Err(StorageError::Conflict(post.id.clone()));
        }
        store.insert(post.id.clone(), post.clone());

        // Evict the oldest post of the category when over the limit
        let mut same: Vec<&Post> = store.values().filter(|p| p.category == post.category).collect();
        if same.len() > self.max_posts_per_category {
            same.sort_by_key(|p| p.created_at);
            let oldest = same[0].id.clone();
            store.remove(&oldest);
        }
        Ok(())
    }

    fn get(&self, category: PostCategory, id: &str) -> Result<Option<Post>, StorageError> {
        Ok(self.find(id)?.filter(|p| p.category == category))
    }

    fn find(&self, id: &str) -> Result<Option<Post>, StorageError> {
        let store = self
            .posts
            .read()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(store.get(id).cloned())
    }

    fn list(&self, category: PostCategory) -> Result<Vec<Post>, StorageError> {
        let store = self
            .posts
            .read()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let mut posts: Vec<Post> = store.values().filter(|p| p.category == category).cloned().collect();
        sort_recent_first(&mut posts);
        Ok(posts)
    }

    fn replace(&self, post: &Post) -> Result<(), StorageError> {
        let mut store = self
            .posts
            .write()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        match store.get_mut(&post.id) {
            Some(existing) => {
                *existing = post.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn delete(&self, category: PostCategory, id: &str) -> Result<bool, StorageError> {
        let removed = {
            let mut store = self
                .posts
                .write()
                .map_err(|e| StorageError::Database(e.to_string()))?;
            match store.get(id) {
                Some(p) if p.category == category => store.remove(id),
                _ => None,
            }
        };
        let Some(post) = removed else {
            return Ok(false);
        };

        let mut blobs = self
            .attachments
            .write()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        for a in &post.attachments {
            blobs.remove(&a.id);
        }
        Ok(true)
    }

    fn put_attachment(&self, attachment_id: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.attachments
            .write()
            .map_err(|e| StorageError::Database(e.to_string()))?
            .insert(attachment_id.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get_attachment(&self, attachment_id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self
            .attachments
            .read()
            .map_err(|e| StorageError::Database(e.to_string()))?
            .get(attachment_id)
            .cloned())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}
