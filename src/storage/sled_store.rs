//! sled-backed post store
//!
//! Posts live in the `posts` tree keyed by id; attachment bytes in the
//! `attachments` tree keyed by attachment id.

use std::sync::Arc;

use super::persistence::{sort_recent_first, PostStore};
use super::StorageError;
use crate::types::{Post, PostCategory};

const POSTS_TREE: &str = "posts";
const ATTACHMENTS_TREE: &str = "attachments";

#[derive(Clone)]
pub struct SledPostStore {
    db: Arc<sled::Db>,
    posts: sled::Tree,
    attachments: sled::Tree,
}

impl SledPostStore {
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self, StorageError> {
        Self::from_db(sled::open(path)?)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let posts = db.open_tree(POSTS_TREE)?;
        let attachments = db.open_tree(ATTACHMENTS_TREE)?;
        Ok(Self {
            db: Arc::new(db),
            posts,
            attachments,
        })
    }

    fn decode(bytes: &[u8]) -> Result<Post, StorageError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

impl PostStore for SledPostStore {
    fn insert(&self, post: &Post) -> Result<(), StorageError> {
        let value = serde_json::to_vec(post)?;
        let swapped = self
            .posts
            .compare_and_swap(post.id.as_bytes(), None as Option<&[u8]>, Some(value))?;
        if swapped.is_err() {
            return Err(StorageError::Conflict(post.id.clone()));
        }
        self.flush()?;
        tracing::debug!(id = %post.id, category = post.category.as_str(), "Post stored");
        Ok(())
    }

    fn get(&self, category: PostCategory, id: &str) -> Result<Option<Post>, StorageError> {
        Ok(self.find(id)?.filter(|p| p.category == category))
    }

    fn find(&self, id: &str) -> Result<Option<Post>, StorageError> {
        match self.posts.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn list(&self, category: PostCategory) -> Result<Vec<Post>, StorageError> {
        let mut posts = Vec::new();
        for item in self.posts.iter() {
            let (_key, value) = item?;
            match Self::decode(&value) {
                Ok(post) if post.category == category => posts.push(post),
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping undecodable post record: {}", e),
            }
        }
        sort_recent_first(&mut posts);
        Ok(posts)
    }

    fn replace(&self, post: &Post) -> Result<(), StorageError> {
        if !self.posts.contains_key(post.id.as_bytes())? {
            return Err(StorageError::NotFound);
        }
        self.posts.insert(post.id.as_bytes(), serde_json::to_vec(post)?)?;
        self.flush()
    }

    fn delete(&self, category: PostCategory, id: &str) -> Result<bool, StorageError> {
        let Some(post) = self.get(category, id)? else {
            return Ok(false);
        };
        self.posts.remove(id.as_bytes())?;
        for a in &post.attachments {
            self.attachments.remove(a.id.as_bytes())?;
        }
        self.flush()?;
        Ok(true)
    }

    fn put_attachment(&self, attachment_id: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.attachments.insert(attachment_id.as_bytes(), bytes)?;
        self.flush()
    }

    fn get_attachment(&self, attachment_id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.attachments.get(attachment_id.as_bytes())?.map(|v| v.to_vec()))
    }

    fn backend_name(&self) -> &'static str {
        "Sled"
    }
}
