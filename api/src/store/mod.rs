//! Persistence for [`Post`] records.
//!
//! Handlers only see the [`PostStore`] trait. `main` picks the backend at
//! startup from configuration.

mod memory;
mod mongo;

pub use memory::MemoryPostStore;
pub use mongo::MongoPostStore;

use crate::models::{NewPost, Post};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
    #[error("unexpected document: {0}")]
    Malformed(String),
}

/// Append-only collection of posts.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Persists `post` and returns it with its backend-assigned id.
    async fn insert(&self, post: NewPost) -> Result<Post, StoreError>;

    /// Every stored post, in whatever order the backend yields them.
    async fn list(&self) -> Result<Vec<Post>, StoreError>;

    /// Round-trips to the backend to check it is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
