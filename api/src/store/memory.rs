use super::{PostStore, StoreError};
use crate::models::{NewPost, Post};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use uuid::Uuid;

/// In-process store used by tests and by local runs without MongoDB.
///
/// Listing returns posts in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryPostStore {
    posts: Arc<DashMap<Uuid, (u64, Post)>>,
    next_seq: Arc<AtomicU64>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn insert(&self, post: NewPost) -> Result<Post, StoreError> {
        let id = Uuid::new_v4();
        let post = Post {
            id: id.to_string(),
            caption: post.caption,
            image_url: post.image_url,
        };

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.posts.insert(id, (seq, post.clone()));

        Ok(post)
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let mut posts: Vec<(u64, Post)> = self
            .posts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        posts.sort_by_key(|(seq, _)| *seq);

        Ok(posts.into_iter().map(|(_, post)| post).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
