use super::{PostStore, StoreError};
use crate::models::{NewPost, Post, PostDocument};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{Client, Collection, bson::doc};
use tracing::info;

/// Posts kept in a single MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoPostStore {
    client: Client,
    collection: Collection<PostDocument>,
}

impl MongoPostStore {
    /// Builds a pooled client for `url`. The driver connects lazily, so an
    /// unreachable server surfaces on the first operation rather than here.
    pub async fn connect(url: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(url).await?;
        let collection = client.database(database).collection(collection);

        info!(
            "MongoDB client created for {}.{}",
            database,
            collection.name()
        );

        Ok(Self { client, collection })
    }

    /// Closes pooled connections. Call once at process shutdown.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

#[async_trait]
impl PostStore for MongoPostStore {
    async fn insert(&self, post: NewPost) -> Result<Post, StoreError> {
        let mut document = PostDocument::from(post);
        let result = self.collection.insert_one(&document).await?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            StoreError::Malformed(format!("inserted id {} is not an ObjectId", result.inserted_id))
        })?;
        document.id = Some(id);

        Ok(document.into())
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let documents: Vec<PostDocument> = self
            .collection
            .find(doc! {})
            .await?
            .try_collect()
            .await?;

        Ok(documents.into_iter().map(Post::from).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}
