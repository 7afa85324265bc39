use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// URL prefix under which stored uploads are served.
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// A post as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub image_url: String,
}

/// A post that has not been persisted yet.
///
/// Built by the upload handler once the image is on disk, and checked with
/// [`Validate`] before it is handed to a [`PostStore`](crate::store::PostStore).
#[derive(Debug, Clone, Validate)]
pub struct NewPost {
    pub caption: Option<String>,
    #[validate(custom(function = "validate_image_url"))]
    pub image_url: String,
}

impl NewPost {
    /// Empty captions are stored as absent.
    pub fn new(caption: Option<String>, file_name: &str) -> Self {
        Self {
            caption: caption.filter(|c| !c.is_empty()),
            image_url: format!("{UPLOADS_PREFIX}{file_name}"),
        }
    }
}

fn validate_image_url(url: &str) -> Result<(), ValidationError> {
    match url.strip_prefix(UPLOADS_PREFIX) {
        Some(name) if !name.is_empty() && !name.contains('/') => Ok(()),
        _ => Err(ValidationError::new("image_url")
            .with_message("imageUrl must reference a file under /uploads/".into())),
    }
}

/// BSON shape of a post inside the MongoDB collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub image_url: String,
}

impl From<NewPost> for PostDocument {
    fn from(post: NewPost) -> Self {
        Self {
            id: None,
            caption: post.caption,
            image_url: post.image_url,
        }
    }
}

impl From<PostDocument> for Post {
    fn from(doc: PostDocument) -> Self {
        Self {
            id: doc.id.map(|id| id.to_hex()).unwrap_or_default(),
            caption: doc.caption,
            image_url: doc.image_url,
        }
    }
}
