pub mod post;

pub use post::{NewPost, Post, PostDocument, UPLOADS_PREFIX};
