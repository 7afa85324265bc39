pub mod health;
pub mod post;

pub use health::health_check;
pub use post::{create_post, list_posts};
