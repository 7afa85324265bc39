use crate::{files::FileStore, store::PostStore};
use std::sync::Arc;

// ============================================================================
// APPLICATION STATE - Shared data across all requests
// ============================================================================
/// Built once in `main` and cloned into every handler by axum.
///
/// `store` is a trait object so the same router runs against MongoDB in
/// production and an in-memory map in tests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PostStore>,
    pub files: FileStore,
}

impl AppState {
    pub fn new(store: impl PostStore + 'static, files: FileStore) -> Self {
        Self {
            store: Arc::new(store),
            files,
        }
    }
}
