use crate::{
    AppState,
    dto::UploadForm,
    errors::ApiError,
    files::StoredFile,
    models::{NewPost, Post},
};
use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use tracing::{info, warn};
use validator::Validate;

/// POST /posts
/// Body: multipart/form-data with `image` (file, required) and `caption` (text, optional)
pub async fn create_post(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let form = UploadForm::from_multipart(multipart, &state.files).await?;
    let stored = form.image;

    let post = persist(&state, NewPost::new(form.caption, &stored.name))
        .await
        .inspect_err(|_| orphaned(&stored))?;

    info!("Post created: {} ({} bytes at {})", post.id, stored.size, post.image_url);

    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /posts
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = state.store.list().await?;

    Ok(Json(posts))
}

async fn persist(state: &AppState, post: NewPost) -> Result<Post, ApiError> {
    post.validate()
        .map_err(|e| ApiError::InternalError(format!("Invalid post record: {}", e)))?;

    Ok(state.store.insert(post).await?)
}

// The file write and the insert are not transactional; nothing removes the file.
fn orphaned(file: &StoredFile) {
    warn!(
        "Upload {} was stored but its post was not persisted; file left orphaned",
        file.path.display()
    );
}
