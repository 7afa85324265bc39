//! HTTP API for image posts: multipart uploads land on disk, their metadata
//! in a document store, and both are served back over HTTP.

pub mod config;
pub mod dto;
pub mod errors;
pub mod files;
pub mod models;
pub mod routes;
pub mod states;
pub mod store;

pub use states::AppState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Builds the router.
///
/// `upload_limit` caps request bodies read by extractors; `None` removes
/// axum's default cap so uploads of any size are accepted.
pub fn app(state: AppState, upload_limit: Option<usize>) -> Router {
    let body_limit = match upload_limit {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    let uploads = ServeDir::new(state.files.root());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health_check))
        .route(
            "/posts",
            post(routes::create_post)
                .get(routes::list_posts)
                .layer(body_limit),
        )
        .nest_service("/uploads", uploads)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
