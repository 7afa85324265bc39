use api::{
    AppState, app,
    config::{Config, StoreBackend},
    files::FileStore,
    store::{MemoryPostStore, MongoPostStore},
};
use axum::Router;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("api=debug,tower_http=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::load()?;
    info!("Configuration loaded");

    let files = FileStore::new(&config.uploads.dir);
    files.ensure_root().await?;

    let listener = TcpListener::bind(config.addr()).await?;

    info!("Server running on http://{}", config.addr());
    info!("Uploads stored in {}", files.root().display());
    info!("API Endpoints:");
    info!("  GET    /health           - Health check");
    info!("  POST   /posts            - Upload an image with a caption");
    info!("  GET    /posts            - List posts");
    info!("  GET    /uploads/:file    - Stored images");

    let upload_limit = config.uploads.max_body_bytes;

    match config.database.backend {
        StoreBackend::Mongo => {
            let store = MongoPostStore::connect(
                &config.database.url,
                &config.database.name,
                &config.database.collection,
            )
            .await?;

            let state = AppState::new(store.clone(), files);
            serve(listener, app(state, upload_limit)).await?;

            store.shutdown().await;
            info!("MongoDB client closed");
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory post store; posts are lost on restart");

            let state = AppState::new(MemoryPostStore::new(), files);
            serve(listener, app(state, upload_limit)).await?;
        }
    }

    Ok(())
}

async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
