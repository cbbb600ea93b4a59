//! HTTP server wiring: shared context, router construction, lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use imagecask_db::pool::{init_pool, DbPool};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::images::{BatchProcessor, BlobCatalog, BlobSink, FileCatalog, FileSink};

pub mod routes_images;

/// `Cache-Control` value sent with every rendition response, 30 days.
pub const CACHE_CONTROL_VALUE: &str = "public, max-age=2592000";

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Database connection pool
    pub db_pool: DbPool,
    /// Batch orchestrator committing to the blob store
    pub blob_processor: Arc<BatchProcessor>,
    /// Batch orchestrator committing to the sharded file tree
    pub file_processor: Arc<BatchProcessor>,
    pub blob_catalog: Arc<BlobCatalog>,
    pub file_catalog: Arc<FileCatalog>,
}

impl AppContext {
    /// Build a context over an existing pool.
    ///
    /// Both storage variants share the pool; the file variant roots its
    /// rendition tree at the configured data directory.
    pub fn new(config: Config, db_pool: DbPool) -> Self {
        let base_dir = config.storage.data_dir.clone();

        let blob_sink = Arc::new(BlobSink::new(db_pool.clone()));
        let file_sink = Arc::new(FileSink::new(db_pool.clone(), base_dir.clone()));

        Self {
            blob_processor: Arc::new(BatchProcessor::new(blob_sink)),
            file_processor: Arc::new(BatchProcessor::new(file_sink)),
            blob_catalog: Arc::new(BlobCatalog::new(db_pool.clone())),
            file_catalog: Arc::new(FileCatalog::new(db_pool.clone(), base_dir)),
            config: Arc::new(config),
            db_pool,
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let images_dir = ctx.config.storage.data_dir.join("images");
    let max_body_bytes = ctx.config.upload.max_body_bytes;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Upload and retrieval for both storage variants
        .nest("/api", routes_images::image_routes())
        // The file-variant listing returns paths under this mount
        .nest_service(
            "/images",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static(CACHE_CONTROL_VALUE),
                ))
                .service(ServeDir::new(&images_dir)),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    tokio::fs::create_dir_all(&config.storage.data_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create data directory {:?}",
                config.storage.data_dir
            )
        })?;

    let db_path = config.storage.data_dir.join("imagecask.db");
    let db_pool =
        init_pool(&db_path.to_string_lossy()).context("Failed to initialize database")?;

    let ctx = AppContext::new(config, db_pool);
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
