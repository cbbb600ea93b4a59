//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, default config
//! rooted at a temp data directory, and a full [`AppContext`]. The
//! [`with_server`] constructor starts Axum on a random port for HTTP-level
//! testing.

use std::net::SocketAddr;

use imagecask::config::Config;
use imagecask::server::{create_router, AppContext};
use imagecask_db::pool::{init_memory_pool, DbPool};
use tempfile::TempDir;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database and a temporary rendition tree.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub data_dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration, an in-memory DB,
    /// and a temp data directory.
    pub fn new() -> Self {
        let data_dir = tempfile::tempdir().expect("failed to create data dir");
        let mut config = Config::default();
        config.storage.data_dir = data_dir.path().to_path_buf();

        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(config, db.clone());

        Self { ctx, db, data_dir }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> imagecask_db::pool::PooledConnection {
        imagecask_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }
}

/// Encode a solid-color JPEG of the given dimensions.
pub fn make_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::new(width, height);
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .expect("failed to encode test jpeg");
    buf.into_inner()
}

/// Build a multipart form carrying the given named JPEG payloads.
pub fn multipart_form(files: Vec<(String, Vec<u8>)>) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    for (name, data) in files {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(name)
            .mime_str("image/jpeg")
            .expect("invalid mime");
        form = form.part("files", part);
    }
    form
}
