//! Storage sinks committing rendition sets to their durable home.
//!
//! A sink receives fully generated rendition sets and commits them: the
//! file sink writes three JPEG files into a shard folder and inserts an
//! index row, the blob sink inserts a single row carrying all three
//! payloads. Every call takes its own pooled connection, so concurrent
//! units of work never share a handle.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use imagecask_common::{Error, ImageId, Result, SizeClass};
use imagecask_db::models::{ImageData, ImageFile};
use imagecask_db::pool::{get_conn, DbPool};
use imagecask_db::queries::{image_data, image_files};

use super::renditions::RenditionSet;

/// File name of one rendition, `{Prefix}_{id}.jpg`.
pub fn rendition_file_name(size: SizeClass, id: ImageId) -> String {
    format!("{}_{}.jpg", size.prefix(), id)
}

/// Everything a sink needs to commit one processed image.
pub struct StoreRequest {
    pub id: ImageId,
    pub file_name: String,
    pub content_type: String,
    pub renditions: RenditionSet,
}

/// Per-batch context handed back by [`RenditionSink::open_batch`].
///
/// The file sink resolves its shard folder once per batch and carries it
/// here; the blob sink has no batch state.
#[derive(Debug, Clone, Default)]
pub struct BatchToken {
    folder: Option<String>,
    dir: Option<PathBuf>,
}

impl BatchToken {
    /// The shard folder for this batch, if the sink uses one.
    pub fn folder(&self) -> Option<&str> {
        self.folder.as_deref()
    }
}

/// Destination for generated rendition sets.
#[async_trait]
pub trait RenditionSink: Send + Sync {
    /// Open a batch context. Called once per batch, before any store.
    async fn open_batch(&self) -> Result<BatchToken>;

    /// Durably commit one image's renditions.
    async fn store(&self, token: &BatchToken, request: StoreRequest) -> Result<()>;
}

/// Shard folder for the nth stored image, wrapping every 1000 images.
fn shard_folder(count: i64) -> String {
    format!("/images/{}", count % 1000)
}

/// Sink writing renditions as files under a sharded directory tree,
/// indexed by the `image_files` table.
pub struct FileSink {
    pool: DbPool,
    base_dir: PathBuf,
}

impl FileSink {
    /// Create a new `FileSink` rooted at `base_dir`.
    ///
    /// Rendition files land under `{base_dir}/images/{shard}/`, matching
    /// the `/images` web mount.
    pub fn new(pool: DbPool, base_dir: PathBuf) -> Self {
        Self { pool, base_dir }
    }
}

#[async_trait]
impl RenditionSink for FileSink {
    async fn open_batch(&self) -> Result<BatchToken> {
        let count = {
            let conn = get_conn(&self.pool)?;
            image_files::count_image_files(&conn)?
        };

        let folder = shard_folder(count);
        let dir = self
            .base_dir
            .join("images")
            .join((count % 1000).to_string());

        // Idempotent under concurrent batches landing on the same shard.
        tokio::fs::create_dir_all(&dir).await?;

        Ok(BatchToken {
            folder: Some(folder),
            dir: Some(dir),
        })
    }

    async fn store(&self, token: &BatchToken, request: StoreRequest) -> Result<()> {
        let folder = token
            .folder
            .as_ref()
            .ok_or_else(|| Error::internal("file sink batch token has no folder"))?;
        let dir = token
            .dir
            .as_ref()
            .ok_or_else(|| Error::internal("file sink batch token has no directory"))?;

        for size in SizeClass::all() {
            let path = dir.join(rendition_file_name(size, request.id));
            tokio::fs::write(&path, request.renditions.get(size)).await?;
        }

        // No two-phase commit: a crash here leaves the three files above
        // without an index row.
        let conn = get_conn(&self.pool)?;
        image_files::insert_image_file(
            &conn,
            &ImageFile {
                id: request.id,
                folder: folder.clone(),
                created_at: Utc::now(),
            },
        )?;

        Ok(())
    }
}

/// Sink storing all renditions inline in the `image_data` table.
pub struct BlobSink {
    pool: DbPool,
}

impl BlobSink {
    /// Create a new `BlobSink`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RenditionSink for BlobSink {
    async fn open_batch(&self) -> Result<BatchToken> {
        Ok(BatchToken::default())
    }

    async fn store(&self, _token: &BatchToken, request: StoreRequest) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        image_data::insert_image_data(
            &conn,
            &ImageData {
                id: request.id,
                original_file_name: request.file_name,
                original_type: request.content_type,
                original_content: request.renditions.original,
                fullscreen_content: request.renditions.fullscreen,
                thumbnail_content: request.renditions.thumbnail,
                created_at: Utc::now(),
            },
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagecask_db::pool::init_memory_pool;

    fn test_renditions() -> RenditionSet {
        RenditionSet {
            original: vec![0xFF, 0xD8, 1],
            fullscreen: vec![0xFF, 0xD8, 2],
            thumbnail: vec![0xFF, 0xD8, 3],
        }
    }

    fn test_request() -> StoreRequest {
        StoreRequest {
            id: ImageId::new(),
            file_name: "cat.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            renditions: test_renditions(),
        }
    }

    #[test]
    fn test_shard_folder() {
        assert_eq!(shard_folder(0), "/images/0");
        assert_eq!(shard_folder(999), "/images/999");
        assert_eq!(shard_folder(1000), "/images/0");
        assert_eq!(shard_folder(2500), "/images/500");
    }

    #[test]
    fn test_rendition_file_name() {
        let id = ImageId::new();
        assert_eq!(
            rendition_file_name(SizeClass::Thumbnail, id),
            format!("Thumbnail_{}.jpg", id)
        );
        assert_eq!(
            rendition_file_name(SizeClass::Original, id),
            format!("Original_{}.jpg", id)
        );
    }

    #[tokio::test]
    async fn test_file_sink_store() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_memory_pool().unwrap();
        let sink = FileSink::new(pool.clone(), dir.path().to_path_buf());

        let token = sink.open_batch().await.unwrap();
        assert_eq!(token.folder(), Some("/images/0"));

        let request = test_request();
        let id = request.id;
        sink.store(&token, request).await.unwrap();

        // All three rendition files exist under the shard directory.
        let shard_dir = dir.path().join("images").join("0");
        for size in SizeClass::all() {
            let path = shard_dir.join(rendition_file_name(size, id));
            assert!(path.exists(), "missing rendition file for {}", size);
        }
        let original = std::fs::read(shard_dir.join(rendition_file_name(SizeClass::Original, id)))
            .unwrap();
        assert_eq!(original, vec![0xFF, 0xD8, 1]);

        // The index row records the shard folder.
        let conn = pool.get().unwrap();
        let record = image_files::get_image_file(&conn, id).unwrap().unwrap();
        assert_eq!(record.folder, "/images/0");
    }

    #[tokio::test]
    async fn test_file_sink_shard_advances_with_count() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_memory_pool().unwrap();
        let sink = FileSink::new(pool.clone(), dir.path().to_path_buf());

        {
            let conn = pool.get().unwrap();
            for _ in 0..3 {
                image_files::insert_image_file(
                    &conn,
                    &ImageFile {
                        id: ImageId::new(),
                        folder: "/images/0".to_string(),
                        created_at: Utc::now(),
                    },
                )
                .unwrap();
            }
        }

        let token = sink.open_batch().await.unwrap();
        assert_eq!(token.folder(), Some("/images/3"));
        assert!(dir.path().join("images").join("3").is_dir());
    }

    #[tokio::test]
    async fn test_file_sink_open_batch_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_memory_pool().unwrap();
        let sink = FileSink::new(pool.clone(), dir.path().to_path_buf());

        sink.open_batch().await.unwrap();
        // Same shard directory again; must not fail.
        sink.open_batch().await.unwrap();
    }

    #[tokio::test]
    async fn test_blob_sink_store() {
        let pool = init_memory_pool().unwrap();
        let sink = BlobSink::new(pool.clone());

        let token = sink.open_batch().await.unwrap();
        assert!(token.folder().is_none());

        let request = test_request();
        let id = request.id;
        sink.store(&token, request).await.unwrap();

        let conn = pool.get().unwrap();
        let record = image_data::get_image_data(&conn, id).unwrap().unwrap();
        assert_eq!(record.original_file_name, "cat.jpg");
        assert_eq!(record.original_type, "image/jpeg");
        assert_eq!(record.original_content, vec![0xFF, 0xD8, 1]);
        assert_eq!(record.fullscreen_content, vec![0xFF, 0xD8, 2]);
        assert_eq!(record.thumbnail_content, vec![0xFF, 0xD8, 3]);
    }
}
