//! Catalog read path over stored images.
//!
//! One catalog per storage variant. Both resolve unknown ids to `Ok(None)`
//! so the HTTP layer can map misses to 404 without treating them as
//! failures.

use std::path::PathBuf;

use imagecask_common::{ImageId, Result, SizeClass};
use imagecask_db::pool::{get_conn, DbPool};
use imagecask_db::queries::{image_data, image_files};

use super::sink::rendition_file_name;

/// Read path over the file-backed store.
pub struct FileCatalog {
    pool: DbPool,
    base_dir: PathBuf,
}

impl FileCatalog {
    /// Create a new `FileCatalog` rooted at the same base directory as the
    /// file sink.
    pub fn new(pool: DbPool, base_dir: PathBuf) -> Self {
        Self { pool, base_dir }
    }

    /// List the web paths of every stored thumbnail,
    /// `{folder}/Thumbnail_{id}.jpg`.
    pub fn list_all(&self) -> Result<Vec<String>> {
        let conn = get_conn(&self.pool)?;
        let records = image_files::list_image_files(&conn)?;

        Ok(records
            .iter()
            .map(|r| {
                format!(
                    "{}/{}",
                    r.folder,
                    rendition_file_name(SizeClass::Thumbnail, r.id)
                )
            })
            .collect())
    }

    /// Resolve the on-disk path of one rendition.
    ///
    /// Returns `Ok(None)` when the id is not indexed. The path is built
    /// from the record's shard folder; whether the file actually exists is
    /// the caller's concern.
    pub fn rendition_path(&self, id: ImageId, size: SizeClass) -> Result<Option<PathBuf>> {
        let conn = get_conn(&self.pool)?;
        let record = match image_files::get_image_file(&conn, id)? {
            Some(record) => record,
            None => return Ok(None),
        };

        let relative = record.folder.trim_start_matches('/');
        let path = self
            .base_dir
            .join(relative)
            .join(rendition_file_name(size, id));

        Ok(Some(path))
    }
}

/// Read path over the blob-backed store.
pub struct BlobCatalog {
    pool: DbPool,
}

impl BlobCatalog {
    /// Create a new `BlobCatalog`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// List the ids of every stored image.
    pub fn list_all(&self) -> Result<Vec<ImageId>> {
        let conn = get_conn(&self.pool)?;
        image_data::list_image_ids(&conn)
    }

    /// Fetch one rendition's bytes, or `Ok(None)` for an unknown id.
    pub fn rendition(&self, id: ImageId, size: SizeClass) -> Result<Option<Vec<u8>>> {
        let conn = get_conn(&self.pool)?;
        image_data::get_rendition(&conn, id, size)
    }
}
