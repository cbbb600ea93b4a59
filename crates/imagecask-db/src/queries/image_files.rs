//! File-backed image index queries.
//!
//! This module provides operations on the `image_files` table, which maps
//! each stored image id to the shard folder holding its rendition files.

use chrono::{DateTime, Utc};
use imagecask_common::{Error, ImageId, Result};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::ImageFile;

/// Parse an image file index row.
///
/// Expects columns in order: id, folder, created_at.
fn parse_image_file_row(row: &rusqlite::Row) -> rusqlite::Result<ImageFile> {
    Ok(ImageFile {
        id: ImageId::from(Uuid::parse_str(&row.get::<_, String>(0)?).unwrap()),
        folder: row.get(1)?,
        created_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(2)?)
            .unwrap()
            .with_timezone(&Utc),
    })
}

/// Insert a new image file index row.
///
/// # Arguments
///
/// * `conn` - Database connection
/// * `record` - Index row to insert
///
/// # Returns
///
/// * `Ok(ImageId)` - The ID of the inserted row
/// * `Err(Error)` - If a database error occurs
pub fn insert_image_file(conn: &Connection, record: &ImageFile) -> Result<ImageId> {
    conn.execute(
        "INSERT INTO image_files (id, folder, created_at)
         VALUES (:id, :folder, :created_at)",
        rusqlite::named_params! {
            ":id": record.id.to_string(),
            ":folder": &record.folder,
            ":created_at": record.created_at.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(record.id)
}

/// Get an image file index row by ID.
///
/// # Returns
///
/// * `Ok(Some(ImageFile))` - The row if found
/// * `Ok(None)` - If the id is not indexed
/// * `Err(Error)` - If a database error occurs
pub fn get_image_file(conn: &Connection, id: ImageId) -> Result<Option<ImageFile>> {
    let result = conn.query_row(
        "SELECT id, folder, created_at FROM image_files WHERE id = :id",
        rusqlite::named_params! { ":id": id.to_string() },
        parse_image_file_row,
    );

    match result {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List every image file index row, oldest first.
///
/// # Returns
///
/// * `Ok(Vec<ImageFile>)` - All indexed images
/// * `Err(Error)` - If a database error occurs
pub fn list_image_files(conn: &Connection) -> Result<Vec<ImageFile>> {
    let mut stmt = conn
        .prepare("SELECT id, folder, created_at FROM image_files ORDER BY created_at")
        .map_err(|e| Error::database(e.to_string()))?;

    let records = stmt
        .query_map([], parse_image_file_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(records)
}

/// Count the image file index rows.
///
/// The batch shard folder is derived from this count, so it runs once per
/// batch rather than once per image.
///
/// # Returns
///
/// * `Ok(i64)` - Number of indexed images
/// * `Err(Error)` - If a database error occurs
pub fn count_image_files(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM image_files", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}
