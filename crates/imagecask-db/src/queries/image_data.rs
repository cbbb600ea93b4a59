//! Blob-backed image queries.
//!
//! This module provides operations on the `image_data` table, where all three
//! rendition payloads for an image live inside the row itself.

use chrono::{DateTime, Utc};
use imagecask_common::{Error, ImageId, Result, SizeClass};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::ImageData;

/// Column holding the rendition payload for a size class.
fn content_column(size: SizeClass) -> &'static str {
    match size {
        SizeClass::Original => "original_content",
        SizeClass::Fullscreen => "fullscreen_content",
        SizeClass::Thumbnail => "thumbnail_content",
    }
}

/// Insert a new blob-backed image row.
///
/// # Arguments
///
/// * `conn` - Database connection
/// * `record` - Row to insert, with all three rendition payloads
///
/// # Returns
///
/// * `Ok(ImageId)` - The ID of the inserted row
/// * `Err(Error)` - If a database error occurs
pub fn insert_image_data(conn: &Connection, record: &ImageData) -> Result<ImageId> {
    conn.execute(
        "INSERT INTO image_data
             (id, original_file_name, original_type, original_content,
              fullscreen_content, thumbnail_content, created_at)
         VALUES
             (:id, :original_file_name, :original_type, :original_content,
              :fullscreen_content, :thumbnail_content, :created_at)",
        rusqlite::named_params! {
            ":id": record.id.to_string(),
            ":original_file_name": &record.original_file_name,
            ":original_type": &record.original_type,
            ":original_content": &record.original_content,
            ":fullscreen_content": &record.fullscreen_content,
            ":thumbnail_content": &record.thumbnail_content,
            ":created_at": record.created_at.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(record.id)
}

/// Get one rendition payload by image ID and size class.
///
/// Selects only the requested column so the other two payloads are never
/// read off disk.
///
/// # Returns
///
/// * `Ok(Some(Vec<u8>))` - The rendition bytes if the image exists
/// * `Ok(None)` - If the image does not exist
/// * `Err(Error)` - If a database error occurs
pub fn get_rendition(conn: &Connection, id: ImageId, size: SizeClass) -> Result<Option<Vec<u8>>> {
    let sql = format!(
        "SELECT {} FROM image_data WHERE id = :id",
        content_column(size)
    );
    let result = conn.query_row(
        &sql,
        rusqlite::named_params! { ":id": id.to_string() },
        |row| row.get::<_, Vec<u8>>(0),
    );

    match result {
        Ok(content) => Ok(Some(content)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List the ids of every blob-backed image, oldest first.
///
/// # Returns
///
/// * `Ok(Vec<ImageId>)` - All stored image ids
/// * `Err(Error)` - If a database error occurs
pub fn list_image_ids(conn: &Connection) -> Result<Vec<ImageId>> {
    let mut stmt = conn
        .prepare("SELECT id FROM image_data ORDER BY created_at")
        .map_err(|e| Error::database(e.to_string()))?;

    let ids = stmt
        .query_map([], |row| {
            Ok(ImageId::from(
                Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
            ))
        })
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(ids)
}

/// Get a full blob-backed image row by ID.
///
/// # Returns
///
/// * `Ok(Some(ImageData))` - The row if found
/// * `Ok(None)` - If the image does not exist
/// * `Err(Error)` - If a database error occurs
pub fn get_image_data(conn: &Connection, id: ImageId) -> Result<Option<ImageData>> {
    let result = conn.query_row(
        "SELECT id, original_file_name, original_type, original_content,
                fullscreen_content, thumbnail_content, created_at
         FROM image_data WHERE id = :id",
        rusqlite::named_params! { ":id": id.to_string() },
        |row| {
            Ok(ImageData {
                id: ImageId::from(Uuid::parse_str(&row.get::<_, String>(0)?).unwrap()),
                original_file_name: row.get(1)?,
                original_type: row.get(2)?,
                original_content: row.get(3)?,
                fullscreen_content: row.get(4)?,
                thumbnail_content: row.get(5)?,
                created_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(6)?)
                    .unwrap()
                    .with_timezone(&Utc),
            })
        },
    );

    match result {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}
