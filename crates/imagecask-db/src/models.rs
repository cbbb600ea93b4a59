//! Internal Rust models matching the database schema.
//!
//! This module provides strongly-typed Rust structures that map to database
//! tables. All models use types from imagecask-common where appropriate.

use chrono::{DateTime, Utc};
use imagecask_common::ImageId;
use serde::{Deserialize, Serialize};

/// Index row for a file-backed image.
///
/// The three rendition files live under `folder` on disk; this row only
/// records which shard folder an id landed in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageFile {
    pub id: ImageId,
    pub folder: String,
    pub created_at: DateTime<Utc>,
}

/// Row for a blob-backed image holding all three rendition payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageData {
    pub id: ImageId,
    pub original_file_name: String,
    pub original_type: String,
    pub original_content: Vec<u8>,
    pub fullscreen_content: Vec<u8>,
    pub thumbnail_content: Vec<u8>,
    pub created_at: DateTime<Utc>,
}
