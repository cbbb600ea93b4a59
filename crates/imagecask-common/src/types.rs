//! Core type definitions for the fixed rendition set.
//!
//! Every stored image has exactly three renditions, one per size class. The
//! widths here are the single source of truth for resize targets and the
//! `{prefix}_{id}.jpg` file naming scheme.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size class of an image rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    /// Full-resolution re-encode of the upload.
    Original,
    /// Rendition capped at 1000px wide.
    Fullscreen,
    /// Rendition capped at 300px wide.
    Thumbnail,
}

impl SizeClass {
    /// Target width in pixels, or `None` for the untouched original.
    #[must_use]
    pub fn target_width(&self) -> Option<u32> {
        match self {
            Self::Original => None,
            Self::Fullscreen => Some(1000),
            Self::Thumbnail => Some(300),
        }
    }

    /// Capitalized file name prefix for this size class.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Fullscreen => "Fullscreen",
            Self::Thumbnail => "Thumbnail",
        }
    }

    /// All size classes, in storage order.
    #[must_use]
    pub fn all() -> [SizeClass; 3] {
        [Self::Original, Self::Fullscreen, Self::Thumbnail]
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => write!(f, "original"),
            Self::Fullscreen => write!(f, "fullscreen"),
            Self::Thumbnail => write!(f, "thumbnail"),
        }
    }
}

impl std::str::FromStr for SizeClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original" => Ok(Self::Original),
            "fullscreen" => Ok(Self::Fullscreen),
            "thumbnail" => Ok(Self::Thumbnail),
            _ => Err(format!("Invalid size class: {}", s)),
        }
    }
}
