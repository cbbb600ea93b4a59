//! Typed ID wrappers for type safety across imagecask.
//!
//! This module provides newtype wrappers around UUIDs so identifiers cannot be
//! confused with arbitrary strings or other UUID-typed values.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stored image and its renditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(Uuid);

impl ImageId {
    /// Generate a new random image ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an image ID from its string form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ImageId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ImageId> for Uuid {
    fn from(id: ImageId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_id_creation() {
        let id1 = ImageId::new();
        let id2 = ImageId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_image_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let image_id = ImageId::from(uuid);
        let uuid_back: Uuid = image_id.into();
        assert_eq!(uuid, uuid_back);
    }

    #[test]
    fn test_image_id_serialization() {
        let id = ImageId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: ImageId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_image_id_parse_roundtrip() {
        let id = ImageId::new();
        let parsed = ImageId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_image_id_parse_rejects_garbage() {
        assert!(ImageId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_image_id_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        let id = ImageId::new();
        set.insert(id);
        assert!(set.contains(&id));
    }
}
