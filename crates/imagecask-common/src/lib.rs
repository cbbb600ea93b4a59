//! Imagecask-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across imagecask:
//!
//! - **Typed IDs**: Type-safe UUID wrappers for stored images
//! - **Core Types**: The size class enum for the fixed rendition set
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use imagecask_common::{ImageId, SizeClass, Error, Result};
//!
//! // Create typed IDs
//! let image_id = ImageId::new();
//!
//! // Work with size classes
//! let size = SizeClass::Thumbnail;
//! assert_eq!(size.target_width(), Some(300));
//!
//! // Use common error types
//! fn example() -> Result<()> {
//!     Err(Error::not_found("image"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
