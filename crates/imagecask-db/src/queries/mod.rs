//! Database query operations.
//!
//! One module per table.

pub mod image_data;
pub mod image_files;
