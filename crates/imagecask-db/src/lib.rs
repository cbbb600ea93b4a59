//! Imagecask-DB: Database schema, migrations, and query operations
//!
//! This crate provides database functionality for imagecask using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use imagecask_db::pool::{init_pool, get_conn};
//! use imagecask_db::queries::image_files;
//!
//! let pool = init_pool("/var/lib/imagecask/db.sqlite").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let count = image_files::count_image_files(&conn).unwrap();
//! println!("Stored images: {}", count);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
