//! Image intake pipeline module.
//!
//! This module provides the batch ingestion pipeline: decoding uploads,
//! generating the fixed rendition set, committing renditions through a
//! storage sink, and the catalog read path. It coordinates filesystem and
//! blob storage with the database layer from `imagecask_db`.

mod batch;
mod catalog;
mod renditions;
mod sink;

pub use batch::{BatchProcessor, BatchSummary, ImageInput};
pub use catalog::{BlobCatalog, FileCatalog};
pub use renditions::{RenditionGenerator, RenditionSet};
pub use sink::{rendition_file_name, BatchToken, BlobSink, FileSink, RenditionSink, StoreRequest};
