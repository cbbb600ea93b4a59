//! Batch orchestration for image ingestion.
//!
//! The processor fans out one task per uploaded image, runs decode and
//! rendition generation on the blocking pool, and commits each result
//! through the configured sink. Item failures are logged and dropped at
//! the item boundary; the batch as a whole never fails.

use std::sync::Arc;

use imagecask_common::{Error, ImageId, Result};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::renditions::RenditionGenerator;
use super::sink::{BatchToken, RenditionSink, StoreRequest};

/// One uploaded image awaiting processing.
///
/// The content stream is read exactly once, by the decode step.
pub struct ImageInput {
    pub name: String,
    pub content_type: String,
    pub content: Box<dyn AsyncRead + Send + Unpin>,
}

impl ImageInput {
    /// Build an input from bytes already in memory.
    pub fn from_bytes(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            content: Box::new(std::io::Cursor::new(data)),
        }
    }
}

/// Aggregate outcome of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Orchestrator running every image of a batch concurrently against one sink.
pub struct BatchProcessor {
    sink: Arc<dyn RenditionSink>,
}

impl BatchProcessor {
    /// Create a new `BatchProcessor` over the given sink.
    pub fn new(sink: Arc<dyn RenditionSink>) -> Self {
        Self { sink }
    }

    /// Process a batch of uploaded images.
    ///
    /// Opens the sink's batch context once, spawns one task per input, and
    /// waits for all of them. Failed items are logged at `warn` and counted
    /// in the summary; they never abort siblings or the caller.
    pub async fn process(&self, inputs: Vec<ImageInput>) -> BatchSummary {
        let total = inputs.len();

        let token = match self.sink.open_batch().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Failed to open storage batch, dropping {} images: {}", total, e);
                return BatchSummary {
                    succeeded: 0,
                    failed: total,
                };
            }
        };

        let mut handles = Vec::with_capacity(total);
        for input in inputs {
            let sink = Arc::clone(&self.sink);
            let token = token.clone();
            handles.push(tokio::spawn(async move {
                process_one(sink, token, input).await
            }));
        }

        let mut summary = BatchSummary::default();
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => summary.succeeded += 1,
                Ok(Err(e)) => {
                    tracing::warn!("Image dropped from batch: {}", e);
                    summary.failed += 1;
                }
                Err(e) => {
                    tracing::warn!("Image task failed to complete: {}", e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

/// Run one image through read, decode, rendition generation, and storage.
async fn process_one(
    sink: Arc<dyn RenditionSink>,
    token: BatchToken,
    input: ImageInput,
) -> Result<()> {
    let mut content = input.content;
    let mut data = Vec::new();
    content.read_to_end(&mut data).await?;

    let renditions = tokio::task::spawn_blocking(move || {
        let img = RenditionGenerator::decode(&data)?;
        RenditionGenerator::generate(&img)
    })
    .await
    .map_err(|e| Error::internal(format!("Rendition task did not complete: {}", e)))??;

    sink.store(
        &token,
        StoreRequest {
            id: ImageId::new(),
            file_name: input.name,
            content_type: input.content_type,
            renditions,
        },
    )
    .await
}
