//! Upload and retrieval routes for both storage variants.
//!
//! The blob routes serve rendition bytes straight from the database; the
//! file routes resolve a path through the index and stream the file from
//! disk. Both reject oversized batches before any image is processed.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use imagecask_common::{ImageId, SizeClass};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use super::{AppContext, CACHE_CONTROL_VALUE};
use crate::images::ImageInput;

/// Create image-related routes.
pub fn image_routes() -> Router<AppContext> {
    Router::new()
        .route("/images", get(list_images).post(upload_images))
        .route("/images/:image_id", get(serve_image))
        .route("/file-images", get(list_file_images).post(upload_file_images))
        .route("/file-images/:image_id", get(serve_file_image))
}

// ============================================================================
// Request types
// ============================================================================

/// Query parameters for the rendition serving endpoints.
#[derive(Debug, Deserialize)]
pub struct ImageSizeQuery {
    /// Desired rendition (original, fullscreen, thumbnail).
    /// Defaults to original if not specified.
    #[serde(default = "default_size")]
    pub size: String,
}

fn default_size() -> String {
    "original".to_string()
}

// ============================================================================
// Handlers
// ============================================================================

/// Upload a batch of images into the blob store.
///
/// Accepts a multipart body with one part per image. Batches larger than
/// the configured maximum are rejected with 400 before any processing.
async fn upload_images(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> impl IntoResponse {
    let inputs = match collect_inputs(multipart).await {
        Ok(inputs) => inputs,
        Err(response) => return response,
    };

    if inputs.len() > ctx.config.upload.max_batch_size {
        return batch_too_large(inputs.len(), ctx.config.upload.max_batch_size);
    }

    // The summary stays internal; callers get the same response for full
    // and partial success.
    let summary = ctx.blob_processor.process(inputs).await;
    tracing::info!(
        "Blob upload batch done: {} succeeded, {} failed",
        summary.succeeded,
        summary.failed
    );

    Json(serde_json::json!({"status": "done"})).into_response()
}

/// List the ids of every image in the blob store.
async fn list_images(State(ctx): State<AppContext>) -> impl IntoResponse {
    match ctx.blob_catalog.list_all() {
        Ok(ids) => Json(ids).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Serve one rendition from the blob store.
///
/// Returns the image bytes with 30-day caching headers. The rendition is
/// chosen via the `size` query parameter.
async fn serve_image(
    State(ctx): State<AppContext>,
    Path(image_id): Path<String>,
    Query(query): Query<ImageSizeQuery>,
) -> impl IntoResponse {
    let id = match ImageId::parse(&image_id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid image ID"})),
            )
                .into_response()
        }
    };

    let size = match parse_size(&query.size) {
        Some(s) => s,
        None => return invalid_size(),
    };

    let bytes = match ctx.blob_catalog.rendition(id, size) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Image not found"})),
            )
                .into_response()
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    (StatusCode::OK, rendition_headers(), bytes).into_response()
}

/// Upload a batch of images into the file-backed store.
async fn upload_file_images(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> impl IntoResponse {
    let inputs = match collect_inputs(multipart).await {
        Ok(inputs) => inputs,
        Err(response) => return response,
    };

    if inputs.len() > ctx.config.upload.max_batch_size {
        return batch_too_large(inputs.len(), ctx.config.upload.max_batch_size);
    }

    let summary = ctx.file_processor.process(inputs).await;
    tracing::info!(
        "File upload batch done: {} succeeded, {} failed",
        summary.succeeded,
        summary.failed
    );

    Json(serde_json::json!({"status": "done"})).into_response()
}

/// List the web paths of every stored thumbnail in the file-backed store.
///
/// The returned paths resolve under the static `/images` mount.
async fn list_file_images(State(ctx): State<AppContext>) -> impl IntoResponse {
    match ctx.file_catalog.list_all() {
        Ok(paths) => Json(paths).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Serve one rendition from the file-backed store.
///
/// Resolves the on-disk path through the index and streams the file back
/// with 30-day caching headers.
async fn serve_file_image(
    State(ctx): State<AppContext>,
    Path(image_id): Path<String>,
    Query(query): Query<ImageSizeQuery>,
) -> impl IntoResponse {
    let id = match ImageId::parse(&image_id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid image ID"})),
            )
                .into_response()
        }
    };

    let size = match parse_size(&query.size) {
        Some(s) => s,
        None => return invalid_size(),
    };

    let path = match ctx.file_catalog.rendition_path(id, size) {
        Ok(Some(path)) => path,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Image not found"})),
            )
                .into_response()
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    // Open the file and stream it back
    let file = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Image file not found on disk"})),
            )
                .into_response()
        }
    };

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    (StatusCode::OK, rendition_headers(), body).into_response()
}

// ============================================================================
// Helpers
// ============================================================================

/// Drain a multipart body into in-memory inputs.
///
/// Each part becomes one `ImageInput`; part file names and content types
/// are carried through to storage. A malformed body maps to 400.
async fn collect_inputs(mut multipart: Multipart) -> Result<Vec<ImageInput>, Response> {
    let mut inputs = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": format!("Malformed multipart body: {}", e)
                    })),
                )
                    .into_response())
            }
        };

        let name = field
            .file_name()
            .or(field.name())
            .unwrap_or("upload")
            .to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        match field.bytes().await {
            Ok(data) => inputs.push(ImageInput::from_bytes(name, content_type, data.to_vec())),
            Err(e) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": format!("Failed to read uploaded file: {}", e)
                    })),
                )
                    .into_response())
            }
        }
    }

    Ok(inputs)
}

fn batch_too_large(count: usize, max: usize) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": format!("Too many files: {} exceeds the batch limit of {}", count, max)
        })),
    )
        .into_response()
}

fn invalid_size() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": "Invalid size. Valid values: original, fullscreen, thumbnail"
        })),
    )
        .into_response()
}

/// Parse a size string into a `SizeClass`.
fn parse_size(s: &str) -> Option<SizeClass> {
    s.to_lowercase().parse().ok()
}

/// Caching headers attached to every rendition response.
fn rendition_headers() -> [(header::HeaderName, String); 3] {
    let expires = (Utc::now() + chrono::Duration::days(30))
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();

    [
        (header::CACHE_CONTROL, CACHE_CONTROL_VALUE.to_string()),
        (header::EXPIRES, expires),
        (header::CONTENT_TYPE, "image/jpeg".to_string()),
    ]
}
