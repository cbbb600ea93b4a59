//! Rendition generation from a decoded source image.
//!
//! Each upload is decoded once, then re-encoded into three JPEG renditions:
//! the full-resolution original plus fullscreen (1000px) and thumbnail
//! (300px) downscales. Re-encoding from decoded pixels carries no EXIF or
//! profile data, so the renditions are metadata-free by construction.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use imagecask_common::{Error, Result, SizeClass};

/// JPEG quality for every rendition.
const JPEG_QUALITY: u8 = 75;

/// The three encoded JPEG renditions of one source image.
#[derive(Debug, Clone)]
pub struct RenditionSet {
    pub original: Vec<u8>,
    pub fullscreen: Vec<u8>,
    pub thumbnail: Vec<u8>,
}

impl RenditionSet {
    /// Rendition bytes for a size class.
    pub fn get(&self, size: SizeClass) -> &[u8] {
        match size {
            SizeClass::Original => &self.original,
            SizeClass::Fullscreen => &self.fullscreen,
            SizeClass::Thumbnail => &self.thumbnail,
        }
    }
}

/// Generator for the fixed rendition set.
pub struct RenditionGenerator;

impl RenditionGenerator {
    /// Decode raw upload bytes into a source image.
    ///
    /// The result is normalized to RGB so every rendition encodes as JPEG
    /// regardless of the upload's pixel format.
    pub fn decode(data: &[u8]) -> Result<DynamicImage> {
        let img = image::load_from_memory(data)
            .map_err(|e| Error::decode(format!("Failed to decode image: {}", e)))?;
        Ok(DynamicImage::ImageRgb8(img.into_rgb8()))
    }

    /// Generate all three renditions from a decoded source image.
    ///
    /// Each size class is produced independently from the same source. A
    /// source narrower than the target width is never upscaled.
    pub fn generate(img: &DynamicImage) -> Result<RenditionSet> {
        Ok(RenditionSet {
            original: Self::render(img, SizeClass::Original)?,
            fullscreen: Self::render(img, SizeClass::Fullscreen)?,
            thumbnail: Self::render(img, SizeClass::Thumbnail)?,
        })
    }

    /// Produce one rendition at its size class's target width.
    fn render(img: &DynamicImage, size: SizeClass) -> Result<Vec<u8>> {
        match size.target_width() {
            Some(target) if img.width() > target => {
                let (w, h) = scaled_dimensions(img.width(), img.height(), target);
                let resized = img.resize_exact(w, h, FilterType::Lanczos3);
                encode_jpeg(&resized)
            }
            _ => encode_jpeg(img),
        }
    }
}

/// Compute the downscaled dimensions for a target width.
///
/// Height preserves the aspect ratio, rounded to the nearest pixel.
fn scaled_dimensions(width: u32, height: u32, target: u32) -> (u32, u32) {
    let new_height = (f64::from(target) / f64::from(width) * f64::from(height)).round() as u32;
    (target, new_height.max(1))
}

/// Encode an image as JPEG at the fixed rendition quality.
fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    img.write_with_encoder(encoder)
        .map_err(|e| Error::internal(format!("Failed to encode JPEG: {}", e)))?;
    Ok(buf.into_inner())
}
