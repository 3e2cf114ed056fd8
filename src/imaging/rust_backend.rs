//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Format detection | `image::ImageReader::with_guessed_format` (magic bytes) |
//! | Decode (PNG, JPEG, GIF, BMP) | `image` crate decoders |
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Rotate | `DynamicImage::rotate270` (90° counter-clockwise, canvas swaps) |
//! | Encode → PNG | `DynamicImage::write_to` with `ImageFormat::Png` |

use super::backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use tracing::debug;

/// Pure Rust backend using the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(BackendError::Io)
}

/// Decode an in-memory image, sniffing the format from its content.
fn decode(data: &[u8]) -> Result<DynamicImage, BackendError> {
    reader(data)?
        .decode()
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode image: {e}")))
}

/// Encode as PNG into a fresh buffer.
fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, BackendError> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to encode PNG: {e}")))?;
    Ok(buffer.into_inner())
}

impl ImageBackend for RustBackend {
    fn identify(&self, data: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(data)?.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {e}"))
        })?;
        Ok(Dimensions { width, height })
    }

    fn normalize(&self, data: &[u8]) -> Result<EncodedImage, BackendError> {
        let img = decode(data)?;
        // rotate270 is a clockwise 270° turn, i.e. a quarter turn counter-clockwise
        let rotated = img.rotate270();
        debug!(
            src_w = img.width(),
            src_h = img.height(),
            dst_w = rotated.width(),
            dst_h = rotated.height(),
            "rotated image"
        );
        let png = encode_png(&rotated)?;
        Ok(EncodedImage {
            dimensions: Dimensions {
                width: rotated.width(),
                height: rotated.height(),
            },
            png,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{corner_png, jpeg_bytes, pixel_at};

    #[test]
    fn identify_synthetic_png() {
        let backend = RustBackend::new();
        let dims = backend.identify(&corner_png(40, 25)).unwrap();
        assert_eq!(
            dims,
            Dimensions {
                width: 40,
                height: 25
            }
        );
    }

    #[test]
    fn identify_garbage_errors() {
        let backend = RustBackend::new();
        assert!(backend.identify(b"definitely not an image").is_err());
    }

    #[test]
    fn normalize_swaps_dimensions() {
        let backend = RustBackend::new();
        let result = backend.normalize(&corner_png(6, 3)).unwrap();
        assert_eq!(
            result.dimensions,
            Dimensions {
                width: 3,
                height: 6
            }
        );
    }

    #[test]
    fn normalize_emits_png_stream() {
        let backend = RustBackend::new();
        let result = backend.normalize(&jpeg_bytes(16, 8)).unwrap();
        assert!(result.png.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert_eq!(
            image::guess_format(&result.png).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn normalize_turns_counter_clockwise() {
        // corner_png: top-left=10, top-right=20, bottom-left=30, bottom-right=40
        let backend = RustBackend::new();
        let result = backend.normalize(&corner_png(6, 3)).unwrap();
        let rotated = image::load_from_memory(&result.png).unwrap();

        // Counter-clockwise: the old right edge becomes the top edge
        assert_eq!(pixel_at(&rotated, 0, 0), 20);
        assert_eq!(pixel_at(&rotated, 2, 0), 40);
        assert_eq!(pixel_at(&rotated, 0, 5), 10);
        assert_eq!(pixel_at(&rotated, 2, 5), 30);
    }

    #[test]
    fn normalize_is_lossless() {
        let backend = RustBackend::new();
        let once = backend.normalize(&corner_png(5, 7)).unwrap();
        let rotated = image::load_from_memory(&once.png).unwrap();
        // Four quarter turns bring every pixel back where it started
        let full_turn = rotated.rotate270().rotate270().rotate270();
        let original = image::load_from_memory(&corner_png(5, 7)).unwrap();
        assert_eq!(full_turn.to_luma8(), original.to_luma8());
    }

    #[test]
    fn normalize_truncated_png_errors() {
        let backend = RustBackend::new();
        let png = corner_png(10, 10);
        let truncated = &png[..png.len() / 2];
        let err = backend.normalize(truncated).unwrap_err();
        assert!(err.to_string().contains("Failed to decode"));
    }
}
