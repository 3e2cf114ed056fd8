//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the pipeline needs
//! from a raster library: identify (read dimensions without a full decode)
//! and normalize (decode, rotate a quarter turn counter-clockwise, re-encode
//! as PNG).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the mock in [`tests::MockBackend`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a raster image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A normalized image held in memory as a PNG stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub dimensions: Dimensions,
    /// Complete PNG file contents, starting at the signature.
    pub png: Vec<u8>,
}

/// Trait for image processing backends.
///
/// Backends are shared across the rayon pool, hence the `Sync` bound.
pub trait ImageBackend: Sync {
    /// Read image dimensions from an encoded buffer.
    fn identify(&self, data: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode, rotate 90° counter-clockwise with canvas expansion, and
    /// re-encode losslessly as PNG.
    fn normalize(&self, data: &[u8]) -> Result<EncodedImage, BackendError>;
}
