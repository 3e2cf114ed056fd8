//! Image processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Normalize** | decode → `rotate270` → PNG encode |
//!
//! The module is split into:
//! - **Backend**: [`ImageBackend`] trait + shared types
//! - **Rust backend**: [`RustBackend`], the `image`-crate implementation

pub mod backend;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
pub use rust_backend::RustBackend;
