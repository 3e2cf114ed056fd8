//! Shared test utilities for the quadprint test suite.
//!
//! Provides synthetic image fixtures (encoded in memory with the `image`
//! crate), fake artifacts for layout tests, and plan-shape assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let plan = layout(artifacts(5));
//! assert_plan_shape(&plan, &[4, 1]);
//! ```

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use std::io::Cursor;

use crate::layout::DocumentPlan;
use crate::process::ImageArtifact;
use crate::scan::SourceImage;

// =========================================================================
// Synthetic images
// =========================================================================

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

/// Grayscale PNG with unique values at the corners.
/// Top-left=10, Top-right=20, Bottom-left=30, Bottom-right=40, rest=128.
pub fn corner_png(width: u32, height: u32) -> Vec<u8> {
    let mut img = GrayImage::from_pixel(width, height, Luma([128]));
    img.put_pixel(0, 0, Luma([10]));
    img.put_pixel(width - 1, 0, Luma([20]));
    img.put_pixel(0, height - 1, Luma([30]));
    img.put_pixel(width - 1, height - 1, Luma([40]));
    encode(&DynamicImage::ImageLuma8(img), ImageFormat::Png)
}

/// Solid-color RGB JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 120, 40]));
    encode(&DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

/// Luma value of a pixel, converting the image to grayscale first.
pub fn pixel_at(img: &DynamicImage, x: u32, y: u32) -> u8 {
    img.to_luma8().get_pixel(x, y).0[0]
}

// =========================================================================
// Pipeline fixtures
// =========================================================================

/// An in-memory source with the given name.
pub fn source(name: &str, bytes: Vec<u8>) -> SourceImage {
    SourceImage {
        name: name.to_string(),
        bytes,
    }
}

/// `count` sources whose contents the mock backend accepts.
pub fn mock_sources(count: usize) -> Vec<SourceImage> {
    (0..count)
        .map(|i| source(&format!("img-{i}.png"), format!("image-{i}").into_bytes()))
        .collect()
}

/// A fake artifact; the PNG payload encodes the index so tests can tell
/// artifacts apart after layout.
pub fn artifact(index: usize) -> ImageArtifact {
    ImageArtifact {
        index,
        name: format!("img-{index}.png"),
        width: 30,
        height: 20,
        png: format!("png-{index}").into_bytes(),
    }
}

/// `count` fake artifacts with indices `0..count`.
pub fn artifacts(count: usize) -> Vec<ImageArtifact> {
    (0..count).map(artifact).collect()
}

// =========================================================================
// Plan assertions
// =========================================================================

/// Filled-slot count of every page, in order.
pub fn filled_per_page(plan: &DocumentPlan) -> Vec<usize> {
    plan.pages().map(|p| p.filled_count()).collect()
}

/// Assert the number of filled slots on each page and the break count.
///
/// ```rust
/// assert_plan_shape(&plan, &[4, 4, 2]);
/// ```
pub fn assert_plan_shape(plan: &DocumentPlan, expected: &[usize]) {
    assert_eq!(
        filled_per_page(plan),
        expected.to_vec(),
        "filled slots per page mismatch"
    );
    assert_eq!(
        plan.page_break_count(),
        expected.len().saturating_sub(1),
        "page break count mismatch"
    );
}
