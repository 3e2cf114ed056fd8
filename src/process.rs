//! Page normalization: raw uploads → ready-to-place PNG artifacts.
//!
//! Every source image goes through the same fixed transform before layout:
//!
//! ```text
//! raw bytes ──decode──▶ bitmap ──rotate 90° CCW (canvas expands)──▶ PNG buffer
//! ```
//!
//! The rotation is not configurable. The printed sheet expects landscape
//! scans turned on their side; callers that need a different orientation
//! rotate before submitting.
//!
//! ## Partial failure
//!
//! A source that fails to decode or encode becomes a [`DecodeFailure`]. The
//! batch fold ([`process_batch`]) logs it and moves on; one bad file never
//! sinks the whole document. Callers decide what an empty result means.
//!
//! ## Parallel Processing
//!
//! Sources are normalized in parallel with [rayon](https://docs.rs/rayon).
//! Results are collected through an indexed parallel iterator, so the
//! artifacts come back in input order no matter which worker finished first.
//! Layout depends on that order.

use crate::imaging::ImageBackend;
use crate::scan::SourceImage;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, warn};

/// A normalized image, ready to be placed in a grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageArtifact {
    /// Position of the source in the submitted batch.
    pub index: usize,
    /// Display name of the source (file name).
    pub name: String,
    /// Pixel width after rotation.
    pub width: u32,
    /// Pixel height after rotation.
    pub height: u32,
    /// PNG stream, starting at the signature.
    #[serde(skip)]
    pub png: Vec<u8>,
}

/// A single source that could not be normalized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{name} (input #{index}): {message}")]
pub struct DecodeFailure {
    pub index: usize,
    pub name: String,
    pub message: String,
}

/// Progress events emitted by [`process_batch`], in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Normalized {
        index: usize,
        name: String,
        width: u32,
        height: u32,
    },
    Skipped {
        index: usize,
        name: String,
        message: String,
    },
}

/// Outcome of normalizing a whole batch.
#[derive(Debug, Default)]
pub struct ProcessedBatch {
    /// Successfully normalized images, in input order.
    pub artifacts: Vec<ImageArtifact>,
    /// Sources that were dropped, in input order.
    pub failures: Vec<DecodeFailure>,
}

/// Normalize one source image.
pub fn process_page(
    backend: &impl ImageBackend,
    index: usize,
    source: &SourceImage,
) -> Result<ImageArtifact, DecodeFailure> {
    let encoded = backend
        .normalize(&source.bytes)
        .map_err(|e| DecodeFailure {
            index,
            name: source.name.clone(),
            message: e.to_string(),
        })?;

    Ok(ImageArtifact {
        index,
        name: source.name.clone(),
        width: encoded.dimensions.width,
        height: encoded.dimensions.height,
        png: encoded.png,
    })
}

/// Normalize every source in parallel, skipping the ones that fail.
///
/// When `events` is given, one [`ProcessEvent`] per source is sent after the
/// parallel phase, in input order.
pub fn process_batch(
    backend: &impl ImageBackend,
    sources: &[SourceImage],
    events: Option<Sender<ProcessEvent>>,
) -> ProcessedBatch {
    let results: Vec<Result<ImageArtifact, DecodeFailure>> = sources
        .par_iter()
        .enumerate()
        .map(|(index, source)| process_page(backend, index, source))
        .collect();

    let mut batch = ProcessedBatch::default();
    for result in results {
        let event = match result {
            Ok(artifact) => {
                debug!(
                    index = artifact.index,
                    name = %artifact.name,
                    width = artifact.width,
                    height = artifact.height,
                    "normalized image"
                );
                let event = ProcessEvent::Normalized {
                    index: artifact.index,
                    name: artifact.name.clone(),
                    width: artifact.width,
                    height: artifact.height,
                };
                batch.artifacts.push(artifact);
                event
            }
            Err(failure) => {
                warn!(
                    index = failure.index,
                    name = %failure.name,
                    error = %failure.message,
                    "skipping image that could not be processed"
                );
                let event = ProcessEvent::Skipped {
                    index: failure.index,
                    name: failure.name.clone(),
                    message: failure.message.clone(),
                };
                batch.failures.push(failure);
                event
            }
        };
        if let Some(tx) = &events {
            // A dropped receiver only means nobody is listening
            let _ = tx.send(event);
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::{corner_png, jpeg_bytes, mock_sources, source};

    // =========================================================================
    // Single page (mock backend)
    // =========================================================================

    #[test]
    fn process_page_carries_index_and_name() {
        let backend = MockBackend::new();
        let artifact = process_page(&backend, 7, &source("scan.png", b"image".to_vec())).unwrap();

        assert_eq!(artifact.index, 7);
        assert_eq!(artifact.name, "scan.png");
        assert_eq!((artifact.width, artifact.height), (30, 20));
        assert_eq!(artifact.png, b"image");
    }

    #[test]
    fn process_page_failure_is_typed() {
        let backend = MockBackend::new();
        let failure =
            process_page(&backend, 2, &source("bad.jpg", b"corrupt!".to_vec())).unwrap_err();

        assert_eq!(failure.index, 2);
        assert_eq!(failure.name, "bad.jpg");
        assert!(failure.message.contains("mock corrupt input"));
        assert!(failure.to_string().starts_with("bad.jpg (input #2)"));
    }

    // =========================================================================
    // Batch fold (mock backend)
    // =========================================================================

    #[test]
    fn batch_preserves_input_order() {
        let backend = MockBackend::new();
        let sources = mock_sources(23);

        let batch = process_batch(&backend, &sources, None);

        let indices: Vec<usize> = batch.artifacts.iter().map(|a| a.index).collect();
        assert_eq!(indices, (0..23).collect::<Vec<_>>());
        for (artifact, source) in batch.artifacts.iter().zip(&sources) {
            assert_eq!(artifact.png, source.bytes);
        }
        assert_eq!(backend.get_operations().len(), 23);
    }

    #[test]
    fn batch_skips_corrupt_and_keeps_relative_order() {
        let backend = MockBackend::new();
        let mut sources = mock_sources(5);
        sources[2] = source("broken.png", b"corrupt".to_vec());

        let batch = process_batch(&backend, &sources, None);

        let names: Vec<&str> = batch.artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["img-0.png", "img-1.png", "img-3.png", "img-4.png"]);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].index, 2);
        assert_eq!(batch.failures[0].name, "broken.png");
    }

    #[test]
    fn batch_with_corrupt_first_yields_four_artifacts() {
        let backend = MockBackend::new();
        let mut sources = vec![source("first.png", b"corrupt".to_vec())];
        sources.extend(mock_sources(4));

        let batch = process_batch(&backend, &sources, None);

        assert_eq!(batch.artifacts.len(), 4);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.artifacts[0].index, 1);
    }

    #[test]
    fn batch_of_only_failures_is_empty() {
        let backend = MockBackend::new();
        let sources = vec![
            source("a.png", b"corrupt".to_vec()),
            source("b.png", b"corrupt".to_vec()),
        ];

        let batch = process_batch(&backend, &sources, None);

        assert!(batch.artifacts.is_empty());
        assert_eq!(batch.failures.len(), 2);
    }

    #[test]
    fn empty_batch_does_no_work() {
        let backend = MockBackend::new();
        let batch = process_batch(&backend, &[], None);
        assert!(batch.artifacts.is_empty());
        assert!(batch.failures.is_empty());
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn batch_only_normalizes() {
        let backend = MockBackend::new();
        process_batch(&backend, &mock_sources(3), None);
        assert!(
            backend
                .get_operations()
                .iter()
                .all(|op| matches!(op, RecordedOp::Normalize(_)))
        );
    }

    #[test]
    fn batch_sends_events_in_input_order() {
        let backend = MockBackend::new();
        let mut sources = mock_sources(3);
        sources[1] = source("broken.png", b"corrupt".to_vec());
        let (tx, rx) = std::sync::mpsc::channel();

        process_batch(&backend, &sources, Some(tx));

        let events: Vec<ProcessEvent> = rx.iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], ProcessEvent::Normalized { index: 0, .. }));
        assert!(
            matches!(&events[1], ProcessEvent::Skipped { index: 1, name, .. } if name == "broken.png")
        );
        assert!(matches!(&events[2], ProcessEvent::Normalized { index: 2, .. }));
    }

    // =========================================================================
    // Real backend
    // =========================================================================

    #[test]
    fn real_backend_rotates_mixed_batch() {
        let backend = RustBackend::new();
        let sources = vec![
            source("wide.png", corner_png(40, 10)),
            source("garbage.bmp", b"BM not really a bitmap".to_vec()),
            source("photo.jpg", jpeg_bytes(12, 30)),
        ];

        let batch = process_batch(&backend, &sources, None);

        assert_eq!(batch.artifacts.len(), 2);
        assert_eq!((batch.artifacts[0].width, batch.artifacts[0].height), (10, 40));
        assert_eq!((batch.artifacts[1].width, batch.artifacts[1].height), (30, 12));
        assert_eq!(batch.failures[0].name, "garbage.bmp");
    }
}
