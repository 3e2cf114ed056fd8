//! End-to-end composition: sources → artifacts → plan → sink.
//!
//! ```text
//! Vec<SourceImage> ──process_batch──▶ artifacts ──layout──▶ DocumentPlan ──sink──▶ file
//!                          │
//!                          └──▶ failures (logged, reported, never fatal)
//! ```
//!
//! The only batch-level failure the core raises itself is
//! [`PipelineError::EmptyBatch`]: nothing survived processing, so there is
//! no document to build. Sink errors are passed through unchanged. Nothing
//! is retried.

use crate::imaging::ImageBackend;
use crate::layout::{DocumentPlan, layout};
use crate::process::{DecodeFailure, ProcessEvent, process_batch};
use crate::render::{DocumentSink, RenderError};
use crate::scan::SourceImage;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No usable images: {submitted} submitted, {failed} could not be processed")]
    EmptyBatch { submitted: usize, failed: usize },
    #[error("Failed to write document: {0}")]
    Render(#[from] RenderError),
}

/// A laid-out document plus what was dropped on the way.
#[derive(Debug)]
pub struct PlannedDocument {
    pub plan: DocumentPlan,
    pub failures: Vec<DecodeFailure>,
    /// Number of sources submitted, including failures.
    pub submitted: usize,
}

/// Counts reported after a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub submitted: usize,
    pub placed: usize,
    pub failures: Vec<DecodeFailure>,
    pub pages: usize,
    pub page_breaks: usize,
}

/// Normalize and lay out `sources` without writing anything.
pub fn plan_document(
    backend: &impl ImageBackend,
    sources: &[SourceImage],
    events: Option<Sender<ProcessEvent>>,
) -> Result<PlannedDocument, PipelineError> {
    let batch = process_batch(backend, sources, events);
    if batch.artifacts.is_empty() {
        return Err(PipelineError::EmptyBatch {
            submitted: sources.len(),
            failed: batch.failures.len(),
        });
    }

    let plan = layout(batch.artifacts);
    info!(
        submitted = sources.len(),
        skipped = batch.failures.len(),
        pages = plan.page_count(),
        "laid out document"
    );
    Ok(PlannedDocument {
        plan,
        failures: batch.failures,
        submitted: sources.len(),
    })
}

/// Normalize, lay out, and hand the plan to `sink` exactly once.
pub fn build_document(
    backend: &impl ImageBackend,
    sources: &[SourceImage],
    sink: &mut impl DocumentSink,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BuildSummary, PipelineError> {
    let planned = plan_document(backend, sources, events)?;
    sink.write(&planned.plan)?;

    Ok(BuildSummary {
        submitted: planned.submitted,
        placed: planned.plan.image_count(),
        pages: planned.plan.page_count(),
        page_breaks: planned.plan.page_break_count(),
        failures: planned.failures,
    })
}
