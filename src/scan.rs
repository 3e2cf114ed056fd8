//! Input collection: command-line paths → ordered in-memory sources.
//!
//! The scanner decides *which* files enter the batch and *in what order*.
//! It never decodes anything; corrupt files are the page processor's
//! problem.
//!
//! ## Ordering
//!
//! ```text
//! quadprint build cover.jpg scans/ back.png
//!
//! scans/
//! ├── page-001.png      ─┐
//! ├── page-002.png       │ expanded in file-name order,
//! ├── page-010.png       │ between cover.jpg and back.png
//! └── notes.txt         ─┘ (skipped: not an image)
//! ```
//!
//! Paths are taken in the order given. A directory expands in place to its
//! image files sorted by file name, which keeps the pages of a rasterized
//! PDF together and in page order. Directories are not descended into
//! recursively.
//!
//! ## Filtering
//!
//! - Extensions are matched case-insensitively against
//!   [`InputConfig::extensions`](crate::config::InputConfig).
//! - `.pdf` files are skipped with a hint: PDF pages must be rasterized
//!   to images before submission.
//! - Anything else is skipped and reported.
//!
//! ## Size limit
//!
//! The combined size of all accepted files is capped by
//! `input.max_batch_bytes` (32 MiB by default). Exceeding it is a hard
//! error, checked before any file is read. Skipped files never enter the
//! batch, so they do not count toward the limit: a 40 MiB PDF passed next
//! to two photos is reported as skipped, not as an oversized batch.
//!
//! Ending up with nothing to process (every input skipped, or only empty
//! directories) is [`ScanError::NoInputs`].

use crate::config::InputConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
    #[error("Batch is {total} bytes, over the {limit}-byte limit")]
    BatchTooLarge { total: u64, limit: u64 },
    #[error("No image inputs to process ({skipped} skipped)")]
    NoInputs { skipped: usize },
}

/// One raw image handed to the page processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// File name, used in progress output and diagnostics.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Why an input path was left out of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A PDF; its pages need rasterizing before they can be laid out.
    Pdf,
    /// Extension not on the allow-list.
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInput {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Result of collecting inputs.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Accepted sources, in batch order.
    pub sources: Vec<SourceImage>,
    /// Inputs left out, in the order they were encountered.
    pub skipped: Vec<SkippedInput>,
    /// Combined size of the accepted sources.
    pub total_bytes: u64,
}

/// Resolve `inputs` to an ordered batch of sources.
pub fn collect_sources(inputs: &[PathBuf], config: &InputConfig) -> Result<ScanResult, ScanError> {
    let mut accepted = Vec::new();
    let mut result = ScanResult::default();

    for input in inputs {
        if !input.exists() {
            return Err(ScanError::NotFound(input.clone()));
        }
        let candidates = if input.is_dir() {
            collect_entries(input)?
        } else {
            vec![input.clone()]
        };
        for path in candidates {
            match classify(&path, config) {
                Ok(()) => accepted.push(path),
                Err(reason) => {
                    warn!(path = %path.display(), ?reason, "skipping input");
                    result.skipped.push(SkippedInput { path, reason });
                }
            }
        }
    }

    if accepted.is_empty() {
        return Err(ScanError::NoInputs {
            skipped: result.skipped.len(),
        });
    }

    let mut total = 0u64;
    for path in &accepted {
        total += fs::metadata(path)?.len();
    }
    if total > config.max_batch_bytes {
        return Err(ScanError::BatchTooLarge {
            total,
            limit: config.max_batch_bytes,
        });
    }

    for path in accepted {
        let bytes = fs::read(&path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "read source");
        result.sources.push(SourceImage {
            name: display_name(&path),
            bytes,
        });
    }
    result.total_bytes = total;

    Ok(result)
}

/// Regular files directly inside `dir`, sorted by file name.
fn collect_entries(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(entries)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn classify(path: &Path, config: &InputConfig) -> Result<(), SkipReason> {
    match extension(path) {
        Some(ext) if config.extensions.iter().any(|a| a.eq_ignore_ascii_case(&ext)) => Ok(()),
        Some(ext) if ext == "pdf" => Err(SkipReason::Pdf),
        _ => Err(SkipReason::Unsupported),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
