//! CLI output formatting for every command.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! Diagnostics go through `tracing` on stderr; this module is only the
//! user-facing report.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Sources
//! 001 cover.jpg (2480x3508, 1.2 MiB)
//! 002 page-001.png (unreadable)
//!
//! Skipped
//!     report.pdf: PDF pages must be rasterized to images first
//! ```
//!
//! ## Process
//!
//! ```text
//! 001 cover.jpg → 3508x2480
//! 002 page-001.png: skipped (Failed to decode image: ...)
//! ```
//!
//! ## Plan
//!
//! ```text
//! Page 001 (4 images)
//!     [1,1] 001 cover.jpg  92x131mm at (13, 5)
//!     [1,2] 003 page-002.png  92x131mm at (105, 5)
//!     ...
//! Page 002 (1 image)
//!     [1,1] 006 back.png  92x131mm at (13, 5)
//!     [1,2] empty
//! ```

use crate::imaging::Dimensions;
use crate::layout::{Cell, DocumentPlan, PageDescriptor};
use crate::pipeline::BuildSummary;
use crate::process::{DecodeFailure, ProcessEvent};
use crate::scan::{ScanResult, SkipReason, SkippedInput};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 0-based input index as a 1-based, 3-digit zero-padded position.
fn format_index(index: usize) -> String {
    format!("{:0>3}", index + 1)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Human-readable byte size with one decimal (KiB/MiB).
fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b >= KIB * KIB {
        format!("{:.1} MiB", b / (KIB * KIB))
    } else if b >= KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{bytes} B")
    }
}

fn skip_reason(reason: &SkipReason) -> &'static str {
    match reason {
        SkipReason::Pdf => "PDF pages must be rasterized to images first",
        SkipReason::Unsupported => "unsupported file type",
    }
}

fn format_skipped(skipped: &[SkippedInput]) -> Vec<String> {
    if skipped.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Skipped".to_string()];
    for s in skipped {
        lines.push(format!(
            "{}{}: {}",
            indent(1),
            s.path.display(),
            skip_reason(&s.reason)
        ));
    }
    lines
}

// ============================================================================
// Check
// ============================================================================

/// Format the result of collecting inputs.
///
/// `dimensions` holds one identify result per source, in source order.
pub fn format_check_output(
    result: &ScanResult,
    dimensions: &[Option<Dimensions>],
) -> Vec<String> {
    let mut lines = vec!["Sources".to_string()];
    for (i, source) in result.sources.iter().enumerate() {
        let detail = match dimensions.get(i).copied().flatten() {
            Some(d) => format!(
                "{}x{}, {}",
                d.width,
                d.height,
                format_bytes(source.bytes.len() as u64)
            ),
            None => "unreadable".to_string(),
        };
        lines.push(format!("{} {} ({})", format_index(i), source.name, detail));
    }
    if result.sources.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    lines.extend(format_skipped(&result.skipped));
    lines.push(String::new());
    lines.push(format!(
        "{}, {} total",
        plural(result.sources.len(), "source"),
        format_bytes(result.total_bytes)
    ));
    lines
}

pub fn print_check_output(result: &ScanResult, dimensions: &[Option<Dimensions>]) {
    for line in format_check_output(result, dimensions) {
        println!("{}", line);
    }
}

/// Format the skipped-input section on its own (used before processing).
pub fn format_scan_skips(result: &ScanResult) -> Vec<String> {
    format_skipped(&result.skipped)
}

// ============================================================================
// Process
// ============================================================================

/// Format one progress event from the page processor.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Normalized {
            index,
            name,
            width,
            height,
        } => vec![format!(
            "{} {} → {}x{}",
            format_index(*index),
            name,
            width,
            height
        )],
        ProcessEvent::Skipped {
            index,
            name,
            message,
        } => vec![format!(
            "{} {}: skipped ({})",
            format_index(*index),
            name,
            message
        )],
    }
}

// ============================================================================
// Plan
// ============================================================================

fn format_cell(cell: &Cell) -> String {
    let slot = format!("[{},{}]", cell.position.row + 1, cell.position.column + 1);
    match &cell.image {
        Some(placed) => format!(
            "{}{} {} {}  {}x{}mm at ({}, {})",
            indent(1),
            slot,
            format_index(placed.artifact.index),
            placed.artifact.name,
            placed.placement.width,
            placed.placement.height,
            placed.placement.x,
            placed.placement.y
        ),
        None => format!("{}{} empty", indent(1), slot),
    }
}

fn format_page(page: &PageDescriptor) -> Vec<String> {
    let mut lines = vec![format!(
        "Page {:0>3} ({})",
        page.number,
        plural(page.filled_count(), "image")
    )];
    lines.extend(page.cells.iter().map(format_cell));
    lines
}

/// Format a document plan page by page, slot by slot.
pub fn format_plan(plan: &DocumentPlan) -> Vec<String> {
    let mut lines: Vec<String> = plan.pages().flat_map(format_page).collect();
    lines.push(String::new());
    lines.push(format!(
        "{} on {}, {}",
        plural(plan.image_count(), "image"),
        plural(plan.page_count(), "page"),
        plural(plan.page_break_count(), "page break")
    ));
    lines
}

pub fn print_plan(plan: &DocumentPlan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

fn format_failures(failures: &[DecodeFailure]) -> Vec<String> {
    if failures.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Dropped".to_string()];
    for f in failures {
        lines.push(format!(
            "{}{} {}: {}",
            indent(1),
            format_index(f.index),
            f.name,
            f.message
        ));
    }
    lines
}

/// Format the summary printed after `build`.
pub fn format_build_summary(summary: &BuildSummary, output: &Path) -> Vec<String> {
    let mut lines = format_failures(&summary.failures);
    lines.push(format!(
        "Placed {} of {} on {} → {}",
        summary.placed,
        plural(summary.submitted, "image"),
        plural(summary.pages, "page"),
        output.display()
    ));
    lines
}

pub fn print_build_summary(summary: &BuildSummary, output: &Path) {
    for line in format_build_summary(summary, output) {
        println!("{}", line);
    }
}
