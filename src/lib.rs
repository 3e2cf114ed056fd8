//! # quadprint
//!
//! Lays out a batch of photos and scanned pages as a printable A4 document,
//! four images to a page in a fixed 2x2 grid.
//!
//! # Architecture: Linear Pipeline
//!
//! ```text
//! 1. Scan      paths      →  Vec<SourceImage>   (allow-list, ordering, size cap)
//! 2. Process   sources    →  Vec<ImageArtifact> (rotate 90° CCW, PNG; failures skipped)
//! 3. Layout    artifacts  →  DocumentPlan       (chunks of 4, page breaks between)
//! 4. Render    plan       →  PDF                (one call to a DocumentSink)
//! ```
//!
//! Stages 2 and 3 are the core. Both are single-pass transforms with no
//! retained state; layout in particular is a pure function of its input and
//! the constants in [`layout::geometry`]. Scanning and rendering sit behind
//! small seams ([`scan::collect_sources`], [`render::DocumentSink`]) so the
//! core can be driven from anything that can produce bytes and accept a plan.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Resolves CLI paths to an ordered batch of in-memory sources |
//! | [`process`] | Page processor — per-image normalization and the parallel batch fold |
//! | [`layout`] | Layout engine — grid pagination into a [`layout::DocumentPlan`] |
//! | [`render`] | Document sinks; [`render::PdfSink`] writes the plan with `lopdf` |
//! | [`pipeline`] | Composes process → layout → render; raises `EmptyBatch` |
//! | [`imaging`] | [`imaging::ImageBackend`] trait and the `image`-crate backend |
//! | [`config`] | `quadprint.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Order Is an Invariant
//!
//! Images are normalized in parallel, but the artifact list always comes back
//! in submission order, and image `i` always lands on page `i / 4`, slot
//! `i % 4`. A file that fails to decode is dropped; the survivors keep their
//! relative order.
//!
//! ## Skip, Don't Abort
//!
//! One unreadable file never costs the user the rest of the batch. Failures
//! are collected, logged, and reported. Only a batch with *no* usable images
//! is an error.
//!
//! ## Fixed Geometry
//!
//! The page is A4 with 5 mm margins, cells are 92 × 131 mm, and each row
//! reserves an extra 10 mm. Images are stretched to the cell box without
//! preserving aspect ratio. None of this is configurable.

pub mod config;
pub mod imaging;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod render;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
