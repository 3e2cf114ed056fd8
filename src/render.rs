//! Document sinks: turn a [`DocumentPlan`] into a persisted file.
//!
//! The layout engine never touches a file format. It hands a finished plan
//! to a [`DocumentSink`], exactly once per build. The shipped sink is
//! [`PdfSink`], which writes an A4 PDF with `lopdf`:
//!
//! | Plan element | PDF object |
//! |---|---|
//! | `PageDescriptor` | `/Page` with a 595.28 × 841.89 pt `/MediaBox` |
//! | `PageBreak` | start of the next `/Page` |
//! | filled slot | RGB image XObject (+ `/SMask` when the PNG has alpha) drawn with `cm … Do` |
//! | empty slot | nothing |
//!
//! ## Coordinate System
//!
//! Placements are in millimeters from the **top-left** corner of the page.
//! PDF user space is in points from the **bottom-left**, so:
//!
//! ```text
//! pdf_x = mm_to_pt(x)
//! pdf_y = mm_to_pt(PAGE_HEIGHT - (y + height))
//! ```

use crate::layout::geometry::{PAGE_HEIGHT, PAGE_WIDTH, mm_to_pt};
use crate::layout::{DocumentPlan, PageDescriptor, Placement};
use crate::process::ImageArtifact;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Failed to embed {name}: {message}")]
    Image { name: String, message: String },
    #[error("Refusing to write a document with no pages")]
    EmptyPlan,
}

/// Receives a completed plan and persists it.
pub trait DocumentSink {
    fn write(&mut self, plan: &DocumentPlan) -> Result<(), RenderError>;
}

/// Writes the plan as a PDF to any [`Write`] target.
pub struct PdfSink<W: Write> {
    writer: W,
}

impl<W: Write> PdfSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DocumentSink for PdfSink<W> {
    fn write(&mut self, plan: &DocumentPlan) -> Result<(), RenderError> {
        let bytes = render_pdf(plan)?;
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        info!(
            pages = plan.page_count(),
            bytes = bytes.len(),
            "wrote PDF document"
        );
        Ok(())
    }
}

/// Render the plan to PDF bytes.
pub fn render_pdf(plan: &DocumentPlan) -> Result<Vec<u8>, RenderError> {
    if plan.is_empty() {
        return Err(RenderError::EmptyPlan);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(plan.page_count());
    for page in plan.pages() {
        let page_id = add_page(&mut doc, pages_id, page)?;
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    let pages = Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(count)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc.compress();

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| RenderError::Pdf(format!("Failed to save PDF: {e}")))?;
    Ok(output)
}

/// PDF rectangle `(x, y, width, height)` in points for a top-left placement.
fn pdf_rect(placement: &Placement) -> (f32, f32, f32, f32) {
    (
        mm_to_pt(placement.x),
        mm_to_pt(PAGE_HEIGHT - (placement.y + placement.height)),
        mm_to_pt(placement.width),
        mm_to_pt(placement.height),
    )
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    page: &PageDescriptor,
) -> Result<ObjectId, RenderError> {
    let mut xobjects = Dictionary::new();
    let mut operations = Vec::new();

    for (slot, cell) in page.cells.iter().enumerate() {
        let Some(placed) = &cell.image else {
            continue;
        };
        let image_id = add_image(doc, &placed.artifact)?;
        let name = format!("Im{}", slot + 1);
        xobjects.set(name.as_str(), Object::Reference(image_id));

        let (x, y, w, h) = pdf_rect(&placed.placement);
        operations.push(Operation::new("q", vec![]));
        operations.push(Operation::new(
            "cm",
            vec![
                w.into(),
                Object::Integer(0),
                Object::Integer(0),
                h.into(),
                x.into(),
                y.into(),
            ],
        ));
        operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        operations.push(Operation::new("Q", vec![]));
    }

    let content = Content { operations };
    let content_bytes = content
        .encode()
        .map_err(|e| RenderError::Pdf(format!("Failed to encode page content: {e}")))?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content_bytes));

    let resources = Dictionary::from_iter([("XObject", Object::Dictionary(xobjects))]);
    let page_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        ("Contents", Object::Reference(content_id)),
        ("Resources", Object::Dictionary(resources)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                mm_to_pt(PAGE_WIDTH).into(),
                mm_to_pt(PAGE_HEIGHT).into(),
            ]),
        ),
    ]));

    debug!(page = page.number, images = page.filled_count(), "rendered page");
    Ok(page_id)
}

fn image_dictionary(width: u32, height: u32, color_space: &str) -> Dictionary {
    Dictionary::from_iter([
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(i64::from(width))),
        ("Height", Object::Integer(i64::from(height))),
        ("ColorSpace", Object::Name(color_space.as_bytes().to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
    ])
}

/// Embed an artifact as an 8-bit RGB image XObject. Alpha goes into a
/// separate DeviceGray soft mask.
fn add_image(doc: &mut Document, artifact: &ImageArtifact) -> Result<ObjectId, RenderError> {
    let img = image::load_from_memory(&artifact.png).map_err(|e| RenderError::Image {
        name: artifact.name.clone(),
        message: e.to_string(),
    })?;
    let (width, height) = (img.width(), img.height());

    let mut dict = image_dictionary(width, height, "DeviceRGB");
    if img.color().has_alpha() {
        let alpha: Vec<u8> = img.to_rgba8().pixels().map(|p| p.0[3]).collect();
        let mask_id = doc.add_object(Stream::new(
            image_dictionary(width, height, "DeviceGray"),
            alpha,
        ));
        dict.set("SMask", Object::Reference(mask_id));
    }

    let rgb = img.to_rgb8().into_raw();
    Ok(doc.add_object(Stream::new(dict, rgb)))
}
