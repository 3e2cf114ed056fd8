//! Grid pagination: ordered artifacts → a printable page plan.
//!
//! The layout engine is a pure function. It partitions the artifacts into
//! consecutive chunks of four and turns each chunk into one
//! [`PageDescriptor`]: a 2x2 grid whose slots are filled row-major.
//!
//! ```text
//! input:  a0 a1 a2 a3 | a4 a5 a6 a7 | a8
//!
//! page 1            page 2            page 3
//! ┌────┬────┐       ┌────┬────┐       ┌────┬────┐
//! │ a0 │ a1 │       │ a4 │ a5 │       │ a8 │    │
//! ├────┼────┤ break ├────┼────┤ break ├────┼────┤
//! │ a2 │ a3 │       │ a6 │ a7 │       │    │    │
//! └────┴────┘       └────┴────┘       └────┴────┘
//! ```
//!
//! Image `i` always lands on page `i / 4`, slot `i % 4`. Empty slots only
//! ever appear at the end of the last page, and no page break follows the
//! last page.
//!
//! ## Stretch-to-cell
//!
//! Every image is drawn at exactly [`CELL_WIDTH`] × [`CELL_HEIGHT`],
//! whatever its own aspect ratio. Inputs that don't match the cell ratio
//! come out distorted. This is the established output of the tool and is
//! kept as-is; see the `stretches_regardless_of_aspect_ratio` test.

pub mod geometry;

use crate::process::ImageArtifact;
use geometry::{
    CELL_HEIGHT, CELL_WIDTH, CELLS_PER_PAGE, GRID_COLUMNS, ROW_HEIGHT, TABLE_LEFT, TABLE_TOP,
    TABLE_WIDTH,
};
use serde::Serialize;
use tracing::debug;

/// How the height of a grid row is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowHeightRule {
    /// The row is exactly this tall; content never grows it.
    Exact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlign {
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlign {
    Top,
}

/// Grid-level geometry shared by every page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridStyle {
    /// Total table width (mm), two cells side by side.
    pub table_width: f32,
    /// Table placement between the page margins.
    pub table_align: HorizontalAlign,
    /// Row height (mm): the image height plus the reserved top space.
    pub row_height: f32,
    pub row_height_rule: RowHeightRule,
    pub cell_width: f32,
    pub cell_height: f32,
    /// Image placement inside a cell.
    pub image_align: HorizontalAlign,
    pub cell_vertical_align: VerticalAlign,
    /// Cell padding above the image (mm).
    pub cell_padding_top: f32,
    /// Cell padding below the image (mm).
    pub cell_padding_bottom: f32,
}

impl GridStyle {
    pub const STANDARD: GridStyle = GridStyle {
        table_width: TABLE_WIDTH,
        table_align: HorizontalAlign::Center,
        row_height: ROW_HEIGHT,
        row_height_rule: RowHeightRule::Exact,
        cell_width: CELL_WIDTH,
        cell_height: CELL_HEIGHT,
        image_align: HorizontalAlign::Center,
        cell_vertical_align: VerticalAlign::Top,
        cell_padding_top: 0.0,
        cell_padding_bottom: 0.0,
    };
}

/// Row/column coordinates of a slot in the 2x2 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotPosition {
    pub row: usize,
    pub column: usize,
}

impl SlotPosition {
    /// Row-major mapping: 0→(0,0), 1→(0,1), 2→(1,0), 3→(1,1).
    pub const fn from_slot(slot: usize) -> Self {
        Self {
            row: slot / GRID_COLUMNS,
            column: slot % GRID_COLUMNS,
        }
    }
}

/// Absolute rectangle on the page, in millimeters from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Placement {
    /// Rectangle of the grid cell at `position`.
    pub fn cell(position: SlotPosition, style: &GridStyle) -> Self {
        Self {
            x: TABLE_LEFT + position.column as f32 * style.cell_width,
            y: TABLE_TOP + position.row as f32 * style.row_height,
            width: style.cell_width,
            height: style.row_height,
        }
    }

    /// Rectangle of an image drawn in the cell at `position`: stretched to
    /// the cell size, centered horizontally, pinned to the top of the row.
    pub fn image(position: SlotPosition, style: &GridStyle) -> Self {
        let cell = Self::cell(position, style);
        Self {
            x: cell.x + (cell.width - style.cell_width) / 2.0,
            y: cell.y + style.cell_padding_top,
            width: style.cell_width,
            height: style.cell_height,
        }
    }
}

/// An artifact placed in a slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedImage {
    pub artifact: ImageArtifact,
    pub placement: Placement,
}

/// One slot of the grid; `image` is `None` for trailing empty slots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub position: SlotPosition,
    pub image: Option<PlacedImage>,
}

/// One physical page: exactly four cells in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageDescriptor {
    /// 1-based page number.
    pub number: usize,
    pub grid: GridStyle,
    pub cells: [Cell; CELLS_PER_PAGE],
}

impl PageDescriptor {
    /// Build a page from a chunk of one to four artifacts.
    fn from_chunk(number: usize, chunk: &[ImageArtifact]) -> Self {
        debug_assert!(!chunk.is_empty() && chunk.len() <= CELLS_PER_PAGE);
        let grid = GridStyle::STANDARD;
        let cells = std::array::from_fn(|slot| {
            let position = SlotPosition::from_slot(slot);
            let image = chunk.get(slot).map(|artifact| PlacedImage {
                artifact: artifact.clone(),
                placement: Placement::image(position, &grid),
            });
            Cell { position, image }
        });
        Self {
            number,
            grid,
            cells,
        }
    }

    /// Number of slots holding an image.
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.image.is_some()).count()
    }

    /// Placed images in slot order.
    pub fn images(&self) -> impl Iterator<Item = &PlacedImage> {
        self.cells.iter().filter_map(|c| c.image.as_ref())
    }
}

/// An entry in the document plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanItem {
    Page(PageDescriptor),
    PageBreak,
}

/// Pages interleaved with page breaks, ready for a document sink.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentPlan {
    pub items: Vec<PlanItem>,
}

impl DocumentPlan {
    pub fn pages(&self) -> impl Iterator<Item = &PageDescriptor> {
        self.items.iter().filter_map(|item| match item {
            PlanItem::Page(page) => Some(page),
            PlanItem::PageBreak => None,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages().count()
    }

    pub fn page_break_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, PlanItem::PageBreak))
            .count()
    }

    /// Total number of placed images.
    pub fn image_count(&self) -> usize {
        self.pages().map(PageDescriptor::filled_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Lay the artifacts out four to a page.
///
/// An empty input yields an empty plan; rejecting empty batches is up to the
/// caller.
pub fn layout(images: Vec<ImageArtifact>) -> DocumentPlan {
    let chunks: Vec<&[ImageArtifact]> = images.chunks(CELLS_PER_PAGE).collect();
    let last = chunks.len().saturating_sub(1);
    let mut items = Vec::with_capacity(chunks.len() * 2);

    for (i, chunk) in chunks.into_iter().enumerate() {
        let page = PageDescriptor::from_chunk(i + 1, chunk);
        debug!(page = page.number, filled = page.filled_count(), "laid out page");
        items.push(PlanItem::Page(page));
        if i < last {
            items.push(PlanItem::PageBreak);
        }
    }

    DocumentPlan { items }
}
