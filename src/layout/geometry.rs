//! Fixed page geometry, in millimeters.
//!
//! All values derive from A4 portrait. Nothing here is configurable: the
//! grid is always 2x2 and every image is drawn at exactly one cell size.
//!
//! ```text
//!  ┌──────────────── 210 ────────────────┐
//!  │ 5  ┌──── 92 ────┬──── 92 ────┐      │
//!  │    │  image     │  image     │ 131  │
//!  │    │            │            │      │
//!  │    │ (top space)│            │ +10  │
//!  │    ├────────────┼────────────┤      │ 297
//!  │    │  image     │  image     │      │
//!  │    │            │            │      │
//!  │    │            │            │      │
//!  │    └────────────┴────────────┘      │
//!  └─────────────────────────────────────┘
//! ```

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const CELL_WIDTH: f32 = 92.0;
pub const CELL_HEIGHT: f32 = 131.0;
/// Page margin on all four sides.
pub const MARGIN: f32 = 5.0;
/// Extra height reserved in each row on top of the image height.
pub const TOP_SPACE: f32 = 10.0;

pub const GRID_COLUMNS: usize = 2;
pub const GRID_ROWS: usize = 2;
pub const CELLS_PER_PAGE: usize = GRID_COLUMNS * GRID_ROWS;

/// Exact height of every grid row.
pub const ROW_HEIGHT: f32 = CELL_HEIGHT + TOP_SPACE;
pub const TABLE_WIDTH: f32 = CELL_WIDTH * GRID_COLUMNS as f32;

/// Width available between the left and right margins.
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

/// Left edge of the grid; the table is centered between the margins.
pub const TABLE_LEFT: f32 = MARGIN + (CONTENT_WIDTH - TABLE_WIDTH) / 2.0;
pub const TABLE_TOP: f32 = MARGIN;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_centered() {
        assert_eq!(TABLE_LEFT, 13.0);
        let right_gap = PAGE_WIDTH - (TABLE_LEFT + TABLE_WIDTH);
        assert_eq!(right_gap, TABLE_LEFT);
    }

    #[test]
    fn grid_fits_inside_margins() {
        assert!(TABLE_WIDTH <= CONTENT_WIDTH);
        let grid_bottom = TABLE_TOP + ROW_HEIGHT * GRID_ROWS as f32;
        assert_eq!(grid_bottom, 287.0);
        assert!(grid_bottom <= PAGE_HEIGHT - MARGIN);
    }

    #[test]
    fn a4_in_points() {
        assert!((mm_to_pt(PAGE_WIDTH) - 595.28).abs() < 0.01);
        assert!((mm_to_pt(PAGE_HEIGHT) - 841.89).abs() < 0.01);
    }
}
