//! Frame composition
//!
//! Turns a run of glyph cells and their color tags into what the bus
//! consumes: one byte buffer per row and one color entry per dot column.

use heapless::Vec;

use crate::glyph::{ColorTag, Glyph, CELL_WIDTH, GLYPH_ROWS};

/// Cells that fit on the two panels at once
pub const STATIC_CAPACITY: usize = 8;

/// Longest text a single scroll can carry
pub const SCROLL_CAPACITY: usize = 96;

/// Dot columns in the largest frame
pub const MAX_COLUMNS: usize = SCROLL_CAPACITY * CELL_WIDTH;

/// Byte buffer for one row, one byte per cell
pub type RowBuffer = Vec<u8, SCROLL_CAPACITY>;

/// Per-column color array
pub type ColumnColors = Vec<ColorTag, MAX_COLUMNS>;

const EMPTY_ROW: RowBuffer = Vec::new();

/// How a frame will be shown, which decides its cell capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderMode {
    /// One pass, must fit the panels
    Static,
    /// Marquee, may be longer than the panels
    Scroll,
}

impl RenderMode {
    /// Maximum number of cells for this mode
    pub const fn capacity(self) -> usize {
        match self {
            RenderMode::Static => STATIC_CAPACITY,
            RenderMode::Scroll => SCROLL_CAPACITY,
        }
    }
}

/// Errors from composing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ComposeError {
    /// Text needs more cells than the mode allows
    TooManyCharacters { cells: usize, capacity: usize },
    /// One color tag is needed per cell
    ColorCountMismatch { cells: usize, colors: usize },
}

/// Composed row buffers and column colors for one print
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    rows: [RowBuffer; GLYPH_ROWS],
    colors: ColumnColors,
}

impl Frame {
    /// Create an empty frame (zero cells)
    pub const fn new() -> Self {
        Self {
            rows: [EMPTY_ROW; GLYPH_ROWS],
            colors: Vec::new(),
        }
    }

    /// Compose a new frame from cells and their color tags
    pub fn compose(
        cells: &[Glyph],
        colors: &[ColorTag],
        mode: RenderMode,
    ) -> Result<Self, ComposeError> {
        let mut frame = Self::new();
        frame.compose_into(cells, colors, mode)?;
        Ok(frame)
    }

    /// A frame of `cells` blank cells
    pub fn blank(cells: usize) -> Self {
        let mut frame = Self::new();
        let cells = cells.min(SCROLL_CAPACITY);
        for row in frame.rows.iter_mut() {
            // Cannot fail: bounded by SCROLL_CAPACITY
            let _ = row.resize(cells, 0);
        }
        let _ = frame.colors.resize(cells * CELL_WIDTH, ColorTag::None);
        frame
    }

    /// Recompose this frame in place
    ///
    /// Input is validated before anything is written, so on error the
    /// previous contents are untouched.
    pub fn compose_into(
        &mut self,
        cells: &[Glyph],
        colors: &[ColorTag],
        mode: RenderMode,
    ) -> Result<(), ComposeError> {
        if cells.len() != colors.len() {
            return Err(ComposeError::ColorCountMismatch {
                cells: cells.len(),
                colors: colors.len(),
            });
        }
        let capacity = mode.capacity();
        if cells.len() > capacity {
            return Err(ComposeError::TooManyCharacters {
                cells: cells.len(),
                capacity,
            });
        }

        self.colors.clear();
        for &tag in colors {
            for _ in 0..CELL_WIDTH {
                // Cannot fail: cells <= SCROLL_CAPACITY
                let _ = self.colors.push(tag);
            }
        }

        for (r, row) in self.rows.iter_mut().enumerate() {
            row.clear();
            for glyph in cells {
                let _ = row.push(glyph.row(r));
            }
        }

        Ok(())
    }

    /// Number of cells (bytes per row)
    pub fn cells(&self) -> usize {
        self.rows[0].len()
    }

    /// Number of dot columns
    pub fn columns(&self) -> usize {
        self.colors.len()
    }

    /// Check if the frame holds no cells
    pub fn is_empty(&self) -> bool {
        self.cells() == 0
    }

    /// Bytes of row `row` (0-15)
    pub fn row(&self, row: usize) -> &[u8] {
        &self.rows[row]
    }

    /// All row buffers
    pub fn rows(&self) -> &[RowBuffer; GLYPH_ROWS] {
        &self.rows
    }

    /// Per-column colors
    pub fn colors(&self) -> &[ColorTag] {
        &self.colors
    }

    /// Mutable access for the scroll engine
    pub(crate) fn parts_mut(&mut self) -> (&mut [RowBuffer; GLYPH_ROWS], &mut ColumnColors) {
        (&mut self.rows, &mut self.colors)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned(seed: u8) -> Glyph {
        let mut rows = [0u8; GLYPH_ROWS];
        for (i, b) in rows.iter_mut().enumerate() {
            *b = seed.wrapping_mul(31).wrapping_add(i as u8 * 7);
        }
        Glyph::from_rows(rows)
    }

    #[test]
    fn test_three_cells_red_green_red() {
        let cells = [patterned(1), patterned(2), patterned(3)];
        let tags = [ColorTag::Red, ColorTag::Green, ColorTag::Red];
        let frame = Frame::compose(&cells, &tags, RenderMode::Static).unwrap();

        assert_eq!(frame.cells(), 3);
        assert_eq!(frame.columns(), 24);
        for r in 0..GLYPH_ROWS {
            assert_eq!(frame.row(r).len(), 3);
            assert_eq!(frame.row(r)[0], cells[0].row(r));
            assert_eq!(frame.row(r)[1], cells[1].row(r));
            assert_eq!(frame.row(r)[2], cells[2].row(r));
        }
        assert!(frame.colors()[0..8].iter().all(|&c| c == ColorTag::Red));
        assert!(frame.colors()[8..16].iter().all(|&c| c == ColorTag::Green));
        assert!(frame.colors()[16..24].iter().all(|&c| c == ColorTag::Red));
    }

    #[test]
    fn test_static_capacity() {
        let cells = [Glyph::SOLID; 8];
        let tags = [ColorTag::Orange; 8];
        assert!(Frame::compose(&cells, &tags, RenderMode::Static).is_ok());

        let cells = [Glyph::SOLID; 9];
        let tags = [ColorTag::Orange; 9];
        assert_eq!(
            Frame::compose(&cells, &tags, RenderMode::Static),
            Err(ComposeError::TooManyCharacters {
                cells: 9,
                capacity: 8
            })
        );
        // Scroll mode takes it
        assert!(Frame::compose(&cells, &tags, RenderMode::Scroll).is_ok());
    }

    #[test]
    fn test_rejected_compose_leaves_frame_untouched() {
        let cells = [patterned(5), patterned(6)];
        let tags = [ColorTag::Green, ColorTag::Red];
        let mut frame = Frame::compose(&cells, &tags, RenderMode::Static).unwrap();
        let before = frame.clone();

        let too_many = [Glyph::SOLID; STATIC_CAPACITY + 1];
        let tags = [ColorTag::Red; STATIC_CAPACITY + 1];
        assert!(frame
            .compose_into(&too_many, &tags, RenderMode::Static)
            .is_err());
        assert_eq!(frame, before);
    }

    #[test]
    fn test_color_count_mismatch() {
        let cells = [Glyph::SOLID; 3];
        let tags = [ColorTag::Red; 2];
        assert_eq!(
            Frame::compose(&cells, &tags, RenderMode::Static),
            Err(ComposeError::ColorCountMismatch {
                cells: 3,
                colors: 2
            })
        );
    }

    #[test]
    fn test_scroll_capacity_bound() {
        let cells = [Glyph::BLANK; SCROLL_CAPACITY + 1];
        let tags = [ColorTag::None; SCROLL_CAPACITY + 1];
        assert!(Frame::compose(&cells, &tags, RenderMode::Scroll).is_err());
        assert!(Frame::compose(
            &cells[..SCROLL_CAPACITY],
            &tags[..SCROLL_CAPACITY],
            RenderMode::Scroll
        )
        .is_ok());
    }

    #[test]
    fn test_blank_frame() {
        let frame = Frame::blank(STATIC_CAPACITY);
        assert_eq!(frame.cells(), 8);
        assert_eq!(frame.columns(), 64);
        assert!(frame.rows().iter().all(|r| r.iter().all(|&b| b == 0)));
        assert!(frame.colors().iter().all(|&c| c == ColorTag::None));
    }
}
