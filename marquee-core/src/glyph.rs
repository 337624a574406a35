//! Glyph cells and per-cell color tags
//!
//! A glyph is one half-width cell: 8 dots wide, 16 rows tall, stored as one
//! byte per row with the leftmost dot in the most significant bit.

use heapless::Vec;

use crate::frame::ComposeError;

/// Rows per glyph cell (and per panel)
pub const GLYPH_ROWS: usize = 16;

/// Dot columns per glyph cell
pub const CELL_WIDTH: usize = 8;

/// Monochrome bitmap for one half-width cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Glyph {
    rows: [u8; GLYPH_ROWS],
}

impl Glyph {
    /// All dots off
    pub const BLANK: Self = Self {
        rows: [0; GLYPH_ROWS],
    };

    /// All dots on
    pub const SOLID: Self = Self {
        rows: [0xFF; GLYPH_ROWS],
    };

    /// Create a glyph from its row bytes (row 0 at the top)
    pub const fn from_rows(rows: [u8; GLYPH_ROWS]) -> Self {
        Self { rows }
    }

    /// Byte for row `row` (0-15)
    pub fn row(&self, row: usize) -> u8 {
        self.rows[row]
    }

    /// All row bytes
    pub fn rows(&self) -> &[u8; GLYPH_ROWS] {
        &self.rows
    }

    /// Check if no dot is lit
    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|&b| b == 0)
    }
}

/// Logical color of one cell
///
/// The panel has a red and a green dot at every position; orange lights both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorTag {
    /// Dots stay dark even where the bitmap is set
    #[default]
    None,
    Red,
    Green,
    /// Red and green together
    Orange,
}

impl ColorTag {
    /// Whether the red line is driven for a lit dot of this color
    pub const fn red(self) -> bool {
        matches!(self, ColorTag::Red | ColorTag::Orange)
    }

    /// Whether the green line is driven for a lit dot of this color
    pub const fn green(self) -> bool {
        matches!(self, ColorTag::Green | ColorTag::Orange)
    }
}

/// Source of glyph bitmaps for text
///
/// Rasterization and code-page handling live behind this trait. A character
/// the source cannot map degrades to [`Glyph::BLANK`].
pub trait GlyphSource {
    /// Look up the half-width glyph for `ch`
    fn lookup(&self, ch: char) -> Option<Glyph>;

    /// Glyph for `ch`, blank when unmapped
    fn glyph(&self, ch: char) -> Glyph {
        self.lookup(ch).unwrap_or(Glyph::BLANK)
    }

    /// Rasterize `text` into `cells`, one cell per character
    ///
    /// `cells` is cleared first. Returns the number of cells consumed, or
    /// `TooManyCharacters` if the text needs more than `capacity` cells (or
    /// more than `cells` can hold). On error `cells` is left empty.
    fn rasterize<const N: usize>(
        &self,
        text: &str,
        capacity: usize,
        cells: &mut Vec<Glyph, N>,
    ) -> Result<usize, ComposeError> {
        cells.clear();
        let needed = text.chars().count();
        let limit = capacity.min(N);
        if needed > limit {
            return Err(ComposeError::TooManyCharacters {
                cells: needed,
                capacity: limit,
            });
        }
        for ch in text.chars() {
            // Cannot fail: length checked above
            let _ = cells.push(self.glyph(ch));
        }
        Ok(cells.len())
    }
}
