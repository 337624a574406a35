//! Built-in 5x7 glyph source
//!
//! Small fallback font for status text: digits, A-Z (lowercase folds to
//! uppercase), space and a handful of punctuation. Each 5x7 glyph is
//! doubled vertically and centered in the 8x16 cell.

use crate::glyph::{Glyph, GlyphSource, GLYPH_ROWS};

/// Column-major 5x7 bitmaps, bit 0 = top dot
const FONT_5X7: &[(char, [u8; 5])] = &[
    (' ', [0x00, 0x00, 0x00, 0x00, 0x00]),
    ('!', [0x00, 0x00, 0x5F, 0x00, 0x00]),
    ('%', [0x23, 0x13, 0x08, 0x64, 0x62]),
    ('-', [0x08, 0x08, 0x08, 0x08, 0x08]),
    ('.', [0x00, 0x60, 0x60, 0x00, 0x00]),
    (':', [0x00, 0x36, 0x36, 0x00, 0x00]),
    ('0', [0x3E, 0x51, 0x49, 0x45, 0x3E]),
    ('1', [0x00, 0x42, 0x7F, 0x40, 0x00]),
    ('2', [0x42, 0x61, 0x51, 0x49, 0x46]),
    ('3', [0x21, 0x41, 0x45, 0x4B, 0x31]),
    ('4', [0x18, 0x14, 0x12, 0x7F, 0x10]),
    ('5', [0x27, 0x45, 0x45, 0x45, 0x39]),
    ('6', [0x3C, 0x4A, 0x49, 0x49, 0x30]),
    ('7', [0x01, 0x71, 0x09, 0x05, 0x03]),
    ('8', [0x36, 0x49, 0x49, 0x49, 0x36]),
    ('9', [0x06, 0x49, 0x49, 0x29, 0x1E]),
    ('A', [0x7E, 0x11, 0x11, 0x11, 0x7E]),
    ('B', [0x7F, 0x49, 0x49, 0x49, 0x36]),
    ('C', [0x3E, 0x41, 0x41, 0x41, 0x22]),
    ('D', [0x7F, 0x41, 0x41, 0x22, 0x1C]),
    ('E', [0x7F, 0x49, 0x49, 0x49, 0x41]),
    ('F', [0x7F, 0x09, 0x09, 0x09, 0x01]),
    ('G', [0x3E, 0x41, 0x49, 0x49, 0x7A]),
    ('H', [0x7F, 0x08, 0x08, 0x08, 0x7F]),
    ('I', [0x00, 0x41, 0x7F, 0x41, 0x00]),
    ('J', [0x20, 0x40, 0x41, 0x3F, 0x01]),
    ('K', [0x7F, 0x08, 0x14, 0x22, 0x41]),
    ('L', [0x7F, 0x40, 0x40, 0x40, 0x40]),
    ('M', [0x7F, 0x02, 0x0C, 0x02, 0x7F]),
    ('N', [0x7F, 0x04, 0x08, 0x10, 0x7F]),
    ('O', [0x3E, 0x41, 0x41, 0x41, 0x3E]),
    ('P', [0x7F, 0x09, 0x09, 0x09, 0x06]),
    ('Q', [0x3E, 0x41, 0x51, 0x21, 0x5E]),
    ('R', [0x7F, 0x09, 0x19, 0x29, 0x46]),
    ('S', [0x46, 0x49, 0x49, 0x49, 0x31]),
    ('T', [0x01, 0x01, 0x7F, 0x01, 0x01]),
    ('U', [0x3F, 0x40, 0x40, 0x40, 0x3F]),
    ('V', [0x1F, 0x20, 0x40, 0x20, 0x1F]),
    ('W', [0x3F, 0x40, 0x38, 0x40, 0x3F]),
    ('X', [0x63, 0x14, 0x08, 0x14, 0x63]),
    ('Y', [0x07, 0x08, 0x70, 0x08, 0x07]),
    ('Z', [0x61, 0x51, 0x49, 0x45, 0x43]),
];

/// First cell row used by the scaled glyph
const TOP_MARGIN: usize = 1;

/// Leftmost bit used by the scaled glyph (one dot of left margin)
const LEFT_BIT: u8 = 6;

/// Built-in 5x7 font scaled to the 8x16 cell
#[derive(Debug, Clone, Copy, Default)]
pub struct Font5x7;

impl Font5x7 {
    /// Create the font
    pub const fn new() -> Self {
        Self
    }

    /// Expand 5 column bytes into a 16-row cell
    fn scale(columns: &[u8; 5]) -> Glyph {
        let mut rows = [0u8; GLYPH_ROWS];
        for src_row in 0..7 {
            let mut byte = 0u8;
            for (c, col) in columns.iter().enumerate() {
                if (col >> src_row) & 1 != 0 {
                    byte |= 1 << (LEFT_BIT - c as u8);
                }
            }
            let r = TOP_MARGIN + src_row * 2;
            rows[r] = byte;
            rows[r + 1] = byte;
        }
        Glyph::from_rows(rows)
    }
}

impl GlyphSource for Font5x7 {
    fn lookup(&self, ch: char) -> Option<Glyph> {
        let ch = ch.to_ascii_uppercase();
        FONT_5X7
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, columns)| Self::scale(columns))
    }
}
