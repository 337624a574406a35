//! Marquee scroll engine
//!
//! Moves a composed frame one dot column to the left. Content leaves the
//! left edge and is never reintroduced; the right edge fills with dark,
//! uncolored columns.

use crate::frame::Frame;
use crate::glyph::{ColorTag, CELL_WIDTH};

/// Extra passes after the last column has entered, so the trailing columns
/// clear past the visible edge
pub const TRAILING_PASSES: usize = 2;

/// Number of render passes needed to scroll a frame of `cells` cells
pub const fn scroll_pass_count(cells: usize) -> usize {
    cells * CELL_WIDTH + TRAILING_PASSES
}

/// Shift one row left by one bit, carrying across byte boundaries
///
/// The last byte is filled with a zero bit.
pub fn shift_row_left(row: &mut [u8]) {
    let len = row.len();
    if len == 0 {
        return;
    }
    for i in 0..len - 1 {
        row[i] = (row[i] << 1) | ((row[i + 1] & 0x80) >> 7);
    }
    row[len - 1] <<= 1;
}

/// Shift the column colors left by one entry, appending a neutral entry
pub fn shift_colors_left(colors: &mut [ColorTag]) {
    if colors.is_empty() {
        return;
    }
    colors.copy_within(1.., 0);
    if let Some(last) = colors.last_mut() {
        *last = ColorTag::None;
    }
}

/// Advance a frame by one dot column
///
/// Bits and colors move 1:1, so color stays attached to the column it
/// was composed for.
pub fn shift_left_one_column(frame: &mut Frame) {
    let (rows, colors) = frame.parts_mut();
    for row in rows.iter_mut() {
        shift_row_left(row);
    }
    shift_colors_left(colors);
}
