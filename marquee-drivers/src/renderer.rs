//! Double-banked panel renderer
//!
//! The panels hold two row RAM banks. One is scanned out to the dots while
//! the other is loaded; each pass flips the bank select line once, then
//! writes rows 0..15 in order. Updates never tear because the bank being
//! shown is never the one being written.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use marquee_core::frame::Frame;
use marquee_core::glyph::GLYPH_ROWS;

use crate::bus::{BusError, ShiftBus};

/// Row RAM bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bank {
    /// Bank select low
    #[default]
    A,
    /// Bank select high
    B,
}

impl Bank {
    /// The other bank
    pub const fn other(self) -> Self {
        match self {
            Bank::A => Bank::B,
            Bank::B => Bank::A,
        }
    }

    /// Level of the bank select line for this bank
    pub const fn is_high(self) -> bool {
        matches!(self, Bank::B)
    }
}

/// Full-panel renderer
pub struct Renderer<P, D> {
    bus: ShiftBus<P, D>,
    bank: Bank,
    passes: u32,
}

impl<P: OutputPin, D: DelayNs> Renderer<P, D> {
    /// Create a renderer; the bus starts on bank A
    pub fn new(bus: ShiftBus<P, D>) -> Self {
        Self {
            bus,
            bank: Bank::A,
            passes: 0,
        }
    }

    /// Render one full pass
    ///
    /// Flips the bank select exactly once, then commits rows 0..15.
    pub fn render_frame(&mut self, frame: &Frame) -> Result<(), BusError> {
        self.bank = self.bank.other();
        self.bus.select_bank(self.bank.is_high())?;
        self.bus.begin_pass();
        for row in 0..GLYPH_ROWS {
            self.bus.commit_row(row as u8, frame.row(row), frame.colors())?;
        }
        self.passes = self.passes.wrapping_add(1);
        Ok(())
    }

    /// Bank selected by the most recent pass
    pub fn bank(&self) -> Bank {
        self.bank
    }

    /// Number of passes rendered
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Get the underlying bus
    pub fn bus(&self) -> &ShiftBus<P, D> {
        &self.bus
    }

    /// Get the underlying bus mutably
    pub fn bus_mut(&mut self) -> &mut ShiftBus<P, D> {
        &mut self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{clock_pulses, latched_rows, mock_bus, writes_to, Line};
    use marquee_core::frame::RenderMode;
    use marquee_core::glyph::{ColorTag, Glyph};

    fn two_cell_frame() -> Frame {
        Frame::compose(
            &[Glyph::SOLID, Glyph::BLANK],
            &[ColorTag::Red, ColorTag::Green],
            RenderMode::Static,
        )
        .unwrap()
    }

    #[test]
    fn test_bank_toggles_once_per_pass() {
        let (bus, log) = mock_bus();
        let mut renderer = Renderer::new(bus);
        let frame = two_cell_frame();

        assert_eq!(renderer.bank(), Bank::A);
        renderer.render_frame(&frame).unwrap();
        assert_eq!(renderer.bank(), Bank::B);
        assert_eq!(writes_to(&log, Line::BankSelect), vec![true]);

        renderer.render_frame(&frame).unwrap();
        assert_eq!(renderer.bank(), Bank::A);
        assert_eq!(writes_to(&log, Line::BankSelect), vec![true, false]);
        assert_eq!(renderer.passes(), 2);
    }

    #[test]
    fn test_pass_commits_rows_in_order() {
        let (bus, log) = mock_bus();
        let mut renderer = Renderer::new(bus);
        renderer.render_frame(&two_cell_frame()).unwrap();

        let expected: Vec<u8> = (0..16).collect();
        assert_eq!(latched_rows(&log), expected);
        assert_eq!(clock_pulses(&log), 16 * 16);
    }

    #[test]
    fn test_bank_flips_before_first_row() {
        let (bus, log) = mock_bus();
        let mut renderer = Renderer::new(bus);
        renderer.render_frame(&two_cell_frame()).unwrap();

        let events = log.borrow();
        let bank = events
            .iter()
            .position(|e| *e == crate::mock::BusEvent::Drive(Line::BankSelect, true))
            .unwrap();
        let first_clock = events
            .iter()
            .position(|e| *e == crate::mock::BusEvent::Drive(Line::Clock, true))
            .unwrap();
        assert!(bank < first_clock);
    }

    #[test]
    fn test_empty_frame_still_latches_every_row() {
        let (bus, log) = mock_bus();
        let mut renderer = Renderer::new(bus);
        renderer.render_frame(&Frame::new()).unwrap();

        assert_eq!(clock_pulses(&log), 0);
        assert_eq!(latched_rows(&log).len(), 16);
    }
}
