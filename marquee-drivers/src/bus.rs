//! Bit-banged shift bus
//!
//! The panels load one row at a time. Dots are shifted in serially on a
//! red and a green data line, then the row address is presented and a
//! latch strobe writes the shifted pattern into that row of the row RAM
//! bank not currently being scanned out.
//!
//! # Row protocol
//!
//! For every byte of the row, left to right, and every bit from 7 down to 0:
//!
//! 1. Clock, red and green go low
//! 2. If the bit is set: red goes high for red/orange columns, green goes
//!    high for green/orange columns
//! 3. Setup delay, clock high, hold delay
//!
//! Then the four address lines are driven to the row index and the latch
//! strobe runs: ALE high, WE high, WE low, ALE low.
//!
//! The bit and byte order is a fixed hardware contract. A row is latched
//! only after all of its bits have been shifted; all argument checks run
//! before the first edge.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use marquee_core::config::{TimingConfig, ADDRESS_LINES};
use marquee_core::glyph::{ColorTag, CELL_WIDTH, GLYPH_ROWS};

/// Errors that can occur while driving the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Row index outside 0-15
    RowOutOfRange(u8),
    /// Rows must be committed 0..15 in order within a pass
    RowOutOfOrder { expected: u8, got: u8 },
    /// Color entries must be exactly 8 per row byte
    ColorLengthMismatch { bytes: usize, colors: usize },
    /// A GPIO write failed
    Pin,
}

/// The bus signal lines
pub struct BusPins<P> {
    /// Row address, least significant bit first
    pub address: [P; ADDRESS_LINES],
    pub clock: P,
    pub red: P,
    pub green: P,
    pub latch_enable: P,
    pub write_enable: P,
    pub bank_select: P,
}

/// Shift bus driver
///
/// Generic over the output pin type and a precise delay. On hosts without
/// sub-millisecond timing the delay will not meet the panel's setup/hold
/// requirements; run on the target or against a timing-accurate model.
pub struct ShiftBus<P, D> {
    pins: BusPins<P>,
    delay: D,
    timing: TimingConfig,
    /// Next row expected in the current pass
    next_row: u8,
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), BusError> {
    pin.set_state(PinState::from(high)).map_err(|_| BusError::Pin)
}

impl<P: OutputPin, D: DelayNs> ShiftBus<P, D> {
    /// Create the driver and park every line low
    pub fn new(pins: BusPins<P>, delay: D, timing: TimingConfig) -> Result<Self, BusError> {
        let mut bus = Self {
            pins,
            delay,
            timing,
            next_row: 0,
        };
        bus.idle()?;
        Ok(bus)
    }

    /// Drive every line low
    fn idle(&mut self) -> Result<(), BusError> {
        for pin in self.pins.address.iter_mut() {
            drive(pin, false)?;
        }
        drive(&mut self.pins.clock, false)?;
        drive(&mut self.pins.red, false)?;
        drive(&mut self.pins.green, false)?;
        drive(&mut self.pins.write_enable, false)?;
        drive(&mut self.pins.latch_enable, false)?;
        drive(&mut self.pins.bank_select, false)
    }

    /// Start a new pass; the next commit must be row 0
    pub fn begin_pass(&mut self) {
        self.next_row = 0;
    }

    /// Drive the bank select line
    pub fn select_bank(&mut self, high: bool) -> Result<(), BusError> {
        drive(&mut self.pins.bank_select, high)
    }

    /// Shift one row and latch it into row `row`
    ///
    /// `colors` carries one entry per dot column, so its length must be
    /// `bytes.len() * 8`.
    pub fn commit_row(
        &mut self,
        row: u8,
        bytes: &[u8],
        colors: &[ColorTag],
    ) -> Result<(), BusError> {
        if row as usize >= GLYPH_ROWS {
            return Err(BusError::RowOutOfRange(row));
        }
        if row != self.next_row {
            return Err(BusError::RowOutOfOrder {
                expected: self.next_row,
                got: row,
            });
        }
        if colors.len() != bytes.len() * CELL_WIDTH {
            return Err(BusError::ColorLengthMismatch {
                bytes: bytes.len(),
                colors: colors.len(),
            });
        }

        for (i, &byte) in bytes.iter().enumerate() {
            for bit in (0..8u8).rev() {
                let color = colors[i * CELL_WIDTH + (7 - bit) as usize];
                let lit = (byte >> bit) & 1 != 0;
                self.clock_dot(lit && color.red(), lit && color.green())?;
            }
        }

        self.set_address(row)?;
        self.latch()?;
        self.next_row = row + 1;
        Ok(())
    }

    /// Present one dot and clock it in
    fn clock_dot(&mut self, red: bool, green: bool) -> Result<(), BusError> {
        drive(&mut self.pins.red, false)?;
        drive(&mut self.pins.green, false)?;
        drive(&mut self.pins.clock, false)?;
        if red {
            drive(&mut self.pins.red, true)?;
        }
        if green {
            drive(&mut self.pins.green, true)?;
        }
        self.delay.delay_us(self.timing.setup_us);
        drive(&mut self.pins.clock, true)?;
        self.delay.delay_us(self.timing.hold_us);
        Ok(())
    }

    fn set_address(&mut self, row: u8) -> Result<(), BusError> {
        for (bit, pin) in self.pins.address.iter_mut().enumerate() {
            drive(pin, (row >> bit) & 1 != 0)?;
        }
        Ok(())
    }

    /// Write the shifted pattern into the addressed row
    fn latch(&mut self) -> Result<(), BusError> {
        drive(&mut self.pins.latch_enable, true)?;
        drive(&mut self.pins.write_enable, true)?;
        drive(&mut self.pins.write_enable, false)?;
        drive(&mut self.pins.latch_enable, false)
    }

    /// Block for `ms` milliseconds using the bus delay
    pub fn pause_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Get the timing configuration
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Release the pins and delay
    pub fn release(self) -> (BusPins<P>, D) {
        (self.pins, self.delay)
    }
}
