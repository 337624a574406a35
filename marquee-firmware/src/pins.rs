//! Pin allocation by number
//!
//! Bus pins come from `sign.toml`, so they are taken out of a bank of
//! type-erased GPIOs at runtime instead of being named in code.

use embassy_rp::gpio::{AnyPin, Level, Output};
use embassy_rp::peripherals::CORE1;
use embassy_rp::{Peri, Peripherals};

use marquee_core::config::{PinMap, GPIO_COUNT};
use marquee_drivers::BusPins;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin already taken
    AlreadyTaken(u8),
}

/// All GPIO pins, taken by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT as usize],
}

impl PinBank {
    /// Move every GPIO out of the peripherals
    ///
    /// The second core is handed back since the bank consumes the rest.
    pub fn new(p: Peripherals) -> (Self, Peri<'static, CORE1>) {
        let bank = Self {
            pins: [
                Some(p.PIN_0.into()),
                Some(p.PIN_1.into()),
                Some(p.PIN_2.into()),
                Some(p.PIN_3.into()),
                Some(p.PIN_4.into()),
                Some(p.PIN_5.into()),
                Some(p.PIN_6.into()),
                Some(p.PIN_7.into()),
                Some(p.PIN_8.into()),
                Some(p.PIN_9.into()),
                Some(p.PIN_10.into()),
                Some(p.PIN_11.into()),
                Some(p.PIN_12.into()),
                Some(p.PIN_13.into()),
                Some(p.PIN_14.into()),
                Some(p.PIN_15.into()),
                Some(p.PIN_16.into()),
                Some(p.PIN_17.into()),
                Some(p.PIN_18.into()),
                Some(p.PIN_19.into()),
                Some(p.PIN_20.into()),
                Some(p.PIN_21.into()),
                Some(p.PIN_22.into()),
                Some(p.PIN_23.into()),
                Some(p.PIN_24.into()),
                Some(p.PIN_25.into()),
                Some(p.PIN_26.into()),
                Some(p.PIN_27.into()),
                Some(p.PIN_28.into()),
                Some(p.PIN_29.into()),
            ],
        };
        (bank, p.CORE1)
    }

    /// Take a pin by number
    pub fn take(&mut self, pin: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        self.pins
            .get_mut(pin as usize)
            .ok_or(PinError::InvalidPin(pin))?
            .take()
            .ok_or(PinError::AlreadyTaken(pin))
    }

    /// Take a pin as a push-pull output, driven low
    pub fn output(&mut self, pin: u8) -> Result<Output<'static>, PinError> {
        Ok(Output::new(self.take(pin)?, Level::Low))
    }

    /// Take every bus line named in the pin map
    pub fn bus_pins(&mut self, map: &PinMap) -> Result<BusPins<Output<'static>>, PinError> {
        Ok(BusPins {
            address: [
                self.output(map.address[0])?,
                self.output(map.address[1])?,
                self.output(map.address[2])?,
                self.output(map.address[3])?,
            ],
            clock: self.output(map.clock)?,
            red: self.output(map.red)?,
            green: self.output(map.green)?,
            latch_enable: self.output(map.latch_enable)?,
            write_enable: self.output(map.write_enable)?,
            bank_select: self.output(map.bank_select)?,
        })
    }
}
