//! Recording pins and delay for driver tests

use core::cell::RefCell;
use core::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use marquee_core::config::TimingConfig;

use crate::bus::{BusPins, ShiftBus};

/// Bus line a pin is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Address(u8),
    Clock,
    Red,
    Green,
    LatchEnable,
    WriteEnable,
    BankSelect,
}

/// Something that happened on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    Drive(Line, bool),
    DelayNs(u32),
}

pub type BusLog = Rc<RefCell<Vec<BusEvent>>>;

/// Output pin that records every write
pub struct MockPin {
    line: Line,
    log: BusLog,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(BusEvent::Drive(self.line, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(BusEvent::Drive(self.line, true));
        Ok(())
    }
}

/// Delay that records requested durations instead of waiting
pub struct MockDelay {
    log: BusLog,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(BusEvent::DelayNs(ns));
    }
}

/// Shift bus on mock pins, plus the shared log
pub fn mock_bus() -> (ShiftBus<MockPin, MockDelay>, BusLog) {
    let log: BusLog = Rc::new(RefCell::new(Vec::new()));
    let pin = |line| MockPin {
        line,
        log: log.clone(),
    };
    let pins = BusPins {
        address: [
            pin(Line::Address(0)),
            pin(Line::Address(1)),
            pin(Line::Address(2)),
            pin(Line::Address(3)),
        ],
        clock: pin(Line::Clock),
        red: pin(Line::Red),
        green: pin(Line::Green),
        latch_enable: pin(Line::LatchEnable),
        write_enable: pin(Line::WriteEnable),
        bank_select: pin(Line::BankSelect),
    };
    let delay = MockDelay { log: log.clone() };
    let bus = ShiftBus::new(pins, delay, TimingConfig::default()).unwrap();
    log.borrow_mut().clear();
    (bus, log)
}

/// Number of rising clock edges in the log
pub fn clock_pulses(log: &BusLog) -> usize {
    log.borrow()
        .iter()
        .filter(|e| **e == BusEvent::Drive(Line::Clock, true))
        .count()
}

/// Writes to one line, in order
pub fn writes_to(log: &BusLog, line: Line) -> Vec<bool> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            BusEvent::Drive(l, v) if *l == line => Some(*v),
            _ => None,
        })
        .collect()
}

/// Dots latched with each rising clock edge, as (red, green)
pub fn shifted_dots(log: &BusLog) -> Vec<(bool, bool)> {
    let mut red = false;
    let mut green = false;
    let mut dots = Vec::new();
    for event in log.borrow().iter() {
        match event {
            BusEvent::Drive(Line::Red, v) => red = *v,
            BusEvent::Drive(Line::Green, v) => green = *v,
            BusEvent::Drive(Line::Clock, true) => dots.push((red, green)),
            _ => {}
        }
    }
    dots
}

/// Row addresses present on the address lines at each write-enable pulse
pub fn latched_rows(log: &BusLog) -> Vec<u8> {
    let mut address = [false; 4];
    let mut rows = Vec::new();
    for event in log.borrow().iter() {
        match event {
            BusEvent::Drive(Line::Address(bit), v) => address[*bit as usize] = *v,
            BusEvent::Drive(Line::WriteEnable, true) => {
                let row = address
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (bit, &set)| acc | ((set as u8) << bit));
                rows.push(row);
            }
            _ => {}
        }
    }
    rows
}
