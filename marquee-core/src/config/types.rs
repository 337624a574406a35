//! Sign configuration types
//!
//! These types define the hardware-level configuration for the bus pins,
//! shift timing and the background display task.

use heapless::FnvIndexSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::task::ExecContext;

/// Number of GPIO pins on the RP2040
pub const GPIO_COUNT: u8 = 30;

/// Number of row address lines
pub const ADDRESS_LINES: usize = 4;

/// Total number of bus signal lines
pub const BUS_LINES: usize = ADDRESS_LINES + 6;

/// GPIO assignment for every bus line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinMap {
    /// Row address lines, least significant bit first
    pub address: [u8; ADDRESS_LINES],
    /// Shift clock
    pub clock: u8,
    /// Red data line
    pub red: u8,
    /// Green data line
    pub green: u8,
    /// Address latch enable
    pub latch_enable: u8,
    /// Row RAM write enable
    pub write_enable: u8,
    /// Row RAM bank select
    pub bank_select: u8,
}

impl PinMap {
    /// All assigned pins, address lines first
    pub fn all(&self) -> [u8; BUS_LINES] {
        [
            self.address[0],
            self.address[1],
            self.address[2],
            self.address[3],
            self.clock,
            self.red,
            self.green,
            self.latch_enable,
            self.write_enable,
            self.bank_select,
        ]
    }
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            address: [2, 3, 4, 5],
            clock: 6,
            red: 7,
            green: 8,
            latch_enable: 9,
            write_enable: 10,
            bank_select: 11,
        }
    }
}

/// Shift bus timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Data setup time before the clock rises (µs)
    pub setup_us: u32,
    /// Clock high hold time (µs)
    pub hold_us: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            setup_us: 1,
            hold_us: 1,
        }
    }
}

/// Background display task settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskConfig {
    /// Bounded wait for the bus lock (ms)
    pub lock_timeout_ms: u32,
    /// Sleep between script iterations (ms)
    pub idle_ms: u32,
    /// Execution context for the task
    pub context: ExecContext,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 1000,
            idle_ms: 100,
            context: ExecContext::Core1,
        }
    }
}

/// Scroll defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScrollConfig {
    /// Delay between scroll passes for foreground prints (ms)
    pub step_delay_ms: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self { step_delay_ms: 30 }
    }
}

/// Complete sign configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignConfig {
    pub pins: PinMap,
    pub timing: TimingConfig,
    pub task: TaskConfig,
    pub scroll: ScrollConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pin assigned to more than one line
    DuplicatePin(u8),
    /// Pin number out of range
    InvalidPin(u8),
    /// Zero lock timeout
    InvalidTiming,
}

impl SignConfig {
    /// Check the configuration for conflicts
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut allocated: FnvIndexSet<u8, 16> = FnvIndexSet::new();
        for pin in self.pins.all() {
            if pin >= GPIO_COUNT {
                return Err(ConfigError::InvalidPin(pin));
            }
            if allocated.contains(&pin) {
                return Err(ConfigError::DuplicatePin(pin));
            }
            allocated
                .insert(pin)
                .map_err(|_| ConfigError::InvalidPin(pin))?;
        }

        if self.task.lock_timeout_ms == 0 {
            return Err(ConfigError::InvalidTiming);
        }

        Ok(())
    }
}
