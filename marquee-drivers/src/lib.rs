//! Hardware driver implementations
//!
//! This crate drives the sign through `embedded-hal` pins and delays:
//!
//! - Shift bus (bit-banged row loading, address and latch strobes)
//! - Renderer (double-banked full-panel passes)
//! - Sign facade (static and scrolling prints from text)
//! - Script player (stepwise playback for the background task)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bus;
pub mod player;
pub mod renderer;
pub mod sign;

#[cfg(test)]
pub(crate) mod mock;

pub use bus::{BusError, BusPins, ShiftBus};
pub use player::{Quantum, ScriptPlayer, Tick};
pub use renderer::{Bank, Renderer};
pub use sign::{ScrollSession, Sign, SignError};
