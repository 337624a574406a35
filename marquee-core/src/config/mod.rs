//! Configuration types
//!
//! Board wiring, bus timing and display task settings, plus a parser for
//! the small TOML subset the firmware embeds.

pub mod parse;
pub mod types;

pub use parse::{parse_config, parse_pin, ParseError};
pub use types::*;
