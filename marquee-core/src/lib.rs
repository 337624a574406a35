//! Board-agnostic core logic for the dot-matrix sign firmware
//!
//! This crate contains all display logic that does not depend on
//! specific hardware implementations:
//!
//! - Glyph cells, color tags and the glyph source seam
//! - Frame composition (row buffers + per-column colors)
//! - Scroll engine (one-column marquee shift)
//! - Display script and playback cursor
//! - Display task lifecycle registry
//! - Configuration types and the config file parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod font;
pub mod frame;
pub mod glyph;
pub mod scroll;
pub mod script;
pub mod task;
