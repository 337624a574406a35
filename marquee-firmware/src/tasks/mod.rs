//! Embassy async tasks
//!
//! Each task runs independently and shares the sign through the display
//! context.

pub mod display;
pub mod status;

pub use display::display_task;
pub use status::status_task;
