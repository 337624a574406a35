//! Display script
//!
//! The background display task plays a fixed sequence of static and
//! scrolling prints. A script is a static slice of steps; playback progress
//! is a [`ScriptPosition`] that only the player advances, so parking the
//! task never loses its place.

use heapless::Vec;

use crate::frame::ComposeError;
use crate::glyph::ColorTag;

/// Color assignment for a step's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorSpec {
    /// Every cell the same color
    Uniform(ColorTag),
    /// One tag per cell, must match the text length
    PerCell(&'static [ColorTag]),
}

impl ColorSpec {
    /// Expand into one tag per cell
    ///
    /// A `PerCell` spec must carry exactly one tag per cell, and the result
    /// must fit in `out`. On error `out` is left empty.
    pub fn resolve<const N: usize>(
        &self,
        cells: usize,
        out: &mut Vec<ColorTag, N>,
    ) -> Result<(), ComposeError> {
        out.clear();
        let colors = match *self {
            ColorSpec::Uniform(_) => cells,
            ColorSpec::PerCell(tags) => tags.len(),
        };
        if colors != cells {
            return Err(ComposeError::ColorCountMismatch { cells, colors });
        }
        if cells > N {
            return Err(ComposeError::TooManyCharacters { cells, capacity: N });
        }

        match *self {
            ColorSpec::Uniform(tag) => {
                for _ in 0..cells {
                    // Cannot fail: cells <= N
                    let _ = out.push(tag);
                }
            }
            ColorSpec::PerCell(tags) => {
                // Cannot fail: tags.len() == cells <= N
                let _ = out.extend_from_slice(tags);
            }
        }
        Ok(())
    }
}

/// One step of a display script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScriptStep {
    /// Print text in place, then hold it
    Static {
        text: &'static str,
        colors: ColorSpec,
        hold_ms: u32,
    },
    /// Scroll text across the panels
    Scroll {
        text: &'static str,
        colors: ColorSpec,
        step_delay_ms: u32,
    },
    /// Blank the panels, then hold
    Clear { hold_ms: u32 },
    /// Wait without touching the display
    Pause { ms: u32 },
}

/// An ordered, repeating sequence of steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Script {
    steps: &'static [ScriptStep],
}

impl Script {
    /// Create a script from its steps
    pub const fn new(steps: &'static [ScriptStep]) -> Self {
        Self { steps }
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the script has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`
    pub fn step(&self, index: usize) -> Option<&ScriptStep> {
        self.steps.get(index)
    }
}

/// Where playback is within a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScriptPosition {
    /// Index of the current step
    pub step: usize,
    /// Render passes already done within the current step
    pub pass: usize,
}

impl ScriptPosition {
    /// Start of the script
    pub const fn start() -> Self {
        Self { step: 0, pass: 0 }
    }

    /// Move to the next step, wrapping at `len`
    ///
    /// Returns true if the script wrapped back to its first step.
    pub fn next_step(&mut self, len: usize) -> bool {
        self.pass = 0;
        self.step += 1;
        if self.step >= len {
            self.step = 0;
            true
        } else {
            false
        }
    }

    /// Record one more render pass within the current step
    pub fn next_pass(&mut self) {
        self.pass += 1;
    }

    /// Check if this is the very start of the script
    pub fn at_start(&self) -> bool {
        *self == Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static STEPS: [ScriptStep; 3] = [
        ScriptStep::Static {
            text: "HI",
            colors: ColorSpec::Uniform(ColorTag::Green),
            hold_ms: 500,
        },
        ScriptStep::Scroll {
            text: "HELLO",
            colors: ColorSpec::Uniform(ColorTag::Red),
            step_delay_ms: 30,
        },
        ScriptStep::Pause { ms: 100 },
    ];

    #[test]
    fn test_script_access() {
        let script = Script::new(&STEPS);
        assert_eq!(script.len(), 3);
        assert!(!script.is_empty());
        assert!(matches!(script.step(2), Some(ScriptStep::Pause { ms: 100 })));
        assert!(script.step(3).is_none());
    }

    #[test]
    fn test_position_wraps() {
        let mut pos = ScriptPosition::start();
        assert!(pos.at_start());

        pos.next_pass();
        pos.next_pass();
        assert_eq!(pos.pass, 2);

        assert!(!pos.next_step(3));
        assert_eq!(pos, ScriptPosition { step: 1, pass: 0 });
        assert!(!pos.next_step(3));
        assert!(pos.next_step(3));
        assert!(pos.at_start());
    }

    #[test]
    fn test_uniform_colors() {
        let mut out: Vec<ColorTag, 8> = Vec::new();
        ColorSpec::Uniform(ColorTag::Orange)
            .resolve(3, &mut out)
            .unwrap();
        assert_eq!(out.as_slice(), &[ColorTag::Orange; 3]);

        assert_eq!(
            ColorSpec::Uniform(ColorTag::Orange).resolve(9, &mut out),
            Err(ComposeError::TooManyCharacters {
                cells: 9,
                capacity: 8
            })
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_per_cell_colors() {
        static TAGS: [ColorTag; 2] = [ColorTag::Red, ColorTag::Green];
        let mut out: Vec<ColorTag, 8> = Vec::new();
        ColorSpec::PerCell(&TAGS).resolve(2, &mut out).unwrap();
        assert_eq!(out.as_slice(), &TAGS);

        assert_eq!(
            ColorSpec::PerCell(&TAGS).resolve(5, &mut out),
            Err(ComposeError::ColorCountMismatch {
                cells: 5,
                colors: 2
            })
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_per_cell_overflow_is_not_truncated() {
        static TAGS: [ColorTag; 5] = [ColorTag::Red; 5];
        let mut out: Vec<ColorTag, 3> = Vec::new();

        assert_eq!(
            ColorSpec::PerCell(&TAGS).resolve(3, &mut out),
            Err(ComposeError::ColorCountMismatch {
                cells: 3,
                colors: 5
            })
        );
        assert!(out.is_empty());
    }
}
