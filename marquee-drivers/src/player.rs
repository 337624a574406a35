//! Stepwise script playback
//!
//! The background task calls [`ScriptPlayer::advance`] once per quantum:
//! one static print, one clear, one pause, or a single scroll pass. Between
//! quanta the caller may release the bus and park. The player keeps its
//! own position and any scroll in progress, so a foreground print in
//! between does not disturb playback.
//!
//! [`ScriptPlayer::quantum`] wraps one advance in the task's scheduling
//! decision: park if suspended, retry if the bus lock timed out, otherwise
//! play.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;

use marquee_core::frame::{ComposeError, SCROLL_CAPACITY};
use marquee_core::glyph::{ColorTag, GlyphSource};
use marquee_core::script::{ColorSpec, Script, ScriptPosition, ScriptStep};
use marquee_core::task::TaskRegistry;

use crate::sign::{ScrollSession, Sign, SignError};

/// What the caller should do after a quantum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// Wait, then advance again
    Continue { wait_ms: u32 },
    /// The last step finished and playback wrapped to the start
    EndOfScript { wait_ms: u32 },
}

impl Tick {
    /// Time to wait before the next quantum
    pub fn wait_ms(&self) -> u32 {
        match *self {
            Tick::Continue { wait_ms } | Tick::EndOfScript { wait_ms } => wait_ms,
        }
    }
}

/// Outcome of one scheduling quantum of the display task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Quantum {
    /// A suspend is outstanding; release the bus and park
    Parked,
    /// The bus lock was not acquired in time; try again
    LockTimedOut,
    /// One quantum was played
    Played(Tick),
    /// The current step failed and was skipped
    Failed(SignError),
}

/// Plays a script one quantum at a time
pub struct ScriptPlayer {
    script: Script,
    position: ScriptPosition,
    session: Option<ScrollSession>,
    colors: Vec<ColorTag, SCROLL_CAPACITY>,
}

impl ScriptPlayer {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            position: ScriptPosition::start(),
            session: None,
            colors: Vec::new(),
        }
    }

    /// Current playback position
    pub fn position(&self) -> ScriptPosition {
        self.position
    }

    /// Check if a scroll is part way through
    pub fn in_scroll(&self) -> bool {
        self.session.is_some()
    }

    /// Go back to the first step, dropping any scroll in progress
    pub fn restart(&mut self) {
        self.position = ScriptPosition::start();
        self.session = None;
    }

    /// Run one quantum of the current step
    ///
    /// A step that fails is skipped so a bad entry cannot stall playback;
    /// the error is still returned for logging.
    pub fn advance<G, P, D>(&mut self, sign: &mut Sign<G, P, D>) -> Result<Tick, SignError>
    where
        G: GlyphSource,
        P: OutputPin,
        D: DelayNs,
    {
        let Some(&step) = self.script.step(self.position.step) else {
            return Ok(Tick::EndOfScript { wait_ms: 0 });
        };

        match step {
            ScriptStep::Static {
                text,
                colors,
                hold_ms,
            } => {
                if let Err(e) = self.resolve(text, colors) {
                    return Err(self.skip_step(e.into()));
                }
                match sign.print_static(text, &self.colors) {
                    Ok(()) => Ok(self.finish_step(hold_ms)),
                    Err(e) => Err(self.skip_step(e)),
                }
            }
            ScriptStep::Scroll {
                text,
                colors,
                step_delay_ms,
            } => self.scroll_pass(sign, text, colors, step_delay_ms),
            ScriptStep::Clear { hold_ms } => match sign.clear() {
                Ok(()) => Ok(self.finish_step(hold_ms)),
                Err(e) => Err(self.skip_step(e)),
            },
            ScriptStep::Pause { ms } => Ok(self.finish_step(ms)),
        }
    }

    /// Run one quantum of the display task
    ///
    /// `sign` is `None` when the bus lock timed out. The registry is checked
    /// again under the lock, since a suspend may arrive while the task waits
    /// for it. Parking and lock timeouts leave the position untouched.
    pub fn quantum<G, P, D>(
        &mut self,
        registry: &TaskRegistry,
        sign: Option<&mut Sign<G, P, D>>,
    ) -> Quantum
    where
        G: GlyphSource,
        P: OutputPin,
        D: DelayNs,
    {
        if registry.should_park() {
            return Quantum::Parked;
        }
        let Some(sign) = sign else {
            return Quantum::LockTimedOut;
        };
        match self.advance(sign) {
            Ok(tick) => Quantum::Played(tick),
            Err(e) => Quantum::Failed(e),
        }
    }

    fn scroll_pass<G, P, D>(
        &mut self,
        sign: &mut Sign<G, P, D>,
        text: &str,
        colors: ColorSpec,
        step_delay_ms: u32,
    ) -> Result<Tick, SignError>
    where
        G: GlyphSource,
        P: OutputPin,
        D: DelayNs,
    {
        let mut session = match self.session.take() {
            Some(session) => session,
            None => {
                if let Err(e) = self.resolve(text, colors) {
                    return Err(self.skip_step(e.into()));
                }
                match sign.begin_scroll(text, &self.colors) {
                    Ok(session) => session,
                    Err(e) => return Err(self.skip_step(e)),
                }
            }
        };

        let finished = match sign.render_scroll_pass(&mut session) {
            Ok(finished) => finished,
            Err(e) => return Err(self.skip_step(e)),
        };
        self.position.next_pass();

        if finished {
            Ok(self.finish_step(step_delay_ms))
        } else {
            self.session = Some(session);
            Ok(Tick::Continue {
                wait_ms: step_delay_ms,
            })
        }
    }

    fn resolve(&mut self, text: &str, colors: ColorSpec) -> Result<(), ComposeError> {
        colors.resolve(text.chars().count(), &mut self.colors)
    }

    fn finish_step(&mut self, wait_ms: u32) -> Tick {
        self.session = None;
        if self.position.next_step(self.script.len()) {
            Tick::EndOfScript { wait_ms }
        } else {
            Tick::Continue { wait_ms }
        }
    }

    fn skip_step(&mut self, err: SignError) -> SignError {
        self.finish_step(0);
        err
    }
}
