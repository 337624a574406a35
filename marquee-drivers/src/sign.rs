//! Sign facade
//!
//! Turns text and per-character colors into rendered passes. A static
//! print is one pass; a scroll of an N-cell frame is `N * 8 + 2` passes
//! with a one-column shift between each pair.
//!
//! Scrolls can be driven one pass at a time through a [`ScrollSession`],
//! which lets async callers await between passes and release the bus.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;

use marquee_core::frame::{ComposeError, Frame, RenderMode, SCROLL_CAPACITY, STATIC_CAPACITY};
use marquee_core::glyph::{ColorTag, Glyph, GlyphSource};
use marquee_core::scroll::{scroll_pass_count, shift_left_one_column};

use crate::bus::BusError;
use crate::renderer::Renderer;

/// Errors from a print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignError {
    /// Text or colors rejected; nothing was rendered
    Compose(ComposeError),
    /// Bus failure during a pass
    Bus(BusError),
}

impl From<ComposeError> for SignError {
    fn from(e: ComposeError) -> Self {
        SignError::Compose(e)
    }
}

impl From<BusError> for SignError {
    fn from(e: BusError) -> Self {
        SignError::Bus(e)
    }
}

/// A scroll in progress
#[derive(Debug, Clone)]
pub struct ScrollSession {
    frame: Frame,
    pass: usize,
    total: usize,
}

impl ScrollSession {
    fn new(frame: Frame) -> Self {
        let total = scroll_pass_count(frame.cells());
        Self {
            frame,
            pass: 0,
            total,
        }
    }

    /// Check if every pass has been rendered
    pub fn is_finished(&self) -> bool {
        self.pass >= self.total
    }

    /// Passes rendered so far
    pub fn passes_done(&self) -> usize {
        self.pass
    }

    /// Passes the whole scroll takes
    pub fn total_passes(&self) -> usize {
        self.total
    }

    /// Frame as it will be shown by the next pass
    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

#[cfg(feature = "defmt")]
fn log_rejected(err: &ComposeError) {
    match *err {
        ComposeError::TooManyCharacters { cells, capacity } => {
            defmt::warn!("too many characters: {} > {}", cells, capacity)
        }
        ComposeError::ColorCountMismatch { cells, colors } => {
            defmt::warn!("color count mismatch: {} cells, {} colors", cells, colors)
        }
    }
}

#[cfg(not(feature = "defmt"))]
fn log_rejected(_err: &ComposeError) {}

/// Text-level interface to the panels
pub struct Sign<G, P, D> {
    glyphs: G,
    renderer: Renderer<P, D>,
    /// Scratch space for rasterized text
    cells: Vec<Glyph, SCROLL_CAPACITY>,
    /// Last statically printed frame
    frame: Frame,
}

impl<G, P, D> Sign<G, P, D>
where
    G: GlyphSource,
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(glyphs: G, renderer: Renderer<P, D>) -> Self {
        Self {
            glyphs,
            renderer,
            cells: Vec::new(),
            frame: Frame::new(),
        }
    }

    /// Rasterize `text` into the scratch cells
    fn rasterize(&mut self, text: &str, mode: RenderMode) -> Result<(), SignError> {
        self.glyphs
            .rasterize(text, mode.capacity(), &mut self.cells)
            .map_err(|e| {
                log_rejected(&e);
                SignError::Compose(e)
            })?;
        Ok(())
    }

    /// Print up to eight characters in place
    ///
    /// `colors` holds one tag per character. Oversized input is rejected
    /// before anything touches the bus and the previous frame stays up.
    pub fn print_static(&mut self, text: &str, colors: &[ColorTag]) -> Result<(), SignError> {
        self.rasterize(text, RenderMode::Static)?;
        self.frame
            .compose_into(&self.cells, colors, RenderMode::Static)
            .map_err(|e| {
                log_rejected(&e);
                SignError::Compose(e)
            })?;
        self.renderer.render_frame(&self.frame)?;
        Ok(())
    }

    /// Blank both panels
    pub fn clear(&mut self) -> Result<(), SignError> {
        self.frame = Frame::blank(STATIC_CAPACITY);
        self.renderer.render_frame(&self.frame)?;
        Ok(())
    }

    /// Compose a scroll without rendering anything yet
    pub fn begin_scroll(
        &mut self,
        text: &str,
        colors: &[ColorTag],
    ) -> Result<ScrollSession, SignError> {
        self.rasterize(text, RenderMode::Scroll)?;
        let frame = Frame::compose(&self.cells, colors, RenderMode::Scroll).map_err(|e| {
            log_rejected(&e);
            SignError::Compose(e)
        })?;
        Ok(ScrollSession::new(frame))
    }

    /// Render the next pass of a scroll
    ///
    /// The frame is shifted one column before every pass but the first.
    /// Returns true once the last pass has been rendered.
    pub fn render_scroll_pass(&mut self, session: &mut ScrollSession) -> Result<bool, SignError> {
        if session.is_finished() {
            return Ok(true);
        }
        if session.pass > 0 {
            shift_left_one_column(&mut session.frame);
        }
        self.renderer.render_frame(&session.frame)?;
        session.pass += 1;
        Ok(session.is_finished())
    }

    /// Scroll `text` across the panels, blocking until it has left
    ///
    /// Waits `step_delay_ms` between passes using the bus delay.
    pub fn print_scroll(
        &mut self,
        text: &str,
        colors: &[ColorTag],
        step_delay_ms: u32,
    ) -> Result<(), SignError> {
        let mut session = self.begin_scroll(text, colors)?;
        while !self.render_scroll_pass(&mut session)? {
            self.renderer.bus_mut().pause_ms(step_delay_ms);
        }
        Ok(())
    }

    /// Last statically printed frame
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Get the renderer
    pub fn renderer(&self) -> &Renderer<P, D> {
        &self.renderer
    }

    /// Get the renderer mutably
    pub fn renderer_mut(&mut self) -> &mut Renderer<P, D> {
        &mut self.renderer
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mock::{clock_pulses, mock_bus, BusEvent, BusLog, Line, MockDelay, MockPin};
    use marquee_core::font::Font5x7;

    pub(crate) type TestSign = Sign<Font5x7, MockPin, MockDelay>;

    pub(crate) fn test_sign() -> (TestSign, BusLog) {
        let (bus, log) = mock_bus();
        (Sign::new(Font5x7::new(), Renderer::new(bus)), log)
    }

    #[test]
    fn test_static_print_is_one_pass() {
        let (mut sign, log) = test_sign();
        sign.print_static("RGR", &[ColorTag::Red, ColorTag::Green, ColorTag::Red])
            .unwrap();

        assert_eq!(sign.renderer().passes(), 1);
        assert_eq!(sign.frame().cells(), 3);
        assert_eq!(clock_pulses(&log), 16 * 3 * 8);
        assert!(sign.frame().colors()[8..16]
            .iter()
            .all(|&c| c == ColorTag::Green));
    }

    #[test]
    fn test_oversize_static_rejected_without_bus_activity() {
        let (mut sign, log) = test_sign();
        sign.print_static("OK", &[ColorTag::Green; 2]).unwrap();
        let before = sign.frame().clone();
        log.borrow_mut().clear();

        let result = sign.print_static("NINECHARS", &[ColorTag::Red; 9]);
        assert_eq!(
            result,
            Err(SignError::Compose(ComposeError::TooManyCharacters {
                cells: 9,
                capacity: 8
            }))
        );
        assert!(log.borrow().is_empty());
        assert_eq!(sign.frame(), &before);
        assert_eq!(sign.renderer().passes(), 1);
    }

    #[test]
    fn test_color_mismatch_rejected() {
        let (mut sign, log) = test_sign();
        let result = sign.print_static("ABC", &[ColorTag::Red; 2]);
        assert!(matches!(
            result,
            Err(SignError::Compose(ComposeError::ColorCountMismatch { .. }))
        ));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_clear_renders_blank_frame() {
        let (mut sign, log) = test_sign();
        sign.clear().unwrap();

        assert_eq!(sign.renderer().passes(), 1);
        assert_eq!(sign.frame().cells(), STATIC_CAPACITY);
        // Every dot is shifted dark
        assert_eq!(clock_pulses(&log), 16 * STATIC_CAPACITY * 8);
        assert!(!log
            .borrow()
            .iter()
            .any(|e| *e == BusEvent::Drive(Line::Red, true)));
    }

    #[test]
    fn test_eight_cell_scroll_is_66_passes() {
        let (mut sign, _log) = test_sign();
        sign.print_scroll("SCROLLER", &[ColorTag::Orange; 8], 30)
            .unwrap();
        assert_eq!(sign.renderer().passes(), 66);
    }

    #[test]
    fn test_scroll_delay_only_between_passes() {
        let (mut sign, log) = test_sign();
        sign.print_scroll("A", &[ColorTag::Red], 5).unwrap();

        // One cell: 10 passes, 9 waits of 5 ms
        let waits = log
            .borrow()
            .iter()
            .filter(|e| **e == BusEvent::DelayNs(5_000_000))
            .count();
        assert_eq!(sign.renderer().passes(), 10);
        assert_eq!(waits, 9);
    }

    #[test]
    fn test_scroll_session_steps() {
        let (mut sign, _log) = test_sign();
        let mut session = sign.begin_scroll("AB", &[ColorTag::Green; 2]).unwrap();
        assert_eq!(session.total_passes(), 18);
        assert_eq!(sign.renderer().passes(), 0);

        let first_row = session.frame().row(3).to_vec();
        assert!(!sign.render_scroll_pass(&mut session).unwrap());
        // First pass shows the frame unshifted
        assert_eq!(session.frame().row(3), &first_row[..]);

        assert!(!sign.render_scroll_pass(&mut session).unwrap());
        assert_eq!(session.passes_done(), 2);

        while !sign.render_scroll_pass(&mut session).unwrap() {}
        assert!(session.is_finished());
        assert_eq!(sign.renderer().passes(), 18);
        assert!(session.frame().rows().iter().all(|r| r.iter().all(|&b| b == 0)));

        // A finished session renders nothing more
        assert!(sign.render_scroll_pass(&mut session).unwrap());
        assert_eq!(sign.renderer().passes(), 18);
    }

    #[test]
    fn test_scroll_capacity() {
        let (mut sign, _log) = test_sign();
        let long = "X".repeat(SCROLL_CAPACITY + 1);
        let colors = [ColorTag::Red; SCROLL_CAPACITY + 1];
        assert!(matches!(
            sign.begin_scroll(&long, &colors),
            Err(SignError::Compose(ComposeError::TooManyCharacters { .. }))
        ));

        let fits = "X".repeat(SCROLL_CAPACITY);
        let session = sign
            .begin_scroll(&fits, &colors[..SCROLL_CAPACITY])
            .unwrap();
        assert_eq!(session.total_passes(), SCROLL_CAPACITY * 8 + 2);
    }
}
