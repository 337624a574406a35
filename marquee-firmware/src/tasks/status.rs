//! Status task
//!
//! Stands in for the request handlers that use the sign's upward
//! interface. Periodically interrupts the script with an uptime print, and
//! restarts the display task if it keeps failing on the bus.

use core::fmt::Write;

use defmt::*;
use embassy_time::{Duration, Instant, Ticker, Timer};
use heapless::{String, Vec};

use marquee_core::frame::STATIC_CAPACITY;
use marquee_core::glyph::ColorTag;

use crate::display::DisplayContext;

/// Seconds between status prints
const STATUS_INTERVAL_S: u64 = 60;

/// How long the status stays up before the script resumes
const STATUS_HOLD_MS: u64 = 3000;

/// Consecutive bus failures before the display task is restarted
const MAX_FAULTS: u32 = 5;

/// Status task - foreground prints and display task supervision
#[embassy_executor::task]
pub async fn status_task(display: &'static DisplayContext) {
    info!("Status task started");

    let mut ticker = Ticker::every(Duration::from_secs(STATUS_INTERVAL_S));
    let start = Instant::now();

    loop {
        ticker.next().await;

        if display.faults() >= MAX_FAULTS {
            restart_display_task(display).await;
            continue;
        }

        let minutes = start.elapsed().as_secs() / 60;
        show_uptime(display, minutes).await;

        if minutes % 10 == 0 {
            let step_delay = display.config().scroll.step_delay_ms;
            let _ = display
                .print_scroll("STATUS OK", &[ColorTag::Green; 9], step_delay)
                .await;
        }
    }
}

/// Hold an uptime print on the panels, with the script parked
async fn show_uptime(display: &'static DisplayContext, minutes: u64) {
    let mut text: String<STATIC_CAPACITY> = String::new();
    if core::write!(text, "UP {}M", minutes).is_err() {
        text.clear();
        let _ = text.push_str("UP LONG");
    }
    let mut colors: Vec<ColorTag, STATIC_CAPACITY> = Vec::new();
    for _ in text.chars() {
        let _ = colors.push(ColorTag::Orange);
    }

    // Outer suspend keeps the script parked for the hold
    let suspended = display.controller.suspend().is_ok();
    if display.print_static(&text, &colors).await.is_ok() {
        Timer::after_millis(STATUS_HOLD_MS).await;
    }
    if suspended {
        let _ = display.controller.resume();
    }
}

async fn restart_display_task(display: &'static DisplayContext) {
    warn!(
        "Display task failed {} times in a row, restarting",
        display.faults()
    );

    if display.controller.state().is_registered() {
        if let Err(e) = display.terminate().await {
            warn!("Terminate failed: {}", e);
            return;
        }
    }

    let context = display.config().task.context;
    if let Err(e) = display.recreate(context).await {
        error!("Display task restart failed: {}", e);
    }
}
