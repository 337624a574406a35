//! Background display task
//!
//! Plays the display script forever, one quantum per bus lock. Between
//! quanta it checks for a pending suspend and parks without the lock.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{with_timeout, Duration, Timer};

use marquee_core::glyph::ColorTag;
use marquee_core::script::{ColorSpec, Script, ScriptStep};
use marquee_drivers::{Quantum, ScriptPlayer, SignError, Tick};

use crate::display::DisplayContext;

static WELCOME_COLORS: [ColorTag; 8] = [
    ColorTag::Red,
    ColorTag::Red,
    ColorTag::Orange,
    ColorTag::Orange,
    ColorTag::Green,
    ColorTag::Green,
    ColorTag::Orange,
    ColorTag::Red,
];

static DEFAULT_STEPS: [ScriptStep; 5] = [
    ScriptStep::Static {
        text: "MARQUEE!",
        colors: ColorSpec::PerCell(&WELCOME_COLORS),
        hold_ms: 2000,
    },
    ScriptStep::Scroll {
        text: "TWO PANEL BICOLOR SIGN",
        colors: ColorSpec::Uniform(ColorTag::Green),
        step_delay_ms: 30,
    },
    ScriptStep::Clear { hold_ms: 500 },
    ScriptStep::Scroll {
        text: "RED GREEN ORANGE",
        colors: ColorSpec::Uniform(ColorTag::Orange),
        step_delay_ms: 40,
    },
    ScriptStep::Pause { ms: 1000 },
];

/// Script played by the display task
pub static DEFAULT_SCRIPT: Script = Script::new(&DEFAULT_STEPS);

/// Display task - plays the script until terminated
#[embassy_executor::task(pool_size = 1)]
pub async fn display_task(display: &'static DisplayContext, generation: u32) {
    info!("Display task {} started", generation);

    let mut player = ScriptPlayer::new(DEFAULT_SCRIPT);
    let outcome = select(
        play(display, &mut player),
        display.controller.stop_requested(),
    )
    .await;

    match outcome {
        Either::First(()) => {}
        Either::Second(()) => {
            info!(
                "Display task {} stopping at step {}",
                generation,
                player.position().step
            );
        }
    }

    display.controller.exited(generation);
}

async fn play(display: &'static DisplayContext, player: &mut ScriptPlayer) {
    let task = display.config().task;
    let lock_timeout = Duration::from_millis(u64::from(task.lock_timeout_ms));

    loop {
        display.controller.park_while_suspended().await;

        // The guard is dropped before any wait
        let quantum = {
            let mut locked = with_timeout(lock_timeout, display.sign().lock()).await;
            let registry = display.controller.registry();
            player.quantum(&registry, locked.as_mut().ok().map(|guard| &mut **guard))
        };

        match quantum {
            Quantum::Parked => {}
            Quantum::LockTimedOut => {
                warn!("Display task: bus lock timeout, retrying");
            }
            Quantum::Played(Tick::Continue { wait_ms }) => {
                display.clear_faults();
                Timer::after_millis(u64::from(wait_ms)).await;
            }
            Quantum::Played(Tick::EndOfScript { wait_ms }) => {
                display.clear_faults();
                trace!("Script loop complete");
                Timer::after_millis(u64::from(wait_ms) + u64::from(task.idle_ms)).await;
            }
            Quantum::Failed(SignError::Compose(e)) => {
                warn!("Script step skipped: {}", e);
            }
            Quantum::Failed(SignError::Bus(e)) => {
                let faults = display.record_fault();
                error!("Bus failure in display task ({} in a row): {}", faults, e);
                Timer::after_millis(u64::from(task.idle_ms)).await;
            }
        }
    }
}
