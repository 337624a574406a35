//! Marquee - Two-Panel Dot-Matrix Sign Firmware
//!
//! Main firmware binary for RP2040 boards driving two 8-cell bicolor
//! dot-matrix panels over a bit-banged shift bus. A background task plays
//! the display script; foreground prints preempt it through the display
//! context.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{Executor, Spawner};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use marquee_core::font::Font5x7;
use marquee_core::task::ExecContext;
use marquee_drivers::{Renderer, ShiftBus, Sign};

use crate::display::DisplayContext;
use crate::pins::PinBank;

mod config;
mod display;
mod pins;
mod tasks;

/// Stack for the second core's executor
static CORE1_STACK: StaticCell<Stack<8192>> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

/// Display subsystem (must live forever for task references)
static DISPLAY: StaticCell<DisplayContext> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Marquee firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();

    // Pin assignments come from config
    let (mut bank, core1) = PinBank::new(p);
    let bus_pins = unwrap!(bank.bus_pins(&config.pins));
    let bus = unwrap!(ShiftBus::new(bus_pins, Delay, config.timing));
    let sign = Sign::new(Font5x7::new(), Renderer::new(bus));
    info!("Shift bus initialized");

    let display: &'static DisplayContext = DISPLAY.init(DisplayContext::new(sign, config));
    display
        .controller
        .set_spawner(ExecContext::Core0, spawner.make_send());

    // Second core runs its own executor; the display task lands there by default
    spawn_core1(core1, CORE1_STACK.init(Stack::new()), move || {
        let executor = EXECUTOR1.init(Executor::new());
        executor.run(|spawner| {
            display
                .controller
                .set_spawner(ExecContext::Core1, spawner.make_send());
        })
    });
    info!("Core 1 executor started");

    // Spawn tasks
    if let Err(e) = display.recreate(config.task.context).await {
        error!("Display task not started: {}", e);
    }
    unwrap!(spawner.spawn(tasks::status_task(display)));

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
