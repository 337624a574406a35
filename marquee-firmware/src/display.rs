//! Display subsystem context
//!
//! Owns the sign behind the bus lock and the controller for the background
//! display task. Everything that drives the panels goes through here: the
//! display task, and foreground prints from request handlers.
//!
//! # Bus ownership
//!
//! Both sides acquire the same lock. The display task holds it for one
//! quantum at a time (a static print, a clear, or one scroll pass) and
//! checks for a pending suspend before every acquire, so a parked task
//! holds no lock. A foreground print suspends the task, takes the lock,
//! prints, releases it and resumes the task; it gets the bus after at most
//! one quantum, never mid-row.

use core::cell::Cell;

use defmt::*;
use embassy_executor::{SendSpawner, SpawnError};
use embassy_rp::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::once_lock::OnceLock;
use embassy_sync::signal::Signal;
use embassy_time::{Delay, Timer};
use portable_atomic::{AtomicU32, Ordering};

use marquee_core::config::SignConfig;
use marquee_core::font::Font5x7;
use marquee_core::glyph::ColorTag;
use marquee_core::task::{ExecContext, TaskError, TaskRegistry, TaskState};
use marquee_drivers::{Sign, SignError};

use crate::tasks::display_task;

/// The sign as wired on this board
pub type BoardSign = Sign<Font5x7, Output<'static>, Delay>;

/// Errors from task control
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlError {
    /// Lifecycle rule violated
    Task(TaskError),
    /// The executor had no room for the task
    Spawn(SpawnError),
}

impl From<TaskError> for ControlError {
    fn from(e: TaskError) -> Self {
        ControlError::Task(e)
    }
}

/// Lifecycle control for the background display task
pub struct TaskController {
    registry: BlockingMutex<CriticalSectionRawMutex, Cell<TaskRegistry>>,
    /// Wakes a parked task
    resume: Signal<CriticalSectionRawMutex, ()>,
    /// Stops the task at its next await; cleared when it exits
    terminate: Signal<CriticalSectionRawMutex, ()>,
    /// Generation of the task that just exited
    exited: Signal<CriticalSectionRawMutex, u32>,
    core0: OnceLock<SendSpawner>,
    core1: OnceLock<SendSpawner>,
}

impl TaskController {
    pub const fn new() -> Self {
        Self {
            registry: BlockingMutex::new(Cell::new(TaskRegistry::new())),
            resume: Signal::new(),
            terminate: Signal::new(),
            exited: Signal::new(),
            core0: OnceLock::new(),
            core1: OnceLock::new(),
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut TaskRegistry) -> R) -> R {
        self.registry.lock(|cell| {
            let mut registry = cell.get();
            let result = f(&mut registry);
            cell.set(registry);
            result
        })
    }

    /// Make an executor available for `context`
    pub fn set_spawner(&self, context: ExecContext, spawner: SendSpawner) {
        let slot = match context {
            ExecContext::Core0 => &self.core0,
            ExecContext::Core1 => &self.core1,
        };
        if slot.init(spawner).is_err() {
            warn!("Spawner for {} already set", context);
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> TaskState {
        self.update(|r| r.state())
    }

    /// Whether the task should park at its next yield point
    pub fn should_park(&self) -> bool {
        self.update(|r| r.should_park())
    }

    /// Ask the task to park; nests with other suspends
    pub fn suspend(&self) -> Result<(), TaskError> {
        self.update(|r| r.suspend())?;
        debug!("Display task suspend requested");
        Ok(())
    }

    /// Release one suspend, waking the task if it was the last
    pub fn resume(&self) -> Result<(), TaskError> {
        if self.update(|r| r.resume())? {
            debug!("Display task resumed");
            self.resume.signal(());
        }
        Ok(())
    }

    /// Park until no suspend is outstanding
    pub(crate) async fn park_while_suspended(&self) {
        while self.should_park() {
            trace!("Display task parked");
            self.resume.wait().await;
        }
    }

    /// Resolves when the task has been told to stop
    pub(crate) async fn stop_requested(&self) {
        self.terminate.wait().await
    }

    /// Snapshot of the registry
    pub fn registry(&self) -> TaskRegistry {
        self.update(|r| *r)
    }

    /// Acknowledge that task `generation` has stopped
    ///
    /// The stop request is consumed before the slot is released, so a task
    /// registered afterwards never sees it.
    pub(crate) fn exited(&self, generation: u32) {
        let released = self.update(|r| {
            self.terminate.reset();
            r.exited(generation)
        });
        if let Err(e) = released {
            warn!("Exit of display task {} not registered: {}", generation, e);
        }
        self.exited.signal(generation);
    }
}

impl Default for TaskController {
    fn default() -> Self {
        Self::new()
    }
}

/// The display subsystem
pub struct DisplayContext {
    sign: Mutex<CriticalSectionRawMutex, BoardSign>,
    pub controller: TaskController,
    config: SignConfig,
    /// Consecutive bus failures reported by the display task
    faults: AtomicU32,
}

impl DisplayContext {
    pub fn new(sign: BoardSign, config: SignConfig) -> Self {
        Self {
            sign: Mutex::new(sign),
            controller: TaskController::new(),
            config,
            faults: AtomicU32::new(0),
        }
    }

    /// Configuration the subsystem was built with
    pub fn config(&self) -> &SignConfig {
        &self.config
    }

    /// The bus lock
    pub(crate) fn sign(&self) -> &Mutex<CriticalSectionRawMutex, BoardSign> {
        &self.sign
    }

    pub(crate) fn record_fault(&self) -> u32 {
        self.faults.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn clear_faults(&self) {
        self.faults.store(0, Ordering::Relaxed);
    }

    /// Consecutive bus failures since the last good quantum
    pub fn faults(&self) -> u32 {
        self.faults.load(Ordering::Relaxed)
    }

    /// Spawn a fresh display task on `context`
    ///
    /// Fails without spawning if a task is registered. The script starts
    /// from its first step. Returns the new task's generation.
    pub async fn recreate(&'static self, context: ExecContext) -> Result<u32, ControlError> {
        let generation = match self.controller.update(|r| r.register(context)) {
            Ok(generation) => generation,
            Err(e) => {
                warn!("Display task recreate rejected: {}", e);
                return Err(e.into());
            }
        };

        let spawner = match context {
            ExecContext::Core0 => self.controller.core0.get().await,
            ExecContext::Core1 => self.controller.core1.get().await,
        };

        self.clear_faults();

        if let Err(e) = spawner.spawn(display_task(self, generation)) {
            error!("Failed to spawn display task: {}", e);
            // Releases the slot and any terminate() already waiting on it
            self.controller.exited(generation);
            return Err(ControlError::Spawn(e));
        }

        info!("Display task {} spawned on {}", generation, context);
        Ok(generation)
    }

    /// Stop the display task and wait until it has exited
    ///
    /// The task is dropped at its next await, which is never inside a row
    /// commit. Its script position is lost. Until it has exited the task
    /// stays registered, so a concurrent `recreate()` is rejected.
    pub async fn terminate(&self) -> Result<(), ControlError> {
        // Raised in the same critical section as the state change
        let generation = self.controller.update(|r| {
            let generation = r.terminate()?;
            self.controller.terminate.signal(());
            Ok::<_, TaskError>(generation)
        })?;

        while self.controller.exited.wait().await != generation {}

        info!("Display task {} terminated", generation);
        Ok(())
    }

    /// Print up to eight characters now, ahead of the display task
    pub async fn print_static(&self, text: &str, colors: &[ColorTag]) -> Result<(), SignError> {
        let suspended = self.controller.suspend().is_ok();
        let result = self.sign.lock().await.print_static(text, colors);
        if suspended {
            let _ = self.controller.resume();
        }

        if let Err(e) = result {
            warn!("Foreground print rejected: {}", e);
        }
        result
    }

    /// Scroll `text` now, ahead of the display task
    ///
    /// The bus stays locked for the whole scroll; the wait between passes
    /// is an async timer, not a busy wait.
    pub async fn print_scroll(
        &self,
        text: &str,
        colors: &[ColorTag],
        step_delay_ms: u32,
    ) -> Result<(), SignError> {
        let suspended = self.controller.suspend().is_ok();
        let result = self.scroll_locked(text, colors, step_delay_ms).await;
        if suspended {
            let _ = self.controller.resume();
        }

        if let Err(e) = result {
            warn!("Foreground scroll rejected: {}", e);
        }
        result
    }

    async fn scroll_locked(
        &self,
        text: &str,
        colors: &[ColorTag],
        step_delay_ms: u32,
    ) -> Result<(), SignError> {
        let mut sign = self.sign.lock().await;
        let mut session = sign.begin_scroll(text, colors)?;
        while !sign.render_scroll_pass(&mut session)? {
            Timer::after_millis(u64::from(step_delay_ms)).await;
        }
        Ok(())
    }
}
