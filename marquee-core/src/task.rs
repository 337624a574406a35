//! Display task lifecycle
//!
//! Tracks the single background display task: whether a handle is
//! registered, whether it has been asked to park, and on which execution
//! context it runs. The registry is owned by the display subsystem and
//! passed explicitly to whoever needs to suspend, resume or recreate the
//! task.
//!
//! Suspension nests: every `suspend()` must be matched by a `resume()`,
//! and the task only runs again once the last one resumes it.

/// Lifecycle states of the display task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskState {
    /// No task has been spawned yet
    #[default]
    Unregistered,
    /// Task is playing its script
    Running,
    /// Task has been asked to park at its next yield point
    Suspended,
    /// Task has been told to stop but has not exited yet
    Stopping,
    /// Task exited; its handle is gone
    Terminated,
}

impl TaskState {
    /// Check if a task handle is live
    ///
    /// A stopping task still holds its executor slot until it exits.
    pub fn is_registered(&self) -> bool {
        matches!(
            self,
            TaskState::Running | TaskState::Suspended | TaskState::Stopping
        )
    }
}

/// Execution context a task is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecContext {
    /// Main executor, shared with request handling
    Core0,
    /// Dedicated executor on the second core
    #[default]
    Core1,
}

/// Lifecycle errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskError {
    /// A task handle is already registered
    AlreadyRunning,
    /// No task handle is registered
    NotRegistered,
    /// Task is not suspended
    NotSuspended,
    /// Too many nested suspends
    SuspendOverflow,
    /// Task is already stopping
    StopPending,
}

/// Registry for the single display task handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskRegistry {
    state: TaskState,
    context: Option<ExecContext>,
    /// Incremented on every registration
    generation: u32,
    /// Outstanding suspends
    suspend_depth: u8,
}

impl TaskRegistry {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            state: TaskState::Unregistered,
            context: None,
            generation: 0,
            suspend_depth: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Context of the registered task
    pub fn context(&self) -> Option<ExecContext> {
        self.context
    }

    /// Registration counter, used to tell task instances apart
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Check if a task handle is live
    pub fn is_registered(&self) -> bool {
        self.state.is_registered()
    }

    /// Whether the task should park at its next yield point
    pub fn should_park(&self) -> bool {
        self.state == TaskState::Suspended
    }

    /// Register a new task on `context`
    ///
    /// Fails with `AlreadyRunning` while a handle is live, including while a
    /// stop is pending; the caller must not spawn in that case. Returns the
    /// new generation.
    pub fn register(&mut self, context: ExecContext) -> Result<u32, TaskError> {
        if self.is_registered() {
            return Err(TaskError::AlreadyRunning);
        }
        self.state = TaskState::Running;
        self.context = Some(context);
        self.suspend_depth = 0;
        self.generation = self.generation.wrapping_add(1);
        Ok(self.generation)
    }

    /// Ask the task to park
    pub fn suspend(&mut self) -> Result<(), TaskError> {
        match self.state {
            TaskState::Running | TaskState::Suspended => {}
            TaskState::Stopping => return Err(TaskError::StopPending),
            TaskState::Unregistered | TaskState::Terminated => {
                return Err(TaskError::NotRegistered)
            }
        }
        self.suspend_depth = self
            .suspend_depth
            .checked_add(1)
            .ok_or(TaskError::SuspendOverflow)?;
        self.state = TaskState::Suspended;
        Ok(())
    }

    /// Release one suspend
    ///
    /// Returns true if the task is running again.
    pub fn resume(&mut self) -> Result<bool, TaskError> {
        match self.state {
            TaskState::Suspended => {
                self.suspend_depth = self.suspend_depth.saturating_sub(1);
                if self.suspend_depth == 0 {
                    self.state = TaskState::Running;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            TaskState::Running => Err(TaskError::NotSuspended),
            TaskState::Stopping => Err(TaskError::StopPending),
            TaskState::Unregistered | TaskState::Terminated => Err(TaskError::NotRegistered),
        }
    }

    /// Request a stop
    ///
    /// The handle stays registered until [`exited`](Self::exited) is called
    /// for its generation. Returns the generation being stopped.
    pub fn terminate(&mut self) -> Result<u32, TaskError> {
        match self.state {
            TaskState::Running | TaskState::Suspended => {
                self.state = TaskState::Stopping;
                self.suspend_depth = 0;
                Ok(self.generation)
            }
            TaskState::Stopping => Err(TaskError::StopPending),
            TaskState::Unregistered | TaskState::Terminated => Err(TaskError::NotRegistered),
        }
    }

    /// Drop the handle of task `generation` once it has exited
    ///
    /// Also used to roll back a registration whose spawn failed. Exits of
    /// older generations are rejected and change nothing.
    pub fn exited(&mut self, generation: u32) -> Result<(), TaskError> {
        if !self.is_registered() || generation != self.generation {
            return Err(TaskError::NotRegistered);
        }
        self.state = TaskState::Terminated;
        self.context = None;
        self.suspend_depth = 0;
        Ok(())
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
