//! The combined robot-supervisor scheme: one process, no channel.
//!
//! When there is no need to separate the robot from the supervisor — or the
//! observations are too big to package into messages, such as camera frames
//! — a single controller with supervisor privileges can drive the agent
//! directly. The per-tick contract is the same as the messaging scheme's,
//! with the handler pair and queue draining replaced by one direct
//! `apply_action` call before the clock advance.

use crate::handlers::CombinedTask;
use crate::{EnvError, Environment, Step};
use channel::{SimulatorClock, TickResult};

/// Environment over a single combined robot-supervisor controller.
///
/// Shares the messaging environment's lifecycle: `Ready → (step ⇄ Ready) →
/// Ended`, with `Ended` absorbing once the clock reports termination.
pub struct CombinedEnv<C, T> {
    clock: C,
    task: T,
    timestep_ms: u32,
    ended: bool,
    last_action: Option<Vec<f32>>,
    episode_steps: u64,
}

impl<C, T> CombinedEnv<C, T>
where
    C: SimulatorClock,
    T: CombinedTask,
{
    /// Builds the environment around an explicit clock handle and a task.
    /// `timestep_ms: None` falls back to the simulator's basic timestep;
    /// either way the value is fixed for the environment's lifetime.
    #[must_use]
    pub fn new(clock: C, task: T, timestep_ms: Option<u32>) -> Self {
        let timestep_ms = timestep_ms.unwrap_or_else(|| clock.basic_timestep());
        Self {
            clock,
            task,
            timestep_ms,
            ended: false,
            last_action: None,
            episode_steps: 0,
        }
    }

    /// The fixed timestep in milliseconds, as chosen at construction.
    #[must_use]
    pub fn timestep_ms(&self) -> u32 {
        self.timestep_ms
    }

    /// The action most recently applied through `step`, if any this episode.
    #[must_use]
    pub fn last_action(&self) -> Option<&[f32]> {
        self.last_action.as_deref()
    }

    /// Steps taken in the current episode.
    #[must_use]
    pub fn episode_steps(&self) -> u64 {
        self.episode_steps
    }

    /// Borrows the injected task, e.g. for test assertions.
    pub fn task(&mut self) -> &mut T {
        &mut self.task
    }

    fn advance(&mut self) -> Result<u64, EnvError> {
        match self.clock.advance(self.timestep_ms) {
            TickResult::Continuing(tick) => Ok(tick),
            TickResult::Terminated => {
                self.ended = true;
                tracing::warn!("simulator terminated; environment is permanently ended");
                Err(EnvError::SessionEnded)
            }
        }
    }
}

impl<C, T> Environment for CombinedEnv<C, T>
where
    C: SimulatorClock,
    T: CombinedTask,
{
    fn reset(&mut self) -> Result<Vec<f32>, EnvError> {
        if self.ended {
            return Err(EnvError::SessionEnded);
        }
        self.clock.reset_world();
        self.clock.reset_physics();
        // One tick to let the reset settle before the first observation.
        self.advance()?;
        self.task.on_reset();
        self.last_action = None;
        self.episode_steps = 0;
        Ok(self.task.default_observation())
    }

    fn step(&mut self, action: &[f32]) -> Result<Step, EnvError> {
        if self.ended {
            return Err(EnvError::SessionEnded);
        }
        self.task.apply_action(action);
        self.advance()?;
        self.last_action = Some(action.to_vec());
        self.episode_steps += 1;

        Ok(Step {
            observation: self.task.observations(),
            reward: self.task.reward(action),
            done: self.task.is_done(),
            info: self.task.info(),
        })
    }

    fn observations(&mut self) -> Vec<f32> {
        self.task.observations()
    }

    fn reward(&mut self, action: &[f32]) -> f32 {
        self.task.reward(action)
    }

    fn is_done(&mut self) -> bool {
        self.task.is_done()
    }

    fn info(&mut self) -> serde_json::Value {
        self.task.info()
    }
}
