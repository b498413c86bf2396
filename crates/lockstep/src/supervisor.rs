//! The supervisor-side environment state machine.

use crate::config::{ProtocolConfig, SendOrder};
use crate::handlers::SupervisorTask;
use crate::{EnvError, Environment, Step};
use channel::{Endpoint, SimulatorClock, TickResult};

/// The environment half of the coupled pair.
///
/// Owns the clock handle, the channel endpoint and the injected
/// [`SupervisorTask`], and drives the fixed per-tick ordering:
/// emit the action, advance the shared clock, drain the inbound queue
/// (latest packet wins), then evaluate the task's observation, reward,
/// done and info hooks exactly once each.
///
/// Lifecycle: `Ready → (step ⇄ Ready) → Ended`. `Ended` is absorbing — once
/// the clock reports termination, every later `step` or `reset` returns
/// [`EnvError::SessionEnded`].
pub struct SupervisorEnv<C, E, T> {
    clock: C,
    endpoint: E,
    task: T,
    timestep_ms: u32,
    send_order: SendOrder,
    ended: bool,
    last_action: Option<Vec<f32>>,
    episode_steps: u64,
}

impl<C, E, T> SupervisorEnv<C, E, T>
where
    C: SimulatorClock,
    E: Endpoint,
    T: SupervisorTask,
{
    /// Builds the environment around an explicit clock handle, an endpoint
    /// and a task. The timestep is fixed here for the lifetime of the
    /// environment; the receiving device is enabled with it.
    pub fn new(clock: C, mut endpoint: E, task: T, config: &ProtocolConfig) -> Self {
        let timestep_ms = config.timestep_ms.unwrap_or_else(|| clock.basic_timestep());
        endpoint.enable(timestep_ms);
        Self {
            clock,
            endpoint,
            task,
            timestep_ms,
            send_order: config.send_order,
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

    /// Drains the inbound queue completely, handing every decoded packet to
    /// the task in arrival order. The last packet of a tick therefore wins.
    fn drain_inbound(&mut self) -> Result<(), EnvError> {
        while self.endpoint.queue_length() > 0 {
            let packet = self.endpoint.receive_next()?;
            let fields = wire::decode(&packet);
            self.task.absorb_fields(&fields);
        }
        Ok(())
    }

    /// Discards anything still queued, without handing it to the task. Used
    /// by `reset` so fragments from the previous episode cannot leak into
    /// the new one.
    fn discard_inbound(&mut self) -> Result<(), EnvError> {
        let mut dropped = 0usize;
        while self.endpoint.queue_length() > 0 {
            let _ = self.endpoint.receive_next()?;
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!(dropped, "discarded stale packets during reset");
        }
        Ok(())
    }
}

impl<C, E, T> Environment for SupervisorEnv<C, E, T>
where
    C: SimulatorClock,
    E: Endpoint,
    T: SupervisorTask,
{
    fn reset(&mut self) -> Result<Vec<f32>, EnvError> {
        if self.ended {
            return Err(EnvError::SessionEnded);
        }
        self.clock.reset_world();
        self.clock.reset_physics();
        // One tick to let the reset settle before the first observation.
        self.advance()?;
        self.discard_inbound()?;
        self.task.on_reset();
        self.last_action = None;
        self.episode_steps = 0;
        Ok(self.task.default_observation())
    }

    fn step(&mut self, action: &[f32]) -> Result<Step, EnvError> {
        if self.ended {
            return Err(EnvError::SessionEnded);
        }
        let payload = self.task.encode_action(action).encode()?;
        match self.send_order {
            SendOrder::BeforeAdvance => {
                self.endpoint.send(&payload);
                self.advance()?;
            }
            SendOrder::AfterAdvance => {
                self.advance()?;
                self.endpoint.send(&payload);
            }
        }
        self.drain_inbound()?;
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
