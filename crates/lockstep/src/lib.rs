#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Tether Lock-Step Environment
//!
//! The tick/reset state machine that makes two independently stepped
//! processes — a robot and a supervisor coupled only through a transport
//! channel and a shared simulation clock — behave as one synchronous RL
//! environment with the conventional reset/step/observe/reward/done/info
//! contract.
//!
//! ## Key Components
//!
//! -   **Problem definition:** the [`SupervisorTask`] and [`RobotTask`]
//!     traits in [`handlers`] carry the user-supplied logic (message
//!     translation, observation, reward, termination). They are injected
//!     into the state machine as strategies; there are no subclass chains
//!     and no default behavior for the problem hooks.
//! -   **Supervisor side:** [`SupervisorEnv`] in [`supervisor`] owns the
//!     clock handle, the channel endpoint and the task, and drives the fixed
//!     per-tick ordering of the step protocol.
//! -   **Robot side:** [`RobotLink`] in [`robot`] is the mirror half: apply
//!     inbound commands as actuation, emit the sensed state, repeat until
//!     the simulator terminates.
//! -   **Combined scheme:** [`CombinedEnv`] in [`combined`] covers the case
//!     where one controller plays both roles: the [`CombinedTask`] actuates
//!     the agent directly and no channel is involved.
//! -   **Composition:** the wrappers in [`wrappers`] stack over any
//!     [`Environment`] and add side effects (metric logging, console
//!     tracing) without altering the 4-tuple contract.

pub mod combined;
pub mod config;
pub mod handlers;
pub mod robot;
pub mod supervisor;
pub mod wrappers;

pub use combined::CombinedEnv;
pub use config::{ProtocolConfig, SendOrder};
pub use handlers::{CombinedTask, RobotTask, SupervisorTask};
pub use robot::RobotLink;
pub use supervisor::SupervisorEnv;
pub use wrappers::{ConsoleTrace, ScoreLog};

use thiserror::Error;

/// Errors surfaced by the lock-step protocol.
#[derive(Error, Debug)]
pub enum EnvError {
    /// The simulator reported shutdown. This state is absorbing: once
    /// returned, every later `step` or `reset` on the same environment
    /// returns it again. The session never resumes; the host process decides
    /// how to shut down.
    #[error("simulator reported termination; this session cannot be resumed")]
    SessionEnded,

    /// Outbound user data could not be framed. Aborts the tick.
    #[error(transparent)]
    Encode(#[from] wire::EncodeError),

    /// Contract violation on the channel (receive without a queue check).
    #[error(transparent)]
    Channel(#[from] channel::ChannelError),

    /// A message decoded but the task could not make sense of it.
    #[error("malformed message: {0}")]
    Protocol(String),
}

/// The result of one environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Observation after the tick.
    pub observation: Vec<f32>,
    /// Reward awarded for the action just taken.
    pub reward: f32,
    /// Whether the episode is over. `true` does not auto-reset; the caller
    /// must call `reset` explicitly.
    pub done: bool,
    /// Diagnostic information, mostly useful for debugging.
    pub info: serde_json::Value,
}

/// The capability set every environment — wrapped or not — exposes.
///
/// Wrappers implement this same trait and forward every call to exactly one
/// inner environment, so the innermost core RL semantics are identical
/// whether zero or many wrappers are stacked.
pub trait Environment {
    /// Resets the world and physics, lets the reset settle for one tick and
    /// returns the default observation of a fresh episode.
    ///
    /// # Errors
    ///
    /// [`EnvError::SessionEnded`] once the simulator has terminated.
    fn reset(&mut self) -> Result<Vec<f32>, EnvError>;

    /// Advances the coupled pair by one tick under `action` and returns the
    /// `(observation, reward, done, info)` 4-tuple.
    ///
    /// # Errors
    ///
    /// [`EnvError::SessionEnded`] once the simulator has terminated; encode
    /// and channel errors abort the tick and the episode. Nothing is rolled
    /// back on a failed step.
    fn step(&mut self, action: &[f32]) -> Result<Step, EnvError>;

    /// Current observation vector.
    fn observations(&mut self) -> Vec<f32>;

    /// Reward for `action` in the current state.
    fn reward(&mut self, action: &[f32]) -> f32;

    /// Whether the episode has reached a terminal state.
    fn is_done(&mut self) -> bool;

    /// Diagnostic info for the current state.
    fn info(&mut self) -> serde_json::Value;
}
