//! User-supplied problem definitions for the two sides of the channel.
//!
//! These traits are the seams where the actual RL problem plugs into the
//! protocol. The state machine invokes each hook exactly once per tick, in
//! the order fixed by the step protocol. None of the problem hooks has a
//! fallback implementation — an environment that does not define its
//! observation or reward does not compile.

use wire::Message;

/// Supervisor-side problem definition: action translation, observation
/// assembly and the reward/termination capability set.
pub trait SupervisorTask {
    /// Converts the agent's action into an outbound message.
    ///
    /// The default implementation frames the action values as
    /// comma-separated numbers, the common scheme for this wire. Override it
    /// to use a different message layout.
    fn encode_action(&mut self, action: &[f32]) -> Message {
        Message::from_values(action)
    }

    /// Consumes one decoded observation fragment from the robot.
    ///
    /// Called once per packet while the inbound queue is drained, so when
    /// the peer enqueued several packets during a tick the last one wins.
    /// Not called at all on a silent tick — the task keeps its last-known
    /// values in that case.
    fn absorb_fields(&mut self, fields: &[String]);

    /// Current observation vector, assembled from absorbed fragments.
    fn observations(&mut self) -> Vec<f32>;

    /// Reward for `action` in the current state.
    fn reward(&mut self, action: &[f32]) -> f32;

    /// Whether the episode has reached a terminal state.
    fn is_done(&mut self) -> bool;

    /// Diagnostic info for the current state.
    fn info(&mut self) -> serde_json::Value;

    /// The observation a freshly reset episode starts from. Must not depend
    /// on anything accumulated in a previous episode.
    fn default_observation(&mut self) -> Vec<f32>;

    /// Hook called by the environment's `reset` so the task can clear its
    /// own per-episode state (absorbed fragments, counters).
    fn on_reset(&mut self) {}
}

/// Problem definition for the combined scheme: a single controller with
/// supervisor privileges that actuates the agent directly, no channel.
///
/// Mirrors [`SupervisorTask`] with the message hooks replaced by
/// [`apply_action`](CombinedTask::apply_action).
pub trait CombinedTask {
    /// Applies the agent's action as actuation. Invoked once per step,
    /// before the clock advance, so the tick simulates its effect.
    fn apply_action(&mut self, action: &[f32]);

    /// Current observation vector, read directly from the simulated world.
    fn observations(&mut self) -> Vec<f32>;

    /// Reward for `action` in the current state.
    fn reward(&mut self, action: &[f32]) -> f32;

    /// Whether the episode has reached a terminal state.
    fn is_done(&mut self) -> bool;

    /// Diagnostic info for the current state.
    fn info(&mut self) -> serde_json::Value;

    /// The observation a freshly reset episode starts from. Must not depend
    /// on anything accumulated in a previous episode.
    fn default_observation(&mut self) -> Vec<f32>;

    /// Hook called by the environment's `reset` so the task can clear its
    /// own per-episode state.
    fn on_reset(&mut self) {}
}

/// Robot-side problem definition: sensing and actuation.
pub trait RobotTask {
    /// Converts the robot's sensed state into an outbound message for the
    /// supervisor. Invoked once per tick.
    fn create_message(&mut self) -> Message;

    /// Applies one decoded command's fields as actuation.
    ///
    /// May be called zero times in a tick — no inbound message means "no
    /// command this tick, hold the previous actuation", never an error.
    fn apply_fields(&mut self, fields: &[String]);
}
