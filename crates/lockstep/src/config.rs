//! Protocol configuration, parsed from JSON.

use anyhow::Result;
use serde::Deserialize;

/// When the action packet is emitted relative to the clock advance.
///
/// The two orderings change which tick the peer sees the action in:
/// `BeforeAdvance` makes the robot act on `a_t` during tick `t`;
/// `AfterAdvance` delays its effect to tick `t + 1`. The choice is an
/// explicit configuration constant — it never varies implicitly — and the
/// peer's tick semantics must match it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendOrder {
    /// Emit the action, then advance the clock. The default.
    BeforeAdvance,
    /// Advance the clock, then emit the action.
    AfterAdvance,
}

impl Default for SendOrder {
    fn default() -> Self {
        SendOrder::BeforeAdvance
    }
}

fn default_step_cap() -> u32 {
    1000
}

/// Configuration shared by the supervisor environment and the optimizer
/// adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolConfig {
    /// Controller timestep in milliseconds. `None` falls back to the
    /// simulator's basic timestep.
    #[serde(default)]
    pub timestep_ms: Option<u32>,

    /// Ordering of send relative to the clock advance.
    #[serde(default)]
    pub send_order: SendOrder,

    /// Hard per-episode step cap used when scoring candidates.
    #[serde(default = "default_step_cap")]
    pub step_cap: u32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            timestep_ms: None,
            send_order: SendOrder::default(),
            step_cap: default_step_cap(),
        }
    }
}

impl ProtocolConfig {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the expected shape.
    pub fn from_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
