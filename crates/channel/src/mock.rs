//! In-process stand-ins for the simulator clock and the device pair.
//!
//! The protocol is single-threaded and cooperative, so the loopback channel
//! uses plain `Rc<RefCell<VecDeque>>` queues with no locking — the two
//! "processes" of a test or demo run interleaved on one thread, exactly as
//! the tick protocol orders them.

use crate::{ChannelError, Endpoint, SimulatorClock, TickResult};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

type Queue = Rc<RefCell<VecDeque<Vec<u8>>>>;

/// One side of an in-process loopback channel. Create with
/// [`loopback_pair`].
pub struct LoopbackEndpoint {
    inbound: Queue,
    outbound: Queue,
    enabled: bool,
}

/// Creates two crossed endpoints: whatever one sends, the other receives,
/// in FIFO order.
#[must_use]
pub fn loopback_pair() -> (LoopbackEndpoint, LoopbackEndpoint) {
    let a_to_b: Queue = Rc::new(RefCell::new(VecDeque::new()));
    let b_to_a: Queue = Rc::new(RefCell::new(VecDeque::new()));
    (
        LoopbackEndpoint {
            inbound: Rc::clone(&b_to_a),
            outbound: Rc::clone(&a_to_b),
            enabled: false,
        },
        LoopbackEndpoint {
            inbound: a_to_b,
            outbound: b_to_a,
            enabled: false,
        },
    )
}

impl Endpoint for LoopbackEndpoint {
    fn queue_length(&self) -> usize {
        if !self.enabled {
            return 0;
        }
        self.inbound.borrow().len()
    }

    fn send(&mut self, payload: &[u8]) {
        self.outbound.borrow_mut().push_back(payload.to_vec());
    }

    fn receive_next(&mut self) -> Result<Vec<u8>, ChannelError> {
        self.inbound
            .borrow_mut()
            .pop_front()
            .ok_or(ChannelError::EmptyQueue)
    }

    fn enable(&mut self, _timestep_ms: u32) {
        self.enabled = true;
    }
}

/// A scripted clock that produces a fixed number of ticks and then reports
/// termination, forever.
///
/// An optional `on_tick` callback runs inside each successful `advance`,
/// standing in for the peer process executing its controller during the
/// tick. Tests use it to script peer replies with exact timing.
pub struct ScriptedClock {
    tick: u64,
    limit: u64,
    timestep_ms: u32,
    world_resets: u32,
    physics_resets: u32,
    on_tick: Option<Box<dyn FnMut(u64)>>,
    on_world_reset: Option<Box<dyn FnMut()>>,
}

impl ScriptedClock {
    /// A clock that ticks `limit` times before terminating.
    #[must_use]
    pub fn until(limit: u64) -> Self {
        Self {
            tick: 0,
            limit,
            timestep_ms: 32,
            world_resets: 0,
            physics_resets: 0,
            on_tick: None,
            on_world_reset: None,
        }
    }

    /// Installs a callback invoked with the new tick count inside every
    /// successful `advance`.
    #[must_use]
    pub fn with_on_tick(mut self, on_tick: impl FnMut(u64) + 'static) -> Self {
        self.on_tick = Some(Box::new(on_tick));
        self
    }

    /// Installs a callback invoked on every `reset_world` request, standing
    /// in for the simulator restoring the peer process's world state.
    #[must_use]
    pub fn with_on_world_reset(mut self, on_world_reset: impl FnMut() + 'static) -> Self {
        self.on_world_reset = Some(Box::new(on_world_reset));
        self
    }

    /// Ticks elapsed so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// How many times `reset_world` was requested.
    #[must_use]
    pub fn world_resets(&self) -> u32 {
        self.world_resets
    }

    /// How many times `reset_physics` was requested.
    #[must_use]
    pub fn physics_resets(&self) -> u32 {
        self.physics_resets
    }
}

impl SimulatorClock for ScriptedClock {
    fn advance(&mut self, _timestep_ms: u32) -> TickResult {
        if self.tick >= self.limit {
            tracing::debug!("scripted clock exhausted after {} ticks", self.limit);
            return TickResult::Terminated;
        }
        self.tick += 1;
        if let Some(on_tick) = &mut self.on_tick {
            on_tick(self.tick);
        }
        TickResult::Continuing(self.tick)
    }

    fn reset_world(&mut self) {
        self.world_resets += 1;
        if let Some(on_world_reset) = &mut self.on_world_reset {
            on_world_reset();
        }
    }

    fn reset_physics(&mut self) {
        self.physics_resets += 1;
    }

    fn basic_timestep(&self) -> u32 {
        self.timestep_ms
    }
}
