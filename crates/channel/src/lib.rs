#![deny(clippy::all, clippy::pedantic)]
//! # Tether Transport Channel
//!
//! The narrow interface to the two external collaborators of the lock-step
//! protocol: the simulator clock that both processes share, and the
//! emitter/receiver device pair that carries packets between them.
//!
//! The core never touches the physics engine or the radio transport
//! directly. It sees a [`SimulatorClock`] it can advance one tick at a time
//! and an [`Endpoint`] it can enqueue packets on and poll packets from.
//! `advance` is the only operation allowed to suspend the calling process;
//! everything else is non-blocking. A receive on an empty queue is a
//! programming-contract violation ([`ChannelError::EmptyQueue`]), not a
//! wait — callers must poll [`Endpoint::queue_length`] first.

use thiserror::Error;

#[cfg(feature = "mock")]
pub mod mock;

/// Errors raised by channel endpoints.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// `receive_next` was called with nothing queued. Check
    /// [`Endpoint::queue_length`] before receiving.
    #[error("receive_next called on an empty queue; poll queue_length first")]
    EmptyQueue,
}

/// Outcome of advancing the shared simulation clock by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    /// The simulator advanced; the payload is the new tick count.
    Continuing(u64),
    /// The simulator shut down. The session can never be resumed: no
    /// further ticks will ever be produced for this clock handle.
    Terminated,
}

impl TickResult {
    /// Returns `true` for [`TickResult::Terminated`].
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        matches!(self, TickResult::Terminated)
    }
}

/// Handle to the external simulator's clock and world state.
///
/// Both processes hold one of these; the simulator itself decides when a
/// tick has elapsed. The handle is passed explicitly into whatever owns it —
/// there is no ambient global simulator.
pub trait SimulatorClock {
    /// Blocks until the simulator has advanced by `timestep_ms` milliseconds
    /// of simulated time, or reports [`TickResult::Terminated`] if the
    /// simulation has ended.
    fn advance(&mut self, timestep_ms: u32) -> TickResult;

    /// Asks the simulator to restore the world to its initial state.
    fn reset_world(&mut self);

    /// Asks the simulator to zero out velocities and forces.
    fn reset_physics(&mut self);

    /// The simulator's native timestep in milliseconds, used when the
    /// controller does not override it.
    fn basic_timestep(&self) -> u32;
}

/// One side of the emitter/receiver device pair.
///
/// Owns an unbounded outbound FIFO (send never blocks on capacity) and an
/// inbound FIFO. Each endpoint is exclusively owned by the process side that
/// created it.
pub trait Endpoint {
    /// Number of packets waiting in the inbound queue.
    fn queue_length(&self) -> usize;

    /// Enqueues one packet for delivery to the peer. Non-blocking.
    fn send(&mut self, payload: &[u8]);

    /// Dequeues the next inbound packet.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::EmptyQueue`] when nothing is queued.
    fn receive_next(&mut self) -> Result<Vec<u8>, ChannelError>;

    /// Enables the receiving device with the given sampling period.
    fn enable(&mut self, timestep_ms: u32);
}
