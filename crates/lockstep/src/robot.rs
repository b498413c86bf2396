//! The robot-side half of the protocol.

use crate::handlers::RobotTask;
use crate::EnvError;
use channel::{Endpoint, SimulatorClock, TickResult};

/// Per-tick translation between the robot's local state and the wire.
///
/// Mirrors the supervisor environment from the other side: each tick, apply
/// any queued commands as actuation (latest wins; a silent tick keeps the
/// previous actuation) and emit the sensed state back to the supervisor.
pub struct RobotLink<E, T> {
    endpoint: E,
    task: T,
}

impl<E, T> RobotLink<E, T>
where
    E: Endpoint,
    T: RobotTask,
{
    /// Wraps an endpoint and a task, enabling the receiving device with the
    /// given sampling period.
    pub fn new(mut endpoint: E, task: T, timestep_ms: u32) -> Self {
        endpoint.enable(timestep_ms);
        Self { endpoint, task }
    }

    /// Borrows the injected task, e.g. for test assertions.
    pub fn task(&mut self) -> &mut T {
        &mut self.task
    }

    /// Runs the handlers for one tick: drain inbound commands into the
    /// task's actuation, then emit the sensed state.
    ///
    /// # Errors
    ///
    /// Propagates encode and channel errors; a failed emit aborts the tick.
    pub fn service_tick(&mut self) -> Result<(), EnvError> {
        while self.endpoint.queue_length() > 0 {
            let packet = self.endpoint.receive_next()?;
            let fields = wire::decode(&packet);
            self.task.apply_fields(&fields);
        }
        let payload = self.task.create_message().encode()?;
        self.endpoint.send(&payload);
        Ok(())
    }

    /// The robot main loop: advance the shared clock and service the
    /// handlers until the simulator terminates.
    ///
    /// Termination is the normal way for a robot process to finish, so it
    /// returns `Ok(())`; the caller decides whether to exit.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`RobotLink::service_tick`].
    pub fn run<C: SimulatorClock>(
        &mut self,
        clock: &mut C,
        timestep_ms: u32,
    ) -> Result<(), EnvError> {
        loop {
            match clock.advance(timestep_ms) {
                TickResult::Terminated => {
                    tracing::info!("simulator terminated; robot loop finished");
                    return Ok(());
                }
                TickResult::Continuing(_) => self.service_tick()?,
            }
        }
    }
}
