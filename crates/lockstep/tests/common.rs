//! Shared fixtures for the lockstep integration tests.

use channel::mock::LoopbackEndpoint;
use channel::Endpoint;
use lockstep::{RobotTask, SupervisorTask};
use serde_json::json;
use wire::Message;

/// Supervisor task that tracks the last observation fragment received and
/// rewards the first action component.
pub struct TrackerTask {
    pub obs: Vec<f32>,
    pub absorbed: usize,
    pub steps: u64,
    pub done_after: u64,
}

impl TrackerTask {
    pub fn new(done_after: u64) -> Self {
        Self {
            obs: vec![0.0; 3],
            absorbed: 0,
            steps: 0,
            done_after,
        }
    }
}

impl SupervisorTask for TrackerTask {
    fn absorb_fields(&mut self, fields: &[String]) {
        self.obs = fields
            .iter()
            .map(|f| f.parse().unwrap_or(0.0))
            .collect();
        self.absorbed += 1;
    }

    fn observations(&mut self) -> Vec<f32> {
        self.obs.clone()
    }

    fn reward(&mut self, action: &[f32]) -> f32 {
        self.steps += 1;
        action.first().copied().unwrap_or(0.0)
    }

    fn is_done(&mut self) -> bool {
        self.steps >= self.done_after
    }

    fn info(&mut self) -> serde_json::Value {
        json!({ "absorbed": self.absorbed })
    }

    fn default_observation(&mut self) -> Vec<f32> {
        vec![0.0; 3]
    }

    fn on_reset(&mut self) {
        self.obs = vec![0.0; 3];
        self.absorbed = 0;
        self.steps = 0;
    }
}

/// Drives the robot half of the channel from inside a scripted clock tick:
/// if an action arrived this tick, reply with each component halved plus a
/// trailing `1` marker.
pub fn echo_robot(mut endpoint: LoopbackEndpoint) -> impl FnMut(u64) {
    endpoint.enable(32);
    move |_tick| {
        let mut latest: Option<Vec<String>> = None;
        while endpoint.queue_length() > 0 {
            latest = Some(wire::decode(&endpoint.receive_next().unwrap()));
        }
        if let Some(fields) = latest {
            let mut reply: Vec<f32> = fields
                .iter()
                .map(|f| f.parse::<f32>().unwrap_or(0.0) * 0.5)
                .collect();
            reply.push(1.0);
            endpoint.send(&Message::from_values(&reply).encode().unwrap());
        }
    }
}

/// Robot task with a single motor: the first command field sets the speed,
/// the position integrates it once per emitted message.
pub struct MotorBot {
    pub speed: f32,
    pub position: f32,
    pub applied: usize,
}

impl MotorBot {
    pub fn new() -> Self {
        Self {
            speed: 0.0,
            position: 0.0,
            applied: 0,
        }
    }
}

impl RobotTask for MotorBot {
    fn create_message(&mut self) -> Message {
        self.position += self.speed;
        Message::from_values(&[self.position])
    }

    fn apply_fields(&mut self, fields: &[String]) {
        if let Some(first) = fields.first() {
            if let Ok(speed) = first.parse() {
                self.speed = speed;
            }
        }
        self.applied += 1;
    }
}
