//! # Tether Demo Application
//!
//! A self-contained demonstration of the lock-step protocol: a 1-D
//! target-seeking robot and its supervisor environment, coupled through the
//! in-process loopback channel and a scripted clock.
//!
//! The robot holds a position and a commanded velocity; each tick it applies
//! the latest velocity command and reports its position. The supervisor
//! rewards proximity to a fixed target and ends the episode once the robot
//! is close enough. The same environment is driven two ways: by a scripted
//! bang-bang controller ([`run_episode`]) and by the population optimizer
//! ([`run_evolution`]).

use anyhow::Result;
use channel::mock::{loopback_pair, LoopbackEndpoint, ScriptedClock};
use evolve::{Evolution, EvolutionConfig};
use lockstep::{
    EnvError, Environment, ProtocolConfig, RobotLink, RobotTask, ScoreLog, SupervisorEnv,
    SupervisorTask,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use wire::Message;

/// Simulated seconds of robot motion per tick.
const DT: f32 = 0.05;

/// How close the robot must get to the target to end the episode.
const DONE_DISTANCE: f32 = 0.05;

/// The robot half of the demo: one velocity "motor", one position "sensor".
pub struct SeekerRobot {
    position: f32,
    velocity: f32,
}

impl SeekerRobot {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
        }
    }

    /// What the simulator's world reset does to this robot.
    pub fn reset_state(&mut self) {
        self.position = 0.0;
        self.velocity = 0.0;
    }
}

impl Default for SeekerRobot {
    fn default() -> Self {
        Self::new()
    }
}

impl RobotTask for SeekerRobot {
    fn create_message(&mut self) -> Message {
        self.position += self.velocity * DT;
        Message::from_values(&[self.position])
    }

    fn apply_fields(&mut self, fields: &[String]) {
        if let Some(Ok(velocity)) = fields.first().map(|f| f.parse::<f32>()) {
            self.velocity = velocity.clamp(-1.0, 1.0);
        }
    }
}

/// The supervisor half: rewards proximity of the reported position to a
/// fixed target.
pub struct SeekerTask {
    target: f32,
    position: f32,
}

impl SeekerTask {
    #[must_use]
    pub fn new(target: f32) -> Self {
        Self {
            target,
            position: 0.0,
        }
    }

    fn distance(&self) -> f32 {
        (self.position - self.target).abs()
    }
}

impl SupervisorTask for SeekerTask {
    fn absorb_fields(&mut self, fields: &[String]) {
        if let Some(Ok(position)) = fields.first().map(|f| f.parse::<f32>()) {
            self.position = position;
        }
    }

    fn observations(&mut self) -> Vec<f32> {
        vec![self.position, self.target]
    }

    fn reward(&mut self, _action: &[f32]) -> f32 {
        -self.distance()
    }

    fn is_done(&mut self) -> bool {
        self.distance() < DONE_DISTANCE
    }

    fn info(&mut self) -> serde_json::Value {
        json!({ "distance": self.distance() })
    }

    fn default_observation(&mut self) -> Vec<f32> {
        vec![0.0, self.target]
    }

    fn on_reset(&mut self) {
        self.position = 0.0;
    }
}

/// The demo environment type: supervisor over the loopback channel, with the
/// robot serviced from inside the scripted clock's tick.
pub type DemoEnv = SupervisorEnv<ScriptedClock, LoopbackEndpoint, SeekerTask>;

/// Builds the coupled pair. The robot link lives inside the clock callbacks:
/// it runs its handlers during every tick and is restored by world resets,
/// which is exactly the lifecycle the real simulator gives a robot process.
#[must_use]
pub fn build_env(target: f32, tick_limit: u64, config: &ProtocolConfig) -> DemoEnv {
    let (sup_end, robot_end) = loopback_pair();
    let link = Rc::new(RefCell::new(RobotLink::new(
        robot_end,
        SeekerRobot::new(),
        32,
    )));
    let tick_link = Rc::clone(&link);
    let clock = ScriptedClock::until(tick_limit)
        .with_on_tick(move |_| {
            if let Err(e) = tick_link.borrow_mut().service_tick() {
                tracing::error!("robot tick failed: {e}");
            }
        })
        .with_on_world_reset(move || link.borrow_mut().task().reset_state());
    SupervisorEnv::new(clock, sup_end, SeekerTask::new(target), config)
}

/// Summary of one scripted episode.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeReport {
    pub steps: u32,
    pub score: f32,
    pub final_distance: f32,
    /// Whether the episode reached its terminal state (as opposed to the
    /// simulator shutting down or the step cap expiring).
    pub done: bool,
}

/// Runs one episode under a bang-bang controller (full speed toward the
/// target) and returns its summary.
///
/// A simulator shutdown mid-episode is not an error here: the report simply
/// carries what was achieved up to that point.
///
/// # Errors
///
/// Returns protocol or encode errors from the environment.
pub fn run_episode(tick_limit: u64, config: &ProtocolConfig) -> Result<EpisodeReport> {
    let mut env = ScoreLog::new(build_env(1.0, tick_limit, config));
    let mut observation = env.reset()?;
    let mut steps = 0;
    let mut done = false;

    while steps < config.step_cap {
        let action = [if observation[0] < observation[1] { 1.0 } else { -1.0 }];
        match env.step(&action) {
            Ok(step) => {
                observation = step.observation;
                steps += 1;
                if step.done {
                    done = true;
                    break;
                }
            }
            Err(EnvError::SessionEnded) => {
                tracing::info!("simulator ended mid-episode after {steps} steps");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let report = EpisodeReport {
        steps,
        score: env.score(),
        final_distance: (observation[0] - observation[1]).abs(),
        done,
    };
    tracing::info!(?report, "episode complete");
    Ok(report)
}

/// Evolves linear policies against the demo environment and returns the best
/// fitness of the final generation.
///
/// # Errors
///
/// Any environment error aborts the session, including simulator shutdown —
/// the optimizer has no notion of a partial generation.
pub fn run_evolution(
    generations: u32,
    population: usize,
    config: &ProtocolConfig,
) -> Result<f32> {
    let mut env = build_env(1.0, u64::MAX, config);
    let mut evolution = Evolution::new(
        EvolutionConfig {
            population,
            step_cap: config.step_cap,
            ..EvolutionConfig::default()
        },
        2,
        1,
    );
    let mut best = f32::NEG_INFINITY;
    for _ in 0..generations {
        best = evolution.run_generation(&mut env)?.best_fitness;
    }
    Ok(best)
}
