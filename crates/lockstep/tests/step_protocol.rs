mod common;

use channel::mock::{loopback_pair, ScriptedClock};
use channel::Endpoint;
use common::TrackerTask;
use lockstep::{EnvError, Environment, ProtocolConfig, SendOrder, SupervisorEnv, SupervisorTask};
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;
use wire::Message;

fn config(send_order: SendOrder) -> ProtocolConfig {
    ProtocolConfig {
        timestep_ms: Some(32),
        send_order,
        step_cap: 1000,
    }
}

#[test]
fn step_observes_reply_to_current_action() {
    // The peer replies with f(a_t) before advance returns, so the step that
    // sent a_t must observe f(a_t).
    let (sup_end, robot_end) = loopback_pair();
    let clock = ScriptedClock::until(100).with_on_tick(common::echo_robot(robot_end));
    let mut env = SupervisorEnv::new(
        clock,
        sup_end,
        TrackerTask::new(u64::MAX),
        &config(SendOrder::BeforeAdvance),
    );

    let step = env.step(&[1.0, 0.0]).unwrap();
    assert_eq!(step.observation, vec![0.5, 0.0, 1.0]);
    assert_eq!(step.reward, 1.0);
    assert!(!step.done);
    assert_eq!(step.info, json!({ "absorbed": 1 }));
}

#[test]
fn scenario_action_one_zero() {
    // action [1, 0] travels as "1,0"; the peer echoes "0.5,0.5,1".
    let (sup_end, mut robot_end) = loopback_pair();
    robot_end.enable(32);
    let clock = ScriptedClock::until(100).with_on_tick(move |_| {
        while robot_end.queue_length() > 0 {
            let packet = robot_end.receive_next().unwrap();
            assert_eq!(packet, b"1,0");
            robot_end.send(b"0.5,0.5,1");
        }
    });
    let mut env = SupervisorEnv::new(
        clock,
        sup_end,
        TrackerTask::new(u64::MAX),
        &config(SendOrder::BeforeAdvance),
    );

    let step = env.step(&[1.0, 0.0]).unwrap();
    assert_eq!(step.observation, vec![0.5, 0.5, 1.0]);
    assert_eq!(step.reward, 1.0);
    assert!(!step.done);
}

#[test]
fn send_after_advance_delays_peer_view_by_one_tick() {
    let (sup_end, robot_end) = loopback_pair();
    let clock = ScriptedClock::until(100).with_on_tick(common::echo_robot(robot_end));
    let mut env = SupervisorEnv::new(
        clock,
        sup_end,
        TrackerTask::new(u64::MAX),
        &config(SendOrder::AfterAdvance),
    );

    // First step: the peer saw nothing during the tick, observation stays
    // at the last-known (default) values.
    let first = env.step(&[2.0, 4.0]).unwrap();
    assert_eq!(first.observation, vec![0.0, 0.0, 0.0]);

    // Second step: the peer acted on the first action during this tick.
    let second = env.step(&[6.0, 8.0]).unwrap();
    assert_eq!(second.observation, vec![1.0, 2.0, 1.0]);
}

#[test]
fn silent_tick_keeps_last_known_observation() {
    let (sup_end, _robot_end) = loopback_pair();
    let clock = ScriptedClock::until(100);
    let mut env = SupervisorEnv::new(
        clock,
        sup_end,
        TrackerTask::new(u64::MAX),
        &config(SendOrder::BeforeAdvance),
    );

    // Peer never replies: step still returns a full 4-tuple.
    let step = env.step(&[3.0]).unwrap();
    assert_eq!(step.observation, vec![0.0, 0.0, 0.0]);
    assert_eq!(step.reward, 3.0);
    assert!(!step.done);
    assert_eq!(step.info, json!({ "absorbed": 0 }));
}

#[test]
fn multiple_packets_in_one_tick_last_wins() {
    let (sup_end, mut robot_end) = loopback_pair();
    robot_end.enable(32);
    let clock = ScriptedClock::until(100).with_on_tick(move |_| {
        robot_end.send(b"1,1,1");
        robot_end.send(b"2,2,2");
    });
    let mut env = SupervisorEnv::new(
        clock,
        sup_end,
        TrackerTask::new(u64::MAX),
        &config(SendOrder::BeforeAdvance),
    );

    let step = env.step(&[0.0]).unwrap();
    assert_eq!(step.observation, vec![2.0, 2.0, 2.0]);
    // Both packets were consumed, in order; the later one won.
    assert_eq!(step.info, json!({ "absorbed": 2 }));
}

#[test]
fn termination_is_absorbing_for_step_and_reset() {
    let (sup_end, _robot_end) = loopback_pair();
    let clock = ScriptedClock::until(0);
    let mut env = SupervisorEnv::new(
        clock,
        sup_end,
        TrackerTask::new(u64::MAX),
        &config(SendOrder::BeforeAdvance),
    );

    assert!(matches!(env.step(&[1.0]), Err(EnvError::SessionEnded)));
    assert!(matches!(env.step(&[1.0]), Err(EnvError::SessionEnded)));
    assert!(matches!(env.reset(), Err(EnvError::SessionEnded)));
}

#[test]
fn reset_settles_one_tick_and_discards_stale_packets() {
    let (sup_end, mut robot_end) = loopback_pair();
    robot_end.enable(32);
    // A stale fragment from the previous episode is already queued.
    robot_end.send(b"9,9,9");
    let clock = ScriptedClock::until(100);
    let mut env = SupervisorEnv::new(
        clock,
        sup_end,
        TrackerTask::new(u64::MAX),
        &config(SendOrder::BeforeAdvance),
    );

    let observation = env.reset().unwrap();
    assert_eq!(observation, vec![0.0, 0.0, 0.0]);
    // The stale packet was dropped, not absorbed.
    assert_eq!(env.task().absorbed, 0);
    // Silent follow-up step still sees the default values, not "9,9,9".
    let step = env.step(&[0.0]).unwrap();
    assert_eq!(step.observation, vec![0.0, 0.0, 0.0]);
}

#[test]
fn reset_yields_episode_independent_state() {
    let (sup_end, robot_end) = loopback_pair();
    let clock = ScriptedClock::until(1000).with_on_tick(common::echo_robot(robot_end));
    let mut env = SupervisorEnv::new(
        clock,
        sup_end,
        TrackerTask::new(u64::MAX),
        &config(SendOrder::BeforeAdvance),
    );

    let fresh = env.reset().unwrap();
    for _ in 0..10 {
        env.step(&[4.0, 4.0]).unwrap();
    }
    assert_eq!(env.task().steps, 10);
    let again = env.reset().unwrap();
    assert_eq!(again, fresh);
    assert_eq!(env.task().steps, 0);
    assert_eq!(env.last_action(), None);
}

#[test]
fn done_does_not_auto_reset() {
    let (sup_end, robot_end) = loopback_pair();
    let clock = ScriptedClock::until(1000).with_on_tick(common::echo_robot(robot_end));
    let mut env = SupervisorEnv::new(
        clock,
        sup_end,
        TrackerTask::new(2),
        &config(SendOrder::BeforeAdvance),
    );

    assert!(!env.step(&[1.0]).unwrap().done);
    assert!(env.step(&[1.0]).unwrap().done);
    // Stepping past done is the caller's choice; the environment does not
    // reset on its own and the done flag stays up.
    assert!(env.step(&[1.0]).unwrap().done);
}

#[test]
fn encode_error_aborts_the_tick_before_sending() {
    struct BadEncoder(TrackerTask);
    impl SupervisorTask for BadEncoder {
        fn encode_action(&mut self, _action: &[f32]) -> Message {
            Message::Fields(vec![wire::Field::Text("a,b".into())])
        }
        fn absorb_fields(&mut self, fields: &[String]) {
            self.0.absorb_fields(fields);
        }
        fn observations(&mut self) -> Vec<f32> {
            self.0.observations()
        }
        fn reward(&mut self, action: &[f32]) -> f32 {
            self.0.reward(action)
        }
        fn is_done(&mut self) -> bool {
            self.0.is_done()
        }
        fn info(&mut self) -> serde_json::Value {
            self.0.info()
        }
        fn default_observation(&mut self) -> Vec<f32> {
            self.0.default_observation()
        }
    }

    let (sup_end, _robot_end) = loopback_pair();
    let ticks = Rc::new(Cell::new(0u64));
    let tick_count = Rc::clone(&ticks);
    let clock =
        ScriptedClock::until(100).with_on_tick(move |_| tick_count.set(tick_count.get() + 1));
    let mut env = SupervisorEnv::new(
        clock,
        sup_end,
        BadEncoder(TrackerTask::new(u64::MAX)),
        &config(SendOrder::BeforeAdvance),
    );

    assert!(matches!(env.step(&[1.0]), Err(EnvError::Encode(_))));
    // A failed encode does not end the session; the next step may proceed.
    assert!(matches!(env.step(&[1.0]), Err(EnvError::Encode(_))));
    // Neither failed step reached the clock: the tick was aborted before
    // anything was sent or advanced.
    assert_eq!(ticks.get(), 0);
}

#[test]
fn timestep_falls_back_to_basic_timestep() {
    let (sup_end, _robot_end) = loopback_pair();
    let clock = ScriptedClock::until(10);
    let env = SupervisorEnv::new(
        clock,
        sup_end,
        TrackerTask::new(u64::MAX),
        &ProtocolConfig::default(),
    );
    assert_eq!(env.timestep_ms(), 32);
}
