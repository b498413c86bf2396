#![deny(clippy::all, clippy::pedantic)]
//! # Tether
//!
//! Tether bridges a physics-simulation process (an embodied agent, the
//! "robot") with a reinforcement-learning control loop (the "supervisor"),
//! presenting the pair as a single synchronous environment with the
//! conventional reset/step/observe/reward/done/info contract.
//!
//! ## Overview
//!
//! The two processes are coupled only through a byte-oriented transport
//! channel and a shared, externally driven simulation clock. Tether owns
//! neither the physics engine nor the devices — it owns the protocol: the
//! exact per-tick ordering of message emission, clock advance and queue
//! draining that makes two independently stepped processes behave as one
//! deterministic lock-step RL environment.
//!
//! ## Workspace
//!
//! -   [`wire`] — the delimiter-joined UTF-8 message codec.
//! -   [`channel`] — the simulator clock and endpoint traits, plus the
//!     in-process mocks used for tests and this demo harness.
//! -   [`lockstep`] — the handler traits, the supervisor/robot state
//!     machines, and the stackable environment wrappers.
//! -   [`evolve`] — the population-based optimizer adapter that scores
//!     parameter vectors over full episodes.
//!
//! This crate wires all of it together into a small self-contained demo:
//! a 1-D target-seeking robot driven over the loopback channel, runnable as
//! a scripted episode or as an evolution session from the `tether` binary.

pub mod app;
