//! Stackable wrappers over the environment capability set.
//!
//! Each wrapper holds exactly one inner environment and forwards the full
//! contract unchanged, injecting side effects strictly around the forwarded
//! call. Stacking any number of them leaves the `(observation, reward,
//! done, info)` tuples of the innermost environment untouched.

use crate::{EnvError, Environment, Step};

/// Records per-step and per-episode score metrics through `tracing`.
///
/// Keeps a cumulative score for the running episode and a history of final
/// episode scores, with windowed averages for a coarse learning curve.
pub struct ScoreLog<E> {
    inner: E,
    episode: u64,
    steps: u64,
    score: f32,
    history: Vec<f32>,
}

impl<E: Environment> ScoreLog<E> {
    /// Wraps `inner` with score recording.
    #[must_use]
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            episode: 0,
            steps: 0,
            score: 0.0,
            history: Vec::new(),
        }
    }

    /// Cumulative reward of the episode in progress.
    #[must_use]
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Final scores of completed episodes, oldest first.
    #[must_use]
    pub fn history(&self) -> &[f32] {
        &self.history
    }

    /// Mean of the last `window` episode scores, if that many have finished.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn windowed_average(&self, window: usize) -> Option<f32> {
        if window == 0 || self.history.len() < window {
            return None;
        }
        let tail = &self.history[self.history.len() - window..];
        Some(tail.iter().sum::<f32>() / window as f32)
    }

    /// Consumes the wrapper, returning the inner environment.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Environment> Environment for ScoreLog<E> {
    fn reset(&mut self) -> Result<Vec<f32>, EnvError> {
        let observation = self.inner.reset()?;
        if self.steps > 0 {
            tracing::info!(
                episode = self.episode,
                steps = self.steps,
                score = self.score,
                "episode finished"
            );
            self.history.push(self.score);
        }
        self.episode += 1;
        self.steps = 0;
        self.score = 0.0;
        Ok(observation)
    }

    fn step(&mut self, action: &[f32]) -> Result<Step, EnvError> {
        let step = self.inner.step(action)?;
        self.steps += 1;
        self.score += step.reward;
        tracing::trace!(
            episode = self.episode,
            step = self.steps,
            reward = step.reward,
            done = step.done,
            "step"
        );
        Ok(step)
    }

    fn observations(&mut self) -> Vec<f32> {
        self.inner.observations()
    }

    fn reward(&mut self, action: &[f32]) -> f32 {
        self.inner.reward(action)
    }

    fn is_done(&mut self) -> bool {
        self.inner.is_done()
    }

    fn info(&mut self) -> serde_json::Value {
        self.inner.info()
    }
}

/// Prints actions, rewards and observations for interactive debugging.
pub struct ConsoleTrace<E> {
    inner: E,
    /// Print every step when `true`; otherwise only resets and episode ends.
    pub verbose: bool,
}

impl<E: Environment> ConsoleTrace<E> {
    /// Wraps `inner` with console tracing.
    #[must_use]
    pub fn new(inner: E, verbose: bool) -> Self {
        Self { inner, verbose }
    }

    /// Consumes the wrapper, returning the inner environment.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Environment> Environment for ConsoleTrace<E> {
    fn reset(&mut self) -> Result<Vec<f32>, EnvError> {
        let observation = self.inner.reset()?;
        println!("RESET -> {observation:?}");
        Ok(observation)
    }

    fn step(&mut self, action: &[f32]) -> Result<Step, EnvError> {
        let step = self.inner.step(action)?;
        if self.verbose {
            println!(
                "action: {action:?}  reward: {}  obs: {:?}",
                step.reward, step.observation
            );
        }
        if step.done {
            println!("DONE");
        }
        Ok(step)
    }

    fn observations(&mut self) -> Vec<f32> {
        self.inner.observations()
    }

    fn reward(&mut self, action: &[f32]) -> f32 {
        self.inner.reward(action)
    }

    fn is_done(&mut self) -> bool {
        self.inner.is_done()
    }

    fn info(&mut self) -> serde_json::Value {
        self.inner.info()
    }
}
