#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
//! # Tether Population Optimizer
//!
//! Scores parameter vectors by driving full episodes through a lock-step
//! environment and evolves a population of candidates by elitism plus
//! mutation noise.
//!
//! The adapter sits outside the per-tick protocol but depends on its exact
//! step/reset semantics: the single shared environment has no isolation
//! between candidates, so every candidate's episode is consumed completely —
//! one `reset`, then `step` until `done` or the step cap — before the next
//! candidate is scored. Episodes are never interleaved. An error during a
//! candidate's episode is not caught here; it propagates and aborts the
//! whole generation.

use lockstep::{EnvError, Environment};

/// Maps observations to actions under a fixed parameterization.
pub trait Policy {
    /// Chooses an action for the given observation.
    fn act(&self, observation: &[f32]) -> Vec<f32>;
}

/// A single linear layer with bias: `action = W * obs + b`.
///
/// Small enough to evolve directly as a flat parameter vector, standing in
/// for whatever model the caller wants to parameterize.
pub struct LinearPolicy {
    params: Vec<f32>,
    obs_dim: usize,
    act_dim: usize,
}

impl LinearPolicy {
    /// Number of parameters a policy of this shape needs.
    #[must_use]
    pub fn param_count(obs_dim: usize, act_dim: usize) -> usize {
        (obs_dim + 1) * act_dim
    }

    /// Builds a policy from a flat parameter vector laid out as `act_dim`
    /// rows of `obs_dim` weights followed by `act_dim` biases.
    ///
    /// # Panics
    ///
    /// Panics if `params` has the wrong length for the given shape.
    #[must_use]
    pub fn from_params(params: &[f32], obs_dim: usize, act_dim: usize) -> Self {
        assert_eq!(params.len(), Self::param_count(obs_dim, act_dim));
        Self {
            params: params.to_vec(),
            obs_dim,
            act_dim,
        }
    }
}

impl Policy for LinearPolicy {
    fn act(&self, observation: &[f32]) -> Vec<f32> {
        let mut action = vec![0.0; self.act_dim];
        for (o, slot) in action.iter_mut().enumerate() {
            let row = &self.params[o * self.obs_dim..(o + 1) * self.obs_dim];
            let bias = self.params[self.act_dim * self.obs_dim + o];
            let mut sum = bias;
            for (w, x) in row.iter().zip(observation) {
                sum += w * x;
            }
            *slot = sum;
        }
        action
    }
}

/// Runs exactly one full episode and returns the cumulative reward.
///
/// Calls `reset` once, then `step` until `done` or `step_cap` steps.
///
/// # Errors
///
/// Propagates any environment error; nothing is retried.
pub fn score_episode<E, P>(env: &mut E, policy: &P, step_cap: u32) -> Result<f32, EnvError>
where
    E: Environment,
    P: Policy,
{
    let mut observation = env.reset()?;
    let mut total = 0.0;
    for _ in 0..step_cap {
        let action = policy.act(&observation);
        let step = env.step(&action)?;
        total += step.reward;
        observation = step.observation;
        if step.done {
            break;
        }
    }
    Ok(total)
}

/// Evolution parameters.
#[derive(Debug, Clone)]
pub struct EvolutionConfig {
    /// Candidates per generation.
    pub population: usize,
    /// Top candidates carried over unchanged.
    pub elites: usize,
    /// Uniform mutation noise amplitude.
    pub mutation_std: f32,
    /// Per-episode step cap while scoring.
    pub step_cap: u32,
    /// RNG seed; generations are deterministic for a fixed seed.
    pub seed: u64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population: 16,
            elites: 2,
            mutation_std: 0.1,
            step_cap: 1000,
            seed: 0,
        }
    }
}

/// Summary of one scored generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationReport {
    /// Index of the generation just scored, starting at 0.
    pub generation: u32,
    /// Best cumulative reward in the population.
    pub best_fitness: f32,
    /// Mean cumulative reward across the population.
    pub mean_fitness: f32,
}

/// Elitist evolution over flat parameter vectors for a [`LinearPolicy`]
/// shape.
pub struct Evolution {
    config: EvolutionConfig,
    obs_dim: usize,
    act_dim: usize,
    population: Vec<Vec<f32>>,
    generation: u32,
}

impl Evolution {
    /// Seeds the RNG and draws an initial population of uniform random
    /// parameter vectors in `[-1, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if the configuration asks for zero candidates or more elites
    /// than candidates.
    #[must_use]
    pub fn new(config: EvolutionConfig, obs_dim: usize, act_dim: usize) -> Self {
        assert!(config.population > 0, "population must not be empty");
        assert!(
            config.elites < config.population,
            "elites must leave room for offspring"
        );
        fastrand::seed(config.seed);
        let n = LinearPolicy::param_count(obs_dim, act_dim);
        let population = (0..config.population)
            .map(|_| (0..n).map(|_| fastrand::f32() * 2.0 - 1.0).collect())
            .collect();
        Self {
            config,
            obs_dim,
            act_dim,
            population,
            generation: 0,
        }
    }

    /// Best parameter vector of the current population (by the ordering the
    /// last [`Evolution::run_generation`] left behind).
    #[must_use]
    pub fn best(&self) -> &[f32] {
        &self.population[0]
    }

    /// Scores every candidate with one full episode each, strictly in
    /// sequence, then forms the next generation by elitism and mutation.
    ///
    /// # Errors
    ///
    /// An error in any candidate's episode aborts the generation; the
    /// population is left as it was before the call scored it.
    pub fn run_generation<E: Environment>(
        &mut self,
        env: &mut E,
    ) -> Result<GenerationReport, EnvError> {
        let mut scored: Vec<(f32, Vec<f32>)> = Vec::with_capacity(self.population.len());
        for params in &self.population {
            let policy = LinearPolicy::from_params(params, self.obs_dim, self.act_dim);
            let fitness = score_episode(env, &policy, self.config.step_cap)?;
            scored.push((fitness, params.clone()));
        }
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let best_fitness = scored[0].0;
        let mean_fitness =
            scored.iter().map(|(f, _)| f).sum::<f32>() / self.population.len() as f32;
        let report = GenerationReport {
            generation: self.generation,
            best_fitness,
            mean_fitness,
        };
        tracing::info!(
            generation = report.generation,
            best = report.best_fitness,
            mean = report.mean_fitness,
            "generation scored"
        );

        // Elites survive unchanged; the rest are mutated copies of elites.
        let mut next: Vec<Vec<f32>> = scored
            .iter()
            .take(self.config.elites)
            .map(|(_, p)| p.clone())
            .collect();
        while next.len() < self.config.population {
            let parent = &scored[fastrand::usize(..self.config.elites.max(1))].1;
            let child = parent
                .iter()
                .map(|&w| w + (fastrand::f32() * 2.0 - 1.0) * self.config.mutation_std)
                .collect();
            next.push(child);
        }
        self.population = next;
        self.generation += 1;
        Ok(report)
    }
}
