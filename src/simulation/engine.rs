//! Monte Carlo batch engine over the scenario simulator

use super::aggregate::{AggregateResult, PathSampler};
use super::scenario::ScenarioSimulator;
use crate::plan::{ConfigError, PlanParameters};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Reference run count
pub const DEFAULT_RUN_COUNT: usize = 5_000;

/// Reference number of retained paths per outcome kind
pub const DEFAULT_PATH_SAMPLE_LIMIT: usize = 5;

/// Batch-level failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("simulation batch cancelled")]
    Cancelled,
}

/// Handle for cooperatively cancelling a running batch.
///
/// Checked between runs, never mid-run, so latency is bounded by one
/// trajectory.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Configuration for a Monte Carlo batch
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of independent scenario runs
    pub run_count: usize,

    /// Retain at most this many full paths per outcome kind
    pub path_sample_limit: usize,

    /// Base seed for reproducible draws; None seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            run_count: DEFAULT_RUN_COUNT,
            path_sample_limit: DEFAULT_PATH_SAMPLE_LIMIT,
            seed: None,
        }
    }
}

/// Runs N independent scenarios and aggregates their outcomes.
///
/// Run `i` always draws from stream `i` of the base seed, so the recorded
/// distributions are identical between [`run`](Self::run) and
/// [`run_parallel`](Self::run_parallel).
#[derive(Debug)]
pub struct MonteCarloEngine {
    simulator: ScenarioSimulator,
    config: EngineConfig,
    base_seed: u64,
    cancel: CancelToken,
}

impl MonteCarloEngine {
    /// Validate the configuration and build the engine.
    ///
    /// All InvalidConfiguration conditions surface here, before any run
    /// starts.
    pub fn new(params: PlanParameters, config: EngineConfig) -> Result<Self, ConfigError> {
        params.validate()?;
        if config.run_count == 0 {
            return Err(ConfigError::InvalidRunCount {
                run_count: config.run_count,
            });
        }

        if params.accumulation_years() == 0 {
            info!(
                "current age {} is at or past retirement age {}; accumulation phase will be skipped",
                params.current_age, params.retirement_age
            );
        }

        let base_seed = config.seed.unwrap_or_else(rand::random);

        Ok(Self {
            simulator: ScenarioSimulator::new(params),
            config,
            base_seed,
            cancel: CancelToken::default(),
        })
    }

    /// The seed this batch draws from (reported for reproducibility)
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    pub fn params(&self) -> &PlanParameters {
        self.simulator.params()
    }

    /// Token for cancelling this engine's batches from another thread
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Independently keyed sub-stream for one run index
    fn run_rng(&self, index: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.base_seed);
        rng.set_stream(index as u64);
        rng
    }

    /// Sequential reference execution in run order 0..N-1
    pub fn run(&self) -> Result<AggregateResult, EngineError> {
        self.run_with_progress(|_| {})
    }

    /// Sequential execution, invoking `progress` with completed/total after
    /// every run
    pub fn run_with_progress<F: FnMut(f64)>(
        &self,
        mut progress: F,
    ) -> Result<AggregateResult, EngineError> {
        let n = self.config.run_count;
        info!("starting {} sequential runs (seed {})", n, self.base_seed);

        let mut sampler = PathSampler::new(self.config.path_sample_limit);
        let mut result = AggregateResult::with_capacity(n);

        for i in 0..n {
            if self.cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            let mut rng = self.run_rng(i);
            let mut outcome = self.simulator.simulate(&mut rng, sampler.wants_more());

            if let Some(points) = outcome.path.take() {
                sampler.offer(outcome.outcome_kind, points);
            }
            result.record(&outcome);
            progress((i + 1) as f64 / n as f64);
        }

        result.finalize(sampler.into_samples());
        info!(
            "batch complete: success rate {:.4}, {} depleted",
            result.success_rate, result.depleted_count
        );
        Ok(result)
    }

    /// Parallel execution across the rayon pool.
    ///
    /// Statistics are identical to [`run`](Self::run) (same per-index
    /// sub-streams, outcomes collected in index order). Path samples are
    /// selected in completion order rather than strict run order.
    pub fn run_parallel(&self) -> Result<AggregateResult, EngineError> {
        self.run_parallel_with_progress(|_| {})
    }

    /// Parallel execution with a thread-safe progress sink.
    ///
    /// The sink is invoked once per completed run, with strictly
    /// increasing fractions. Runs complete in pool order, so the
    /// sink sees completion counts rather than run indices.
    pub fn run_parallel_with_progress<F: Fn(f64) + Sync>(
        &self,
        progress: F,
    ) -> Result<AggregateResult, EngineError> {
        let n = self.config.run_count;
        info!("starting {} parallel runs (seed {})", n, self.base_seed);

        let sampler = Mutex::new(PathSampler::new(self.config.path_sample_limit));
        // Incrementing and reporting under one lock keeps the reported
        // fractions strictly increasing across threads.
        let completed = Mutex::new(0usize);

        let outcomes = (0..n)
            .into_par_iter()
            .map(|i| {
                if self.cancel.is_cancelled() {
                    return Err(EngineError::Cancelled);
                }

                let record = sampler.lock().expect("sampler lock poisoned").wants_more();
                let mut rng = self.run_rng(i);
                let mut outcome = self.simulator.simulate(&mut rng, record);

                if let Some(points) = outcome.path.take() {
                    sampler
                        .lock()
                        .expect("sampler lock poisoned")
                        .offer(outcome.outcome_kind, points);
                }

                {
                    let mut done = completed.lock().expect("progress lock poisoned");
                    *done += 1;
                    progress(*done as f64 / n as f64);
                }
                Ok(outcome)
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        let mut result = AggregateResult::with_capacity(n);
        for outcome in &outcomes {
            result.record(outcome);
        }
        result.finalize(
            sampler
                .into_inner()
                .expect("sampler lock poisoned")
                .into_samples(),
        );

        info!(
            "batch complete: success rate {:.4}, {} depleted",
            result.success_rate, result.depleted_count
        );
        Ok(result)
    }
}
