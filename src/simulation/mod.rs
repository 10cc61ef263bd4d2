//! Simulation core: single-trajectory simulator and Monte Carlo batch engine

mod aggregate;
mod engine;
mod outcome;
mod scenario;

pub use aggregate::{AggregateResult, AggregateSummary, SamplePath};
pub use engine::{
    CancelToken, EngineConfig, EngineError, MonteCarloEngine, DEFAULT_PATH_SAMPLE_LIMIT,
    DEFAULT_RUN_COUNT,
};
pub use outcome::{OutcomeKind, PathPoint, Phase, ScenarioOutcome};
pub use scenario::ScenarioSimulator;
