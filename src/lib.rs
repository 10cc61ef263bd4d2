//! Retirement Sim - Monte Carlo engine for retirement plan survivability
//!
//! This library provides:
//! - Per-scenario trajectory simulation (accumulation + decumulation phases)
//! - Monte Carlo batch execution with reproducible per-run sub-streams
//! - Success/depletion classification and distributional statistics
//! - A presentation layer of verdict bands, histograms, and path export

pub mod plan;
pub mod report;
pub mod simulation;

// Re-export commonly used types
pub use plan::{ConfigError, PlanParameters};
pub use report::Verdict;
pub use simulation::{
    AggregateResult, EngineConfig, EngineError, MonteCarloEngine, OutcomeKind, ScenarioOutcome,
    ScenarioSimulator,
};
