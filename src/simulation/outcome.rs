//! Outcome data contract produced by scenario runs

use serde::{Deserialize, Serialize};

/// How a single simulated trajectory ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// Reached the target end age with a positive balance
    Success,
    /// Balance hit zero before the target end age
    Depleted,
    /// Stopped short of the end age with funds still positive, or never
    /// entered decumulation with a positive balance. Unreachable under the
    /// current loop guard except for zero starting balances; kept so a
    /// forced early stop cannot masquerade as success.
    PartialShortfall,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "Success",
            OutcomeKind::Depleted => "Depleted",
            OutcomeKind::PartialShortfall => "PartialShortfall",
        }
    }
}

/// Phase of the plan a path sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    PreRetirement,
    PostRetirement,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::PreRetirement => "PreRetirement",
            Phase::PostRetirement => "PostRetirement",
        }
    }
}

/// One recorded point of a trajectory: end-of-year balance at an age
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub age: u32,
    pub balance: f64,
    pub phase: Phase,
}

/// Result of one full scenario run. Immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Balance at termination; 0 for depleted runs
    pub final_balance: f64,

    /// Classification of the run
    pub outcome_kind: OutcomeKind,

    /// Years since retirement start at which the balance first hit zero;
    /// present only for Depleted runs
    pub depletion_year_offset: Option<u32>,

    /// Full age/balance series including the initial state, when recording
    /// was requested
    pub path: Option<Vec<PathPoint>>,
}
