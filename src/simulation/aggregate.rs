//! Batch aggregation structures and summary statistics

use super::outcome::{OutcomeKind, PathPoint, ScenarioOutcome};
use serde::{Deserialize, Serialize};

/// A retained full trajectory, tagged once with how its run ended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplePath {
    pub outcome_kind: OutcomeKind,
    pub points: Vec<PathPoint>,
}

/// Bounded collector of representative paths: at most `limit` Success and
/// `limit` Depleted trajectories are kept, so memory stays flat however many
/// runs the batch executes.
#[derive(Debug)]
pub struct PathSampler {
    limit: usize,
    success: Vec<SamplePath>,
    depleted: Vec<SamplePath>,
}

impl PathSampler {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            success: Vec::with_capacity(limit),
            depleted: Vec::with_capacity(limit),
        }
    }

    /// Whether another recorded path could still be retained
    pub fn wants_more(&self) -> bool {
        self.success.len() < self.limit || self.depleted.len() < self.limit
    }

    /// Keep the path if its outcome kind still has quota; drop it otherwise
    pub fn offer(&mut self, outcome_kind: OutcomeKind, points: Vec<PathPoint>) {
        let bucket = match outcome_kind {
            OutcomeKind::Success => &mut self.success,
            OutcomeKind::Depleted => &mut self.depleted,
            OutcomeKind::PartialShortfall => return,
        };
        if bucket.len() < self.limit {
            bucket.push(SamplePath {
                outcome_kind,
                points,
            });
        }
    }

    /// All retained paths, successes first
    pub fn into_samples(mut self) -> Vec<SamplePath> {
        self.success.append(&mut self.depleted);
        self.success
    }
}

/// Aggregate output of a Monte Carlo batch, built incrementally across all
/// runs and returned once, fully formed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Configured number of runs; always equals `final_balances.len()`
    pub run_count: usize,

    /// Fraction of runs classified Success
    pub success_rate: f64,

    pub success_count: usize,
    pub depleted_count: usize,
    pub partial_shortfall_count: usize,

    /// Every run's final balance, in run order
    pub final_balances: Vec<f64>,

    /// Depletion offsets (years since retirement start) from Depleted runs,
    /// in run order
    pub depletion_year_offsets: Vec<u32>,

    /// Retained representative trajectories for charting collaborators
    pub sample_paths: Vec<SamplePath>,
}

impl AggregateResult {
    pub(crate) fn with_capacity(run_count: usize) -> Self {
        Self {
            run_count,
            success_rate: 0.0,
            success_count: 0,
            depleted_count: 0,
            partial_shortfall_count: 0,
            final_balances: Vec::with_capacity(run_count),
            depletion_year_offsets: Vec::new(),
            sample_paths: Vec::new(),
        }
    }

    /// Fold one completed run into the aggregate
    pub(crate) fn record(&mut self, outcome: &ScenarioOutcome) {
        self.final_balances.push(outcome.final_balance);
        match outcome.outcome_kind {
            OutcomeKind::Success => self.success_count += 1,
            OutcomeKind::Depleted => {
                self.depleted_count += 1;
                if let Some(offset) = outcome.depletion_year_offset {
                    self.depletion_year_offsets.push(offset);
                }
            }
            OutcomeKind::PartialShortfall => self.partial_shortfall_count += 1,
        }
    }

    /// Close the batch: compute the success rate and attach sampled paths
    pub(crate) fn finalize(&mut self, sample_paths: Vec<SamplePath>) {
        self.success_rate = self.success_count as f64 / self.run_count as f64;
        self.sample_paths = sample_paths;
    }

    /// Distributional summary of the batch
    pub fn summary(&self) -> AggregateSummary {
        let mut sorted = self.final_balances.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean_final_balance =
            self.final_balances.iter().sum::<f64>() / self.run_count.max(1) as f64;
        let median_final_balance = median(&sorted);
        let min_final_balance = sorted.first().copied().unwrap_or(0.0);
        let max_final_balance = sorted.last().copied().unwrap_or(0.0);

        let mean_depletion_offset = if self.depletion_year_offsets.is_empty() {
            None
        } else {
            Some(
                self.depletion_year_offsets
                    .iter()
                    .map(|&o| o as u64)
                    .sum::<u64>() as f64
                    / self.depletion_year_offsets.len() as f64,
            )
        };

        AggregateSummary {
            run_count: self.run_count,
            success_rate: self.success_rate,
            success_count: self.success_count,
            depleted_count: self.depleted_count,
            partial_shortfall_count: self.partial_shortfall_count,
            mean_final_balance,
            median_final_balance,
            min_final_balance,
            max_final_balance,
            mean_depletion_offset,
        }
    }
}

/// Summary statistics for one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub run_count: usize,
    pub success_rate: f64,
    pub success_count: usize,
    pub depleted_count: usize,
    pub partial_shortfall_count: usize,
    pub mean_final_balance: f64,
    pub median_final_balance: f64,
    pub min_final_balance: f64,
    pub max_final_balance: f64,
    /// Mean years-to-depletion across Depleted runs; None when nothing depleted
    pub mean_depletion_offset: Option<f64>,
}

fn median(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn outcome(kind: OutcomeKind, balance: f64, offset: Option<u32>) -> ScenarioOutcome {
        ScenarioOutcome {
            final_balance: balance,
            outcome_kind: kind,
            depletion_year_offset: offset,
            path: None,
        }
    }

    #[test]
    fn test_record_and_summary() {
        let mut result = AggregateResult::with_capacity(4);
        result.record(&outcome(OutcomeKind::Success, 100.0, None));
        result.record(&outcome(OutcomeKind::Depleted, 0.0, Some(5)));
        result.record(&outcome(OutcomeKind::Success, 300.0, None));
        result.record(&outcome(OutcomeKind::Depleted, 0.0, Some(15)));
        result.finalize(Vec::new());

        assert_eq!(result.final_balances, vec![100.0, 0.0, 300.0, 0.0]);
        assert_eq!(result.depletion_year_offsets, vec![5, 15]);
        assert_relative_eq!(result.success_rate, 0.5);

        let summary = result.summary();
        assert_relative_eq!(summary.mean_final_balance, 100.0);
        assert_relative_eq!(summary.median_final_balance, 50.0);
        assert_relative_eq!(summary.min_final_balance, 0.0);
        assert_relative_eq!(summary.max_final_balance, 300.0);
        assert_relative_eq!(summary.mean_depletion_offset.unwrap(), 10.0);
    }

    #[test]
    fn test_partial_shortfall_not_counted_as_success() {
        let mut result = AggregateResult::with_capacity(2);
        result.record(&outcome(OutcomeKind::PartialShortfall, 50.0, None));
        result.record(&outcome(OutcomeKind::Success, 10.0, None));
        result.finalize(Vec::new());

        assert_relative_eq!(result.success_rate, 0.5);
        assert_eq!(result.partial_shortfall_count, 1);
        assert!(result.depletion_year_offsets.is_empty());
        assert_eq!(result.summary().mean_depletion_offset, None);
    }

    #[test]
    fn test_mean_depletion_offset_survives_large_offsets() {
        // Two offsets of u32::MAX overflow a u32 accumulator; the mean
        // must still come out exact
        let mut result = AggregateResult::with_capacity(2);
        result.record(&outcome(OutcomeKind::Depleted, 0.0, Some(u32::MAX)));
        result.record(&outcome(OutcomeKind::Depleted, 0.0, Some(u32::MAX)));
        result.finalize(Vec::new());

        assert_relative_eq!(
            result.summary().mean_depletion_offset.unwrap(),
            u32::MAX as f64
        );
    }

    #[test]
    fn test_path_sampler_bounds() {
        let mut sampler = PathSampler::new(2);
        assert!(sampler.wants_more());

        for _ in 0..5 {
            sampler.offer(OutcomeKind::Success, Vec::new());
        }
        sampler.offer(OutcomeKind::Depleted, Vec::new());
        sampler.offer(OutcomeKind::PartialShortfall, Vec::new());

        assert!(sampler.wants_more()); // depleted quota still open
        let samples = sampler.into_samples();
        assert_eq!(samples.len(), 3);
        assert_eq!(
            samples
                .iter()
                .filter(|s| s.outcome_kind == OutcomeKind::Success)
                .count(),
            2
        );
    }

    #[test]
    fn test_zero_limit_sampler_keeps_nothing() {
        let mut sampler = PathSampler::new(0);
        assert!(!sampler.wants_more());
        sampler.offer(OutcomeKind::Success, Vec::new());
        assert!(sampler.into_samples().is_empty());
    }
}
