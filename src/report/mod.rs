//! Presentation collaborator: verdict bands, text report, path export
//!
//! Consumes [`AggregateResult`] through its plain data contract; nothing in
//! here feeds back into the simulation.

mod histogram;

pub use histogram::Histogram;

use crate::plan::PlanParameters;
use crate::simulation::AggregateResult;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io;

/// Qualitative banner selected from the headline success rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Success rate in [80%, 100%]
    Strong,
    /// [60%, 80%)
    ConsiderAdjustment,
    /// [30%, 60%)
    Risk,
    /// [0%, 30%)
    UrgentAction,
}

impl Verdict {
    pub fn from_success_rate(rate: f64) -> Self {
        if rate >= 0.80 {
            Verdict::Strong
        } else if rate >= 0.60 {
            Verdict::ConsiderAdjustment
        } else if rate >= 0.30 {
            Verdict::Risk
        } else {
            Verdict::UrgentAction
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Strong => "strong",
            Verdict::ConsiderAdjustment => "consider adjustment",
            Verdict::Risk => "risk",
            Verdict::UrgentAction => "urgent action",
        }
    }

    pub fn advisory(&self) -> &'static str {
        match self {
            Verdict::Strong => {
                "This plan looks solid. Keep managing it as you are and the \
                 target horizon is well within reach."
            }
            Verdict::ConsiderAdjustment => {
                "Likely to succeed, but higher savings, lower expenses, or a \
                 later retirement would add a safety margin."
            }
            Verdict::Risk => {
                "Meaningful depletion risk. A stronger rebalance of savings, \
                 expenses, or retirement timing is needed."
            }
            Verdict::UrgentAction => {
                "High risk of running out of funds. Rework the plan now and \
                 consider professional advice."
            }
        }
    }
}

/// Text report for one batch: headline rate, verdict banner, summary
/// statistics, and the two distribution views.
///
/// The depletion view is omitted entirely when no run depleted; non-positive
/// offsets are filtered before binning.
pub fn render_report(result: &AggregateResult, params: &PlanParameters, bins: usize) -> String {
    let summary = result.summary();
    let verdict = Verdict::from_success_rate(result.success_rate);
    let mut out = String::new();

    writeln!(
        out,
        "Probability of funds lasting from retirement at {} to age {}: {:.2}%",
        params.retirement_age,
        params.end_age,
        result.success_rate * 100.0
    )
    .unwrap();
    writeln!(out, "Verdict: {} - {}", verdict.label(), verdict.advisory()).unwrap();
    writeln!(out).unwrap();

    writeln!(out, "Runs:                {}", summary.run_count).unwrap();
    writeln!(out, "  Success:           {}", summary.success_count).unwrap();
    writeln!(out, "  Depleted:          {}", summary.depleted_count).unwrap();
    writeln!(out, "  Partial shortfall: {}", summary.partial_shortfall_count).unwrap();
    writeln!(out, "Final balance mean:   {:.2}", summary.mean_final_balance).unwrap();
    writeln!(out, "Final balance median: {:.2}", summary.median_final_balance).unwrap();
    writeln!(
        out,
        "Final balance range:  {:.2} .. {:.2}",
        summary.min_final_balance, summary.max_final_balance
    )
    .unwrap();

    // Depletion distribution only when runs actually depleted
    let offsets: Vec<f64> = result
        .depletion_year_offsets
        .iter()
        .filter(|&&o| o > 0)
        .map(|&o| o as f64)
        .collect();
    if let Some(hist) = Histogram::from_values(&offsets, bins) {
        writeln!(out).unwrap();
        writeln!(
            out,
            "Years to depletion across {} depleted runs:",
            summary.depleted_count
        )
        .unwrap();
        out.push_str(&hist.render());
    }

    if let Some(hist) = Histogram::from_values(&result.final_balances, bins) {
        writeln!(out).unwrap();
        writeln!(out, "Final balance distribution:").unwrap();
        out.push_str(&hist.render());
    }

    out
}

/// Write retained sample paths in long format for external charting.
///
/// One row per path point: scenario label, outcome kind, age, balance, phase.
pub fn write_paths_csv<W: io::Write>(writer: &mut W, result: &AggregateResult) -> io::Result<()> {
    writeln!(writer, "Scenario,Outcome,Age,Balance,Phase")?;

    for (i, sample) in result.sample_paths.iter().enumerate() {
        let label = format!("{} {}", sample.outcome_kind.as_str(), i + 1);
        for pt in &sample.points {
            writeln!(
                writer,
                "{},{},{},{:.2},{}",
                label,
                sample.outcome_kind.as_str(),
                pt.age,
                pt.balance,
                pt.phase.as_str()
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{EngineConfig, MonteCarloEngine};

    #[test]
    fn test_verdict_bands() {
        assert_eq!(Verdict::from_success_rate(1.0), Verdict::Strong);
        assert_eq!(Verdict::from_success_rate(0.80), Verdict::Strong);
        assert_eq!(
            Verdict::from_success_rate(0.799),
            Verdict::ConsiderAdjustment
        );
        assert_eq!(Verdict::from_success_rate(0.60), Verdict::ConsiderAdjustment);
        assert_eq!(Verdict::from_success_rate(0.599), Verdict::Risk);
        assert_eq!(Verdict::from_success_rate(0.30), Verdict::Risk);
        assert_eq!(Verdict::from_success_rate(0.299), Verdict::UrgentAction);
        assert_eq!(Verdict::from_success_rate(0.0), Verdict::UrgentAction);
    }

    fn run_batch(params: PlanParameters, runs: usize) -> AggregateResult {
        MonteCarloEngine::new(
            params,
            EngineConfig {
                run_count: runs,
                path_sample_limit: 2,
                seed: Some(17),
            },
        )
        .unwrap()
        .run()
        .unwrap()
    }

    #[test]
    fn test_report_contains_headline_and_summary() {
        let params = PlanParameters::default();
        let result = run_batch(params.clone(), 200);
        let report = render_report(&result, &params, 10);

        assert!(report.contains("retirement at 60 to age 90"));
        assert!(report.contains("Runs:                200"));
        assert!(report.contains("Final balance distribution:"));
    }

    #[test]
    fn test_depletion_section_omitted_when_no_depletions() {
        // Enormous savings, no volatility: depletion impossible
        let params = PlanParameters {
            current_savings: 10_000_000.0,
            return_volatility: 0.0,
            inflation_volatility: 0.0,
            ..Default::default()
        };
        let result = run_batch(params.clone(), 50);

        assert_eq!(result.depleted_count, 0);
        let report = render_report(&result, &params, 10);
        assert!(!report.contains("Years to depletion"));
    }

    #[test]
    fn test_depletion_section_present_when_depleted() {
        // No savings flow, heavy expenses: every run depletes
        let params = PlanParameters {
            current_savings: 10_000.0,
            pre_retirement_monthly_saving: 0.0,
            monthly_expenses: 2_000.0,
            annual_fixed_income: 0.0,
            ..Default::default()
        };
        let result = run_batch(params.clone(), 50);

        assert_eq!(result.depleted_count, 50);
        let report = render_report(&result, &params, 10);
        assert!(report.contains("Years to depletion across 50 depleted runs"));
    }

    #[test]
    fn test_paths_csv_format() {
        let params = PlanParameters::default();
        let result = run_batch(params, 100);
        assert!(!result.sample_paths.is_empty());

        let mut buf = Vec::new();
        write_paths_csv(&mut buf, &result).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("Scenario,Outcome,Age,Balance,Phase"));
        let first = lines.next().unwrap();
        assert!(first.starts_with("Success 1,Success,40,"));
        assert!(first.ends_with("PreRetirement"));
    }
}
