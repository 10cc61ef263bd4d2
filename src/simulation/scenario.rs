//! Single-trajectory simulator for one plan

use super::outcome::{OutcomeKind, PathPoint, Phase, ScenarioOutcome};
use crate::plan::PlanParameters;
use rand::Rng;

/// Simulates one full accumulation + decumulation trajectory.
///
/// Pure function of the parameters and the injected random source; holds no
/// state across calls, so one simulator can serve any number of runs.
#[derive(Debug, Clone)]
pub struct ScenarioSimulator {
    params: PlanParameters,
}

impl ScenarioSimulator {
    pub fn new(params: PlanParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PlanParameters {
        &self.params
    }

    /// Run one scenario with draws taken from `rng`.
    ///
    /// When `record_path` is set the outcome carries the full yearly series,
    /// one point per simulated year plus the initial state.
    pub fn simulate<R: Rng + ?Sized>(&self, rng: &mut R, record_path: bool) -> ScenarioOutcome {
        let p = &self.params;

        let mut age = p.current_age;
        let mut balance = p.current_savings;

        let mut path = if record_path {
            Vec::with_capacity(p.horizon_years() as usize + 1)
        } else {
            Vec::new()
        };

        // Initial state. Tagged post-retirement when accumulation is skipped
        // so a zero-length accumulation leaves no pre-retirement samples.
        if record_path {
            let phase = if age >= p.retirement_age {
                Phase::PostRetirement
            } else {
                Phase::PreRetirement
            };
            path.push(PathPoint { age, balance, phase });
        }

        // Accumulation: contribute, then grow at the sampled return
        for _ in 0..p.accumulation_years() {
            let r = draw(rng, p.mean_annual_return, p.return_volatility);
            balance = (balance + p.annual_saving()) * (1.0 + r);
            age += 1;
            if record_path {
                path.push(PathPoint {
                    age,
                    balance,
                    phase: Phase::PreRetirement,
                });
            }
        }

        // Decumulation: inflate expenses, withdraw net of fixed income, then
        // grow whatever survives the withdrawal
        let mut annual_expenses = p.initial_annual_expenses();
        let mut depletion_year_offset = None;

        while balance > 0.0 && age < p.end_age {
            let r = draw(rng, p.mean_annual_return, p.return_volatility);
            let infl = draw(rng, p.mean_annual_inflation, p.inflation_volatility);

            let inflated_expenses = annual_expenses * (1.0 + infl);
            // May be negative: fixed income above expenses is a net surplus
            let net_draw = inflated_expenses - p.annual_fixed_income;
            balance -= net_draw;
            age += 1;

            if balance <= 0.0 {
                // Clamp at the phase boundary; no growth in the depleting year
                balance = 0.0;
                if record_path {
                    path.push(PathPoint {
                        age,
                        balance: 0.0,
                        phase: Phase::PostRetirement,
                    });
                }
                depletion_year_offset = Some(age - p.retirement_age);
                break;
            }

            balance *= 1.0 + r;
            annual_expenses = inflated_expenses;
            if record_path {
                path.push(PathPoint {
                    age,
                    balance,
                    phase: Phase::PostRetirement,
                });
            }
        }

        let (outcome_kind, final_balance) = if depletion_year_offset.is_some() {
            (OutcomeKind::Depleted, 0.0)
        } else if age >= p.end_age && balance > 0.0 {
            (OutcomeKind::Success, balance)
        } else {
            // Funds positive but horizon not reached, or a zero balance that
            // never entered the withdrawal loop
            (OutcomeKind::PartialShortfall, balance.max(0.0))
        };

        ScenarioOutcome {
            final_balance,
            outcome_kind,
            depletion_year_offset,
            path: record_path.then_some(path),
        }
    }
}

/// Uniform draw over `mean +/- half_width`; degenerates to `mean` when the
/// half-width is zero
fn draw<R: Rng + ?Sized>(rng: &mut R, mean: f64, half_width: f64) -> f64 {
    rng.random_range(mean - half_width..=mean + half_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn deterministic_params() -> PlanParameters {
        // Reference scenario with both volatilities zeroed out
        PlanParameters {
            return_volatility: 0.0,
            inflation_volatility: 0.0,
            ..Default::default()
        }
    }

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn test_reference_scenario_reproducible() {
        // current_age=40, retirement=60, end=90, savings=50000, saving=100/mo,
        // expenses=250/mo, fixed income=1200/yr, return=5%, inflation=2%
        let sim = ScenarioSimulator::new(deterministic_params());

        let first = sim.simulate(&mut rng(1), true);
        let second = sim.simulate(&mut rng(99), true);

        // Zero volatility makes the draws irrelevant: outcomes must be identical
        assert_eq!(first.outcome_kind, second.outcome_kind);
        assert_eq!(first.final_balance, second.final_balance);
        assert_eq!(first.path, second.path);

        // Must terminate either at age 90 with funds or earlier clamped to 0
        match first.outcome_kind {
            OutcomeKind::Success => {
                assert!(first.final_balance > 0.0);
                assert_eq!(first.path.as_ref().unwrap().last().unwrap().age, 90);
            }
            OutcomeKind::Depleted => {
                assert_eq!(first.final_balance, 0.0);
                assert_eq!(first.path.as_ref().unwrap().last().unwrap().balance, 0.0);
            }
            OutcomeKind::PartialShortfall => panic!("unexpected partial shortfall"),
        }
    }

    #[test]
    fn test_accumulation_runs_exactly_twenty_years() {
        let sim = ScenarioSimulator::new(deterministic_params());
        let outcome = sim.simulate(&mut rng(7), true);
        let path = outcome.path.unwrap();

        let pre_count = path
            .iter()
            .filter(|pt| pt.phase == Phase::PreRetirement)
            .count();
        // Initial state plus one sample per accumulation year
        assert_eq!(pre_count, 21);
        assert_eq!(path[20].age, 60);
    }

    #[test]
    fn test_accumulation_formula() {
        // One accumulation year, deterministic: (savings + 12*monthly) * 1.05
        let params = PlanParameters {
            current_age: 59,
            retirement_age: 60,
            end_age: 90,
            ..deterministic_params()
        };
        let sim = ScenarioSimulator::new(params);
        let outcome = sim.simulate(&mut rng(0), true);
        let path = outcome.path.unwrap();

        assert_relative_eq!(path[1].balance, (50_000.0 + 1_200.0) * 1.05);
    }

    #[test]
    fn test_path_ages_strictly_increasing() {
        let sim = ScenarioSimulator::new(PlanParameters::default());

        for seed in 0..50 {
            let outcome = sim.simulate(&mut rng(seed), true);
            let path = outcome.path.unwrap();

            assert_eq!(path[0].age, 40);
            for pair in path.windows(2) {
                assert_eq!(pair[1].age, pair[0].age + 1);
            }
            for pt in &path {
                assert!(pt.balance >= 0.0);
            }
        }
    }

    #[test]
    fn test_wide_valid_band_keeps_balances_non_negative() {
        // Widest bands validate() accepts: yearly losses can approach but
        // never reach -100%, so no recorded balance goes negative
        let params = PlanParameters {
            mean_annual_return: 0.05,
            return_volatility: 1.04,
            mean_annual_inflation: 0.02,
            inflation_volatility: 1.01,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
        let sim = ScenarioSimulator::new(params);

        for seed in 0..50 {
            let outcome = sim.simulate(&mut rng(seed), true);
            assert!(outcome.final_balance >= 0.0);
            for pt in &outcome.path.unwrap() {
                assert!(pt.balance >= 0.0);
            }
        }
    }

    #[test]
    fn test_no_pre_retirement_entries_when_already_retired() {
        let params = PlanParameters {
            current_age: 65,
            retirement_age: 60,
            ..Default::default()
        };
        let sim = ScenarioSimulator::new(params);
        let outcome = sim.simulate(&mut rng(3), true);
        let path = outcome.path.unwrap();

        assert!(path.iter().all(|pt| pt.phase == Phase::PostRetirement));
    }

    #[test]
    fn test_depletion_in_first_retirement_year() {
        // 1000 at retirement against 12000/yr expenses: gone in year one
        let params = PlanParameters {
            current_savings: 1_000.0,
            pre_retirement_monthly_saving: 0.0,
            monthly_expenses: 1_000.0,
            annual_fixed_income: 0.0,
            mean_annual_return: 0.0,
            mean_annual_inflation: 0.0,
            ..deterministic_params()
        };
        let sim = ScenarioSimulator::new(params);
        let outcome = sim.simulate(&mut rng(11), true);

        assert_eq!(outcome.outcome_kind, OutcomeKind::Depleted);
        assert_eq!(outcome.depletion_year_offset, Some(1));
        assert_eq!(outcome.final_balance, 0.0);

        let last = *outcome.path.unwrap().last().unwrap();
        assert_eq!(last.age, 61);
        assert_eq!(last.balance, 0.0);
        assert_eq!(last.phase, Phase::PostRetirement);
    }

    #[test]
    fn test_zero_balance_is_partial_shortfall() {
        // Never enters the withdrawal loop; not depleted, not a success
        let params = PlanParameters {
            current_savings: 0.0,
            pre_retirement_monthly_saving: 0.0,
            ..deterministic_params()
        };
        let sim = ScenarioSimulator::new(params);
        let outcome = sim.simulate(&mut rng(5), false);

        assert_eq!(outcome.outcome_kind, OutcomeKind::PartialShortfall);
        assert_eq!(outcome.final_balance, 0.0);
        assert_eq!(outcome.depletion_year_offset, None);
        assert!(outcome.path.is_none());
    }

    #[test]
    fn test_negative_returns_applied_not_rejected() {
        let params = PlanParameters {
            mean_annual_return: -0.05,
            monthly_expenses: 0.0,
            annual_fixed_income: 0.0,
            pre_retirement_monthly_saving: 0.0,
            ..deterministic_params()
        };
        let sim = ScenarioSimulator::new(params);
        let outcome = sim.simulate(&mut rng(2), false);

        // 50 years of -5% with no cashflows in or out
        assert_relative_eq!(
            outcome.final_balance,
            50_000.0 * 0.95_f64.powi(50),
            max_relative = 1e-12
        );
        assert_eq!(outcome.outcome_kind, OutcomeKind::Success);
    }

    #[test]
    fn test_fixed_income_surplus_grows_balance() {
        // Fixed income above expenses: the net draw is a net deposit
        let params = PlanParameters {
            monthly_expenses: 100.0,
            annual_fixed_income: 10_000.0,
            mean_annual_return: 0.0,
            mean_annual_inflation: 0.0,
            pre_retirement_monthly_saving: 0.0,
            ..deterministic_params()
        };
        let sim = ScenarioSimulator::new(params);
        let outcome = sim.simulate(&mut rng(4), false);

        assert_eq!(outcome.outcome_kind, OutcomeKind::Success);
        // 30 retirement years, each adding 10000 - 1200 of surplus
        assert_relative_eq!(outcome.final_balance, 50_000.0 + 30.0 * 8_800.0);
    }

    #[test]
    fn test_draw_respects_band() {
        let mut r = rng(42);
        for _ in 0..1000 {
            let v = draw(&mut r, 0.05, 0.10);
            assert!((-0.05..=0.15).contains(&v));
        }
        // Degenerate band returns the mean exactly
        assert_eq!(draw(&mut r, 0.05, 0.0), 0.05);
    }
}
