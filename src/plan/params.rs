//! Plan parameter data structures and validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default half-width of the uniform return sampling band (+/- 10%)
pub const DEFAULT_RETURN_VOLATILITY: f64 = 0.10;

/// Default half-width of the uniform inflation sampling band (+/- 1%)
pub const DEFAULT_INFLATION_VOLATILITY: f64 = 0.01;

/// Validation failure for a plan or engine configuration.
///
/// Surfaced before any simulation run starts; a batch never partially
/// executes on a bad configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("retirement age {retirement_age} exceeds end age {end_age}")]
    RetirementAfterEnd { retirement_age: u32, end_age: u32 },

    #[error("current age {current_age} is at or past end age {end_age}")]
    HorizonExhausted { current_age: u32, end_age: u32 },

    #[error("{field} must be non-negative, got {value}")]
    NegativeAmount { field: &'static str, value: f64 },

    #[error("{field} must be a non-negative half-width, got {value}")]
    NegativeVolatility { field: &'static str, value: f64 },

    #[error("{field} band reaches {lower_edge} at its lower edge; draws must stay above -100%")]
    BandBelowTotalLoss { field: &'static str, lower_edge: f64 },

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("run count must be positive, got {run_count}")]
    InvalidRunCount { run_count: usize },
}

/// Immutable inputs for one retirement plan.
///
/// Constructed once from external input, validated via [`validate`](Self::validate)
/// before simulation, and never mutated afterwards. Monetary amounts share
/// whatever currency unit the caller uses; rates are decimals (0.05 = 5%).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanParameters {
    /// Current age in whole years
    pub current_age: u32,

    /// Target retirement age; accumulation runs until this age
    pub retirement_age: u32,

    /// Target horizon: the plan succeeds if funds last to this age
    pub end_age: u32,

    /// Savings already accumulated at the start of the simulation
    pub current_savings: f64,

    /// Monthly contribution during the accumulation phase
    pub pre_retirement_monthly_saving: f64,

    /// Expected monthly living expenses after retirement
    pub monthly_expenses: f64,

    /// Annual fixed income after retirement (state pension etc.),
    /// offsets inflated expenses
    pub annual_fixed_income: f64,

    /// Mean annual investment return (decimal, may be negative)
    pub mean_annual_return: f64,

    /// Mean annual inflation rate (decimal)
    pub mean_annual_inflation: f64,

    /// Half-width of the uniform band returns are drawn from
    #[serde(default = "default_return_volatility")]
    pub return_volatility: f64,

    /// Half-width of the uniform band inflation is drawn from
    #[serde(default = "default_inflation_volatility")]
    pub inflation_volatility: f64,
}

fn default_return_volatility() -> f64 {
    DEFAULT_RETURN_VOLATILITY
}

fn default_inflation_volatility() -> f64 {
    DEFAULT_INFLATION_VOLATILITY
}

impl Default for PlanParameters {
    /// Reference plan matching the original application's form defaults
    fn default() -> Self {
        Self {
            current_age: 40,
            retirement_age: 60,
            end_age: 90,
            current_savings: 50_000.0,
            pre_retirement_monthly_saving: 100.0,
            monthly_expenses: 250.0,
            annual_fixed_income: 1_200.0,
            mean_annual_return: 0.05,
            mean_annual_inflation: 0.02,
            return_volatility: DEFAULT_RETURN_VOLATILITY,
            inflation_volatility: DEFAULT_INFLATION_VOLATILITY,
        }
    }
}

impl PlanParameters {
    /// Check every invariant the simulator relies on.
    ///
    /// `current_age >= retirement_age` is deliberately accepted: it is a
    /// valid configuration with a zero-iteration accumulation phase.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retirement_age > self.end_age {
            return Err(ConfigError::RetirementAfterEnd {
                retirement_age: self.retirement_age,
                end_age: self.end_age,
            });
        }
        if self.current_age >= self.end_age {
            return Err(ConfigError::HorizonExhausted {
                current_age: self.current_age,
                end_age: self.end_age,
            });
        }

        for (field, value) in [
            ("current_savings", self.current_savings),
            (
                "pre_retirement_monthly_saving",
                self.pre_retirement_monthly_saving,
            ),
            ("monthly_expenses", self.monthly_expenses),
            ("annual_fixed_income", self.annual_fixed_income),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
            if value < 0.0 {
                return Err(ConfigError::NegativeAmount { field, value });
            }
        }

        for (field, value) in [
            ("mean_annual_return", self.mean_annual_return),
            ("mean_annual_inflation", self.mean_annual_inflation),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }

        for (field, value) in [
            ("return_volatility", self.return_volatility),
            ("inflation_volatility", self.inflation_volatility),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
            if value < 0.0 {
                return Err(ConfigError::NegativeVolatility { field, value });
            }
        }

        // A draw of -100% or worse flips balances negative (or makes
        // inflated expenses negative), so the band's lower edge must
        // stay above -1.
        for (field, mean, half_width) in [
            (
                "mean_annual_return",
                self.mean_annual_return,
                self.return_volatility,
            ),
            (
                "mean_annual_inflation",
                self.mean_annual_inflation,
                self.inflation_volatility,
            ),
        ] {
            let lower_edge = mean - half_width;
            if lower_edge <= -1.0 {
                return Err(ConfigError::BandBelowTotalLoss { field, lower_edge });
            }
        }

        Ok(())
    }

    /// Number of accumulation years (zero when already at or past retirement)
    pub fn accumulation_years(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    /// Annual contribution during accumulation
    pub fn annual_saving(&self) -> f64 {
        self.pre_retirement_monthly_saving * 12.0
    }

    /// Annual expenses at the start of decumulation, before any inflation
    pub fn initial_annual_expenses(&self) -> f64 {
        self.monthly_expenses * 12.0
    }

    /// Total simulated years if the plan reaches the full horizon
    pub fn horizon_years(&self) -> u32 {
        self.end_age - self.current_age
    }
}
