//! Plan parameter structures and batch loading

pub mod loader;
mod params;

pub use loader::{load_plans, load_plans_from_reader, NamedPlan};
pub use params::{
    ConfigError, PlanParameters, DEFAULT_INFLATION_VOLATILITY, DEFAULT_RETURN_VOLATILITY,
};
