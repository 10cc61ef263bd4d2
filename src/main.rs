//! Retirement Sim CLI
//!
//! Runs one Monte Carlo batch for a single plan and prints a text report,
//! or JSON for API integration via --json

use anyhow::Context;
use clap::Parser;
use retirement_sim::report::{render_report, write_paths_csv, Verdict};
use retirement_sim::simulation::{AggregateSummary, DEFAULT_PATH_SAMPLE_LIMIT, DEFAULT_RUN_COUNT};
use retirement_sim::{EngineConfig, MonteCarloEngine, PlanParameters};
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

/// Monte Carlo retirement plan simulator
#[derive(Debug, Parser)]
#[command(name = "retirement_sim", version, about)]
struct Cli {
    /// Current age in years
    #[arg(long, default_value_t = 40)]
    current_age: u32,

    /// Target retirement age
    #[arg(long, default_value_t = 60)]
    retirement_age: u32,

    /// Years the funds should last after retirement
    #[arg(long, default_value_t = 30)]
    post_retirement_years: u32,

    /// Savings already accumulated
    #[arg(long, default_value_t = 50_000.0)]
    current_savings: f64,

    /// Monthly contribution until retirement
    #[arg(long, default_value_t = 100.0)]
    monthly_saving: f64,

    /// Expected monthly expenses after retirement
    #[arg(long, default_value_t = 250.0)]
    monthly_expenses: f64,

    /// Annual fixed income after retirement (pension etc.)
    #[arg(long, default_value_t = 1_200.0)]
    annual_fixed_income: f64,

    /// Mean annual investment return, percent
    #[arg(long, default_value_t = 5.0)]
    annual_return_pct: f64,

    /// Mean annual inflation, percent
    #[arg(long, default_value_t = 2.0)]
    inflation_pct: f64,

    /// Half-width of the uniform return band (decimal)
    #[arg(long, default_value_t = 0.10)]
    return_volatility: f64,

    /// Half-width of the uniform inflation band (decimal)
    #[arg(long, default_value_t = 0.01)]
    inflation_volatility: f64,

    /// Number of simulation runs
    #[arg(long, default_value_t = DEFAULT_RUN_COUNT)]
    runs: usize,

    /// Base seed for reproducible batches
    #[arg(long)]
    seed: Option<u64>,

    /// Retained sample paths per outcome kind
    #[arg(long, default_value_t = DEFAULT_PATH_SAMPLE_LIMIT)]
    path_samples: usize,

    /// Run scenarios across all cores instead of sequentially
    #[arg(long)]
    parallel: bool,

    /// Histogram bins in the text report
    #[arg(long, default_value_t = 20)]
    bins: usize,

    /// Emit the result as JSON instead of a text report
    #[arg(long)]
    json: bool,

    /// Write retained sample paths to this CSV file
    #[arg(long)]
    paths_csv: Option<PathBuf>,
}

impl Cli {
    fn to_params(&self) -> PlanParameters {
        PlanParameters {
            current_age: self.current_age,
            retirement_age: self.retirement_age,
            end_age: self.retirement_age + self.post_retirement_years,
            current_savings: self.current_savings,
            pre_retirement_monthly_saving: self.monthly_saving,
            monthly_expenses: self.monthly_expenses,
            annual_fixed_income: self.annual_fixed_income,
            mean_annual_return: self.annual_return_pct / 100.0,
            mean_annual_inflation: self.inflation_pct / 100.0,
            return_volatility: self.return_volatility,
            inflation_volatility: self.inflation_volatility,
        }
    }
}

#[derive(Serialize)]
struct SimulationResponse {
    success_rate: f64,
    verdict: &'static str,
    seed: u64,
    summary: AggregateSummary,
    depletion_year_offsets: Vec<u32>,
    execution_time_ms: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let params = cli.to_params();

    let engine = MonteCarloEngine::new(
        params.clone(),
        EngineConfig {
            run_count: cli.runs,
            path_sample_limit: cli.path_samples,
            seed: cli.seed,
        },
    )
    .context("invalid configuration")?;
    let seed = engine.base_seed();

    let start = Instant::now();
    let result = if cli.parallel {
        engine.run_parallel()?
    } else if cli.json {
        engine.run()?
    } else {
        // Progress at decile boundaries only, to avoid drowning the report
        let mut last_decile = 0;
        engine.run_with_progress(|fraction| {
            let decile = (fraction * 10.0) as u32;
            if decile > last_decile {
                last_decile = decile;
                eprintln!("  {:>3}% of {} runs complete", decile * 10, cli.runs);
            }
        })?
    };
    let execution_time_ms = start.elapsed().as_millis() as u64;

    if cli.json {
        let response = SimulationResponse {
            success_rate: result.success_rate,
            verdict: Verdict::from_success_rate(result.success_rate).label(),
            seed,
            summary: result.summary(),
            depletion_year_offsets: result.depletion_year_offsets.clone(),
            execution_time_ms,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("Retirement Sim v{}", env!("CARGO_PKG_VERSION"));
        println!("Seed: {}\n", seed);
        print!("{}", render_report(&result, &params, cli.bins));
        println!("\nCompleted {} runs in {} ms", cli.runs, execution_time_ms);
    }

    if let Some(path) = &cli.paths_csv {
        let mut file =
            File::create(path).with_context(|| format!("unable to create {}", path.display()))?;
        write_paths_csv(&mut file, &result)?;
        println!("Sample paths written to: {}", path.display());
    }

    Ok(())
}
