//! AWS Lambda handler for running retirement simulations
//!
//! Accepts plan parameters and engine knobs as JSON and returns the success
//! rate, verdict, and outcome distributions.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use retirement_sim::report::Verdict;
use retirement_sim::simulation::{
    AggregateSummary, DEFAULT_PATH_SAMPLE_LIMIT, DEFAULT_RUN_COUNT,
};
use retirement_sim::{EngineConfig, MonteCarloEngine, PlanParameters};
use serde::{Deserialize, Serialize};

/// Input configuration for one simulation batch
#[derive(Debug, Deserialize)]
pub struct SimulationRequest {
    /// Current age in years (default: 40)
    #[serde(default = "default_current_age")]
    pub current_age: u32,

    /// Target retirement age (default: 60)
    #[serde(default = "default_retirement_age")]
    pub retirement_age: u32,

    /// Target end age for the horizon (default: 90)
    #[serde(default = "default_end_age")]
    pub end_age: u32,

    /// Savings already accumulated (default: 50000)
    #[serde(default = "default_current_savings")]
    pub current_savings: f64,

    /// Monthly contribution until retirement (default: 100)
    #[serde(default = "default_monthly_saving")]
    pub monthly_saving: f64,

    /// Expected monthly expenses after retirement (default: 250)
    #[serde(default = "default_monthly_expenses")]
    pub monthly_expenses: f64,

    /// Annual fixed income after retirement (default: 1200)
    #[serde(default = "default_annual_fixed_income")]
    pub annual_fixed_income: f64,

    /// Mean annual return as a decimal (default: 0.05)
    #[serde(default = "default_mean_return")]
    pub mean_annual_return: f64,

    /// Mean annual inflation as a decimal (default: 0.02)
    #[serde(default = "default_mean_inflation")]
    pub mean_annual_inflation: f64,

    /// Half-width of the uniform return band (default: 0.10)
    #[serde(default = "default_return_volatility")]
    pub return_volatility: f64,

    /// Half-width of the uniform inflation band (default: 0.01)
    #[serde(default = "default_inflation_volatility")]
    pub inflation_volatility: f64,

    /// Number of simulation runs (default: 5000)
    #[serde(default = "default_runs")]
    pub runs: usize,

    /// Base seed for reproducible results
    #[serde(default)]
    pub seed: Option<u64>,

    /// Retained sample paths per outcome kind (default: 5)
    #[serde(default = "default_path_samples")]
    pub path_samples: usize,
}

fn default_current_age() -> u32 { 40 }
fn default_retirement_age() -> u32 { 60 }
fn default_end_age() -> u32 { 90 }
fn default_current_savings() -> f64 { 50_000.0 }
fn default_monthly_saving() -> f64 { 100.0 }
fn default_monthly_expenses() -> f64 { 250.0 }
fn default_annual_fixed_income() -> f64 { 1_200.0 }
fn default_mean_return() -> f64 { 0.05 }
fn default_mean_inflation() -> f64 { 0.02 }
fn default_return_volatility() -> f64 { 0.10 }
fn default_inflation_volatility() -> f64 { 0.01 }
fn default_runs() -> usize { DEFAULT_RUN_COUNT }
fn default_path_samples() -> usize { DEFAULT_PATH_SAMPLE_LIMIT }

impl SimulationRequest {
    fn to_params(&self) -> PlanParameters {
        PlanParameters {
            current_age: self.current_age,
            retirement_age: self.retirement_age,
            end_age: self.end_age,
            current_savings: self.current_savings,
            pre_retirement_monthly_saving: self.monthly_saving,
            monthly_expenses: self.monthly_expenses,
            annual_fixed_income: self.annual_fixed_income,
            mean_annual_return: self.mean_annual_return,
            mean_annual_inflation: self.mean_annual_inflation,
            return_volatility: self.return_volatility,
            inflation_volatility: self.inflation_volatility,
        }
    }
}

/// Output from one simulation batch
#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    pub success_rate: f64,
    pub verdict: &'static str,
    pub seed: u64,
    pub run_count: usize,
    pub summary: AggregateSummary,
    pub depletion_year_offsets: Vec<u32>,
    pub final_balances: Vec<f64>,
    pub execution_time_ms: u64,
}

fn error_response(status: u16, message: &str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Text(format!(r#"{{"error":"{}"}}"#, message)))
        .unwrap()
}

fn json_response(body: &SimulationResponse) -> Response<Body> {
    Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::Text(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// Lambda handler function
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(Body::Empty)
            .unwrap());
    }

    // Parse request body
    let body = event.body();
    let body_str = match body {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let request: SimulationRequest = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => {
            return Ok(error_response(400, &format!("Invalid JSON: {}", e)));
        }
    };

    let engine = match MonteCarloEngine::new(
        request.to_params(),
        EngineConfig {
            run_count: request.runs,
            path_sample_limit: request.path_samples,
            seed: request.seed,
        },
    ) {
        Ok(engine) => engine,
        Err(e) => {
            return Ok(error_response(400, &format!("Invalid configuration: {}", e)));
        }
    };
    let seed = engine.base_seed();

    let result = match engine.run_parallel() {
        Ok(result) => result,
        Err(e) => {
            return Ok(error_response(500, &format!("Simulation failed: {}", e)));
        }
    };

    let response = SimulationResponse {
        success_rate: result.success_rate,
        verdict: Verdict::from_success_rate(result.success_rate).label(),
        seed,
        run_count: result.run_count,
        summary: result.summary(),
        depletion_year_offsets: result.depletion_year_offsets.clone(),
        final_balances: result.final_balances.clone(),
        execution_time_ms: start.elapsed().as_millis() as u64,
    };

    Ok(json_response(&response))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
