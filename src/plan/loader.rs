//! Load plan parameter sets from CSV for batch comparison runs

use super::PlanParameters;
use super::params::{DEFAULT_INFLATION_VOLATILITY, DEFAULT_RETURN_VOLATILITY};
use csv::Reader;
use std::error::Error;
use std::path::Path;

/// A labeled plan loaded from a comparison CSV
#[derive(Debug, Clone)]
pub struct NamedPlan {
    pub name: String,
    pub params: PlanParameters,
}

/// Raw CSV row for one plan
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "CurrentAge")]
    current_age: u32,
    #[serde(rename = "RetirementAge")]
    retirement_age: u32,
    #[serde(rename = "EndAge")]
    end_age: u32,
    #[serde(rename = "CurrentSavings")]
    current_savings: f64,
    #[serde(rename = "MonthlySaving")]
    monthly_saving: f64,
    #[serde(rename = "MonthlyExpenses")]
    monthly_expenses: f64,
    #[serde(rename = "AnnualFixedIncome")]
    annual_fixed_income: f64,
    #[serde(rename = "MeanReturn")]
    mean_return: f64,
    #[serde(rename = "MeanInflation")]
    mean_inflation: f64,
    #[serde(rename = "ReturnVolatility")]
    return_volatility: Option<f64>,
    #[serde(rename = "InflationVolatility")]
    inflation_volatility: Option<f64>,
}

impl CsvRow {
    fn to_plan(self) -> Result<NamedPlan, Box<dyn Error>> {
        let params = PlanParameters {
            current_age: self.current_age,
            retirement_age: self.retirement_age,
            end_age: self.end_age,
            current_savings: self.current_savings,
            pre_retirement_monthly_saving: self.monthly_saving,
            monthly_expenses: self.monthly_expenses,
            annual_fixed_income: self.annual_fixed_income,
            mean_annual_return: self.mean_return,
            mean_annual_inflation: self.mean_inflation,
            return_volatility: self.return_volatility.unwrap_or(DEFAULT_RETURN_VOLATILITY),
            inflation_volatility: self
                .inflation_volatility
                .unwrap_or(DEFAULT_INFLATION_VOLATILITY),
        };

        params
            .validate()
            .map_err(|e| format!("plan '{}': {}", self.name, e))?;

        Ok(NamedPlan {
            name: self.name,
            params,
        })
    }
}

/// Load all plans from a CSV file
pub fn load_plans<P: AsRef<Path>>(path: P) -> Result<Vec<NamedPlan>, Box<dyn Error>> {
    let reader = Reader::from_path(path)?;
    read_plans(reader)
}

/// Load plans from any reader (e.g., string buffer, network stream)
pub fn load_plans_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<NamedPlan>, Box<dyn Error>> {
    read_plans(Reader::from_reader(reader))
}

fn read_plans<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<NamedPlan>, Box<dyn Error>> {
    let mut plans = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        plans.push(row.to_plan()?);
    }

    log::debug!("loaded {} plans", plans.len());
    Ok(plans)
}
