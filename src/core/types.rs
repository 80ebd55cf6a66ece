use serde::Serialize;

pub const DEFAULT_CURRENT_ANNUAL_SPENDING: f64 = 20_000.0;
pub const DEFAULT_INFLATION_RATE: f64 = 0.03;
pub const DEFAULT_INTEREST_RATE: f64 = 0.08;
pub const DEFAULT_YEARS_TO_RETIREMENT: u32 = 30;
pub const DEFAULT_RETIREMENT_DURATION_YEARS: u32 = 20;

/// The five planner parameters. Rates are fractions, so `0.03` is 3%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerInputs {
    pub current_annual_spending: f64,
    pub inflation_rate: f64,
    pub interest_rate: f64,
    pub years_to_retirement: u32,
    pub retirement_duration_years: u32,
}

impl Default for PlannerInputs {
    fn default() -> Self {
        Self {
            current_annual_spending: DEFAULT_CURRENT_ANNUAL_SPENDING,
            inflation_rate: DEFAULT_INFLATION_RATE,
            interest_rate: DEFAULT_INTEREST_RATE,
            years_to_retirement: DEFAULT_YEARS_TO_RETIREMENT,
            retirement_duration_years: DEFAULT_RETIREMENT_DURATION_YEARS,
        }
    }
}

/// Parameters that the Up/Down controls can target.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Parameter {
    AnnualSpending,
    InflationRate,
    InterestRate,
    YearsUntilRetirement,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub year: u32,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub future_annual_spending: f64,
    pub adjusted_rate: f64,
    pub total_needed_at_retirement: f64,
    pub annual_deposit: f64,
    pub balance_series: Vec<BalancePoint>,
}

/// Resampled curve for display only. `x_values` and `y_values` have equal length.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothedCurve {
    pub x_values: Vec<f64>,
    pub y_values: Vec<f64>,
}

impl SmoothedCurve {
    pub fn len(&self) -> usize {
        self.x_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_values.is_empty()
    }
}
