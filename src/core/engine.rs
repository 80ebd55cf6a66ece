use tracing::debug;

use super::types::{BalancePoint, PlannerInputs, ProjectionResult};

const RATE_EPSILON: f64 = 1e-9;

/// Annual spending at the retirement date, in nominal terms.
pub fn compute_future_spending(inputs: &PlannerInputs) -> f64 {
    inputs.current_annual_spending
        * (1.0 + inputs.inflation_rate).powf(inputs.years_to_retirement as f64)
}

/// Real rate of return: the interest rate net of inflation.
pub fn compute_adjusted_rate(inputs: &PlannerInputs) -> f64 {
    (1.0 + inputs.interest_rate) / (1.0 + inputs.inflation_rate) - 1.0
}

/// Lump sum needed at retirement to fund constant real spending for the
/// whole retirement duration, discounted at the real rate.
pub fn compute_total_needed(inputs: &PlannerInputs) -> f64 {
    let future_spending = compute_future_spending(inputs);
    let adjusted_rate = compute_adjusted_rate(inputs);
    future_spending * annuity_factor(adjusted_rate, inputs.retirement_duration_years)
}

/// Sinking-fund payment whose annually compounded future value reaches
/// `total_needed` after `years_to_retirement` deposits.
///
/// Zero years leaves no deposit to make, so the payment is 0.
pub fn compute_annual_deposit(inputs: &PlannerInputs, total_needed: f64) -> f64 {
    if inputs.years_to_retirement == 0 {
        return 0.0;
    }
    total_needed / accumulation_factor(inputs.interest_rate, inputs.years_to_retirement)
}

pub fn compute_balance_series(inputs: &PlannerInputs, annual_deposit: f64) -> Vec<BalancePoint> {
    let growth = 1.0 + inputs.interest_rate;
    let mut balance = 0.0;
    (1..=inputs.years_to_retirement)
        .map(|year| {
            balance = balance * growth + annual_deposit;
            BalancePoint { year, balance }
        })
        .collect()
}

pub fn run_projection(inputs: &PlannerInputs) -> ProjectionResult {
    let future_annual_spending = compute_future_spending(inputs);
    let adjusted_rate = compute_adjusted_rate(inputs);
    let total_needed_at_retirement = compute_total_needed(inputs);
    let annual_deposit = compute_annual_deposit(inputs, total_needed_at_retirement);
    let balance_series = compute_balance_series(inputs, annual_deposit);

    debug!(
        years = inputs.years_to_retirement,
        future_annual_spending,
        adjusted_rate,
        total_needed_at_retirement,
        annual_deposit,
        "projection computed"
    );

    ProjectionResult {
        future_annual_spending,
        adjusted_rate,
        total_needed_at_retirement,
        annual_deposit,
        balance_series,
    }
}

/// Present value of one unit paid at the end of each of `periods` years.
fn annuity_factor(rate: f64, periods: u32) -> f64 {
    let n = periods as f64;
    if rate.abs() < RATE_EPSILON {
        return n;
    }
    (1.0 - (1.0 + rate).powf(-n)) / rate
}

/// Future value of one unit deposited at the end of each of `periods` years.
fn accumulation_factor(rate: f64, periods: u32) -> f64 {
    let n = periods as f64;
    if rate.abs() < RATE_EPSILON {
        return n;
    }
    ((1.0 + rate).powf(n) - 1.0) / rate
}
