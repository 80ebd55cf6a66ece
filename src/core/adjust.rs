use super::types::{Direction, Parameter, PlannerInputs};

const SPENDING_STEP: f64 = 1_000.0;
const RATE_STEP: f64 = 0.001;
const YEARS_STEP: u32 = 1;

const MIN_YEARS_TO_RETIREMENT: u32 = 1;

/// Rates are kept on a 1e-9 grid so repeated 0.1pp steps do not drift.
const RATE_ROUNDING: f64 = 1e9;

/// Applies one Up/Down step to `parameter` and returns the new inputs.
///
/// Decreases clamp at the lower bound instead of failing: spending and the
/// two rates stop at zero, years to retirement stops at one.
pub fn apply_adjustment(
    inputs: &PlannerInputs,
    parameter: Parameter,
    direction: Direction,
) -> PlannerInputs {
    let mut next = *inputs;
    match parameter {
        Parameter::AnnualSpending => {
            next.current_annual_spending = match direction {
                Direction::Up => inputs.current_annual_spending + SPENDING_STEP,
                Direction::Down => (inputs.current_annual_spending - SPENDING_STEP).max(0.0),
            };
        }
        Parameter::InflationRate => {
            next.inflation_rate = step_rate(inputs.inflation_rate, direction);
        }
        Parameter::InterestRate => {
            next.interest_rate = step_rate(inputs.interest_rate, direction);
        }
        Parameter::YearsUntilRetirement => {
            next.years_to_retirement = match direction {
                Direction::Up => inputs.years_to_retirement.saturating_add(YEARS_STEP),
                Direction::Down => inputs
                    .years_to_retirement
                    .saturating_sub(YEARS_STEP)
                    .max(MIN_YEARS_TO_RETIREMENT),
            };
        }
    }
    next
}

fn step_rate(rate: f64, direction: Direction) -> f64 {
    let stepped = match direction {
        Direction::Up => rate + RATE_STEP,
        Direction::Down => rate - RATE_STEP,
    };
    ((stepped * RATE_ROUNDING).round() / RATE_ROUNDING).max(0.0)
}
