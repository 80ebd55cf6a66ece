mod adjust;
mod engine;
mod error;
mod smoothing;
mod types;

pub use adjust::apply_adjustment;
pub use engine::{
    compute_adjusted_rate, compute_annual_deposit, compute_balance_series, compute_future_spending,
    compute_total_needed, run_projection,
};
pub use error::{InputError, MAX_YEARS, validate_inputs};
pub use smoothing::{MIN_SAMPLES, smooth_curve};
pub use types::{
    BalancePoint, Direction, Parameter, PlannerInputs, ProjectionResult, SmoothedCurve,
};
