use thiserror::Error;

use super::types::PlannerInputs;

pub const MAX_YEARS: u32 = 100;

/// Rejections for free-form numeric entry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be between 0 and 100 percent, got {percent}")]
    RateOutOfRange { field: &'static str, percent: f64 },

    #[error("{field} must be between 1 and {max}, got {value}")]
    YearsOutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },
}

pub fn validate_inputs(inputs: &PlannerInputs) -> Result<(), InputError> {
    if !inputs.current_annual_spending.is_finite() {
        return Err(InputError::NotFinite {
            field: "currentAnnualSpending",
        });
    }
    if inputs.current_annual_spending < 0.0 {
        return Err(InputError::Negative {
            field: "currentAnnualSpending",
            value: inputs.current_annual_spending,
        });
    }

    for (field, rate) in [
        ("inflationRate", inputs.inflation_rate),
        ("interestRate", inputs.interest_rate),
    ] {
        if !rate.is_finite() {
            return Err(InputError::NotFinite { field });
        }
        if !(0.0..1.0).contains(&rate) {
            return Err(InputError::RateOutOfRange {
                field,
                percent: rate * 100.0,
            });
        }
    }

    for (field, value) in [
        ("yearsToRetirement", inputs.years_to_retirement),
        ("retirementDurationYears", inputs.retirement_duration_years),
    ] {
        if !(1..=MAX_YEARS).contains(&value) {
            return Err(InputError::YearsOutOfRange {
                field,
                value,
                max: MAX_YEARS,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_inputs(&PlannerInputs::default()), Ok(()));
    }

    #[test]
    fn zero_spending_and_zero_rates_are_valid() {
        let inputs = PlannerInputs {
            current_annual_spending: 0.0,
            inflation_rate: 0.0,
            interest_rate: 0.0,
            ..PlannerInputs::default()
        };
        assert_eq!(validate_inputs(&inputs), Ok(()));
    }

    #[test]
    fn rejects_negative_spending() {
        let inputs = PlannerInputs {
            current_annual_spending: -1.0,
            ..PlannerInputs::default()
        };
        let err = validate_inputs(&inputs).expect_err("must reject negative spending");
        assert!(err.to_string().contains("currentAnnualSpending"));
    }

    #[test]
    fn rejects_non_finite_values() {
        let inputs = PlannerInputs {
            interest_rate: f64::NAN,
            ..PlannerInputs::default()
        };
        assert_eq!(
            validate_inputs(&inputs),
            Err(InputError::NotFinite {
                field: "interestRate"
            })
        );
    }

    #[test]
    fn rejects_rates_outside_unit_interval() {
        let negative = PlannerInputs {
            inflation_rate: -0.01,
            ..PlannerInputs::default()
        };
        let err = validate_inputs(&negative).expect_err("must reject negative inflation");
        assert!(err.to_string().contains("inflationRate"));

        let huge = PlannerInputs {
            interest_rate: 1.0,
            ..PlannerInputs::default()
        };
        let err = validate_inputs(&huge).expect_err("must reject 100% interest");
        assert!(err.to_string().contains("interestRate"));
    }

    #[test]
    fn rejects_years_out_of_range() {
        let zero = PlannerInputs {
            years_to_retirement: 0,
            ..PlannerInputs::default()
        };
        let err = validate_inputs(&zero).expect_err("must reject zero years");
        assert!(err.to_string().contains("yearsToRetirement"));

        let long = PlannerInputs {
            retirement_duration_years: MAX_YEARS + 1,
            ..PlannerInputs::default()
        };
        let err = validate_inputs(&long).expect_err("must reject long retirement");
        assert!(err.to_string().contains("retirementDurationYears"));
    }
}
