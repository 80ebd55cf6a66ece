//! Curve smoothing for the savings chart.
//!
//! The yearly balances are joined with a cubic spline using not-a-knot end
//! conditions and resampled on a dense, evenly spaced grid. Fewer than four
//! control points cannot carry a cubic, so those series use the interpolating
//! polynomial of the highest degree the points support.

use nalgebra::{DMatrix, DVector};
use tracing::warn;

use super::types::{BalancePoint, SmoothedCurve};

/// Minimum number of samples in a smoothed curve.
pub const MIN_SAMPLES: usize = 300;

const SPLINE_MIN_POINTS: usize = 4;

#[derive(Debug, Clone)]
enum Interpolant {
    /// Degree `n - 1` polynomial through `n < 4` points.
    Polynomial { x: Vec<f64>, y: Vec<f64> },
    /// Piecewise cubic stored as second derivatives at each knot.
    Cubic {
        x: Vec<f64>,
        y: Vec<f64>,
        second_derivs: Vec<f64>,
    },
}

impl Interpolant {
    fn fit(x: Vec<f64>, y: Vec<f64>) -> Self {
        if x.len() < SPLINE_MIN_POINTS {
            return Interpolant::Polynomial { x, y };
        }
        let second_derivs = not_a_knot_second_derivatives(&x, &y).unwrap_or_else(|| {
            warn!(points = x.len(), "spline system is singular; drawing straight segments");
            vec![0.0; x.len()]
        });
        Interpolant::Cubic {
            x,
            y,
            second_derivs,
        }
    }

    fn value(&self, xq: f64) -> f64 {
        match self {
            Interpolant::Polynomial { x, y } => lagrange_value(x, y, xq),
            Interpolant::Cubic {
                x,
                y,
                second_derivs,
            } => cubic_value(x, y, second_derivs, xq),
        }
    }
}

/// Fits the balance series and resamples it for display.
///
/// The grid always holds at least [`MIN_SAMPLES`] points and is sized so that
/// every control year is itself a sample, so the drawn curve goes through
/// each yearly balance.
pub fn smooth_curve(series: &[BalancePoint]) -> SmoothedCurve {
    let x = series.iter().map(|p| p.year as f64).collect::<Vec<_>>();
    let y = series.iter().map(|p| p.balance).collect::<Vec<_>>();
    smooth_xy(x, y, MIN_SAMPLES)
}

fn smooth_xy(x: Vec<f64>, y: Vec<f64>, min_samples: usize) -> SmoothedCurve {
    match x.len() {
        0 => SmoothedCurve::default(),
        1 => {
            let count = min_samples.max(1);
            SmoothedCurve {
                x_values: vec![x[0]; count],
                y_values: vec![y[0]; count],
            }
        }
        n => {
            let segments = n - 1;
            let per_segment = min_samples.saturating_sub(1).div_ceil(segments).max(1);
            let steps = segments * per_segment;
            let first = x[0];
            let span = x[n - 1] - first;

            let interpolant = Interpolant::fit(x, y);
            let x_values = (0..=steps)
                .map(|j| first + span * j as f64 / steps as f64)
                .collect::<Vec<_>>();
            let y_values = x_values.iter().map(|&xq| interpolant.value(xq)).collect();
            SmoothedCurve { x_values, y_values }
        }
    }
}

/// Solves for the knot second derivatives of the not-a-knot cubic spline:
/// the third derivative is continuous across the second and the
/// second-to-last knots.
fn not_a_knot_second_derivatives(x: &[f64], y: &[f64]) -> Option<Vec<f64>> {
    let n = x.len();
    let h = x.windows(2).map(|w| w[1] - w[0]).collect::<Vec<_>>();
    let mut a = DMatrix::<f64>::zeros(n, n);
    let mut rhs = DVector::<f64>::zeros(n);

    a[(0, 0)] = h[1];
    a[(0, 1)] = -(h[0] + h[1]);
    a[(0, 2)] = h[0];

    for i in 1..n - 1 {
        a[(i, i - 1)] = h[i - 1];
        a[(i, i)] = 2.0 * (h[i - 1] + h[i]);
        a[(i, i + 1)] = h[i];
        rhs[i] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
    }

    let last = n - 1;
    a[(last, last - 2)] = h[last - 1];
    a[(last, last - 1)] = -(h[last - 2] + h[last - 1]);
    a[(last, last)] = h[last - 2];

    let solution = a.lu().solve(&rhs)?;
    if solution.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(solution.iter().copied().collect())
}

fn cubic_value(x: &[f64], y: &[f64], m: &[f64], xq: f64) -> f64 {
    let n = x.len();
    let idx = x.partition_point(|v| *v <= xq);
    if idx > 0 && x[idx - 1] == xq {
        return y[idx - 1];
    }
    let seg = idx.saturating_sub(1).min(n - 2);

    let (x0, x1) = (x[seg], x[seg + 1]);
    let h = x1 - x0;
    let left = x1 - xq;
    let right = xq - x0;
    m[seg] * left.powi(3) / (6.0 * h)
        + m[seg + 1] * right.powi(3) / (6.0 * h)
        + (y[seg] / h - m[seg] * h / 6.0) * left
        + (y[seg + 1] / h - m[seg + 1] * h / 6.0) * right
}

fn lagrange_value(x: &[f64], y: &[f64], xq: f64) -> f64 {
    if let Some(pos) = x.iter().position(|v| *v == xq) {
        return y[pos];
    }
    x.iter()
        .zip(y)
        .enumerate()
        .map(|(i, (&xi, &yi))| {
            let basis = x
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, &xj)| (xq - xj) / (xi - xj))
                .product::<f64>();
            yi * basis
        })
        .sum()
}
