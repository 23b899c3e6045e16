// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Least-squares fitting of Chebyshev series.

use log::trace;
use nalgebra::{DMatrix, DVector};
use ndarray::prelude::*;

use super::FitError;

/// A Chebyshev series over a fixed domain. Abscissae are mapped from the
/// domain onto [-1, 1] before the series is evaluated, which keeps
/// high-order fits well conditioned.
#[derive(Debug, Clone, PartialEq)]
pub struct Chebyshev {
    coefficients: Vec<f64>,
    domain: (f64, f64),
}

impl Chebyshev {
    /// Fit a series of order `order` to the points `(x, y)`. `domain` should
    /// cover every abscissa that the series will later be evaluated at.
    pub fn fit(
        x: ArrayView1<f64>,
        y: ArrayView1<f64>,
        order: usize,
        domain: (f64, f64),
        max_condition: f64,
    ) -> Result<Chebyshev, FitError> {
        if x.len() != y.len() {
            return Err(FitError::LengthMismatch {
                abscissa: x.len(),
                data: y.len(),
            });
        }
        if x.len() <= order {
            return Err(FitError::TooFewPoints {
                points: x.len(),
                order,
            });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(FitError::NonFiniteInput);
        }

        let mut series = Chebyshev {
            coefficients: vec![],
            domain,
        };
        let t: Vec<f64> = x.iter().map(|&x| series.scale(x)).collect();
        let a = design_matrix(&t, order);
        let b = DVector::from_iterator(y.len(), y.iter().copied());
        series.coefficients = solve_least_squares(a, b, max_condition)?
            .iter()
            .copied()
            .collect();
        if series.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(FitError::NonFiniteOutput);
        }
        Ok(series)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    fn scale(&self, x: f64) -> f64 {
        let (lo, hi) = self.domain;
        if hi == lo {
            0.0
        } else {
            (2.0 * x - (lo + hi)) / (hi - lo)
        }
    }

    /// Evaluate the series with Clenshaw's recurrence.
    pub fn eval(&self, x: f64) -> f64 {
        let t = self.scale(x);
        let (mut b1, mut b2) = (0.0, 0.0);
        for &c in self.coefficients.iter().skip(1).rev() {
            let b0 = c + 2.0 * t * b1 - b2;
            b2 = b1;
            b1 = b0;
        }
        match self.coefficients.first() {
            Some(c0) => c0 + t * b1 - b2,
            None => 0.0,
        }
    }
}

/// Columns are T_0(t) .. T_order(t).
fn design_matrix(t: &[f64], order: usize) -> DMatrix<f64> {
    let mut a = DMatrix::<f64>::zeros(t.len(), order + 1);
    for (i, &t) in t.iter().enumerate() {
        a[(i, 0)] = 1.0;
        if order >= 1 {
            a[(i, 1)] = t;
        }
        for k in 2..=order {
            a[(i, k)] = 2.0 * t * a[(i, k - 1)] - a[(i, k - 2)];
        }
    }
    a
}

/// Minimise |Ax - b| through the SVD of A. The fit is rejected if the ratio
/// of the largest to the smallest singular value exceeds `max_condition`.
fn solve_least_squares(
    a: DMatrix<f64>,
    b: DVector<f64>,
    max_condition: f64,
) -> Result<DVector<f64>, FitError> {
    let svd = a
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or(FitError::Solver("the SVD didn't converge"))?;
    let s = &svd.singular_values;
    let (s_max, s_min) = (s.max(), s.min());
    let condition = if s_min > 0.0 {
        s_max / s_min
    } else {
        f64::INFINITY
    };
    trace!("Design matrix condition number {condition:e}");
    if !condition.is_finite() || condition > max_condition {
        return Err(FitError::IllConditioned {
            condition,
            limit: max_condition,
        });
    }

    svd.solve(&b, f64::EPSILON * s_max).map_err(FitError::Solver)
}
