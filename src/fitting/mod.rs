// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Baseline fitting.
//!
//! A baseline is a Chebyshev series fitted to the channels of a spectrum that
//! are believed to be free of emission. The fit is evaluated over the whole
//! spectrum and subtracted from it to leave the residual.

mod chebyshev;
mod error;

pub use chebyshev::Chebyshev;
pub use error::FitError;

use std::ops::Range;

use log::trace;
use ndarray::prelude::*;

/// A fitted baseline and what is left after subtracting it.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineFit {
    pub baseline: Array1<f64>,
    pub residuals: Array1<f64>,
}

/// Fit a baseline of order `order` against channel indices. Only the channels
/// `start..end` of each of `bounds` take part in the fit. Parts of bounds that
/// fall outside the spectrum are ignored.
pub fn fit_baseline(
    data: ArrayView1<f64>,
    order: usize,
    bounds: &[Range<usize>],
    max_condition: f64,
) -> Result<BaselineFit, FitError> {
    let channels = Array1::range(0.0, data.len() as f64, 1.0);
    fit_baseline_on_axis(data, channels.view(), order, bounds, max_condition)
}

/// Fit a baseline of order `order` against an arbitrary abscissa, e.g. a
/// velocity axis. The series is scaled over the full extent of `abscissa`.
pub fn fit_baseline_on_axis(
    data: ArrayView1<f64>,
    abscissa: ArrayView1<f64>,
    order: usize,
    bounds: &[Range<usize>],
    max_condition: f64,
) -> Result<BaselineFit, FitError> {
    if data.len() != abscissa.len() {
        return Err(FitError::LengthMismatch {
            abscissa: abscissa.len(),
            data: data.len(),
        });
    }

    if data.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFiniteInput);
    }

    let len = data.len();
    let (x, y): (Vec<f64>, Vec<f64>) = bounds
        .iter()
        .flat_map(|r| r.start.min(len)..r.end.min(len))
        .map(|i| (abscissa[i], data[i]))
        .unzip();
    trace!("Fitting order {order} baseline to {} of {len} channels", x.len());

    let domain = abscissa
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let series = Chebyshev::fit(
        ArrayView1::from(&x),
        ArrayView1::from(&y),
        order,
        domain,
        max_condition,
    )?;

    let baseline = abscissa.mapv(|x| series.eval(x));
    if baseline.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFiniteOutput);
    }
    let residuals = &data - &baseline;
    Ok(BaselineFit {
        baseline,
        residuals,
    })
}

/// Fold a frequency-switched residual onto itself. The two halves of the
/// spectrum carry the same features with opposite signs, so their half
/// difference keeps the line and cancels ripple common to both. A trailing
/// odd channel is dropped.
pub fn halve_residuals(residuals: ArrayView1<f64>) -> Array1<f64> {
    let half = residuals.len() / 2;
    let first = residuals.slice(s![..half]);
    let second = residuals.slice(s![half..2 * half]);
    (&first - &second) / 2.0
}
