// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.

#[cfg(test)]
mod tests;

use std::ops::Range;

use hifitime::Epoch;
use log::warn;
use ndarray::prelude::*;

use crate::constants::{EDGE_RMS_MIN_CHANNELS, EDGE_RMS_WINDOW};

/// Get the average MJD of the supplied epochs. Returns `None` if there are no
/// epochs.
pub(crate) fn average_mjd<'a, I: IntoIterator<Item = &'a Epoch>>(epochs: I) -> Option<f64> {
    let (sum, count) = epochs
        .into_iter()
        .fold((0.0, 0_usize), |(sum, count), e| {
            (sum + e.to_mjd_utc_days(), count + 1)
        });
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// The index of the largest value. NaNs are never selected unless every
/// value is NaN, in which case 0 is returned.
pub(crate) fn argmax(values: ArrayView1<f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

/// Elementwise mean of equally-sized spectra. If there aren't any, a zero
/// vector with `len` elements is returned.
pub(crate) fn mean_spectrum(spectra: &[Array1<f64>], len: usize) -> Array1<f64> {
    match spectra.split_first() {
        None => Array1::zeros(len),
        Some((first, rest)) => {
            let mut sum = first.clone();
            for s in rest {
                sum += s;
            }
            sum / spectra.len() as f64
        }
    }
}

/// Root-mean-square of all values.
pub fn rms(data: ArrayView1<f64>) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    (data.iter().map(|v| v * v).sum::<f64>() / data.len() as f64).sqrt()
}

/// Root-mean-square of the two edge windows of a spectrum, which are assumed
/// to be signal-free. Spectra shorter than 1024 channels don't have an edge
/// RMS.
pub fn edge_rms(data: ArrayView1<f64>) -> Option<f64> {
    let len = data.len();
    if len < EDGE_RMS_MIN_CHANNELS {
        return None;
    }
    let (inner, outer) = EDGE_RMS_WINDOW;
    let mut sum = 0.0;
    let mut count = 0;
    for window in [inner..outer, len - outer..len - inner] {
        let slice = data.slice(s![window]);
        sum += slice.iter().map(|v| v * v).sum::<f64>();
        count += slice.len();
    }
    Some((sum / count as f64).sqrt())
}

/// Signal-to-noise ratio of a reduced spectrum; the peak over the edge RMS.
pub fn snr(data: ArrayView1<f64>) -> Option<f64> {
    let noise = edge_rms(data)?;
    let peak = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(peak / noise)
}

/// Blank each range by drawing a straight line between the values at its
/// two ends. The value at `range.end` is used as the right-hand anchor but
/// isn't itself modified, so excised regions are flattened rather than
/// smoothed.
pub fn interpolate_ranges(mut data: ArrayViewMut1<f64>, ranges: &[Range<usize>]) {
    let len = data.len();
    for range in ranges {
        if range.start >= range.end {
            continue;
        }
        if range.end >= len {
            warn!(
                "Cannot interpolate over channels {}..{}; the spectrum has only {len} channels",
                range.start, range.end
            );
            continue;
        }

        let (x1, y1) = (range.start as f64, data[range.start]);
        let (x2, y2) = (range.end as f64, data[range.end]);
        let slope = (y1 - y2) / (x1 - x2);
        let intercept = y1 - slope * x1;
        for j in range.clone() {
            data[j] = slope * j as f64 + intercept;
        }
    }
}
