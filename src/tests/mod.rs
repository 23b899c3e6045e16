// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synthetic observations and deterministic classifiers shared by the unit
//! tests.

use hifitime::Epoch;
use ndarray::prelude::*;

use crate::{
    classifier::{BrokenScanClassifier, ChannelAnnotator, ClassifierError},
    constants::NUM_BBCS,
    flagging::ChannelCategory,
    observation::{MergedScan, Observation, Scan, Sexagesimal},
};

pub(crate) const TEST_MJD: f64 = 60_000.25;
pub(crate) const TEST_REST_FREQ: f64 = 6668.518;

/// A smooth bandpass with a positive line a quarter of the way through the
/// band and its frequency-switched negative image three quarters through.
pub(crate) fn synthetic_spectrum(num_channels: usize, scale: f64) -> Array1<f64> {
    let n = num_channels as f64;
    Array1::from_shape_fn(num_channels, |i| {
        let x = i as f64 / n;
        let bandpass = 100.0 + 8.0 * x - 5.0 * x * x;
        let line = |centre: f64| (-((x - centre) / 0.005).powi(2)).exp();
        scale * (bandpass + 3.0 * line(0.25) - 3.0 * line(0.75))
    })
}

/// Raw scan number `index` of a frequency-switched observation.
pub(crate) fn synthetic_scan(index: usize, num_channels: usize) -> Scan {
    let scale = 1.0 + 0.01 * index as f64;
    Scan {
        elevation: 40.0 + index as f64,
        azimuth: 120.0 + 0.5 * index as f64,
        tsys: [50_000.0, 52_000.0, 51_000.0, 53_000.0],
        pols: std::array::from_fn(|i_bbc| synthetic_spectrum(num_channels, scale + i_bbc as f64)),
        rest_freq: [TEST_REST_FREQ; NUM_BBCS],
        bandwidth: [2.0; NUM_BBCS],
        vlsr: [-5.0; NUM_BBCS],
        epoch: Epoch::from_mjd_utc(TEST_MJD + 0.002 * index as f64),
        ra: Sexagesimal {
            major: 6,
            minutes: 8,
            seconds: 53,
        },
        dec: Sexagesimal {
            major: -2,
            minutes: 38,
            seconds: 9,
        },
        source_name: "G345.01+1.79".to_string(),
        iso_time: "2023-02-25T06:00:00".to_string(),
    }
}

/// Pairs of raw scans are "merged" by keeping the first of the pair.
pub(crate) fn keep_first(first: &Scan, _second: &Scan) -> MergedScan {
    MergedScan::new(first.clone())
}

pub(crate) fn synthetic_observation(num_merged: usize, num_channels: usize) -> Observation {
    let scans = (0..2 * num_merged)
        .map(|i| synthetic_scan(i, num_channels))
        .collect();
    Observation::from_raw_scans(scans, false, keep_first).unwrap()
}

/// Calls every scan fine, or every scan broken.
pub(crate) struct FixedVerdict(pub(crate) bool);

impl BrokenScanClassifier for FixedVerdict {
    fn predict(&self, _: ArrayView1<f64>) -> Result<Array1<f64>, ClassifierError> {
        Ok(if self.0 {
            array![0.1, 0.9]
        } else {
            array![0.9, 0.1]
        })
    }
}

/// Labels channels with fixed categories. Any channels beyond the supplied
/// categories are baseline.
pub(crate) struct FixedAnnotator(pub(crate) Vec<ChannelCategory>);

impl FixedAnnotator {
    pub(crate) fn all_baseline() -> FixedAnnotator {
        FixedAnnotator(vec![])
    }
}

impl ChannelAnnotator for FixedAnnotator {
    fn predict(&self, spectrum: ArrayView1<f64>) -> Result<Array2<f64>, ClassifierError> {
        let mut probabilities = Array2::zeros((spectrum.len(), 4));
        for (i, mut row) in probabilities.outer_iter_mut().enumerate() {
            let category = self
                .0
                .get(i)
                .copied()
                .unwrap_or(ChannelCategory::Baseline);
            row[category.index()] = 1.0;
        }
        Ok(probabilities)
    }
}
