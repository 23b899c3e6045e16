// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod reduce;

use std::sync::Arc;

use ndarray::prelude::*;

use spectral_reduction::{
    classifier::ClassifierError, flagging::ChannelCategory, BrokenScanClassifier,
    ChannelAnnotator, Epoch, MergedScan, Observation, Scan, Sexagesimal,
};

const NUM_CHANNELS: usize = 128;

/// Everything is fine.
struct Healthy;

impl BrokenScanClassifier for Healthy {
    fn predict(&self, _: ArrayView1<f64>) -> Result<Array1<f64>, ClassifierError> {
        Ok(array![1.0, 0.0])
    }
}

/// Every channel is baseline.
struct AllBaseline;

impl ChannelAnnotator for AllBaseline {
    fn predict(&self, spectrum: ArrayView1<f64>) -> Result<Array2<f64>, ClassifierError> {
        let mut probabilities = Array2::zeros((spectrum.len(), 4));
        probabilities
            .column_mut(ChannelCategory::Baseline.index())
            .fill(1.0);
        Ok(probabilities)
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn classifiers() -> (Arc<dyn ChannelAnnotator>, Arc<dyn BrokenScanClassifier>) {
    (Arc::new(AllBaseline), Arc::new(Healthy))
}

/// A sloped bandpass with integer-valued ripple, rotated by `shift` channels.
/// All values are integers, so every shift has exactly the same total flux
/// and no scan stands out.
fn spectrum(shift: usize) -> Array1<f64> {
    Array1::from_shape_fn(NUM_CHANNELS, |i| {
        let ripple = ((i + shift) % NUM_CHANNELS * 7 % 5) as f64;
        let line = match i {
            40 => 12.0,
            104 => -12.0,
            _ => 0.0,
        };
        1000.0 + 2.0 * i as f64 + ripple + line
    })
}

fn scan(index: usize) -> Scan {
    Scan {
        elevation: 45.0,
        azimuth: 180.0,
        tsys: [40_000.0, 41_000.0, 42_000.0, 43_000.0],
        pols: std::array::from_fn(|_| spectrum(index)),
        rest_freq: [6668.518; 4],
        bandwidth: [2.0; 4],
        vlsr: [-12.0; 4],
        epoch: Epoch::from_mjd_utc(60_100.5 + 0.001 * index as f64),
        ra: Sexagesimal {
            major: 17,
            minutes: 20,
            seconds: 53,
        },
        dec: Sexagesimal {
            major: -35,
            minutes: 47,
            seconds: 2,
        },
        source_name: "G351.42+0.64".to_string(),
        iso_time: "2023-06-05T12:00:00".to_string(),
    }
}

/// A frequency-switched observation of 4 merged scans.
fn observation() -> Observation {
    let scans = (0..8).map(scan).collect();
    Observation::from_raw_scans(scans, false, |first, _| MergedScan::new(first.clone())).unwrap()
}
