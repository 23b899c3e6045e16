// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Single scans.

use std::ops::Range;

use hifitime::Epoch;
use log::trace;
use ndarray::prelude::*;

use super::Bbc;
use crate::{constants::NUM_BBCS, math::interpolate_ranges};

/// A sexagesimal angle. For a declination, only `major` carries the sign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sexagesimal {
    /// Hours of right ascension or degrees of declination.
    pub major: i32,
    pub minutes: i32,
    pub seconds: i32,
}

/// One spectrometer record.
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    /// \[degrees\]
    pub elevation: f64,

    /// \[degrees\]
    pub azimuth: f64,

    /// System temperature of each BBC, as recorded.
    pub tsys: [f64; NUM_BBCS],

    /// The spectrum recorded by each BBC.
    pub pols: [Array1<f64>; NUM_BBCS],

    /// \[MHz\]
    pub rest_freq: [f64; NUM_BBCS],

    /// \[MHz\]
    pub bandwidth: [f64; NUM_BBCS],

    /// \[km/s\]
    pub vlsr: [f64; NUM_BBCS],

    pub epoch: Epoch,
    pub ra: Sexagesimal,
    pub dec: Sexagesimal,
    pub source_name: String,

    /// The time of the scan as written by the telescope, e.g.
    /// `2023-05-01T12:00:00`.
    pub iso_time: String,
}

impl Scan {
    pub fn mjd(&self) -> f64 {
        self.epoch.to_mjd_utc_days()
    }

    pub fn pol(&self, bbc: Bbc) -> ArrayView1<f64> {
        self.pols[bbc.index()].view()
    }

    pub fn num_channels(&self, bbc: Bbc) -> usize {
        self.pols[bbc.index()].len()
    }

    /// \[degrees\]
    pub fn zenith_distance(&self) -> f64 {
        90.0 - self.elevation
    }

    /// The sum of absolute amplitudes of a BBC's spectrum.
    pub fn total_flux(&self, bbc: Bbc) -> f64 {
        self.pols[bbc.index()].iter().map(|v| v.abs()).sum()
    }
}

/// A scan assembled from two raw half-scans. Unlike a [`Scan`], its spectra
/// may be edited: channel ranges can be excised, and the most recent
/// excision of each BBC can be undone.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedScan {
    scan: Scan,
    backups: [Option<Array1<f64>>; NUM_BBCS],
}

impl MergedScan {
    pub fn new(scan: Scan) -> MergedScan {
        MergedScan {
            scan,
            backups: Default::default(),
        }
    }

    pub fn scan(&self) -> &Scan {
        &self.scan
    }

    pub fn pol(&self, bbc: Bbc) -> ArrayView1<f64> {
        self.scan.pol(bbc)
    }

    pub fn mjd(&self) -> f64 {
        self.scan.mjd()
    }

    pub fn total_flux(&self, bbc: Bbc) -> f64 {
        self.scan.total_flux(bbc)
    }

    /// Replace each of `ranges` of the BBC's spectrum with a straight line
    /// between the range's ends. The spectrum as it was before is kept so
    /// that [`MergedScan::cancel_remove`] can restore it. The backup this
    /// replaces, if any, is returned.
    pub fn remove_channels(&mut self, bbc: Bbc, ranges: &[Range<usize>]) -> Option<Array1<f64>> {
        let i = bbc.index();
        let previous = self.backups[i].replace(self.scan.pols[i].clone());
        interpolate_ranges(self.scan.pols[i].view_mut(), ranges);
        trace!("Removed {} channel ranges from {bbc}", ranges.len());
        previous
    }

    /// Undo the last excision of a BBC and reinstate the backup that it
    /// replaced, so an earlier excision can still be cancelled.
    pub(crate) fn undo_remove(&mut self, bbc: Bbc, previous: Option<Array1<f64>>) {
        self.cancel_remove(bbc);
        self.backups[bbc.index()] = previous;
    }

    /// Undo the last excision of a BBC. Returns `false` if there was nothing
    /// to undo.
    pub fn cancel_remove(&mut self, bbc: Bbc) -> bool {
        let i = bbc.index();
        match self.backups[i].take() {
            Some(backup) => {
                self.scan.pols[i] = backup;
                true
            }
            None => false,
        }
    }
}

impl From<Scan> for MergedScan {
    fn from(scan: Scan) -> Self {
        MergedScan::new(scan)
    }
}
