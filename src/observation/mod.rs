// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Observations: everything recorded for one source in one session.

mod error;
mod scan;
#[cfg(test)]
mod tests;

pub use error::ObservationError;
pub use scan::{MergedScan, Scan, Sexagesimal};

use hifitime::Epoch;
use log::{debug, warn};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use vec1::Vec1;

use crate::{constants::NUM_BBCS, coord::VelocityAxis, math::average_mjd};

/// A base-band converter, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Bbc(pub(crate) usize);

impl Bbc {
    pub fn new(number: usize) -> Result<Bbc, ObservationError> {
        if (1..=NUM_BBCS).contains(&number) {
            Ok(Bbc(number))
        } else {
            Err(ObservationError::BadBbc { number })
        }
    }

    /// The number used by the telescope, e.g. 1 for "BBC 1".
    pub fn number(self) -> usize {
        self.0
    }

    /// The zero-based index into per-BBC arrays.
    pub fn index(self) -> usize {
        self.0 - 1
    }

    pub fn all() -> impl Iterator<Item = Bbc> {
        (1..=NUM_BBCS).map(Bbc)
    }
}

impl TryFrom<usize> for Bbc {
    type Error = ObservationError;

    fn try_from(number: usize) -> Result<Self, Self::Error> {
        Bbc::new(number)
    }
}

impl From<Bbc> for usize {
    fn from(bbc: Bbc) -> Self {
        bbc.0
    }
}

impl std::fmt::Display for Bbc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BBC {}", self.0)
    }
}

/// Circular polarisations.
#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarization {
    #[strum(serialize = "LHC")]
    Lhc,

    #[strum(serialize = "RHC")]
    Rhc,
}

/// The raw and merged scans of one observation.
#[derive(Debug, Clone)]
pub struct Observation {
    scans: Vec1<Scan>,
    merged_scans: Vec<MergedScan>,

    /// Was this an on/off observation? If not, it was frequency switched.
    on_off: bool,
}

impl Observation {
    /// Assemble an observation. Every spectrum must have as many channels as
    /// the first raw scan has in the same BBC.
    pub fn new(
        scans: Vec<Scan>,
        merged_scans: Vec<MergedScan>,
        on_off: bool,
    ) -> Result<Observation, ObservationError> {
        let scans = Vec1::try_from_vec(scans).map_err(|_| ObservationError::NoScans)?;
        let expected: Vec<usize> = scans.first().pols.iter().map(|p| p.len()).collect();
        for (i_scan, scan) in scans
            .iter()
            .chain(merged_scans.iter().map(|m| m.scan()))
            .enumerate()
        {
            for (i_bbc, pol) in scan.pols.iter().enumerate() {
                if pol.len() != expected[i_bbc] {
                    return Err(ObservationError::ChannelCountMismatch {
                        scan: i_scan,
                        bbc: i_bbc + 1,
                        expected: expected[i_bbc],
                        actual: pol.len(),
                    });
                }
            }
        }

        debug!(
            "Observation of '{}': {} scans, {} merged scans, {}",
            scans.first().source_name,
            scans.len(),
            merged_scans.len(),
            if on_off { "on/off" } else { "frequency switched" }
        );
        Ok(Observation {
            scans,
            merged_scans,
            on_off,
        })
    }

    /// Assemble an observation from raw scans only; consecutive pairs of raw
    /// scans are combined with `merge`. If there is an odd number of raw
    /// scans, the last one can't be paired and is dropped.
    pub fn from_raw_scans<F>(
        mut scans: Vec<Scan>,
        on_off: bool,
        merge: F,
    ) -> Result<Observation, ObservationError>
    where
        F: Fn(&Scan, &Scan) -> MergedScan,
    {
        if scans.len() % 2 != 0 {
            warn!(
                "There is an odd number of scans ({}); dropping the last one",
                scans.len()
            );
            scans.pop();
        }
        let merged_scans = scans
            .chunks_exact(2)
            .map(|pair| merge(&pair[0], &pair[1]))
            .collect();
        Observation::new(scans, merged_scans, on_off)
    }

    pub fn scans(&self) -> &[Scan] {
        &self.scans
    }

    pub fn first_scan(&self) -> &Scan {
        self.scans.first()
    }

    pub fn merged_scans(&self) -> &[MergedScan] {
        &self.merged_scans
    }

    pub fn merged_scan(&self, index: usize) -> Result<&MergedScan, ObservationError> {
        self.merged_scans
            .get(index)
            .ok_or(ObservationError::NoSuchScan(index))
    }

    pub fn merged_scan_mut(&mut self, index: usize) -> Result<&mut MergedScan, ObservationError> {
        self.merged_scans
            .get_mut(index)
            .ok_or(ObservationError::NoSuchScan(index))
    }

    pub fn num_merged_scans(&self) -> usize {
        self.merged_scans.len()
    }

    pub fn on_off(&self) -> bool {
        self.on_off
    }

    pub(crate) fn set_on_off(&mut self, on_off: bool) {
        self.on_off = on_off;
    }

    pub fn source_name(&self) -> &str {
        &self.first_scan().source_name
    }

    /// The mean MJD of the raw scans.
    pub fn mean_mjd(&self) -> f64 {
        // There's always at least one scan.
        average_mjd(self.scans.iter().map(|s| &s.epoch)).unwrap_or_default()
    }

    pub fn mean_epoch(&self) -> Epoch {
        Epoch::from_mjd_utc(self.mean_mjd())
    }

    /// The rest frequency of BBC 1 of the first scan \[MHz\]. This is used to
    /// choose a caltab.
    pub fn reference_frequency(&self) -> f64 {
        self.first_scan().rest_freq[0]
    }

    /// The zenith distance of every raw scan \[degrees\].
    pub fn zenith_distances(&self) -> Array1<f64> {
        self.scans.iter().map(Scan::zenith_distance).collect()
    }

    /// System temperatures with dimensions (num_bbcs, num_scans), scaled
    /// down by 1000.
    pub fn tsys_table(&self) -> Array2<f64> {
        Array2::from_shape_fn((NUM_BBCS, self.scans.len()), |(i_bbc, i_scan)| {
            self.scans[i_scan].tsys[i_bbc] / 1000.0
        })
    }

    /// Total flux with dimensions (num_bbcs, num_merged_scans).
    pub fn total_flux_table(&self) -> Array2<f64> {
        let mut table = Array2::zeros((NUM_BBCS, self.merged_scans.len()));
        for (bbc, mut row) in Bbc::all().zip(table.outer_iter_mut()) {
            row.iter_mut()
                .zip(self.merged_scans.iter())
                .for_each(|(t, m)| *t = m.total_flux(bbc));
        }
        table
    }

    fn start_mjd(&self) -> f64 {
        self.scans
            .iter()
            .map(Scan::mjd)
            .fold(f64::INFINITY, f64::min)
    }

    /// Hours since the earliest raw scan, for every raw scan.
    pub fn time_hours(&self) -> Array1<f64> {
        let start = self.start_mjd();
        self.scans.iter().map(|s| (s.mjd() - start) * 24.0).collect()
    }

    /// Hours since the earliest raw scan, for every merged scan.
    pub fn merged_time_hours(&self) -> Array1<f64> {
        let start = self.start_mjd();
        self.merged_scans
            .iter()
            .map(|m| (m.mjd() - start) * 24.0)
            .collect()
    }

    /// The velocity axis of a BBC, taken from the first scan. A
    /// frequency-switched spectrum is folded in half when it is reduced, so
    /// its axis covers half the bandwidth with half the channels.
    pub fn velocity_axis(&self, bbc: Bbc) -> VelocityAxis {
        let scan = self.first_scan();
        let i = bbc.index();
        let (bandwidth, num_channels) = if self.on_off {
            (scan.bandwidth[i], scan.pols[i].len())
        } else {
            (scan.bandwidth[i] / 2.0, scan.pols[i].len() / 2)
        };
        VelocityAxis::new(scan.rest_freq[i], scan.vlsr[i], bandwidth, num_channels)
    }

    /// [`Observation::velocity_axis`] for every BBC.
    pub fn velocity_axes(&self) -> Vec<VelocityAxis> {
        Bbc::all().map(|bbc| self.velocity_axis(bbc)).collect()
    }
}
