// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Flux calibration from caltabs.
//!
//! A caltab is a pair of time series (one per circular polarisation) of flux
//! calibration coefficients, valid over a range of rest frequencies. Given an
//! observation's reference frequency and mean epoch, the applicable caltab is
//! found and its coefficients are interpolated.

mod error;
mod read;

pub use error::{CalTabError, CalTabReadError};
pub use read::{default_caltab_dir, CalTabIndexEntry};

use indexmap::IndexMap;
use log::debug;
use vec1::Vec1;

use crate::observation::Polarization;

/// One polarisation's coefficients, ordered by epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct CalTabSeries {
    /// \[MJD\]
    epochs: Vec1<f64>,
    coefficients: Vec1<f64>,
}

impl CalTabSeries {
    /// Create a new series. The rows don't need to be ordered; they are
    /// sorted by epoch here.
    pub fn new(epochs: Vec<f64>, coefficients: Vec<f64>) -> Result<CalTabSeries, CalTabError> {
        if epochs.len() != coefficients.len() {
            return Err(CalTabError::LengthMismatch {
                epochs: epochs.len(),
                coefficients: coefficients.len(),
            });
        }
        if let Some(row) = epochs
            .iter()
            .zip(coefficients.iter())
            .position(|(e, c)| !e.is_finite() || !c.is_finite())
        {
            return Err(CalTabError::NonFinite { row });
        }

        let mut rows: Vec<(f64, f64)> = epochs.into_iter().zip(coefficients).collect();
        rows.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (epochs, coefficients): (Vec<f64>, Vec<f64>) = rows.into_iter().unzip();
        Ok(CalTabSeries {
            epochs: Vec1::try_from_vec(epochs).map_err(|_| CalTabError::Empty)?,
            coefficients: Vec1::try_from_vec(coefficients).map_err(|_| CalTabError::Empty)?,
        })
    }

    pub fn epochs(&self) -> &[f64] {
        &self.epochs
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn min_epoch(&self) -> f64 {
        *self.epochs.first()
    }

    pub fn max_epoch(&self) -> f64 {
        *self.epochs.last()
    }

    /// Is `mjd` strictly inside the span of this series?
    pub fn spans(&self, mjd: f64) -> bool {
        mjd > self.min_epoch() && mjd < self.max_epoch()
    }

    /// The coefficient at `mjd`. Between two epochs the coefficient is
    /// linearly interpolated. Outside of the series the coefficient of the
    /// nearest end is used; coefficients are never extrapolated.
    pub fn coefficient_at(&self, mjd: f64) -> f64 {
        if mjd <= self.min_epoch() {
            return *self.coefficients.first();
        }
        if mjd >= self.max_epoch() {
            return *self.coefficients.last();
        }

        // There is at least one epoch <= mjd and one > mjd.
        let upper = self.epochs.partition_point(|&e| e <= mjd);
        let lower = upper - 1;
        let (e1, c1) = (self.epochs[lower], self.coefficients[lower]);
        let (e2, c2) = (self.epochs[upper], self.coefficients[upper]);
        c1 + (c2 - c1) * (mjd - e1) / (e2 - e1)
    }
}

/// A named calibration table.
#[derive(Debug, Clone, PartialEq)]
pub struct CalTab {
    pub label: String,

    /// The lowest rest frequency this caltab applies to \[MHz\].
    pub min_freq: f64,

    /// The highest rest frequency this caltab applies to \[MHz\].
    pub max_freq: f64,

    pub lhc: CalTabSeries,
    pub rhc: CalTabSeries,
}

impl CalTab {
    pub fn new(
        label: String,
        freq_range: (f64, f64),
        lhc: CalTabSeries,
        rhc: CalTabSeries,
    ) -> Result<CalTab, CalTabError> {
        let (min_freq, max_freq) = freq_range;
        if !min_freq.is_finite() || !max_freq.is_finite() || min_freq > max_freq {
            return Err(CalTabError::BadFreqRange {
                label,
                min: min_freq,
                max: max_freq,
            });
        }
        Ok(CalTab {
            label,
            min_freq,
            max_freq,
            lhc,
            rhc,
        })
    }

    /// Does this caltab apply to `freq` \[MHz\]? Both ends are inclusive.
    pub fn in_range(&self, freq: f64) -> bool {
        freq >= self.min_freq && freq <= self.max_freq
    }

    pub fn series(&self, pol: Polarization) -> &CalTabSeries {
        match pol {
            Polarization::Lhc => &self.lhc,
            Polarization::Rhc => &self.rhc,
        }
    }

    pub fn find_coefficients(&self, mjd: f64) -> CalCoefficients {
        CalCoefficients {
            lhc: self.lhc.coefficient_at(mjd),
            rhc: self.rhc.coefficient_at(mjd),
        }
    }

    /// The last epoch covered by both polarisations.
    pub fn max_epoch(&self) -> f64 {
        self.lhc.max_epoch().min(self.rhc.max_epoch())
    }
}

/// Multiplicative flux calibration coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalCoefficients {
    pub lhc: f64,
    pub rhc: f64,
}

impl CalCoefficients {
    /// Coefficients that leave data untouched.
    pub const IDENTITY: CalCoefficients = CalCoefficients { lhc: 1.0, rhc: 1.0 };

    pub fn get(&self, pol: Polarization) -> f64 {
        match pol {
            Polarization::Lhc => self.lhc,
            Polarization::Rhc => self.rhc,
        }
    }
}

impl Default for CalCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The outcome of looking up calibration coefficients for an observation.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationResolution {
    pub coefficients: CalCoefficients,

    /// The caltab that was used, if any matched.
    pub caltab: Option<CalTab>,

    /// The epoch the coefficients were resolved for \[MJD\].
    pub epoch: f64,

    /// `false` if the epoch is later than the last epoch of the caltab. This
    /// is only a warning; the last coefficients are still used.
    pub up_to_date: bool,
}

impl CalibrationResolution {
    /// No caltab; data are left uncalibrated.
    pub fn identity(epoch: f64) -> CalibrationResolution {
        CalibrationResolution {
            coefficients: CalCoefficients::IDENTITY,
            caltab: None,
            epoch,
            up_to_date: true,
        }
    }
}

/// All of the available caltabs, in the order they were loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalTabs {
    tabs: IndexMap<String, CalTab>,
}

impl CalTabs {
    pub fn new() -> CalTabs {
        CalTabs::default()
    }

    /// Add a caltab after all of the others. A caltab with the same label is
    /// removed first, so the new one is the last to be considered.
    pub fn insert(&mut self, caltab: CalTab) {
        self.tabs.shift_remove(&caltab.label);
        self.tabs.insert(caltab.label.clone(), caltab);
    }

    pub fn get(&self, label: &str) -> Option<&CalTab> {
        self.tabs.get(label)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CalTab> {
        self.tabs.values()
    }

    /// Find the caltab for `freq` \[MHz\]. When ranges overlap, the last
    /// matching caltab wins.
    pub fn select(&self, freq: f64) -> Option<&CalTab> {
        self.tabs.values().rev().find(|c| c.in_range(freq))
    }

    /// Resolve the coefficients for an observation with reference frequency
    /// `freq` \[MHz\] and mean epoch `mjd`.
    pub fn resolve(&self, freq: f64, mjd: f64) -> CalibrationResolution {
        match self.select(freq) {
            None => {
                debug!("No caltab covers {freq} MHz");
                CalibrationResolution::identity(mjd)
            }
            Some(caltab) => {
                debug!("Caltab '{}' covers {freq} MHz", caltab.label);
                CalibrationResolution {
                    coefficients: caltab.find_coefficients(mjd),
                    up_to_date: mjd <= caltab.max_epoch(),
                    caltab: Some(caltab.clone()),
                    epoch: mjd,
                }
            }
        }
    }
}

impl FromIterator<CalTab> for CalTabs {
    fn from_iter<T: IntoIterator<Item = CalTab>>(iter: T) -> Self {
        let mut caltabs = CalTabs::new();
        for c in iter {
            caltabs.insert(c);
        }
        caltabs
    }
}
