// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Messages to report to the user.
//!
//! A reduction runs through several stages per polarisation, and the things
//! worth reporting are discovered in an awkward order. This module collects
//! them into a few message types that are printed at sensible times.

use std::path::Path;

use log::{info, warn};

use crate::{
    calibration::CalibrationResolution,
    observation::{Bbc, Observation, Polarization},
};

#[must_use = "This struct must be consumed with its print() method"]
pub(crate) struct ObservationDetails<'a> {
    pub(crate) obs: &'a Observation,
}

impl ObservationDetails<'_> {
    pub(crate) fn print(self) {
        let obs = self.obs;
        info!("Reducing '{}'", obs.source_name());
        info!(
            "  {} raw scans, {} merged scans ({})",
            obs.scans().len(),
            obs.num_merged_scans(),
            if obs.on_off() {
                "on/off"
            } else {
                "frequency switched"
            }
        );
        info!("  Reference frequency: {} MHz", obs.reference_frequency());
        info!("  Mean epoch: MJD {:.5}", obs.mean_mjd());
    }
}

#[must_use = "This struct must be consumed with its print() method"]
pub(crate) struct CalibrationDetails<'a> {
    pub(crate) resolution: &'a CalibrationResolution,
}

impl CalibrationDetails<'_> {
    pub(crate) fn print(self) {
        let CalibrationResolution {
            coefficients,
            caltab,
            epoch,
            up_to_date,
        } = self.resolution;
        let caltab = match caltab {
            Some(c) => c,
            None => {
                warn!("Did not find any suitable caltab; the data won't be calibrated");
                return;
            }
        };

        info!("Using caltab '{}' to calibrate the data", caltab.label);
        info!(
            "  (LHC): coefficient is {} for MJD {}",
            coefficients.lhc, *epoch as i64
        );
        info!(
            "  (RHC): coefficient is {} for MJD {}",
            coefficients.rhc, *epoch as i64
        );
        let min = caltab.lhc.min_epoch();
        let max = caltab.lhc.max_epoch();
        if caltab.lhc.spans(*epoch) {
            info!("  Epoch is between MJD {min} and {max}");
        } else {
            warn!("Epoch MJD {epoch} is OUTSIDE the caltab (MJD {min} to {max}); check carefully that the coefficients are suitable");
        }
        if !up_to_date {
            warn!(
                "Caltab '{}' ends at MJD {}, before the observation",
                caltab.label,
                caltab.max_epoch()
            );
        }
    }
}

/// What happened during one polarisation pass.
#[must_use = "This struct must be consumed with its print() method"]
pub(crate) struct PassSummary {
    pub(crate) pol: Polarization,
    pub(crate) bbc: Bbc,
    pub(crate) num_scans: usize,
    pub(crate) num_added: usize,
    pub(crate) num_broken: usize,
    pub(crate) num_failed_fits: usize,
    pub(crate) snr: Option<f64>,
}

impl PassSummary {
    pub(crate) fn print(self) {
        let PassSummary {
            pol,
            bbc,
            num_scans,
            num_added,
            num_broken,
            num_failed_fits,
            snr,
        } = self;
        info!("{pol} ({bbc}): stacked {num_added} of {num_scans} scans");
        if num_broken > 0 {
            info!("  {num_broken} scans were judged broken");
        }
        if num_failed_fits > 0 {
            warn!("  {num_failed_fits} scans were dropped because their baselines couldn't be fitted");
        }
        if num_added == 0 {
            warn!("  No scans were stacked; the {pol} spectrum is empty");
        }
        match snr {
            Some(snr) => info!("  SNR: {snr:.2}"),
            None => info!("  Spectrum is too short to estimate its SNR"),
        }
    }
}

#[must_use = "This struct must be consumed with its print() method"]
pub(crate) struct OutputFileDetails<'a> {
    pub(crate) file: &'a Path,
}

impl OutputFileDetails<'_> {
    pub(crate) fn print(self) {
        info!("Reduced spectra written to {}", self.file.display());
    }
}
