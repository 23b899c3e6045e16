// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reducing an observation into LHC and RHC spectra.
//!
//! A [`Reduction`] owns an observation and everything derived from it once
//! (velocity axes, outlier flags, calibration coefficients). Each
//! polarisation is reduced in a [`PolarizationPass`]: scans are offered to a
//! stack, the stack is averaged, and the average is edited, fitted and
//! calibrated before being kept as that polarisation's final spectrum.

mod error;
mod pass;

pub use error::ReductionError;
pub use pass::{AddOutcome, PolarizationPass, ScanStatus, Stack};

use std::{
    ops::Range,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, warn};
use ndarray::prelude::*;

use crate::{
    calibration::{CalTabs, CalibrationResolution},
    classifier::{BrokenScanClassifier, ChannelAnnotator},
    config::ReductionConfig,
    coord::VelocityAxis,
    messages,
    observation::{Bbc, Observation, Polarization},
    outliers::OutlierTable,
    product::{product_file_name, write_fits, OutputHeader},
};

/// The Stokes parameters of a finished reduction, alongside the
/// polarisations they were made from.
#[derive(Debug, Clone, PartialEq)]
pub struct Stokes {
    pub i: Array1<f64>,
    pub v: Array1<f64>,
    pub lhc: Array1<f64>,
    pub rhc: Array1<f64>,
}

pub struct Reduction {
    pub(crate) obs: Observation,
    pub(crate) config: ReductionConfig,
    velocity_axes: Vec<VelocityAxis>,
    pub(crate) outliers: OutlierTable,
    caltabs: CalTabs,
    pub(crate) calibration: CalibrationResolution,
    pub(crate) annotator: Arc<dyn ChannelAnnotator>,
    pub(crate) classifier: Arc<dyn BrokenScanClassifier>,
    final_lhc: Option<Array1<f64>>,
    final_rhc: Option<Array1<f64>>,

    /// The BBCs that the final spectra came from; `[LHC, RHC]`.
    bbcs_used: [Option<Bbc>; 2],
}

impl Reduction {
    /// Prepare an observation for reduction. If the config sets the
    /// observing mode, it replaces the observation's own.
    pub fn new(
        mut obs: Observation,
        config: ReductionConfig,
        caltabs: CalTabs,
        annotator: Arc<dyn ChannelAnnotator>,
        classifier: Arc<dyn BrokenScanClassifier>,
    ) -> Reduction {
        if let Some(on_off) = config.on_off {
            if on_off != obs.on_off() {
                warn!(
                    "Reducing '{}' as {} data, as set in the config",
                    obs.source_name(),
                    if on_off { "on/off" } else { "frequency switched" }
                );
                obs.set_on_off(on_off);
            }
        }
        messages::ObservationDetails { obs: &obs }.print();

        let velocity_axes = obs.velocity_axes();
        let outliers = OutlierTable::new(obs.total_flux_table().view(), &config.outliers);
        let calibration = caltabs.resolve(obs.reference_frequency(), obs.mean_mjd());
        Reduction {
            obs,
            config,
            velocity_axes,
            outliers,
            caltabs,
            calibration,
            annotator,
            classifier,
            final_lhc: None,
            final_rhc: None,
            bbcs_used: [None, None],
        }
    }

    pub fn observation(&self) -> &Observation {
        &self.obs
    }

    pub fn config(&self) -> &ReductionConfig {
        &self.config
    }

    pub fn caltabs(&self) -> &CalTabs {
        &self.caltabs
    }

    pub fn calibration(&self) -> &CalibrationResolution {
        &self.calibration
    }

    pub fn outliers(&self) -> &OutlierTable {
        &self.outliers
    }

    pub fn velocity_axis(&self, bbc: Bbc) -> &VelocityAxis {
        &self.velocity_axes[bbc.index()]
    }

    /// Start reducing a polarisation from the given BBC. The config's fit
    /// order and fit bounds are the starting point of the pass.
    pub fn begin_pass(&mut self, pol: Polarization, bbc: Bbc) -> PolarizationPass<'_> {
        debug!("Starting the {pol} pass on {bbc}");
        PolarizationPass {
            pol,
            bbc,
            fit_order: self.config.fit_order,
            fit_bounds: self.config.fit_bounds(),
            final_fit_bounds: self.config.final_fit_bounds(),
            statuses: vec![ScanStatus::NotProcessed; self.obs.num_merged_scans()],
            stack: Stack::default(),
            mean: None,
            working: None,
            reduction: self,
        }
    }

    /// Look up the calibration coefficients for this observation again and
    /// report them. Returns `false` if the selected caltab ends before the
    /// observation.
    pub fn find_cal_coefficients(&mut self) -> bool {
        self.calibration = self
            .caltabs
            .resolve(self.obs.reference_frequency(), self.obs.mean_mjd());
        messages::CalibrationDetails {
            resolution: &self.calibration,
        }
        .print();
        self.calibration.up_to_date
    }

    /// Replace the caltabs and resolve the coefficients against them.
    pub fn set_caltabs(&mut self, caltabs: CalTabs) {
        self.caltabs = caltabs;
        self.find_cal_coefficients();
    }

    /// Replace the caltabs with those listed in an index file. On success,
    /// the new caltabs are also written to the cache directory. If the index
    /// can't be read, nothing changes and `false` is returned.
    pub fn refresh_caltabs_from_index<P: AsRef<Path>>(&mut self, index: P) -> bool {
        if !self.caltabs.refresh_from_index(index) {
            return false;
        }
        if let Some(dir) = self.config.caltab_dir() {
            if let Err(e) = self.caltabs.write_cache(&dir) {
                warn!("Couldn't cache caltabs in {}: {e}", dir.display());
            }
        }
        self.find_cal_coefficients();
        true
    }

    /// Excise channel ranges from a merged scan by interpolation. The
    /// previous state is kept so the excision can be cancelled.
    pub fn remove_channels(
        &mut self,
        bbc: Bbc,
        scan_index: usize,
        ranges: &[Range<usize>],
    ) -> Result<(), ReductionError> {
        self.obs
            .merged_scan_mut(scan_index)?
            .remove_channels(bbc, ranges);
        Ok(())
    }

    /// Undo the last excision from a merged scan. Returns `false` if there
    /// was nothing to undo.
    pub fn cancel_removal(&mut self, bbc: Bbc, scan_index: usize) -> Result<bool, ReductionError> {
        Ok(self.obs.merged_scan_mut(scan_index)?.cancel_remove(bbc))
    }

    pub(crate) fn set_final(&mut self, pol: Polarization, bbc: Bbc, spectrum: Array1<f64>) {
        match pol {
            Polarization::Lhc => {
                self.final_lhc = Some(spectrum);
                self.bbcs_used[0] = Some(bbc);
            }
            Polarization::Rhc => {
                self.final_rhc = Some(spectrum);
                self.bbcs_used[1] = Some(bbc);
            }
        }
    }

    pub fn final_spectrum(&self, pol: Polarization) -> Option<ArrayView1<f64>> {
        match pol {
            Polarization::Lhc => self.final_lhc.as_ref(),
            Polarization::Rhc => self.final_rhc.as_ref(),
        }
        .map(|s| s.view())
    }

    /// The BBCs the final spectra came from. A polarisation that hasn't been
    /// reduced yet reports the configured BBC.
    pub fn bbcs_used(&self) -> [Bbc; 2] {
        [
            self.bbcs_used[0].unwrap_or(self.config.lhc_bbc),
            self.bbcs_used[1].unwrap_or(self.config.rhc_bbc),
        ]
    }

    fn final_pair(&self) -> Result<(ArrayView1<f64>, ArrayView1<f64>), ReductionError> {
        let lhc = self
            .final_spectrum(Polarization::Lhc)
            .ok_or(ReductionError::NoFinalSpectrum(Polarization::Lhc))?;
        let rhc = self
            .final_spectrum(Polarization::Rhc)
            .ok_or(ReductionError::NoFinalSpectrum(Polarization::Rhc))?;
        if lhc.len() != rhc.len() {
            return Err(ReductionError::FinalLengthMismatch {
                lhc: lhc.len(),
                rhc: rhc.len(),
            });
        }
        Ok((lhc, rhc))
    }

    /// Stokes I and V from the final spectra.
    pub fn final_pols(&self) -> Result<Stokes, ReductionError> {
        let (lhc, rhc) = self.final_pair()?;
        Ok(Stokes {
            i: (&lhc + &rhc) / 2.0,
            v: &rhc - &lhc,
            lhc: lhc.to_owned(),
            rhc: rhc.to_owned(),
        })
    }

    pub fn output_header(&self) -> OutputHeader {
        OutputHeader::assemble(&self.obs, self.bbcs_used())
    }

    /// Write the final spectra into `dir`. The file name is derived from the
    /// source name and the mean epoch.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf, ReductionError> {
        let (lhc, rhc) = self.final_pair()?;
        let file = dir
            .as_ref()
            .join(product_file_name(self.obs.source_name(), self.obs.mean_mjd()));
        write_fits(
            &file,
            &self.output_header(),
            &self.config.product,
            lhc,
            rhc,
        )?;
        messages::OutputFileDetails { file: &file }.print();
        Ok(file)
    }

    /// Reduce one polarisation without intervention: every scan is offered
    /// to the stack, scans whose baselines can't be fitted are discarded, and
    /// the final spectrum is optionally fitted and calibrated.
    fn run_pass(&mut self, pol: Polarization) -> Result<(), ReductionError> {
        let bbc = self.config.bbc(pol);
        let final_fit = self.config.final_fit;
        let calibrate = self.config.calibrate;
        let num_scans = self.obs.num_merged_scans();

        let mut pass = self.begin_pass(pol, bbc);
        let mut num_broken = 0;
        let mut num_failed_fits = 0;
        for i_scan in 0..num_scans {
            match pass.add_to_stack(i_scan) {
                Ok(AddOutcome::Broken(_)) => num_broken += 1,
                Ok(_) => (),
                Err(ReductionError::Fit(e)) => {
                    warn!("{pol}: scan no. {} discarded: {e}", i_scan + 1);
                    pass.discard_from_stack(i_scan)?;
                    num_failed_fits += 1;
                }
                Err(e) => return Err(e),
            }
        }

        pass.calculate_spectrum_from_stack();
        if final_fit {
            match pass.fit_final_baseline() {
                Ok(()) => (),
                Err(ReductionError::Fit(e)) => {
                    warn!("{pol}: the final spectrum's baseline wasn't fitted: {e}")
                }
                Err(e) => return Err(e),
            }
        }
        if calibrate {
            pass.calibrate()?;
        }

        messages::PassSummary {
            pol,
            bbc,
            num_scans,
            num_added: pass.stack().len(),
            num_broken,
            num_failed_fits,
            snr: pass.snr(),
        }
        .print();
        pass.clear_stack();
        Ok(())
    }

    /// Reduce both polarisations into final spectra without writing them.
    pub fn reduce(&mut self) -> Result<(), ReductionError> {
        self.find_cal_coefficients();
        for pol in [Polarization::Lhc, Polarization::Rhc] {
            self.run_pass(pol)?;
        }
        Ok(())
    }

    /// Reduce both polarisations and write the product into the configured
    /// output directory.
    pub fn perform(&mut self) -> Result<PathBuf, ReductionError> {
        self.reduce()?;
        self.save(&self.config.output_dir)
    }
}
