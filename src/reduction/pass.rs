// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! One polarisation's pass over the scans of an observation.

use std::ops::Range;

use log::{debug, info, trace, warn};
use ndarray::prelude::*;
use strum_macros::Display;

use super::{Reduction, ReductionError};
use crate::{
    classifier::{is_broken, label_channels},
    fitting::{fit_baseline, fit_baseline_on_axis, halve_residuals, BaselineFit},
    flagging::{count_flagged_channels, extract_category_bounds, ChannelCategory},
    math::{interpolate_ranges, mean_spectrum, snr},
    observation::{Bbc, Polarization},
    outliers::GateVerdict,
};

/// Where a merged scan is in the reduction.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    #[strum(serialize = "not processed")]
    NotProcessed,

    #[strum(serialize = "added")]
    Added,

    #[strum(serialize = "discarded")]
    Discarded,
}

/// The residuals of the stacked scans, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack {
    residuals: Vec<Array1<f64>>,
    scan_indices: Vec<usize>,
}

impl Stack {
    pub fn len(&self) -> usize {
        self.scan_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scan_indices.is_empty()
    }

    pub fn contains(&self, scan_index: usize) -> bool {
        self.scan_indices.contains(&scan_index)
    }

    pub fn scan_indices(&self) -> &[usize] {
        &self.scan_indices
    }

    pub fn residuals(&self) -> &[Array1<f64>] {
        &self.residuals
    }

    fn push(&mut self, scan_index: usize, residuals: Array1<f64>) {
        self.scan_indices.push(scan_index);
        self.residuals.push(residuals);
    }

    fn remove(&mut self, scan_index: usize) -> Option<Array1<f64>> {
        let i = self.scan_indices.iter().position(|&s| s == scan_index)?;
        self.scan_indices.remove(i);
        Some(self.residuals.remove(i))
    }
}

/// What happened when a scan was offered to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,

    /// The scan was already in the stack; nothing changed.
    AlreadyStacked,

    /// The scan was judged broken and left unprocessed.
    Broken(GateVerdict),
}

/// The state of a polarisation's reduction: the scans' statuses, the stack,
/// and the final spectrum being worked on. Only one pass can exist per
/// [`Reduction`] at a time; [`PolarizationPass::clear_stack`] hands the final
/// spectrum back to the reduction.
pub struct PolarizationPass<'a> {
    pub(super) reduction: &'a mut Reduction,
    pub(super) pol: Polarization,
    pub(super) bbc: Bbc,
    pub(super) fit_order: usize,

    /// The channel bounds used by the next scan fit. The channel annotator
    /// replaces these every time a scan is stacked.
    pub(super) fit_bounds: Vec<Range<usize>>,

    pub(super) final_fit_bounds: Vec<Range<usize>>,
    pub(super) statuses: Vec<ScanStatus>,
    pub(super) stack: Stack,

    /// The mean of the stack, as last calculated.
    pub(super) mean: Option<Array1<f64>>,

    /// The final spectrum: the mean of the stack, then edited.
    pub(super) working: Option<Array1<f64>>,
}

impl<'a> PolarizationPass<'a> {
    pub fn polarization(&self) -> Polarization {
        self.pol
    }

    pub fn bbc(&self) -> Bbc {
        self.bbc
    }

    pub fn statuses(&self) -> &[ScanStatus] {
        &self.statuses
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn fit_bounds(&self) -> &[Range<usize>] {
        &self.fit_bounds
    }

    pub fn fit_order(&self) -> usize {
        self.fit_order
    }

    pub fn set_fit_order(&mut self, order: usize) {
        self.fit_order = order;
        info!("Fit order changed to {order}");
    }

    pub fn set_final_fit_bounds(&mut self, bounds: Vec<Range<usize>>) {
        self.final_fit_bounds = bounds;
    }

    /// The final spectrum, if it has been calculated.
    pub fn working_spectrum(&self) -> Option<ArrayView1<f64>> {
        self.working.as_ref().map(|w| w.view())
    }

    /// The mean of the stack as last calculated.
    pub fn saved_mean(&self) -> Option<ArrayView1<f64>> {
        self.mean.as_ref().map(|m| m.view())
    }

    /// Have all scans been either added or discarded?
    pub fn all_scans_processed(&self) -> bool {
        !self.statuses.contains(&ScanStatus::NotProcessed)
    }

    fn check_index(&self, scan_index: usize) -> Result<(), ReductionError> {
        self.reduction.obs.merged_scan(scan_index)?;
        Ok(())
    }

    /// Offer a merged scan to the stack.
    ///
    /// The scan must get past the broken-scan gate. Then the channel
    /// annotator's RFI runs are excised from the scan, its baseline runs
    /// become the fit bounds, and the residual of a baseline fit is stacked.
    /// If the fit fails, the excision is undone and nothing else changes.
    pub fn add_to_stack(&mut self, scan_index: usize) -> Result<AddOutcome, ReductionError> {
        self.check_index(scan_index)?;
        if self.stack.contains(scan_index) {
            info!("Scan no. {} is already stacked!", scan_index + 1);
            return Ok(AddOutcome::AlreadyStacked);
        }

        let bbc = self.bbc;
        let spectrum = self.reduction.obs.merged_scan(scan_index)?.pol(bbc).to_owned();
        let verdict = GateVerdict {
            classifier: is_broken(self.reduction.classifier.as_ref(), spectrum.view())?,
            outlier: self.reduction.outliers.is_outlier(bbc, scan_index),
        };
        if verdict.is_broken() {
            debug!(
                "Scan no. {} is broken (classifier: {}, outlier: {})",
                scan_index + 1,
                verdict.classifier,
                verdict.outlier
            );
            return Ok(AddOutcome::Broken(verdict));
        }

        let categories = label_channels(self.reduction.annotator.as_ref(), spectrum.view())?;
        let rfi = extract_category_bounds(&categories, ChannelCategory::Rfi.index());
        trace!(
            "Scan no. {}: excising {} RFI channels",
            scan_index + 1,
            count_flagged_channels(&rfi)
        );
        let previous_backup = self
            .reduction
            .obs
            .merged_scan_mut(scan_index)?
            .remove_channels(bbc, &rfi);

        let mut fit_bounds =
            extract_category_bounds(&categories, ChannelCategory::Baseline.index());
        if fit_bounds.is_empty() {
            warn!(
                "No baseline channels were found in scan no. {}; keeping the previous fit bounds",
                scan_index + 1
            );
            fit_bounds = self.fit_bounds.clone();
        }

        let residuals = match self.fit_scan_with(scan_index, &fit_bounds) {
            Ok(fit) => fit.residuals,
            Err(e) => {
                self.reduction
                    .obs
                    .merged_scan_mut(scan_index)?
                    .undo_remove(bbc, previous_backup);
                return Err(e);
            }
        };
        self.fit_bounds = fit_bounds;
        self.stack.push(scan_index, residuals);
        self.statuses[scan_index] = ScanStatus::Added;
        Ok(AddOutcome::Added)
    }

    /// Mark a scan as discarded. A scan that is in the stack is also removed
    /// from it.
    pub fn discard_from_stack(&mut self, scan_index: usize) -> Result<(), ReductionError> {
        self.check_index(scan_index)?;
        if self.stack.contains(scan_index) {
            self.delete_from_stack(scan_index);
        } else {
            self.statuses[scan_index] = ScanStatus::Discarded;
        }
        Ok(())
    }

    /// Remove a stacked scan and mark it as discarded. Returns `false` if the
    /// scan wasn't stacked, in which case nothing changes.
    pub fn delete_from_stack(&mut self, scan_index: usize) -> bool {
        match self.stack.remove(scan_index) {
            Some(_) => {
                self.statuses[scan_index] = ScanStatus::Discarded;
                true
            }
            None => {
                info!(
                    "Scan no. {} was not stacked, so it cannot be removed!",
                    scan_index + 1
                );
                false
            }
        }
    }

    /// Fit a baseline to a merged scan with the current fit bounds.
    /// Frequency-switched residuals are folded in half, so they are half as
    /// long as the baseline.
    pub fn fit_scan(&self, scan_index: usize) -> Result<BaselineFit, ReductionError> {
        self.fit_scan_with(scan_index, &self.fit_bounds)
    }

    fn fit_scan_with(
        &self,
        scan_index: usize,
        bounds: &[Range<usize>],
    ) -> Result<BaselineFit, ReductionError> {
        let scan = self.reduction.obs.merged_scan(scan_index)?;
        let mut fit = fit_baseline(
            scan.pol(self.bbc),
            self.fit_order,
            bounds,
            self.reduction.config.max_condition_number,
        )?;
        if !self.reduction.obs.on_off() {
            fit.residuals = halve_residuals(fit.residuals.view());
        }
        Ok(fit)
    }

    /// Average the stack into the final spectrum. An empty stack gives a
    /// spectrum of zeros as long as the BBC's velocity axis.
    pub fn calculate_spectrum_from_stack(&mut self) -> ArrayView1<f64> {
        let len = self.reduction.velocity_axis(self.bbc).len();
        let mean = mean_spectrum(self.stack.residuals(), len);
        self.mean = Some(mean.clone());
        self.working.insert(mean).view()
    }

    fn working_mut(&mut self) -> Result<&mut Array1<f64>, ReductionError> {
        self.working.as_mut().ok_or(ReductionError::NoWorkingSpectrum)
    }

    /// Fit and subtract a baseline from the final spectrum with the final fit
    /// bounds.
    pub fn fit_final_baseline(&mut self) -> Result<(), ReductionError> {
        let bounds = self.final_fit_bounds.clone();
        self.fit_final_baseline_with(&bounds)
    }

    /// Fit and subtract a baseline from the final spectrum. The fit is made
    /// against the BBC's velocity axis.
    pub fn fit_final_baseline_with(
        &mut self,
        bounds: &[Range<usize>],
    ) -> Result<(), ReductionError> {
        let order = self.fit_order;
        let max_condition = self.reduction.config.max_condition_number;
        let axis = self.reduction.velocity_axis(self.bbc).clone();
        let working = self.working_mut()?;
        let fit = fit_baseline_on_axis(
            working.view(),
            axis.velocities(),
            order,
            bounds,
            max_condition,
        )?;
        *working = fit.residuals;
        Ok(())
    }

    /// Blank channel ranges of the final spectrum by interpolation.
    pub fn remove_channels_on_final(
        &mut self,
        ranges: &[Range<usize>],
    ) -> Result<(), ReductionError> {
        let working = self.working_mut()?;
        for r in ranges {
            info!("Removing channels {} to {}", r.start, r.end);
        }
        interpolate_ranges(working.view_mut(), ranges);
        Ok(())
    }

    /// Blank velocity ranges \[km/s\] of the final spectrum by interpolation.
    /// Ranges that don't map onto the velocity axis are ignored.
    pub fn remove_velocity_ranges_on_final(
        &mut self,
        ranges: &[(f64, f64)],
    ) -> Result<(), ReductionError> {
        let channels = self
            .reduction
            .velocity_axis(self.bbc)
            .velocity_ranges_to_channel_ranges(ranges);
        self.remove_channels_on_final(&channels)
    }

    /// Undo every edit of the final spectrum since it was calculated.
    pub fn cancel_changes_final(&mut self) -> Result<(), ReductionError> {
        info!("Cancelling all of the changes!");
        let mean = self.mean.clone().ok_or(ReductionError::NoWorkingSpectrum)?;
        self.working = Some(mean);
        Ok(())
    }

    /// Excise channel ranges from a merged scan in this pass's BBC.
    pub fn remove_scan_channels(
        &mut self,
        scan_index: usize,
        ranges: &[Range<usize>],
    ) -> Result<(), ReductionError> {
        self.reduction.remove_channels(self.bbc, scan_index, ranges)
    }

    /// Undo the last excision from a merged scan in this pass's BBC.
    pub fn cancel_scan_removal(&mut self, scan_index: usize) -> Result<bool, ReductionError> {
        self.reduction.cancel_removal(self.bbc, scan_index)
    }

    fn scale(&mut self, factor: f64) -> Result<ArrayView1<f64>, ReductionError> {
        let mean = self.mean.as_mut().ok_or(ReductionError::NoWorkingSpectrum)?;
        *mean *= factor;
        let working = self.working_mut()?;
        *working *= factor;
        Ok(working.view())
    }

    /// Multiply the final spectrum (and the saved mean) by this
    /// polarisation's calibration coefficient.
    pub fn calibrate(&mut self) -> Result<ArrayView1<f64>, ReductionError> {
        let coefficient = self.reduction.calibration.coefficients.get(self.pol);
        self.scale(coefficient)
    }

    /// Undo [`PolarizationPass::calibrate`].
    pub fn uncalibrate(&mut self) -> Result<ArrayView1<f64>, ReductionError> {
        let coefficient = self.reduction.calibration.coefficients.get(self.pol);
        self.scale(1.0 / coefficient)
    }

    /// The signal-to-noise ratio of the mean of the stack.
    pub fn snr(&self) -> Option<f64> {
        let len = self.reduction.velocity_axis(self.bbc).len();
        snr(mean_spectrum(self.stack.residuals(), len).view())
    }

    /// Keep the final spectrum as this polarisation's result, then reset the
    /// stack, the statuses and the final spectrum.
    pub fn clear_stack(&mut self) {
        match self.working.take() {
            Some(spectrum) => self.reduction.set_final(self.pol, self.bbc, spectrum),
            None => warn!(
                "Clearing the {} stack before its spectrum was calculated",
                self.pol
            ),
        }
        self.mean = None;
        self.stack = Stack::default();
        self.statuses.fill(ScanStatus::NotProcessed);
    }
}
