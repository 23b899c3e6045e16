// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Reduction of single-dish autocorrelator scans into calibrated, RFI-cleaned
LHC and RHC spectra.
 */

pub mod batch;
pub mod calibration;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod coord;
pub mod fitting;
pub mod flagging;
pub mod math;
mod messages;
pub mod observation;
pub mod outliers;
pub mod product;
pub mod reduction;

#[cfg(test)]
mod tests;

// Re-exports.
pub use batch::BatchReduction;
pub use calibration::{CalCoefficients, CalTab, CalTabs, CalibrationResolution};
pub use classifier::{BrokenScanClassifier, ChannelAnnotator, ClassifierError};
pub use config::{ConfigError, ReductionConfig};
pub use coord::VelocityAxis;
pub use fitting::FitError;
pub use observation::{Bbc, MergedScan, Observation, Polarization, Scan, Sexagesimal};
pub use product::{OutputHeader, ProductMetadata};
pub use reduction::{PolarizationPass, Reduction, ReductionError, Stokes};

// External re-exports.
pub use hifitime::Epoch;
pub use ndarray;
