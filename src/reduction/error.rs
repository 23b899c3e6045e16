// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{
    classifier::ClassifierError, fitting::FitError, observation::ObservationError,
    observation::Polarization, product::ProductError,
};

#[derive(Error, Debug)]
pub enum ReductionError {
    #[error("There is no final spectrum to work on; calculate it from the stack first")]
    NoWorkingSpectrum,

    #[error("The {0} spectrum hasn't been reduced yet")]
    NoFinalSpectrum(Polarization),

    #[error("The LHC spectrum has {lhc} channels but the RHC spectrum has {rhc}")]
    FinalLengthMismatch { lhc: usize, rhc: usize },

    #[error(transparent)]
    Fit(#[from] FitError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Observation(#[from] ObservationError),

    #[error(transparent)]
    Product(#[from] ProductError),
}
