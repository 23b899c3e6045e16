// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Interfaces to the externally-trained classifiers.
//!
//! Two models are used during a reduction: one judges whether a whole scan is
//! broken, the other labels every channel of a scan. Both are opaque; only
//! the most probable class is consumed here.

mod error;
#[cfg(test)]
mod tests;

pub use error::ClassifierError;

use ndarray::prelude::*;

use crate::math::argmax;

/// Decides whether a scan is broken.
pub trait BrokenScanClassifier: Send + Sync {
    /// Class probabilities for the whole of `spectrum`. Class 0 means the
    /// scan is fine; any other class means it is broken.
    fn predict(&self, spectrum: ArrayView1<f64>) -> Result<Array1<f64>, ClassifierError>;
}

/// Assigns a category to every channel of a scan.
pub trait ChannelAnnotator: Send + Sync {
    /// Category probabilities with dimensions (num_channels, num_categories).
    fn predict(&self, spectrum: ArrayView1<f64>) -> Result<Array2<f64>, ClassifierError>;
}

/// Does the broken-scan model think this scan is broken?
pub fn is_broken(
    classifier: &dyn BrokenScanClassifier,
    spectrum: ArrayView1<f64>,
) -> Result<bool, ClassifierError> {
    let probabilities = classifier.predict(spectrum)?;
    if probabilities.is_empty() {
        return Err(ClassifierError::BadShape {
            model: "broken-scan",
            expected: 1,
            actual: 0,
        });
    }
    Ok(argmax(probabilities.view()) != 0)
}

/// The most probable category of every channel.
pub fn label_channels(
    annotator: &dyn ChannelAnnotator,
    spectrum: ArrayView1<f64>,
) -> Result<Vec<usize>, ClassifierError> {
    let probabilities = annotator.predict(spectrum)?;
    if probabilities.len_of(Axis(0)) != spectrum.len() {
        return Err(ClassifierError::BadShape {
            model: "channel annotator",
            expected: spectrum.len(),
            actual: probabilities.len_of(Axis(0)),
        });
    }
    Ok(probabilities.outer_iter().map(argmax).collect())
}
