// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("The {model} model failed to make a prediction: {message}")]
    Prediction { model: &'static str, message: String },

    #[error("The {model} model returned {actual} predictions, but {expected} were expected")]
    BadShape {
        model: &'static str,
        expected: usize,
        actual: usize,
    },
}
