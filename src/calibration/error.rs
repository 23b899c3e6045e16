// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with caltabs.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalTabError {
    #[error("A caltab series needs at least one entry")]
    Empty,

    #[error("A caltab series has {epochs} epochs but {coefficients} coefficients")]
    LengthMismatch { epochs: usize, coefficients: usize },

    #[error("A caltab series contains a non-finite value at row {row}")]
    NonFinite { row: usize },

    #[error("Caltab '{label}' has an invalid frequency range [{min}, {max}] MHz")]
    BadFreqRange { label: String, min: f64, max: f64 },
}

#[derive(Error, Debug)]
pub enum CalTabReadError {
    #[error("Couldn't parse line {line} of {file}: '{content}'")]
    Parse {
        file: PathBuf,
        line: usize,
        content: String,
    },

    #[error("Expected 2 frequencies in {file}, found {found}")]
    FreqRange { file: PathBuf, found: usize },

    #[error("Couldn't decode caltab index {file}:\n{err}")]
    IndexDecode { file: PathBuf, err: String },

    #[error("Caltab file {file}: {err}")]
    CalTab { file: PathBuf, err: CalTabError },

    #[error(transparent)]
    CalTabDefinition(#[from] CalTabError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
