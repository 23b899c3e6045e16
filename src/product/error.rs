// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProductError {
    #[error("The LHC spectrum has {lhc} channels but the RHC spectrum has {rhc}")]
    LengthMismatch { lhc: usize, rhc: usize },

    #[error("The value of FITS key '{key}' contains a NUL byte")]
    NulByte { key: String },

    #[error(transparent)]
    Fitsio(#[from] fitsio::errors::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
