// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("A polynomial of order {order} needs more than {order} points, but only {points} were selected")]
    TooFewPoints { points: usize, order: usize },

    #[error("The baseline fit is ill conditioned (condition number {condition:e}, limit {limit:e}); try a lower order or wider fit bounds")]
    IllConditioned { condition: f64, limit: f64 },

    #[error("The least-squares solver failed: {0}")]
    Solver(&'static str),

    #[error("The data to fit contain non-finite values")]
    NonFiniteInput,

    #[error("The baseline fit produced non-finite values")]
    NonFiniteOutput,

    #[error("The fit abscissa has {abscissa} values but the data have {data}")]
    LengthMismatch { abscissa: usize, data: usize },
}
