// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObservationError {
    #[error("An observation needs at least one scan")]
    NoScans,

    #[error("BBC {number} doesn't exist; BBCs are numbered 1 to 4")]
    BadBbc { number: usize },

    #[error("Scan {scan} has {actual} channels in BBC {bbc}, but {expected} were expected")]
    ChannelCountMismatch {
        scan: usize,
        bbc: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Merged scan {0} doesn't exist")]
    NoSuchScan(usize),
}
