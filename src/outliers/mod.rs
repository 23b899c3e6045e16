// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Detection of broken scans.
//!
//! Before a scan is stacked, two independent opinions are sought: whether its
//! total flux is an outlier among all of the observation's scans, and what
//! the broken-scan classifier thinks of it. Either is enough to keep the scan
//! out of the stack.

mod isolation_forest;

pub use isolation_forest::IsolationForest;

use log::debug;
use ndarray::{parallel::prelude::*, prelude::*};

use crate::observation::Bbc;

/// Cached outlier flags with dimensions (num_bbcs, num_merged_scans).
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierTable {
    flags: Array2<bool>,
}

impl OutlierTable {
    /// Run the isolation forest over every BBC's total-flux series. Each row
    /// of `total_flux` is one BBC; each column is one merged scan.
    pub fn new(total_flux: ArrayView2<f64>, forest: &IsolationForest) -> OutlierTable {
        let mut flags = Array2::from_elem(total_flux.dim(), false);
        flags
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(total_flux.axis_iter(Axis(0)).into_par_iter())
            .for_each(|(mut flags, flux)| {
                let verdicts = forest.fit_predict(&flux.to_vec());
                flags
                    .iter_mut()
                    .zip(verdicts)
                    .for_each(|(f, v)| *f = v);
            });

        for (i, row) in flags.outer_iter().enumerate() {
            debug!(
                "BBC {}: {} of {} scans have outlying total flux",
                i + 1,
                row.iter().filter(|&&f| f).count(),
                row.len()
            );
        }
        OutlierTable { flags }
    }

    /// A table without any outliers.
    pub fn empty(num_bbcs: usize, num_scans: usize) -> OutlierTable {
        OutlierTable {
            flags: Array2::from_elem((num_bbcs, num_scans), false),
        }
    }

    /// Is the total flux of the given merged scan an outlier? Scans that
    /// weren't in the table aren't.
    pub fn is_outlier(&self, bbc: Bbc, scan_index: usize) -> bool {
        self.flags
            .get((bbc.index(), scan_index))
            .copied()
            .unwrap_or(false)
    }

    pub fn num_outliers(&self, bbc: Bbc) -> usize {
        self.flags
            .outer_iter()
            .nth(bbc.index())
            .map(|row| row.iter().filter(|&&f| f).count())
            .unwrap_or(0)
    }
}

/// Both opinions on whether a scan is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateVerdict {
    /// The broken-scan classifier's verdict.
    pub classifier: bool,

    /// The scan's total flux is an outlier.
    pub outlier: bool,
}

impl GateVerdict {
    pub fn is_broken(&self) -> bool {
        self.classifier || self.outlier
    }
}
