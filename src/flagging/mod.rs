// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Channel categories and RFI flagging.
//!
//! The channel annotator assigns each channel of a scan to a category. Runs
//! of RFI channels are excised from the scan, and runs of baseline channels
//! become the bounds used for the scan's baseline fit.


use std::ops::Range;

use strum_macros::{Display, EnumIter, FromRepr};

use crate::constants::CATEGORY_EDGE_MARGIN;

/// The categories the channel annotator distinguishes.
#[derive(Debug, Display, EnumIter, FromRepr, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum ChannelCategory {
    /// Emission-free channels that trace the bandpass.
    #[strum(serialize = "baseline")]
    Baseline = 0,

    /// Spectral-line emission.
    #[strum(serialize = "signal")]
    Signal = 1,

    /// Radio-frequency interference.
    #[strum(serialize = "RFI")]
    Rfi = 2,

    #[strum(serialize = "other")]
    Other = 3,
}

impl ChannelCategory {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Find the maximal runs of `target` in `categories`.
///
/// Runs may only start between [`CATEGORY_EDGE_MARGIN`] and `len -
/// CATEGORY_EDGE_MARGIN` (exclusive), but once started a run continues for as
/// long as the category matches. Each run is returned as `start..end` where
/// `end` is the *last* channel of the run; a run of one channel is `i..i`.
/// Used as fit bounds, a run therefore contributes the channels before its
/// last, and used as an excision range, its last channel is the right-hand
/// interpolation anchor.
pub fn extract_category_bounds(categories: &[usize], target: usize) -> Vec<Range<usize>> {
    let len = categories.len();
    let mut bounds = vec![];
    let mut i = CATEGORY_EDGE_MARGIN;
    while i < len.saturating_sub(CATEGORY_EDGE_MARGIN) {
        if categories[i] == target {
            let start = i;
            while i < len && categories[i] == target {
                i += 1;
            }
            bounds.push(start..i - 1);
        } else {
            i += 1;
        }
    }
    bounds
}

/// The number of channels covered by `ranges`, counting each range's anchor
/// channel.
pub fn count_flagged_channels(ranges: &[Range<usize>]) -> usize {
    ranges
        .iter()
        .map(|r| r.end.saturating_sub(r.start) + 1)
        .sum()
}
