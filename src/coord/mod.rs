// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Conversions between frequency, radial velocity and channel index.
//!
//! Spectra are recorded in the LSR frame, so the observed band is the rest
//! frequency Doppler-shifted by the source's LSR velocity. All frequencies
//! are in MHz and all velocities are in km/s.


use std::ops::Range;

use ndarray::prelude::*;

use crate::constants::VEL_C_KM_S;

/// The edges and centre of an observed band \[MHz\].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub centre: f64,
    pub begin: f64,
    pub end: f64,
}

impl Band {
    /// Apply the relativistic Doppler shift of `vlsr` to `rest_freq` and
    /// place a band of width `bandwidth` around the result.
    pub fn new(rest_freq: f64, vlsr: f64, bandwidth: f64) -> Band {
        let centre = doppler_shift(rest_freq, vlsr);
        Band {
            centre,
            begin: centre - bandwidth / 2.0,
            end: centre + bandwidth / 2.0,
        }
    }
}

/// The frequency observed for a line with rest frequency `rest_freq` emitted
/// by a source receding at `velocity`.
pub fn doppler_shift(rest_freq: f64, velocity: f64) -> f64 {
    let beta = velocity / VEL_C_KM_S;
    let gamma = 1.0 / (1.0 - beta * beta).sqrt();
    rest_freq * gamma * (1.0 - beta)
}

/// The radial velocity corresponding to an observed frequency.
pub fn frequency_to_velocity(freq: f64, rest_freq: f64) -> f64 {
    -VEL_C_KM_S * (freq / rest_freq - 1.0)
}

/// The radial velocity of every channel of a spectrum. The velocities
/// increase with the channel index.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityAxis {
    velocities: Array1<f64>,
}

impl VelocityAxis {
    /// Generate the axis for a spectrum of `num_channels` channels spread
    /// over `bandwidth`. Channel frequencies are evenly spaced from the
    /// band's beginning to its end (both inclusive); because velocity falls
    /// as frequency rises, the resulting axis is reversed.
    pub fn new(rest_freq: f64, vlsr: f64, bandwidth: f64, num_channels: usize) -> VelocityAxis {
        let band = Band::new(rest_freq, vlsr, bandwidth);
        let mut velocities = Array1::linspace(band.begin, band.end, num_channels)
            .mapv_into(|f| frequency_to_velocity(f, rest_freq));
        velocities.invert_axis(Axis(0));
        VelocityAxis { velocities }
    }

    pub fn len(&self) -> usize {
        self.velocities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.velocities.is_empty()
    }

    pub fn velocities(&self) -> ArrayView1<f64> {
        self.velocities.view()
    }

    pub fn min(&self) -> Option<f64> {
        self.velocities.first().copied()
    }

    pub fn max(&self) -> Option<f64> {
        self.velocities.last().copied()
    }

    /// The first channel whose velocity exceeds `velocity`. A velocity at or
    /// beyond the end of the axis maps to the last channel.
    fn channel_above(&self, velocity: f64) -> Option<usize> {
        let max = self.max()?;
        if velocity > max {
            return Some(self.len() - 1);
        }
        self.velocities.iter().position(|&v| velocity < v)
    }

    /// Convert a velocity interval into a channel range. `None` is returned
    /// if either bound has no corresponding channel; such ranges are dropped
    /// rather than treated as errors.
    pub fn velocity_range_to_channel_range(&self, low: f64, high: f64) -> Option<Range<usize>> {
        let start = self.channel_above(low)?;
        let end = self.channel_above(high)?;
        Some(start..end)
    }

    /// Convert many velocity intervals, silently skipping those that don't
    /// map onto the axis.
    pub fn velocity_ranges_to_channel_ranges(&self, ranges: &[(f64, f64)]) -> Vec<Range<usize>> {
        ranges
            .iter()
            .filter_map(|&(low, high)| self.velocity_range_to_channel_range(low, high))
            .collect()
    }
}
