// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The reduced product: a pair of final spectra and the metadata describing
//! them.

mod error;
mod fits;
#[cfg(test)]
mod tests;

pub use error::ProductError;
pub use fits::write_fits;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::{
    coord::Band,
    observation::{Bbc, Observation, Sexagesimal},
};

/// Who and what produced the data. These end up in the product's headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductMetadata {
    pub telescope: String,
    pub instrument: String,

    /// Where the data were taken.
    pub origin: String,

    /// Where the data were reduced.
    pub institution: String,

    pub observer: String,
    pub author: String,
}

impl Default for ProductMetadata {
    fn default() -> Self {
        ProductMetadata {
            telescope: "RT4".to_string(),
            instrument: "MYLOVE".to_string(),
            origin: "TRAO".to_string(),
            institution: "TCfA".to_string(),
            observer: String::new(),
            author: String::new(),
        }
    }
}

/// The maser line most likely observed at a rest frequency.
#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq)]
pub enum Molecule {
    #[strum(serialize = "exOH 6031")]
    ExcitedOh6031,

    #[strum(serialize = "exOH 6035")]
    ExcitedOh6035,

    #[strum(serialize = "CH3OH 6668")]
    Methanol6668,

    #[strum(serialize = "CH3OH 12178")]
    Methanol12178,

    #[strum(serialize = "H2O 22235")]
    Water22235,
}

impl Molecule {
    /// `rest_freq` is in MHz.
    pub fn from_rest_freq(rest_freq: f64) -> Molecule {
        match rest_freq {
            f if f < 6034.0 => Molecule::ExcitedOh6031,
            f if f < 6100.0 => Molecule::ExcitedOh6035,
            f if f < 7000.0 => Molecule::Methanol6668,
            f if f < 13000.0 => Molecule::Methanol12178,
            _ => Molecule::Water22235,
        }
    }
}

/// Zero-pad a sexagesimal component to two digits, keeping any minus sign
/// in front.
fn pad(value: i32) -> String {
    if value < 0 {
        format!("-{:02}", value.unsigned_abs())
    } else {
        format!("{value:02}")
    }
}

/// e.g. `06h08m53s`
pub fn format_ra(ra: Sexagesimal) -> String {
    format!("{}h{}m{}s", pad(ra.major), pad(ra.minutes), pad(ra.seconds))
}

/// e.g. `-21d38m29s`
pub fn format_dec(dec: Sexagesimal) -> String {
    format!("{}d{}m{}s", pad(dec.major), pad(dec.minutes), pad(dec.seconds))
}

fn round4(value: f64) -> f64 {
    (value * 1e4).round() / 1e4
}

/// The name of the product file for a source observed at `mjd`, e.g.
/// `G345.01+1.79_60000253.fits` for MJD 60000.2534.
pub fn product_file_name(source_name: &str, mjd: f64) -> String {
    let rounded = ((mjd * 1e3).round() / 1e3).to_string();
    let mjd_digits = if rounded.contains('.') {
        rounded.replace('.', "")
    } else {
        format!("{rounded}0")
    };
    format!("{source_name}_{mjd_digits}.fits")
}

/// Metadata describing a final spectrum. Everything is taken from the first
/// raw scan of the observation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputHeader {
    pub object: String,
    pub equinox: f64,
    pub src_ra: String,
    pub src_dec: String,
    pub date_obs: String,

    /// The rest frequency of BBC 1 \[Hz\].
    pub freq: f64,

    /// \[MHz\]
    pub freq_begin: f64,
    /// \[MHz\]
    pub freq_mid: f64,
    /// \[MHz\]
    pub freq_end: f64,
    /// The bandwidth of the final spectrum \[MHz\].
    pub freq_range: f64,

    /// \[km/s\]
    pub vsys: f64,
    pub doppler_sun: f64,
    pub doppler_observer: f64,
    pub doppler_total: f64,

    /// \[Hz\]
    pub rest_freq: f64,
    pub molecule: Molecule,
    pub time: String,

    /// \[degrees\]
    pub azimuth: f64,
    /// Zenith distance \[degrees\].
    pub zenith: f64,

    pub scan_type: &'static str,

    /// System temperatures of the BBCs used for the two polarisations,
    /// scaled down by 1000.
    pub tsys: [f64; 2],
}

impl OutputHeader {
    /// `bbcs` are the BBCs used for the LHC and RHC spectra.
    pub fn assemble(obs: &Observation, bbcs: [Bbc; 2]) -> OutputHeader {
        let scan = obs.first_scan();
        let rest_freq = scan.rest_freq[0];
        let band = Band::new(rest_freq, scan.vlsr[0], scan.bandwidth[0] / 2.0);
        let freq_range = if obs.on_off() {
            scan.bandwidth[0]
        } else {
            scan.bandwidth[0] / 2.0
        };

        OutputHeader {
            object: scan.source_name.clone(),
            equinox: 2000.0,
            src_ra: format_ra(scan.ra),
            src_dec: format_dec(scan.dec),
            date_obs: scan.iso_time.clone(),
            freq: rest_freq * 1e6,
            freq_begin: band.begin,
            freq_mid: band.centre,
            freq_end: band.end,
            freq_range,
            vsys: scan.vlsr[0],
            doppler_sun: 0.0,
            doppler_observer: 0.0,
            doppler_total: 0.0,
            rest_freq: rest_freq * 1e6,
            molecule: Molecule::from_rest_freq(rest_freq),
            time: scan.iso_time.clone(),
            azimuth: round4(scan.azimuth),
            zenith: round4(scan.zenith_distance()),
            scan_type: "FINAL",
            tsys: bbcs.map(|bbc| scan.tsys[bbc.index()] / 1000.0),
        }
    }
}
