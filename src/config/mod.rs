// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Settings for a reduction.
//!
//! Every setting has a default, so a config file only needs to contain what
//! differs from the defaults. Config files may be toml or json.

mod error;

pub use error::ConfigError;

use std::{
    fs::File,
    io::Read,
    ops::Range,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    calibration::default_caltab_dir,
    constants::*,
    observation::{Bbc, Polarization},
    outliers::IsolationForest,
    product::ProductMetadata,
};

#[derive(Debug, Display, EnumIter, EnumString)]
enum ConfigFileType {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

lazy_static::lazy_static! {
    pub(crate) static ref CONFIG_FILE_TYPES_COMMA_SEPARATED: String = ConfigFileType::iter().join(", ");
}

/// Everything that controls how an observation is reduced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionConfig {
    /// The order of every baseline fit.
    pub fit_order: usize,

    /// Channel bounds of the per-scan baseline fits, used until the channel
    /// annotator suggests better ones. Each is `[start, end)`.
    pub fit_bounds: Vec<[usize; 2]>,

    /// Channel bounds of the baseline fit on the final spectrum.
    pub final_fit_bounds: Vec<[usize; 2]>,

    /// Reduce the observation as on/off (`true`) or frequency switched
    /// (`false`) data, whatever mode it was assembled with. If not given,
    /// the observation's own mode is used.
    pub on_off: Option<bool>,

    /// Apply caltab coefficients to the final spectra.
    pub calibrate: bool,

    /// Fit and subtract a baseline from the final spectra.
    pub final_fit: bool,

    pub lhc_bbc: Bbc,
    pub rhc_bbc: Bbc,

    pub outliers: IsolationForest,

    /// Baseline fits whose design matrix has a larger condition number are
    /// rejected.
    pub max_condition_number: f64,

    /// Where caltabs are cached. If not given, a directory inside the user's
    /// config directory is used.
    pub caltab_dir: Option<PathBuf>,

    /// Where reduced spectra are written.
    pub output_dir: PathBuf,

    pub product: ProductMetadata,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        ReductionConfig {
            fit_order: DEFAULT_FIT_ORDER,
            fit_bounds: DEFAULT_FIT_BOUNDS.to_vec(),
            final_fit_bounds: DEFAULT_FINAL_FIT_BOUNDS.to_vec(),
            on_off: None,
            calibrate: true,
            final_fit: true,
            lhc_bbc: Bbc(1),
            rhc_bbc: Bbc(2),
            outliers: IsolationForest::default(),
            max_condition_number: DEFAULT_MAX_CONDITION_NUMBER,
            caltab_dir: None,
            output_dir: PathBuf::from("."),
            product: ProductMetadata::default(),
        }
    }
}

fn to_ranges(bounds: &[[usize; 2]]) -> Vec<Range<usize>> {
    bounds.iter().map(|&[start, end]| start..end).collect()
}

impl ReductionConfig {
    /// Read a config file. The format is determined by the file's extension.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<ReductionConfig, ConfigError> {
        let file = file.as_ref();
        debug!("Attempting to parse config file {} ...", file.display());

        let file_type = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ConfigFileType::from_str(&e).ok());
        let mut contents = String::new();
        let config: ReductionConfig = match file_type {
            Some(ConfigFileType::Toml) => {
                debug!("Parsing toml file...");
                File::open(file)?.read_to_string(&mut contents)?;
                toml::from_str(&contents).map_err(|e| ConfigError::TomlDecode {
                    file: file.display().to_string(),
                    err: e.to_string(),
                })?
            }

            Some(ConfigFileType::Json) => {
                debug!("Parsing json file...");
                File::open(file)?.read_to_string(&mut contents)?;
                serde_json::from_str(&contents).map_err(|e| ConfigError::JsonDecode {
                    file: file.display().to_string(),
                    err: e.to_string(),
                })?
            }

            None => {
                return Err(ConfigError::UnrecognisedFileExt(
                    file.display().to_string(),
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the settings that can't be checked by deserialisation alone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let contamination = self.outliers.contamination;
        if !(contamination > 0.0 && contamination <= 0.5) {
            return Err(ConfigError::BadContamination(contamination));
        }
        if self.fit_order > 100 {
            return Err(ConfigError::BadFitOrder(self.fit_order));
        }
        if let Some(&[start, end]) = self
            .fit_bounds
            .iter()
            .chain(self.final_fit_bounds.iter())
            .find(|[start, end]| start >= end)
        {
            return Err(ConfigError::EmptyFitBounds { start, end });
        }
        Ok(())
    }

    pub fn fit_bounds(&self) -> Vec<Range<usize>> {
        to_ranges(&self.fit_bounds)
    }

    pub fn final_fit_bounds(&self) -> Vec<Range<usize>> {
        to_ranges(&self.final_fit_bounds)
    }

    pub fn bbc(&self, pol: Polarization) -> Bbc {
        match pol {
            Polarization::Lhc => self.lhc_bbc,
            Polarization::Rhc => self.rhc_bbc,
        }
    }

    /// The caltab cache directory; either the configured one or the default.
    pub fn caltab_dir(&self) -> Option<PathBuf> {
        self.caltab_dir.clone().or_else(default_caltab_dir)
    }
}
