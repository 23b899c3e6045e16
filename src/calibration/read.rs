// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading and writing caltabs.
//!
//! Caltabs are cached in a directory with one sub-directory per caltab. Each
//! sub-directory is named after its caltab's label and contains the LHC and
//! RHC coefficient files and a file with the two ends of the caltab's
//! frequency range. Coefficient files are plain text, one `MJD coefficient`
//! row per line; anything after a `#` is ignored.
//!
//! A fresh set of caltabs can also be pulled in from an index file (TOML),
//! with one table per caltab naming its coefficient files and frequency
//! range.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::{CalTab, CalTabReadError, CalTabSeries, CalTabs};
use crate::constants::*;

/// The default caltab cache directory, inside the user's config directory.
pub fn default_caltab_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CALTAB_DIR_NAME))
}

/// One caltab listed in an index file. Relative paths are relative to the
/// index file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalTabIndexEntry {
    pub lhc_caltab: PathBuf,
    pub rhc_caltab: PathBuf,
    pub min_freq: f64,
    pub max_freq: f64,
}

/// Strip comments and split a line into whitespace-separated tokens. Blank
/// lines yield nothing.
fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split('#').next().unwrap_or("").split_whitespace()
}

fn read_series(file: &Path) -> Result<CalTabSeries, CalTabReadError> {
    let contents = fs::read_to_string(file)?;
    let mut epochs = vec![];
    let mut coefficients = vec![];
    for (i, line) in contents.lines().enumerate() {
        let mut t = tokens(line);
        let (epoch, coefficient) = match (t.next(), t.next()) {
            (None, _) => continue,
            (Some(e), Some(c)) => (e.parse::<f64>().ok(), c.parse::<f64>().ok()),
            (Some(_), None) => (None, None),
        };
        match (epoch, coefficient) {
            (Some(e), Some(c)) => {
                epochs.push(e);
                coefficients.push(c);
            }
            _ => {
                return Err(CalTabReadError::Parse {
                    file: file.to_path_buf(),
                    line: i + 1,
                    content: line.to_string(),
                })
            }
        }
    }
    CalTabSeries::new(epochs, coefficients).map_err(|err| CalTabReadError::CalTab {
        file: file.to_path_buf(),
        err,
    })
}

fn read_freq_range(file: &Path) -> Result<(f64, f64), CalTabReadError> {
    let contents = fs::read_to_string(file)?;
    let mut freqs: Vec<f64> = vec![];
    for (i, line) in contents.lines().enumerate() {
        for token in tokens(line) {
            let f = token.parse().map_err(|_| CalTabReadError::Parse {
                file: file.to_path_buf(),
                line: i + 1,
                content: line.to_string(),
            })?;
            freqs.push(f);
        }
    }
    match freqs.as_slice() {
        [min, max] => Ok((*min, *max)),
        _ => Err(CalTabReadError::FreqRange {
            file: file.to_path_buf(),
            found: freqs.len(),
        }),
    }
}

fn write_series<W: Write>(series: &CalTabSeries, mut writer: W) -> std::io::Result<()> {
    for (e, c) in series.epochs().iter().zip(series.coefficients()) {
        writeln!(writer, "{e} {c}")?;
    }
    writer.flush()
}

impl CalTab {
    /// Read a caltab from a cache sub-directory. The caltab's label is the
    /// directory's name.
    pub fn read_dir<P: AsRef<Path>>(dir: P) -> Result<CalTab, CalTabReadError> {
        let dir = dir.as_ref();
        let label = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let lhc = read_series(&dir.join(CALTAB_LHC_FILE_NAME))?;
        let rhc = read_series(&dir.join(CALTAB_RHC_FILE_NAME))?;
        let freq_range = read_freq_range(&dir.join(CALTAB_FREQ_RANGE_FILE_NAME))?;
        Ok(CalTab::new(label, freq_range, lhc, rhc)?)
    }

    /// Write this caltab into `dir`, creating it if necessary.
    pub fn write_dir<P: AsRef<Path>>(&self, dir: P) -> Result<(), CalTabReadError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        write_series(
            &self.lhc,
            BufWriter::new(File::create(dir.join(CALTAB_LHC_FILE_NAME))?),
        )?;
        write_series(
            &self.rhc,
            BufWriter::new(File::create(dir.join(CALTAB_RHC_FILE_NAME))?),
        )?;
        let mut freq_file = File::create(dir.join(CALTAB_FREQ_RANGE_FILE_NAME))?;
        write!(freq_file, "{}\n{}", self.min_freq, self.max_freq)?;
        Ok(())
    }
}

impl CalTabs {
    /// Read every caltab in a cache directory. The directory is created if
    /// it doesn't exist. Sub-directories that can't be read are skipped with
    /// a warning.
    pub fn read_cache<P: AsRef<Path>>(dir: P) -> Result<CalTabs, CalTabReadError> {
        let dir = dir.as_ref();
        info!("Searching for caltabs in {}", dir.display());
        fs::create_dir_all(dir)?;

        let mut sub_dirs = vec![];
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                sub_dirs.push(path);
            }
        }
        sub_dirs.sort();

        let mut caltabs = CalTabs::new();
        for sub_dir in sub_dirs {
            match CalTab::read_dir(&sub_dir) {
                Ok(c) => {
                    debug!("Read caltab '{}'", c.label);
                    caltabs.insert(c);
                }
                Err(e) => warn!("Skipping caltab in {}: {e}", sub_dir.display()),
            }
        }
        if caltabs.is_empty() {
            warn!("No caltabs found in {}", dir.display());
        }
        Ok(caltabs)
    }

    /// Write all caltabs into a cache directory.
    pub fn write_cache<P: AsRef<Path>>(&self, dir: P) -> Result<(), CalTabReadError> {
        let dir = dir.as_ref();
        for caltab in self.iter() {
            caltab.write_dir(dir.join(&caltab.label))?;
        }
        Ok(())
    }

    /// Read the caltabs listed in an index file, in the order they are
    /// listed.
    pub fn read_index<P: AsRef<Path>>(file: P) -> Result<CalTabs, CalTabReadError> {
        let file = file.as_ref();
        let contents = fs::read_to_string(file)?;
        let entries: IndexMap<String, CalTabIndexEntry> =
            toml::from_str(&contents).map_err(|e| CalTabReadError::IndexDecode {
                file: file.to_path_buf(),
                err: e.to_string(),
            })?;

        let base = file.parent().unwrap_or_else(|| Path::new("."));
        let mut caltabs = CalTabs::new();
        for (label, entry) in entries {
            let lhc = read_series(&base.join(&entry.lhc_caltab))?;
            let rhc = read_series(&base.join(&entry.rhc_caltab))?;
            caltabs.insert(CalTab::new(
                label,
                (entry.min_freq, entry.max_freq),
                lhc,
                rhc,
            )?);
        }
        Ok(caltabs)
    }

    /// Replace these caltabs with those listed in an index file. If the
    /// index can't be read, the current caltabs are kept and `false` is
    /// returned.
    pub fn refresh_from_index<P: AsRef<Path>>(&mut self, file: P) -> bool {
        match CalTabs::read_index(file.as_ref()) {
            Ok(caltabs) => {
                info!("Loaded {} caltabs", caltabs.len());
                *self = caltabs;
                true
            }
            Err(e) => {
                warn!("Couldn't refresh caltabs; keeping the current set: {e}");
                false
            }
        }
    }
}
