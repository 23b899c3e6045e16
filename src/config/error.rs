// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use super::CONFIG_FILE_TYPES_COMMA_SEPARATED;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file '{0}' doesn't have a recognised file extension! Valid extensions are: {}", *CONFIG_FILE_TYPES_COMMA_SEPARATED)]
    UnrecognisedFileExt(String),

    #[error("Couldn't decode toml structure from {file}:\n{err}")]
    TomlDecode { file: String, err: String },

    #[error("Couldn't decode json structure from {file}:\n{err}")]
    JsonDecode { file: String, err: String },

    #[error("The outlier contamination must be in (0, 0.5], but it is {0}")]
    BadContamination(f64),

    #[error("Fit bounds {start}..{end} are empty")]
    EmptyFitBounds { start: usize, end: usize },

    #[error("The baseline fit order ({0}) is too high")]
    BadFitOrder(usize),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}
