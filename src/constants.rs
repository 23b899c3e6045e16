// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Spectra are reduced in double
precision and only converted to single precision when written out.
 */

/// The speed of light \[km/s\].
pub const VEL_C_KM_S: f64 = 299_792.458;

/// The number of base-band converters recorded per scan.
pub const NUM_BBCS: usize = 4;

/// The default polynomial order used for baseline fits.
pub const DEFAULT_FIT_ORDER: usize = 10;

/// Channel bounds used for per-scan baseline fits before the channel
/// annotator has suggested any. These are for a 4096-channel
/// frequency-switched scan.
pub const DEFAULT_FIT_BOUNDS: [[usize; 2]; 3] = [[10, 824], [1224, 2872], [3272, 4086]];

/// Channel bounds used when fitting the baseline of the final (averaged and
/// halved) spectrum.
pub const DEFAULT_FINAL_FIT_BOUNDS: [[usize; 2]; 2] = [[10, 900], [1100, 2038]];

/// The channel annotator is unreliable this close to either end of a
/// spectrum, so category runs may not start inside these margins.
pub const CATEGORY_EDGE_MARGIN: usize = 25;

/// The largest acceptable ratio between the largest and smallest diagonal
/// element of the triangular factor of a baseline fit's design matrix.
pub const DEFAULT_MAX_CONDITION_NUMBER: f64 = 1e12;

/// The expected fraction of outlying scans in an observation.
pub const DEFAULT_OUTLIER_CONTAMINATION: f64 = 0.2;

/// The number of trees grown by the isolation forest.
pub const DEFAULT_OUTLIER_NUM_TREES: usize = 100;

/// The maximum number of samples used to grow a single isolation tree.
pub const DEFAULT_OUTLIER_SUBSAMPLE_SIZE: usize = 256;

/// The isolation forest is seeded so that reductions are repeatable.
pub const DEFAULT_OUTLIER_SEED: u64 = 0x5344_4452;

/// Channel windows (relative to both ends of a spectrum) used to estimate
/// the noise of a reduced spectrum.
pub const EDGE_RMS_WINDOW: (usize, usize) = (20, 400);

/// Spectra shorter than this don't have an edge RMS.
pub const EDGE_RMS_MIN_CHANNELS: usize = 1024;

/// The name of this software's directory inside the user's config
/// directory.
pub const CONFIG_DIR_NAME: &str = "ssddr";

/// The default name of the directory holding the caltab cache.
pub const CALTAB_DIR_NAME: &str = "caltabs";

/// File names inside a single caltab cache directory.
pub const CALTAB_LHC_FILE_NAME: &str = "CALTAB_L1";
pub const CALTAB_RHC_FILE_NAME: &str = "CALTAB_R1";
pub const CALTAB_FREQ_RANGE_FILE_NAME: &str = "freq_ranges";
