// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reducing many observations without intervention.

use std::{path::PathBuf, sync::Arc};

use log::{info, warn};
use rayon::prelude::*;

use crate::{
    calibration::CalTabs,
    classifier::{BrokenScanClassifier, ChannelAnnotator},
    config::ReductionConfig,
    observation::Observation,
    reduction::{Reduction, ReductionError},
};

/// Everything shared by the reductions of a batch.
pub struct BatchReduction {
    pub config: ReductionConfig,
    pub caltabs: CalTabs,
    pub annotator: Arc<dyn ChannelAnnotator>,
    pub classifier: Arc<dyn BrokenScanClassifier>,
}

impl BatchReduction {
    /// Reduce each observation in parallel and write its product. The
    /// results are in the same order as `observations`; a failed observation
    /// doesn't affect the others. Products are written one at a time, as
    /// cfitsio may not be reentrant.
    pub fn reduce(&self, observations: Vec<Observation>) -> Vec<Result<PathBuf, ReductionError>> {
        let num_obs = observations.len();
        info!("Reducing {num_obs} observations");
        let reductions: Vec<Result<Reduction, ReductionError>> = observations
            .into_par_iter()
            .map(|obs| {
                let mut reduction = Reduction::new(
                    obs,
                    self.config.clone(),
                    self.caltabs.clone(),
                    Arc::clone(&self.annotator),
                    Arc::clone(&self.classifier),
                );
                reduction.reduce()?;
                Ok(reduction)
            })
            .collect();

        let results: Vec<_> = reductions
            .into_iter()
            .enumerate()
            .map(|(i_obs, reduction)| {
                let result = reduction.and_then(|r| r.save(&self.config.output_dir));
                if let Err(e) = &result {
                    warn!("Observation {} failed: {e}", i_obs + 1);
                }
                result
            })
            .collect();

        let num_ok = results.iter().filter(|r| r.is_ok()).count();
        info!("Reduced {num_ok} of {num_obs} observations");
        results
    }
}
