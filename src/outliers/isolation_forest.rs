// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An isolation forest over one-dimensional data.
//!
//! Anomalous values are isolated by fewer random splits than typical ones.
//! Each tree is grown on a random subsample, and a value's anomaly score
//! comes from its average path length over the forest.

use rand::{seq::index, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_OUTLIER_CONTAMINATION, DEFAULT_OUTLIER_NUM_TREES, DEFAULT_OUTLIER_SEED,
    DEFAULT_OUTLIER_SUBSAMPLE_SIZE,
};

const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Settings for an isolation forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsolationForest {
    pub num_trees: usize,

    /// The number of values each tree is grown on. Capped at the number of
    /// values available.
    pub subsample_size: usize,

    /// The expected fraction of outliers.
    pub contamination: f64,

    pub seed: u64,
}

impl Default for IsolationForest {
    fn default() -> Self {
        IsolationForest {
            num_trees: DEFAULT_OUTLIER_NUM_TREES,
            subsample_size: DEFAULT_OUTLIER_SUBSAMPLE_SIZE,
            contamination: DEFAULT_OUTLIER_CONTAMINATION,
            seed: DEFAULT_OUTLIER_SEED,
        }
    }
}

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn grow<R: Rng>(values: Vec<f64>, depth: usize, max_depth: usize, rng: &mut R) -> Node {
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if depth >= max_depth || values.len() <= 1 || min >= max {
            return Node::Leaf { size: values.len() };
        }

        let threshold = rng.gen_range(min..max);
        let (left, right): (Vec<f64>, Vec<f64>) = values.into_iter().partition(|&v| v < threshold);
        Node::Split {
            threshold,
            left: Box::new(Node::grow(left, depth + 1, max_depth, rng)),
            right: Box::new(Node::grow(right, depth + 1, max_depth, rng)),
        }
    }

    fn path_length(&self, value: f64) -> f64 {
        let mut node = self;
        let mut depth = 0.0;
        loop {
            match node {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    threshold,
                    left,
                    right,
                } => {
                    node = if value < *threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// The average path length of an unsuccessful search in a binary search
/// tree of `n` values.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linearly-interpolated percentile of already-sorted values.
fn percentile(sorted: &[f64], fraction: f64) -> f64 {
    let rank = fraction.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

impl IsolationForest {
    /// Anomaly scores in (0, 1]; the larger, the more anomalous. Fewer than
    /// two values can't be scored and give scores of 0.5.
    pub fn scores(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let subsample_size = self.subsample_size.min(n);
        let normalisation = average_path_length(subsample_size);
        if normalisation == 0.0 || self.num_trees == 0 {
            return vec![0.5; n];
        }
        let max_depth = (subsample_size as f64).log2().ceil() as usize;

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let trees: Vec<Node> = (0..self.num_trees)
            .map(|_| {
                let subsample = index::sample(&mut rng, n, subsample_size)
                    .into_iter()
                    .map(|i| values[i])
                    .collect();
                Node::grow(subsample, 0, max_depth, &mut rng)
            })
            .collect();

        values
            .iter()
            .map(|&v| {
                let mean_path = trees.iter().map(|t| t.path_length(v)).sum::<f64>()
                    / self.num_trees as f64;
                2.0_f64.powf(-mean_path / normalisation)
            })
            .collect()
    }

    /// Flag the outlying values. The threshold is chosen so that roughly the
    /// `contamination` fraction of the values are flagged.
    pub fn fit_predict(&self, values: &[f64]) -> Vec<bool> {
        if values.len() < 2 {
            return vec![false; values.len()];
        }
        let normality: Vec<f64> = self.scores(values).into_iter().map(|s| -s).collect();
        let mut sorted = normality.clone();
        sorted.sort_by(f64::total_cmp);
        let offset = percentile(&sorted, self.contamination);
        normality.into_iter().map(|s| s < offset).collect()
    }
}
