// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::*;

struct Fixed(Array1<f64>);

impl BrokenScanClassifier for Fixed {
    fn predict(&self, _: ArrayView1<f64>) -> Result<Array1<f64>, ClassifierError> {
        Ok(self.0.clone())
    }
}

/// Labels channels above a threshold as category 1.
struct Threshold(f64);

impl ChannelAnnotator for Threshold {
    fn predict(&self, spectrum: ArrayView1<f64>) -> Result<Array2<f64>, ClassifierError> {
        let mut p = Array2::zeros((spectrum.len(), 2));
        for (mut row, &v) in p.outer_iter_mut().zip(spectrum.iter()) {
            if v > self.0 {
                row[1] = 0.9;
                row[0] = 0.1;
            } else {
                row[0] = 0.8;
                row[1] = 0.2;
            }
        }
        Ok(p)
    }
}

struct Truncating;

impl ChannelAnnotator for Truncating {
    fn predict(&self, spectrum: ArrayView1<f64>) -> Result<Array2<f64>, ClassifierError> {
        Ok(Array2::zeros((spectrum.len() - 1, 4)))
    }
}

#[test]
fn test_is_broken() {
    let spectrum = Array1::<f64>::zeros(8);
    assert!(!is_broken(&Fixed(array![0.9, 0.1]), spectrum.view()).unwrap());
    assert!(is_broken(&Fixed(array![0.2, 0.8]), spectrum.view()).unwrap());
    assert!(is_broken(&Fixed(array![0.2, 0.1, 0.7]), spectrum.view()).unwrap());
    assert!(matches!(
        is_broken(&Fixed(Array1::zeros(0)), spectrum.view()),
        Err(ClassifierError::BadShape { .. })
    ));
}

#[test]
fn test_label_channels() {
    let spectrum = array![0.0, 5.0, 5.0, 0.0];
    let labels = label_channels(&Threshold(1.0), spectrum.view()).unwrap();
    assert_eq!(labels, vec![0, 1, 1, 0]);

    assert!(matches!(
        label_channels(&Truncating, spectrum.view()),
        Err(ClassifierError::BadShape {
            expected: 4,
            actual: 3,
            ..
        })
    ));
}
