// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;

#[test]
fn test_average_mjd() {
    let epochs = [
        Epoch::from_mjd_utc(60000.0),
        Epoch::from_mjd_utc(60000.5),
        Epoch::from_mjd_utc(60001.0),
    ];
    let average = average_mjd(&epochs).unwrap();
    assert_abs_diff_eq!(average, 60000.5, epsilon = 1e-8);

    assert!(average_mjd(Vec::<Epoch>::new().iter()).is_none());
}

#[test]
fn test_interpolate_ramp() {
    let mut data = Array1::zeros(11);
    data[10] = 10.0;
    // Fill the interior with junk; it must all be overwritten.
    data.slice_mut(s![1..10]).fill(123.0);

    interpolate_ranges(data.view_mut(), &[0..10]);
    let expected: Array1<f64> = (0..=10).map(|i| i as f64).collect();
    assert_abs_diff_eq!(data, expected);
}

#[test]
fn test_interpolate_uses_range_ends_not_neighbours() {
    let mut data = array![5.0, 1.0, 100.0, -100.0, 3.0, 9.0];
    interpolate_ranges(data.view_mut(), &[1..4]);
    // The line goes through (1, 1.0) and (4, 3.0).
    assert_abs_diff_eq!(
        data,
        array![5.0, 1.0, 1.0 + 2.0 / 3.0, 1.0 + 4.0 / 3.0, 3.0, 9.0],
        epsilon = 1e-12
    );
}

#[test]
#[allow(clippy::reversed_empty_ranges)]
fn test_interpolate_skips_bad_ranges() {
    let original = array![1.0, 2.0, 3.0, 4.0];
    let mut data = original.clone();
    interpolate_ranges(data.view_mut(), &[2..2, 3..1, 1..4, 0..10]);
    assert_abs_diff_eq!(data, original);
}

#[test]
fn test_mean_spectrum() {
    let empty = mean_spectrum(&[], 2048);
    assert_eq!(empty.len(), 2048);
    assert!(empty.iter().all(|&v| v == 0.0));

    let one = array![1.0, -2.0, 3.5];
    assert_abs_diff_eq!(mean_spectrum(&[one.clone()], 3), one);

    let two = array![3.0, 2.0, 0.5];
    assert_abs_diff_eq!(mean_spectrum(&[one, two], 3), array![2.0, 0.0, 2.0]);
}

#[test]
fn test_argmax() {
    assert_eq!(argmax(array![0.1, 0.7, 0.2].view()), 1);
    assert_eq!(argmax(array![0.5, 0.5].view()), 0);
    assert_eq!(argmax(array![f64::NAN, 0.2, 0.1].view()), 1);
}

#[test]
fn test_rms_and_snr() {
    assert_abs_diff_eq!(rms(array![3.0, -3.0, 3.0, -3.0].view()), 3.0);
    assert_abs_diff_eq!(rms(Array1::<f64>::zeros(0).view()), 0.0);

    assert!(edge_rms(Array1::zeros(1000).view()).is_none());

    let mut spectrum = Array1::from_elem(2048, 0.5);
    spectrum[1024] = 10.0;
    assert_abs_diff_eq!(edge_rms(spectrum.view()).unwrap(), 0.5);
    assert_abs_diff_eq!(snr(spectrum.view()).unwrap(), 20.0);
}
