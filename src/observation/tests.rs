// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;
use crate::tests::{keep_first, synthetic_observation, synthetic_scan, TEST_MJD, TEST_REST_FREQ};

#[test]
fn test_bbc_numbering() {
    let bbc = Bbc::new(3).unwrap();
    assert_eq!(bbc.number(), 3);
    assert_eq!(bbc.index(), 2);
    assert_eq!(bbc.to_string(), "BBC 3");
    assert_eq!(Bbc::new(0), Err(ObservationError::BadBbc { number: 0 }));
    assert_eq!(Bbc::new(5), Err(ObservationError::BadBbc { number: 5 }));
    assert_eq!(Bbc::all().count(), NUM_BBCS);
    assert_eq!(Polarization::Lhc.to_string(), "LHC");
}

#[test]
fn test_bbc_deserialises_from_its_number() {
    let bbc: Bbc = serde_json::from_str("2").unwrap();
    assert_eq!(bbc, Bbc::new(2).unwrap());
    assert!(serde_json::from_str::<Bbc>("7").is_err());
}

#[test]
fn test_odd_scan_count_drops_the_last_scan() {
    let scans: Vec<Scan> = (0..5).map(|i| synthetic_scan(i, 64)).collect();
    let obs = Observation::from_raw_scans(scans, false, keep_first).unwrap();
    assert_eq!(obs.scans().len(), 4);
    assert_eq!(obs.num_merged_scans(), 2);
    // Merged scan 1 is built from raw scans 2 and 3.
    assert_abs_diff_eq!(obs.merged_scans()[1].mjd(), TEST_MJD + 0.004, epsilon = 1e-9);
}

#[test]
fn test_no_scans() {
    let result = Observation::from_raw_scans(vec![synthetic_scan(0, 64)], false, keep_first);
    assert!(matches!(result, Err(ObservationError::NoScans)));
}

#[test]
fn test_channel_count_mismatch() {
    let mut odd = synthetic_scan(1, 64);
    odd.pols[2] = Array1::zeros(32);
    let result = Observation::new(vec![synthetic_scan(0, 64), odd], vec![], false);
    assert_eq!(
        result.unwrap_err(),
        ObservationError::ChannelCountMismatch {
            scan: 1,
            bbc: 3,
            expected: 64,
            actual: 32
        }
    );
}

#[test]
fn test_mean_epoch_and_reference_frequency() {
    let obs = synthetic_observation(2, 64);
    // Raw scans at +0, +0.002, +0.004 and +0.006 days.
    assert_abs_diff_eq!(obs.mean_mjd(), TEST_MJD + 0.003, epsilon = 1e-9);
    assert_abs_diff_eq!(
        obs.mean_epoch().to_mjd_utc_days(),
        TEST_MJD + 0.003,
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(obs.reference_frequency(), TEST_REST_FREQ);
}

#[test]
fn test_diagnostic_tables() {
    let obs = synthetic_observation(2, 64);

    assert_abs_diff_eq!(obs.zenith_distances(), array![50.0, 49.0, 48.0, 47.0]);

    let tsys = obs.tsys_table();
    assert_eq!(tsys.dim(), (NUM_BBCS, 4));
    assert_abs_diff_eq!(tsys[(1, 3)], 52.0);

    let flux = obs.total_flux_table();
    assert_eq!(flux.dim(), (NUM_BBCS, 2));
    let expected: f64 = obs.merged_scans()[1].scan().pols[3]
        .iter()
        .map(|v| v.abs())
        .sum();
    assert_abs_diff_eq!(flux[(3, 1)], expected);

    let hours = obs.time_hours();
    assert_abs_diff_eq!(hours[0], 0.0);
    assert_abs_diff_eq!(hours[3], 0.006 * 24.0, epsilon = 1e-6);
    let merged_hours = obs.merged_time_hours();
    assert_abs_diff_eq!(merged_hours[1], 0.004 * 24.0, epsilon = 1e-6);
}

#[test]
fn test_velocity_axes_are_halved_when_frequency_switched() {
    let obs = synthetic_observation(2, 64);
    let axes = obs.velocity_axes();
    assert_eq!(axes.len(), NUM_BBCS);
    assert!(axes.iter().all(|a| a.len() == 32));

    let scans = obs.scans().to_vec();
    let on_off = Observation::new(scans, vec![], true).unwrap();
    assert_eq!(on_off.velocity_axis(Bbc::new(1).unwrap()).len(), 64);
}

#[test]
fn test_remove_and_cancel_channels() {
    let bbc = Bbc::new(2).unwrap();
    let mut merged = MergedScan::new(synthetic_scan(0, 64));
    let original = merged.pol(bbc).to_owned();

    assert!(!merged.cancel_remove(bbc));

    merged.remove_channels(bbc, &[10..20]);
    let edited = merged.pol(bbc).to_owned();
    assert_abs_diff_eq!(edited[10], original[10]);
    assert_abs_diff_eq!(edited[20], original[20]);
    let midpoint = (original[10] + original[20]) / 2.0;
    assert_abs_diff_eq!(edited[15], midpoint, epsilon = 1e-9);
    // Other BBCs are untouched.
    assert_eq!(
        merged.pol(Bbc::new(1).unwrap()),
        synthetic_scan(0, 64).pols[0].view()
    );

    assert!(merged.cancel_remove(bbc));
    assert_eq!(merged.pol(bbc), original.view());
    // Only one excision can be undone.
    assert!(!merged.cancel_remove(bbc));
}
