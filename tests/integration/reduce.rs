// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs;

use approx::assert_abs_diff_eq;
use fitsio::FitsFile;
use serial_test::serial;
use tempfile::TempDir;

use super::*;
use spectral_reduction::{
    constants::*,
    fitting::{fit_baseline, halve_residuals},
    reduction::{AddOutcome, ScanStatus},
    Bbc, CalTabs, Polarization, Reduction, ReductionConfig,
};

#[test]
fn test_stack_four_scans() {
    init_logger();
    let (annotator, classifier) = classifiers();
    let config = ReductionConfig {
        fit_order: 4,
        ..Default::default()
    };
    let mut reduction = Reduction::new(observation(), config, CalTabs::new(), annotator, classifier);
    let bbc = Bbc::new(1).unwrap();
    assert_eq!(reduction.outliers().num_outliers(bbc), 0);

    // Every channel is baseline, so each scan is fitted over everything
    // inside the edge margins.
    let residuals: Vec<Array1<f64>> = reduction
        .observation()
        .merged_scans()
        .iter()
        .map(|m| {
            let fit = fit_baseline(
                m.pol(bbc),
                4,
                &[25..NUM_CHANNELS - 1],
                DEFAULT_MAX_CONDITION_NUMBER,
            )
            .unwrap();
            halve_residuals(fit.residuals.view())
        })
        .collect();
    assert_eq!(residuals.len(), 4);
    let expected = (&residuals[0] + &residuals[1] + &residuals[2] + &residuals[3]) / 4.0;

    let mut pass = reduction.begin_pass(Polarization::Lhc, bbc);
    for i in 0..4 {
        assert_eq!(pass.add_to_stack(i).unwrap(), AddOutcome::Added);
    }
    assert!(pass.all_scans_processed());
    let mean = pass.calculate_spectrum_from_stack().to_owned();
    assert_eq!(mean.len(), NUM_CHANNELS / 2);
    assert_abs_diff_eq!(mean, expected, epsilon = 1e-9);

    pass.clear_stack();
    assert!(pass
        .statuses()
        .iter()
        .all(|&s| s == ScanStatus::NotProcessed));
    assert!(pass.stack().is_empty());
    drop(pass);

    assert_abs_diff_eq!(
        reduction.final_spectrum(Polarization::Lhc).unwrap(),
        mean.view()
    );
    assert!(reduction.final_spectrum(Polarization::Rhc).is_none());
}

fn write_caltab_cache(dir: &std::path::Path) {
    let caltab_dir = dir.join("6.7GHz");
    fs::create_dir_all(&caltab_dir).unwrap();
    fs::write(
        caltab_dir.join(CALTAB_LHC_FILE_NAME),
        "# MJD coefficient\n60000 1.5\n60200 1.5\n",
    )
    .unwrap();
    fs::write(
        caltab_dir.join(CALTAB_RHC_FILE_NAME),
        "60000 2.5\n60200 2.5\n",
    )
    .unwrap();
    fs::write(caltab_dir.join(CALTAB_FREQ_RANGE_FILE_NAME), "6600 6700\n").unwrap();
}

#[test]
#[serial]
fn test_perform_with_caltabs() {
    init_logger();
    let tmp_dir = TempDir::new().unwrap();
    let cache = tmp_dir.path().join("caltabs");
    write_caltab_cache(&cache);
    let caltabs = CalTabs::read_cache(&cache).unwrap();
    assert_eq!(caltabs.len(), 1);

    let reduce = |calibrate: bool, output_dir: std::path::PathBuf| {
        let (annotator, classifier) = classifiers();
        let config = ReductionConfig {
            fit_order: 4,
            calibrate,
            caltab_dir: Some(cache.clone()),
            output_dir,
            ..Default::default()
        };
        let mut reduction =
            Reduction::new(observation(), config, caltabs.clone(), annotator, classifier);
        let file = reduction.perform().unwrap();
        (reduction, file)
    };

    let calibrated_dir = tmp_dir.path().join("calibrated");
    let uncalibrated_dir = tmp_dir.path().join("uncalibrated");
    fs::create_dir_all(&calibrated_dir).unwrap();
    fs::create_dir_all(&uncalibrated_dir).unwrap();
    let (calibrated, file) = reduce(true, calibrated_dir);
    let (uncalibrated, _) = reduce(false, uncalibrated_dir);

    let resolution = calibrated.calibration();
    assert_eq!(resolution.caltab.as_ref().unwrap().label, "6.7GHz");
    assert!(resolution.up_to_date);

    let cal = calibrated.final_pols().unwrap();
    let uncal = uncalibrated.final_pols().unwrap();
    assert_abs_diff_eq!(cal.lhc, &uncal.lhc * 1.5, epsilon = 1e-9);
    assert_abs_diff_eq!(cal.rhc, &uncal.rhc * 2.5, epsilon = 1e-9);
    assert_abs_diff_eq!(cal.i, (&cal.lhc + &cal.rhc) / 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(cal.v, &cal.rhc - &cal.lhc, epsilon = 1e-12);

    // The product holds the calibrated spectra, highest channel first.
    assert!(file
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("G351.42+0.64_"));
    let mut fptr = FitsFile::open(&file).unwrap();
    let hdu = fptr.hdu(1).unwrap();
    let pol1: Vec<f32> = hdu.read_col(&mut fptr, "Pol 1").unwrap();
    assert_eq!(pol1.len(), NUM_CHANNELS / 2);
    assert_abs_diff_eq!(pol1[0], cal.lhc[NUM_CHANNELS / 2 - 1] as f32, epsilon = 1e-4);
    let tsys1: f64 = hdu.read_key(&mut fptr, "TSYS1").unwrap();
    assert_abs_diff_eq!(tsys1, 40.0);
}
