// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use fitsio::FitsFile;
use ndarray::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

use super::*;
use crate::{
    coord::doppler_shift,
    tests::{synthetic_observation, TEST_REST_FREQ},
};

#[test]
fn test_molecule_thresholds() {
    let cases = [
        (1665.4, "exOH 6031"),
        (6030.7, "exOH 6031"),
        (6034.0, "exOH 6035"),
        (6035.1, "exOH 6035"),
        (6100.0, "CH3OH 6668"),
        (6668.5, "CH3OH 6668"),
        (7000.0, "CH3OH 12178"),
        (12178.6, "CH3OH 12178"),
        (13000.0, "H2O 22235"),
        (22235.1, "H2O 22235"),
    ];
    for (freq, expected) in cases {
        assert_eq!(Molecule::from_rest_freq(freq).to_string(), expected, "{freq}");
    }
}

#[test]
fn test_sexagesimal_strings() {
    let ra = Sexagesimal {
        major: 6,
        minutes: 8,
        seconds: 53,
    };
    assert_eq!(format_ra(ra), "06h08m53s");

    let dec = Sexagesimal {
        major: -5,
        minutes: 38,
        seconds: 0,
    };
    assert_eq!(format_dec(dec), "-05d38m00s");

    let dec = Sexagesimal {
        major: -21,
        minutes: 38,
        seconds: 29,
    };
    assert_eq!(format_dec(dec), "-21d38m29s");
}

#[test]
fn test_product_file_name() {
    assert_eq!(
        product_file_name("G345.01+1.79", 60000.2534),
        "G345.01+1.79_60000253.fits"
    );
    assert_eq!(product_file_name("W3OH", 60000.25), "W3OH_6000025.fits");
    assert_eq!(product_file_name("W3OH", 59999.9999), "W3OH_600000.fits");
}

#[test]
fn test_header_assembly() {
    let obs = synthetic_observation(2, 64);
    let bbcs = [Bbc::new(1).unwrap(), Bbc::new(4).unwrap()];
    let header = OutputHeader::assemble(&obs, bbcs);

    assert_eq!(header.object, "G345.01+1.79");
    assert_eq!(header.src_ra, "06h08m53s");
    assert_eq!(header.src_dec, "-02d38m09s");
    assert_eq!(header.molecule, Molecule::Methanol6668);
    assert_abs_diff_eq!(header.freq, TEST_REST_FREQ * 1e6);
    assert_abs_diff_eq!(header.rest_freq, TEST_REST_FREQ * 1e6);

    // Bandwidth of 2 MHz; the header always describes half of it, and the
    // frequency markers span half of that again.
    let centre = doppler_shift(TEST_REST_FREQ, -5.0);
    assert_abs_diff_eq!(header.freq_mid, centre);
    assert_abs_diff_eq!(header.freq_begin, centre - 0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(header.freq_end, centre + 0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(header.freq_range, 1.0);

    assert_abs_diff_eq!(header.vsys, -5.0);
    assert_abs_diff_eq!(header.azimuth, 120.0);
    assert_abs_diff_eq!(header.zenith, 50.0);
    assert_abs_diff_eq!(header.tsys[0], 50.0);
    assert_abs_diff_eq!(header.tsys[1], 53.0);
    assert_eq!(header.scan_type, "FINAL");
}

#[test]
#[serial]
fn test_write_fits() {
    let tmp_dir = TempDir::new().unwrap();
    let file = tmp_dir.path().join("product.fits");

    let obs = synthetic_observation(2, 64);
    let header = OutputHeader::assemble(&obs, [Bbc::new(1).unwrap(), Bbc::new(2).unwrap()]);
    let metadata = ProductMetadata {
        author: "A. Reducer".to_string(),
        ..Default::default()
    };
    let lhc = Array1::range(0.0, 8.0, 1.0);
    let rhc = Array1::range(10.0, 18.0, 1.0);

    // Writing twice overwrites.
    for _ in 0..2 {
        write_fits(&file, &header, &metadata, lhc.view(), rhc.view()).unwrap();
    }

    let mut fptr = FitsFile::open(&file).unwrap();
    let hdu = fptr.hdu(1).unwrap();
    let pol1: Vec<f32> = hdu.read_col(&mut fptr, "Pol 1").unwrap();
    let pol2: Vec<f32> = hdu.read_col(&mut fptr, "Pol 2").unwrap();
    assert_eq!(pol1, [7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0]);
    assert_eq!(pol2[0], 17.0);

    let object: String = hdu.read_key(&mut fptr, "OBJECT").unwrap();
    assert_eq!(object, "G345.01+1.79");
    let molecule: String = hdu.read_key(&mut fptr, "MOLECULE").unwrap();
    assert_eq!(molecule, "CH3OH 6668");
    let telescope: String = hdu.read_key(&mut fptr, "TELESCOP").unwrap();
    assert_eq!(telescope, "RT4");
    let tsys2: f64 = hdu.read_key(&mut fptr, "TSYS2").unwrap();
    assert_abs_diff_eq!(tsys2, 52.0);
    let freq_range: f64 = hdu.read_key(&mut fptr, "FRQ_RANG").unwrap();
    assert_abs_diff_eq!(freq_range, 1.0);

    let primary = fptr.primary_hdu().unwrap();
    let software: String = primary.read_key(&mut fptr, "SOFTWARE").unwrap();
    assert_eq!(software, env!("CARGO_PKG_NAME"));
}

#[test]
fn test_write_fits_rejects_mismatched_spectra() {
    let tmp_dir = TempDir::new().unwrap();
    let obs = synthetic_observation(1, 64);
    let header = OutputHeader::assemble(&obs, [Bbc::new(1).unwrap(), Bbc::new(2).unwrap()]);
    let result = write_fits(
        tmp_dir.path().join("bad.fits"),
        &header,
        &ProductMetadata::default(),
        Array1::zeros(4).view(),
        Array1::zeros(5).view(),
    );
    assert!(matches!(
        result,
        Err(ProductError::LengthMismatch { lhc: 4, rhc: 5 })
    ));
}
