// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writing products to FITS files.
//!
//! The primary HDU only identifies the software. The spectra are in a binary
//! table with one single-precision column per polarisation, in decreasing
//! channel order, and the table's header carries the [`OutputHeader`].

use std::{ffi::CString, path::Path};

use fitsio::{
    errors::check_status as fits_check_status,
    tables::{ColumnDataType, ColumnDescription},
    FitsFile,
};
use log::debug;
use ndarray::prelude::*;

use super::{OutputHeader, ProductError, ProductMetadata};

fn c_string(key: &str, value: &str) -> Result<CString, ProductError> {
    CString::new(value).map_err(|_| ProductError::NulByte {
        key: key.to_string(),
    })
}

/// Write a string key with a comment into the current HDU.
fn write_str_key(
    fptr: &mut FitsFile,
    key: &str,
    value: &str,
    comment: &str,
) -> Result<(), ProductError> {
    let key_name = c_string(key, key)?;
    let value = c_string(key, value)?;
    let comment = c_string(key, comment)?;
    let mut status = 0;
    unsafe {
        // ffpkys = fits_write_key_str
        fitsio_sys::ffpkys(
            fptr.as_raw(),     /* I - FITS file pointer        */
            key_name.as_ptr(), /* I - name of keyword to write */
            value.as_ptr(),    /* I - keyword value            */
            comment.as_ptr(),  /* I - keyword comment          */
            &mut status,       /* IO - error status            */
        );
    }
    fits_check_status(status)?;
    Ok(())
}

/// Write a double-precision key with a comment into the current HDU.
fn write_f64_key(
    fptr: &mut FitsFile,
    key: &str,
    value: f64,
    comment: &str,
) -> Result<(), ProductError> {
    let key_name = c_string(key, key)?;
    let comment = c_string(key, comment)?;
    let mut status = 0;
    unsafe {
        // ffpkyd = fits_write_key_dbl
        fitsio_sys::ffpkyd(
            fptr.as_raw(),     /* I - FITS file pointer        */
            key_name.as_ptr(), /* I - name of keyword to write */
            value,             /* I - keyword value            */
            -15,               /* I - number of decimal places */
            comment.as_ptr(),  /* I - keyword comment          */
            &mut status,       /* IO - error status            */
        );
    }
    fits_check_status(status)?;
    Ok(())
}

/// Write the LHC and RHC spectra of a product. An existing file is
/// overwritten.
pub fn write_fits<'a, P: AsRef<Path>>(
    file: P,
    header: &OutputHeader,
    metadata: &ProductMetadata,
    lhc: ArrayView1<'a, f64>,
    rhc: ArrayView1<'a, f64>,
) -> Result<(), ProductError> {
    let file = file.as_ref();
    if lhc.len() != rhc.len() {
        return Err(ProductError::LengthMismatch {
            lhc: lhc.len(),
            rhc: rhc.len(),
        });
    }
    if file.exists() {
        std::fs::remove_file(file)?;
    }
    debug!("Writing product to {}", file.display());

    let mut fptr = FitsFile::create(file).open()?;
    fptr.primary_hdu()?;
    write_str_key(
        &mut fptr,
        "ORIGIN",
        &metadata.institution,
        "Institution that reduced the data",
    )?;
    write_str_key(
        &mut fptr,
        "SOFTWARE",
        env!("CARGO_PKG_NAME"),
        "Software that reduced the data",
    )?;
    write_str_key(
        &mut fptr,
        "VERSION",
        env!("CARGO_PKG_VERSION"),
        "Software release version",
    )?;
    if !metadata.author.is_empty() {
        write_str_key(&mut fptr, "AUTHOR", &metadata.author, "Author of the product")?;
    }

    let pol1_col = ColumnDescription::new("Pol 1")
        .with_type(ColumnDataType::Float)
        .create()?;
    let pol2_col = ColumnDescription::new("Pol 2")
        .with_type(ColumnDataType::Float)
        .create()?;
    let hdu = fptr.create_table("SPECTRA", &[pol1_col, pol2_col])?;
    // Channels are written from the highest velocity to the lowest.
    for (name, spectrum) in [("Pol 1", lhc), ("Pol 2", rhc)] {
        let data: Vec<f32> = spectrum.iter().rev().map(|&v| v as f32).collect();
        hdu.write_col(&mut fptr, name, &data)?;
    }

    for (key, value) in [
        ("AUTHOR", &metadata.author),
        ("INSTRUME", &metadata.instrument),
        ("TELESCOP", &metadata.telescope),
        ("ORIGIN", &metadata.origin),
        ("OBSERVER", &metadata.observer),
    ] {
        if !value.is_empty() {
            hdu.write_key(&mut fptr, key, value.as_str())?;
        }
    }

    let h = header;
    write_str_key(&mut fptr, "OBJECT", &h.object, "Name of the observed object")?;
    write_f64_key(
        &mut fptr,
        "EQUINOX",
        h.equinox,
        "Equinox of celestial coordinate system",
    )?;
    write_str_key(&mut fptr, "SRC_RA", &h.src_ra, "RA of source")?;
    write_str_key(&mut fptr, "SRC_DEC", &h.src_dec, "DEC of source")?;
    write_str_key(
        &mut fptr,
        "DATE-OBS",
        &h.date_obs,
        "Format: 'yyyy-mm-ddTHH:MM:SS[.sss]'",
    )?;
    write_f64_key(&mut fptr, "FREQ", h.freq, "Frequency in Hz")?;
    write_f64_key(
        &mut fptr,
        "FRQ_BEG",
        h.freq_begin,
        "Frequency at the beginning [MHz]",
    )?;
    write_f64_key(
        &mut fptr,
        "FRQ_MID",
        h.freq_mid,
        "Frequency at the middle of the spectrum [MHz]",
    )?;
    write_f64_key(&mut fptr, "FRQ_END", h.freq_end, "Frequency at the end [MHz]")?;
    write_f64_key(&mut fptr, "FRQ_RANG", h.freq_range, "Bandwidth [MHz]")?;
    write_f64_key(&mut fptr, "VSYS", h.vsys, "System velocity [km/s]")?;
    write_f64_key(&mut fptr, "DOPP_VSU", h.doppler_sun, "Sun's velocity")?;
    write_f64_key(
        &mut fptr,
        "DOPP_VOB",
        h.doppler_observer,
        "Observer's velocity",
    )?;
    write_f64_key(
        &mut fptr,
        "DOPP_VTO",
        h.doppler_total,
        "Final Doppler velocity for source",
    )?;
    hdu.write_key(&mut fptr, "RESTFRQ", h.rest_freq)?;
    hdu.write_key(&mut fptr, "MOLECULE", h.molecule.to_string())?;
    hdu.write_key(&mut fptr, "TIME", h.time.as_str())?;
    hdu.write_key(&mut fptr, "AZ", h.azimuth)?;
    hdu.write_key(&mut fptr, "Z", h.zenith)?;
    hdu.write_key(&mut fptr, "SCAN_TYP", h.scan_type)?;
    write_f64_key(&mut fptr, "TSYS1", h.tsys[0], "Measured Tsys pol 1")?;
    write_f64_key(&mut fptr, "TSYS2", h.tsys[1], "Measured Tsys pol 2")?;

    Ok(())
}
