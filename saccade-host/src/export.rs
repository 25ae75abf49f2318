//! Profile CSV files
//!
//! One row per sample; missing velocities are empty fields. Values are
//! written with full precision so a file reads back to the same samples.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use saccade_core::profile::{ProfileSample, MAX_PROFILE_SAMPLES};
use thiserror::Error;

pub const HEADER: [&str; 7] = [
    "time", "pan_abs", "tilt_abs", "pan_rel", "tilt_rel", "pan_vel", "tilt_vel",
];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid {column} value '{value}'")]
    Parse {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("more than {} samples", MAX_PROFILE_SAMPLES)]
    TooLong,
}

fn optional(value: Option<f32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write samples to any writer
pub fn write_samples<W: Write>(writer: W, samples: &[ProfileSample]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for s in samples {
        wtr.write_record(&[
            s.elapsed_s.to_string(),
            s.pan_abs.to_string(),
            s.tilt_abs.to_string(),
            s.pan_rel.to_string(),
            s.tilt_rel.to_string(),
            optional(s.pan_vel),
            optional(s.tilt_vel),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write samples to a file, replacing it
pub fn save_samples(path: &Path, samples: &[ProfileSample]) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_samples(file, samples)
}

/// Read samples written by [`write_samples`]
///
/// Columns are located by header name, so extra columns are ignored.
pub fn read_samples<R: Read>(reader: R) -> Result<Vec<ProfileSample>, ExportError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut index = [0usize; 7];
    for (slot, name) in index.iter_mut().zip(HEADER) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(ExportError::MissingColumn(name))?;
    }

    let mut samples = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        if samples.len() == MAX_PROFILE_SAMPLES {
            return Err(ExportError::TooLong);
        }
        let field = |col: usize| -> Result<Option<f32>, ExportError> {
            let value = record.get(index[col]).unwrap_or("").trim();
            if value.is_empty() {
                return Ok(None);
            }
            value.parse().map(Some).map_err(|_| ExportError::Parse {
                row: row + 1,
                column: HEADER[col],
                value: value.to_string(),
            })
        };
        let required = |col: usize| -> Result<f32, ExportError> {
            field(col)?.ok_or(ExportError::Parse {
                row: row + 1,
                column: HEADER[col],
                value: String::new(),
            })
        };

        samples.push(ProfileSample {
            elapsed_s: required(0)?,
            pan_abs: required(1)?,
            tilt_abs: required(2)?,
            pan_rel: required(3)?,
            tilt_rel: required(4)?,
            pan_vel: field(5)?,
            tilt_vel: field(6)?,
        });
    }
    Ok(samples)
}

pub fn load_samples(path: &Path) -> Result<Vec<ProfileSample>, ExportError> {
    let file = std::fs::File::open(path)?;
    read_samples(file)
}

/// `profile_<unix seconds>.csv` in the working directory
pub fn default_filename() -> PathBuf {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    PathBuf::from(format!("profile_{secs}.csv"))
}
