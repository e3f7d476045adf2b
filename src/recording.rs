//! Device log loader
//!
//! Each logger file carries two header lines (the device sampling rate and
//! the device-recorded start time) followed by sample rows. The EDA value
//! sits in the sixth column. Sample indices are 0-based ordinals over the
//! accepted data rows, not raw row numbers.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::clock::{parse_hms, ClockTime};
use crate::error::PipelineError;

/// One device log file, immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecording {
    pub samples: Vec<f64>,
    pub sample_indices: Vec<i64>,
    pub sampling_rate_hz: i64,
    pub start_time: ClockTime,
}

/// Load a device log file.
pub fn load_recording(path: &Path) -> Result<DeviceRecording, PipelineError> {
    let file = File::open(path)?;
    read_recording(file, &path.display().to_string())
}

/// Reader-based variant of [`load_recording`]; `label` names the source in
/// errors.
pub fn read_recording<R: Read>(reader: R, label: &str) -> Result<DeviceRecording, PipelineError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut sampling_rate = None;
    let mut start_time = None;
    let mut samples = Vec::new();
    let mut sample_indices = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let first = record.get(0).unwrap_or("");

        if first.starts_with("Samp") {
            // e.g. "Sampling rate: 4" -- the rate is the trailing character
            let rate = first
                .chars()
                .last()
                .and_then(|c| c.to_digit(10))
                .ok_or_else(|| format_error(label, "unreadable sampling rate header"))?;
            sampling_rate = Some(rate as i64);
        } else if first.starts_with("Start") {
            // e.g. "Start time: Wed 21:03:56 2015" -- 4th space-separated token
            let token = first
                .split_whitespace()
                .nth(3)
                .ok_or_else(|| format_error(label, "unreadable start time header"))?;
            start_time = Some(
                parse_hms(token)
                    .map_err(|_| format_error(label, "unreadable start time header"))?,
            );
        } else if is_data_row(first) {
            let value = record
                .get(5)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .ok_or_else(|| format_error(label, "data row without a numeric EDA column"))?;
            sample_indices.push(samples.len() as i64);
            samples.push(value);
        }
    }

    Ok(DeviceRecording {
        samples,
        sample_indices,
        sampling_rate_hz: sampling_rate
            .ok_or_else(|| format_error(label, "missing sampling rate header"))?,
        start_time: start_time
            .ok_or_else(|| format_error(label, "missing start time header"))?,
    })
}

/// Data rows have a digit as their second character, which tolerates a
/// leading minus sign while rejecting stray header and footer text.
fn is_data_row(first_cell: &str) -> bool {
    first_cell
        .chars()
        .nth(1)
        .map(|c| c.is_ascii_digit())
        .unwrap_or(false)
}

fn format_error(label: &str, reason: &str) -> PipelineError {
    PipelineError::LogFormat {
        path: label.to_string(),
        reason: reason.to_string(),
    }
}
