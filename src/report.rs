//! Tabular exporters
//!
//! Two independent outputs: a statistics table with one row per participant
//! slot, and one wide per-participant table of normalized series resampled
//! to the playback rate.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::info;

use crate::clock::{format_hms, ClockTime};
use crate::consolidate::{ParticipantRecord, Role, Side, SLOT_COUNT, SLOT_LABELS};
use crate::error::PipelineError;
use crate::schedule::Phase;
use crate::transform::{normalize, resample};

/// Header of the statistics table.
const STATISTICS_HEADER: [&str; 18] = [
    "Participant Number",
    "Pre/Post/Intervention",
    "Student/Counselor",
    "Modality",
    "Sampling Rate",
    "Start Time",
    "End Time",
    "Duration",
    "Gender",
    "Extra Info",
    "Mean",
    "Median",
    "Mode",
    "Standard Deviation",
    "Normalized Mean",
    "Normalized Median",
    "Normalized Mode",
    "Normalized Standard Deviation",
];

/// Write `Statistics.csv`: one row per participant and slot, participants
/// in ascending numeric order. Empty slots emit the label columns plus
/// fourteen empty fields.
pub fn export_statistics(
    records: &BTreeMap<String, ParticipantRecord<'_>>,
    path: &Path,
) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(STATISTICS_HEADER)?;

    for participant in sorted_participants(records) {
        let record = &records[participant];
        for (index, slot) in record.slots.iter().enumerate() {
            let (phase, role, side) = slot_headers(index);
            let mut row = vec![
                participant.clone(),
                phase.to_string(),
                role.to_string(),
                side.to_string(),
            ];
            match slot.series() {
                Some(series) => {
                    row.push(series.sampling_rate_hz.to_string());
                    row.push(fmt_time(series.start));
                    row.push(fmt_time(series.end));
                    row.push(fmt_time(series.duration));
                    row.push(series.gender.clone());
                    row.push(series.note.clone());
                    match series.stats {
                        Some(stats) => {
                            for value in [
                                stats.mean,
                                stats.median,
                                stats.mode,
                                stats.stddev,
                                stats.normalized_mean,
                                stats.normalized_median,
                                stats.normalized_mode,
                                stats.normalized_stddev,
                            ] {
                                row.push(value.to_string());
                            }
                        }
                        None => row.extend(std::iter::repeat(String::new()).take(8)),
                    }
                }
                None => row.extend(std::iter::repeat(String::new()).take(14)),
            }
            writer.write_record(&row)?;
        }
    }

    writer.flush()?;
    info!("wrote statistics table to {}", path.display());
    Ok(())
}

/// Write one `<participant>.csv` per participant under `dir`: each populated
/// slot's samples normalized by their own maximum, resampled to `target_fps`
/// from the slot's recorded rate, and zipped side by side with the other
/// slots, shorter columns padded with empty cells.
pub fn export_participant_series(
    records: &BTreeMap<String, ParticipantRecord<'_>>,
    target_fps: i64,
    dir: &Path,
) -> Result<(), PipelineError> {
    fs::create_dir_all(dir)?;

    for participant in sorted_participants(records) {
        let record = &records[participant];
        let mut columns: Vec<Vec<String>> = SLOT_LABELS.iter().map(|l| vec![l.to_string()]).collect();

        for (index, slot) in record.slots.iter().enumerate() {
            let Some(series) = slot.series() else {
                continue;
            };
            if series.samples.is_empty() {
                columns[index].push(String::new());
                continue;
            }
            let max = series.samples.iter().cloned().fold(f64::MIN, f64::max);
            let normalized = normalize(&series.samples, max);
            let playback = resample(&normalized, target_fps, series.sampling_rate_hz);
            columns[index].extend(playback.iter().map(|v| v.to_string()));
        }

        let depth = columns.iter().map(Vec::len).max().unwrap_or(0);
        for column in &mut columns {
            column.resize(depth, String::new());
        }

        let path = dir.join(format!("{}.csv", participant));
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(&path)?;
        writer.write_record([format!("Participant = {}", participant)])?;
        for row in 0..depth {
            writer.write_record(columns.iter().map(|c| c[row].as_str()))?;
        }
        writer.flush()?;
    }

    info!(
        "wrote {} participant series tables to {}",
        records.len(),
        dir.display()
    );
    Ok(())
}

/// Participant keys in ascending numeric order.
fn sorted_participants<'a>(records: &'a BTreeMap<String, ParticipantRecord<'_>>) -> Vec<&'a String> {
    let mut keys: Vec<&String> = records.keys().collect();
    keys.sort_by_key(|k| k.parse::<i64>().unwrap_or(i64::MAX));
    keys
}

fn fmt_time(t: Option<ClockTime>) -> String {
    t.map(format_hms).unwrap_or_default()
}

/// Label columns for a slot index.
fn slot_headers(index: usize) -> (&'static str, &'static str, &'static str) {
    debug_assert!(index < SLOT_COUNT);
    let phase = if index < 4 {
        Phase::Pre
    } else if index < 8 {
        Phase::Pos
    } else {
        Phase::Int
    };
    // intervention recordings are always the student's
    let role = if index >= 8 || index % 4 >= 2 {
        Role::Student
    } else {
        Role::Counselor
    };
    let side = if index % 2 == 0 { Side::Left } else { Side::Right };
    (phase.label(), role.label(), side.label())
}
