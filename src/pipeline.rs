//! Pipeline orchestration
//!
//! One run: load both timetables, walk the log directory, align every
//! recording against its scheduled window, consolidate by participant, and
//! write the two exports. A file that fails to load or parse is logged and
//! skipped; a recording with no schedule entry aborts the run, because that
//! means the timetable and the data directory disagree and someone has to
//! look at it.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::aligner::{align, AlignedSeries, AlignmentWindow};
use crate::clock::resolve_am_pm;
use crate::config::PipelineConfig;
use crate::consolidate::{consolidate, FileKey};
use crate::discover::list_files;
use crate::error::PipelineError;
use crate::recording::load_recording;
use crate::report::{export_participant_series, export_statistics};
use crate::schedule::{load_schedule, Phase, ScheduleEntry, SessionKey};
use crate::stats::compute_stats;

/// Schedule times carry no AM/PM marker. Intervention sessions ran in the
/// morning from 08:00; pre/post sessions never started before noon.
const INT_CUTOFF_HOUR: i64 = 8;
const PREPOS_CUTOFF_HOUR: i64 = 12;

/// What one run did.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub files_processed: usize,
    pub files_skipped: Vec<String>,
    pub participants: usize,
    pub statistics_path: PathBuf,
}

/// Execute the full batch described by `config`.
pub fn run(config: &PipelineConfig) -> Result<RunSummary, PipelineError> {
    config.validate()?;

    let intervention_times = load_schedule(&config.intervention_schedule, true)?;
    let prepost_times = load_schedule(&config.prepost_schedule, false)?;

    let files = list_files(&config.data_dir, |p| {
        p.extension().map(|e| e == "csv").unwrap_or(false)
    })?;
    info!(
        "found {} log files under {}",
        files.len(),
        config.data_dir.display()
    );

    let mut file_data: BTreeMap<String, AlignedSeries> = BTreeMap::new();
    let mut skipped = Vec::new();

    for path in &files {
        match process_file(path, &intervention_times, &prepost_times) {
            Ok((name, aligned)) => {
                file_data.insert(name, aligned);
            }
            Err(err @ PipelineError::ScheduleLookup(_)) => return Err(err),
            Err(err) => {
                warn!("skipping {}: {}", path.display(), err);
                skipped.push(path.display().to_string());
            }
        }
    }

    let records = consolidate(&file_data)?;

    fs::create_dir_all(&config.output_dir)?;
    let statistics_path = config.statistics_path();
    export_statistics(&records, &statistics_path)?;
    export_participant_series(&records, config.target_fps, &config.participants_dir())?;

    Ok(RunSummary {
        files_processed: file_data.len(),
        files_skipped: skipped,
        participants: records.len(),
        statistics_path,
    })
}

/// Load, look up, and align one log file.
fn process_file(
    path: &Path,
    intervention_times: &HashMap<SessionKey, ScheduleEntry>,
    prepost_times: &HashMap<SessionKey, ScheduleEntry>,
) -> Result<(String, AlignedSeries), PipelineError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PipelineError::FileName(path.display().to_string()))?;
    let key = FileKey::parse(name)?;

    let (entry, cutoff, second_window) = match key.phase {
        Phase::Int => {
            let session = SessionKey::new(&key.participant, Phase::Int);
            let entry = intervention_times
                .get(&session)
                .ok_or_else(|| PipelineError::ScheduleLookup(session.to_string()))?;
            // a "part 2" timetable row marks a session recorded in two files
            let part2 = intervention_times
                .iter()
                .find(|(k, _)| k.participant == key.participant && k.part.is_some())
                .map(|(_, e)| e);
            (entry, INT_CUTOFF_HOUR, part2)
        }
        phase => {
            let session = SessionKey::new(&key.participant, phase);
            let entry = prepost_times
                .get(&session)
                .ok_or_else(|| PipelineError::ScheduleLookup(session.to_string()))?;
            (entry, PREPOS_CUTOFF_HOUR, None)
        }
    };

    let window = AlignmentWindow {
        start: entry.start_time.map(|t| resolve_am_pm(t, cutoff)),
        end: entry.end_time.map(|t| resolve_am_pm(t, cutoff)),
        start2: second_window
            .and_then(|e| e.start_time)
            .map(|t| resolve_am_pm(t, cutoff)),
        end2: second_window
            .and_then(|e| e.end_time)
            .map(|t| resolve_am_pm(t, cutoff)),
    };

    let recording = load_recording(path)?;
    let stats = compute_stats(&recording.samples);
    let aligned = align(
        &recording,
        &window,
        entry.gender.clone(),
        entry.note.clone(),
        stats,
    );
    Ok((key.canonical_name(), aligned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        write!(f, "{}", content).unwrap();
    }

    fn log_file(start: &str, values: &[f64]) -> String {
        let mut out = format!("Sampling rate: 1\nStart time: Wed {} 2015\n", start);
        for v in values {
            out.push_str(&format!("1.0,0,0,0,36.0,{}\n", v));
        }
        out
    }

    fn fixture_config(dir: &Path) -> PipelineConfig {
        PipelineConfig {
            intervention_schedule: dir.join("int.csv"),
            prepost_schedule: dir.join("prepos.csv"),
            data_dir: dir.join("logs"),
            output_dir: dir.join("out"),
            target_fps: 30,
        }
    }

    #[test]
    fn missing_schedule_entry_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "int.csv", "Date,Participant,Start,End,Counselor,Notes\n");
        write_file(
            dir.path(),
            "prepos.csv",
            "Date,Session,Gender,Participant,Start,End,Notes\n",
        );
        fs::create_dir(dir.path().join("logs")).unwrap();
        write_file(
            &dir.path().join("logs"),
            "07_pre_cl.csv",
            &log_file("1:00:00", &[1.0, 2.0]),
        );

        let err = run(&fixture_config(dir.path())).unwrap_err();
        assert!(matches!(err, PipelineError::ScheduleLookup(_)));
    }

    #[test]
    fn malformed_file_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "int.csv",
            "Date,Participant,Start,End,Counselor,Notes\n",
        );
        write_file(
            dir.path(),
            "prepos.csv",
            "Date,Session,Gender,Participant,Start,End,Notes\n\
             10/2/15,Pre-test,Females,7,1:00:00,1:02:00,\n",
        );
        fs::create_dir(dir.path().join("logs")).unwrap();
        write_file(
            &dir.path().join("logs"),
            "07_pre_cl.csv",
            &log_file("13:00:00", &[1.0, 2.0]),
        );
        // no headers at all
        write_file(&dir.path().join("logs"), "07_pre_cr.csv", "garbage\n");
        // name outside the grammar
        write_file(&dir.path().join("logs"), "leftovers.csv", "garbage\n");

        let summary = run(&fixture_config(dir.path())).unwrap();
        assert_eq!(summary.files_processed, 1);
        assert_eq!(summary.files_skipped.len(), 2);
        assert_eq!(summary.participants, 1);
    }
}
