//! Schedule spreadsheet loader
//!
//! Parses the human-recorded session timetables into a map from session key
//! to recorded start/end times and metadata. Two layouts exist: one for
//! pre/post counseling sessions and one for intervention sessions.
//!
//! The source spreadsheets have gaps: some sessions were run without anyone
//! writing down the clock times. Those load as `None` and flow through the
//! aligner as "no alignment possible" rather than failing the batch.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::clock::{add_hour, parse_hms, ClockTime};
use crate::error::PipelineError;

/// Session phase within the study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Pre,
    Pos,
    Int,
}

impl Phase {
    /// Three-letter code used in file names and schedule cells.
    pub fn as_code(&self) -> &'static str {
        match self {
            Phase::Pre => "pre",
            Phase::Pos => "pos",
            Phase::Int => "int",
        }
    }

    /// Human-readable label used in the statistics export.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Pre => "Pre",
            Phase::Pos => "Post",
            Phase::Int => "Intervention",
        }
    }

    fn from_schedule_cell(cell: &str) -> Option<Phase> {
        let code: String = cell.chars().take(3).collect::<String>().to_ascii_lowercase();
        match code.as_str() {
            "pre" => Some(Phase::Pre),
            "pos" => Some(Phase::Pos),
            "int" => Some(Phase::Int),
            _ => None,
        }
    }
}

/// Key identifying one scheduled session.
///
/// Participant numbers are always zero-padded to two digits before the key
/// is used in any map. The optional `part` label carries sub-session
/// disambiguators the scheduler wrote next to the participant number
/// (e.g. `"77 part 2"` for a recording split across two files).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub participant: String,
    pub phase: Phase,
    pub part: Option<String>,
}

impl SessionKey {
    pub fn new(participant: &str, phase: Phase) -> SessionKey {
        SessionKey {
            participant: canonical_participant(participant),
            phase,
            part: None,
        }
    }

    /// Build a key from a raw schedule cell such as `"7"` or `"77 part 2"`.
    fn from_schedule_cell(cell: &str, phase: Phase) -> SessionKey {
        let (number, label) = match cell.find(|c: char| !c.is_ascii_digit()) {
            Some(split) => {
                let label = cell[split..].trim();
                let label = if label.is_empty() {
                    None
                } else {
                    Some(label.to_string())
                };
                (&cell[..split], label)
            }
            None => (cell, None),
        };
        SessionKey {
            participant: canonical_participant(number),
            phase,
            part: label,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "participant {} {}", self.participant, self.phase.as_code())?;
        if let Some(part) = &self.part {
            write!(f, " ({})", part)?;
        }
        Ok(())
    }
}

/// Zero-pad single-digit participant numbers to two digits.
pub fn canonical_participant(number: &str) -> String {
    if number.len() == 1 {
        format!("0{}", number)
    } else {
        number.to_string()
    }
}

/// One row of the schedule: recorded clock times plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub start_time: Option<ClockTime>,
    pub end_time: Option<ClockTime>,
    pub gender: String,
    pub note: String,
}

/// Load a schedule spreadsheet into a session-key map.
///
/// When the same key appears on several rows, the last row wins.
pub fn load_schedule(
    path: &Path,
    is_intervention: bool,
) -> Result<HashMap<SessionKey, ScheduleEntry>, PipelineError> {
    let file = File::open(path)?;
    read_schedule(file, is_intervention)
}

/// Reader-based variant of [`load_schedule`].
pub fn read_schedule<R: Read>(
    reader: R,
    is_intervention: bool,
) -> Result<HashMap<SessionKey, ScheduleEntry>, PipelineError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut entries = HashMap::new();

    for record in csv_reader.records() {
        let record = record?;
        let first = cell(&record, 0);
        // Data rows start with a date; everything else is header/footer text.
        if !first.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let dst = needs_dst_correction(first);

        let (key, raw_start, raw_end, gender, note) = if is_intervention {
            (
                SessionKey::from_schedule_cell(cell(&record, 1), Phase::Int),
                cell(&record, 2),
                cell(&record, 3),
                "",
                cell(&record, 5),
            )
        } else {
            let Some(phase) = Phase::from_schedule_cell(cell(&record, 1)) else {
                warn!("skipping schedule row with unknown phase '{}'", cell(&record, 1));
                continue;
            };
            (
                SessionKey::from_schedule_cell(cell(&record, 3), phase),
                cell(&record, 4),
                cell(&record, 5),
                cell(&record, 2),
                cell(&record, 6),
            )
        };

        let entry = ScheduleEntry {
            start_time: parse_schedule_time(raw_start, dst),
            end_time: parse_schedule_time(raw_end, dst),
            gender: gender.to_string(),
            note: note.to_string(),
        };
        entries.insert(key, entry);
    }

    Ok(entries)
}

fn cell<'a>(record: &'a csv::StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("").trim()
}

/// A missing or unparsable time loads as `None`; the dataset is known to
/// have rows where nobody recorded the clock time.
fn parse_schedule_time(raw: &str, dst: bool) -> Option<ClockTime> {
    let t = parse_hms(raw).ok()?;
    Some(if dst { add_hour(t) } else { t })
}

/// Sessions held after the autumn daylight-saving change were written down
/// in the shifted local time; those rows get one hour added back.
fn needs_dst_correction(date_cell: &str) -> bool {
    let date = NaiveDate::parse_from_str(date_cell, "%m/%d/%y")
        .or_else(|_| NaiveDate::parse_from_str(date_cell, "%m/%d/%Y"));
    match date {
        Ok(d) => d.month() > 10 && d.day() > 4,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    const PREPOS: &str = "\
Date,Session,Gender,Participant,Start,End,Notes
10/2/15,Pre-test,Females,21,8:14:14,8:32:11,
10/2/15,Pre-test,Females,7,9:01:00,9:20:30,sensor slipped
10/3/15,Post-test,Females,21,,,times not recorded
11/5/15,Post-test,Males,33,10:00:00,10:30:00,
";

    const INTERVENTION: &str = "\
Date,Participant,Start,End,Counselor,Notes
10/9/15,77,8:05:00,8:45:00,,first part
10/9/15,77 part 2,9:00:00,9:20:00,,second part
11/6/15,12,7:30:00,8:10:00,,
";

    #[test]
    fn loads_prepost_rows() {
        let times = read_schedule(Cursor::new(PREPOS), false).unwrap();
        let entry = &times[&SessionKey::new("21", Phase::Pre)];
        assert_eq!(entry.start_time, Some(8 * 3600 + 14 * 60 + 14));
        assert_eq!(entry.end_time, Some(8 * 3600 + 32 * 60 + 11));
        assert_eq!(entry.gender, "Females");
        assert_eq!(entry.note, "");
    }

    #[test]
    fn single_digit_participants_are_zero_padded() {
        let times = read_schedule(Cursor::new(PREPOS), false).unwrap();
        let entry = &times[&SessionKey::new("7", Phase::Pre)];
        assert_eq!(entry.note, "sensor slipped");
        assert!(times
            .keys()
            .all(|k| k.participant.len() == 2));
    }

    #[test]
    fn missing_times_load_as_none() {
        let times = read_schedule(Cursor::new(PREPOS), false).unwrap();
        let entry = &times[&SessionKey::new("21", Phase::Pos)];
        assert_eq!(entry.start_time, None);
        assert_eq!(entry.end_time, None);
        assert_eq!(entry.note, "times not recorded");
    }

    #[test]
    fn dst_rows_gain_an_hour() {
        let times = read_schedule(Cursor::new(PREPOS), false).unwrap();
        let entry = &times[&SessionKey::new("33", Phase::Pos)];
        assert_eq!(entry.start_time, Some(11 * 3600));
        assert_eq!(entry.end_time, Some(11 * 3600 + 30 * 60));
    }

    #[test]
    fn intervention_layout_and_part_labels() {
        let times = read_schedule(Cursor::new(INTERVENTION), true).unwrap();
        let entry = &times[&SessionKey::new("77", Phase::Int)];
        assert_eq!(entry.start_time, Some(8 * 3600 + 5 * 60));
        assert_eq!(entry.gender, "");
        assert_eq!(entry.note, "first part");

        let part2_key = SessionKey {
            participant: "77".to_string(),
            phase: Phase::Int,
            part: Some("part 2".to_string()),
        };
        let part2 = &times[&part2_key];
        assert_eq!(part2.start_time, Some(9 * 3600));
        assert_eq!(part2.end_time, Some(9 * 3600 + 20 * 60));
    }

    #[test]
    fn later_rows_overwrite_earlier() {
        let doubled = format!(
            "{}10/4/15,Pre-test,Females,21,9:00:00,9:30:00,redo\n",
            PREPOS
        );
        let times = read_schedule(Cursor::new(doubled), false).unwrap();
        let entry = &times[&SessionKey::new("21", Phase::Pre)];
        assert_eq!(entry.start_time, Some(9 * 3600));
        assert_eq!(entry.note, "redo");
    }
}
