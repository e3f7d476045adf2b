//! Consolidation of aligned recordings into per-participant records
//!
//! Log file names encode participant, phase, role, and sensor side:
//! `07_pre_cl.csv` is participant 07, pre-test, counselor, left sensor;
//! `7_avatar_pl.csv` is participant 07's intervention session, left sensor.
//! Intervention recordings carry no role letter and always land in the
//! student slots.

use std::collections::BTreeMap;

use crate::aligner::AlignedSeries;
use crate::error::PipelineError;
use crate::schedule::{canonical_participant, Phase};

/// Slots per participant: pre/post x counselor/student x left/right, plus
/// the intervention left/right pair.
pub const SLOT_COUNT: usize = 10;

/// Short slot labels, in record order. Also the column headers of the
/// per-participant series export.
pub const SLOT_LABELS: [&str; SLOT_COUNT] = [
    "precl", "precr", "presl", "presr", "poscl", "poscr", "possl", "possr", "intl", "intr",
];

/// Sensor wearer during a pre/post session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Counselor,
    Student,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Counselor => "Counselor",
            Role::Student => "Student",
        }
    }
}

/// Left or right sensor channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }
}

/// Parsed identity of one log file.
///
/// Names that do not match the grammar are a hard error; the alternative is
/// silently filing a recording under the wrong participant slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileKey {
    pub participant: String,
    pub phase: Phase,
    pub role: Option<Role>,
    pub side: Side,
}

impl FileKey {
    /// Parse a log file name such as `07_pre_cl.csv` or `7_avatar_pr.csv`.
    pub fn parse(file_name: &str) -> Result<FileKey, PipelineError> {
        let invalid = || PipelineError::FileName(file_name.to_string());

        let stem = file_name.strip_suffix(".csv").ok_or_else(invalid)?;
        let mut tokens = stem.split('_');
        let (number, kind, channel) = match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
            (Some(n), Some(k), Some(c), None) => (n, k, c),
            _ => return Err(invalid()),
        };

        if number.is_empty() || number.len() > 2 || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let participant = canonical_participant(number);

        let (phase, role, side) = match kind {
            "pre" | "pos" => {
                let phase = if kind == "pre" { Phase::Pre } else { Phase::Pos };
                let mut chars = channel.chars();
                let role = match chars.next() {
                    Some('c') => Role::Counselor,
                    Some('s') => Role::Student,
                    _ => return Err(invalid()),
                };
                let side = parse_side(chars.next()).ok_or_else(invalid)?;
                if chars.next().is_some() {
                    return Err(invalid());
                }
                (phase, Some(role), side)
            }
            "avatar" => {
                let mut chars = channel.chars();
                if chars.next() != Some('p') {
                    return Err(invalid());
                }
                let side = parse_side(chars.next()).ok_or_else(invalid)?;
                if chars.next().is_some() {
                    return Err(invalid());
                }
                (Phase::Int, None, side)
            }
            _ => return Err(invalid()),
        };

        Ok(FileKey {
            participant,
            phase,
            role,
            side,
        })
    }

    /// Canonical (zero-padded) file name, the key of the file-data map.
    pub fn canonical_name(&self) -> String {
        match self.phase {
            Phase::Int => {
                let side = if self.side == Side::Left { 'l' } else { 'r' };
                format!("{}_avatar_p{}.csv", self.participant, side)
            }
            _ => {
                let role = match self.role {
                    Some(Role::Counselor) => 'c',
                    _ => 's',
                };
                let side = if self.side == Side::Left { 'l' } else { 'r' };
                format!("{}_{}_{}{}.csv", self.participant, self.phase.as_code(), role, side)
            }
        }
    }

    /// Fixed slot position within a [`ParticipantRecord`].
    pub fn slot_index(&self) -> usize {
        let base = match self.phase {
            Phase::Pre => 0,
            Phase::Pos => 4,
            Phase::Int => 8,
        };
        let role_offset = match (self.phase, self.role) {
            (Phase::Int, _) => 0,
            (_, Some(Role::Counselor)) => 0,
            _ => 2,
        };
        let side_offset = if self.side == Side::Left { 0 } else { 1 };
        base + role_offset + side_offset
    }
}

fn parse_side(c: Option<char>) -> Option<Side> {
    match c {
        Some('l') => Some(Side::Left),
        Some('r') => Some(Side::Right),
        _ => None,
    }
}

/// One slot of a participant record: either a recording exists for the
/// (phase, role, side) combination or it does not.
#[derive(Debug, Clone, Copy)]
pub enum Slot<'a> {
    Empty,
    Populated(&'a AlignedSeries),
}

impl<'a> Slot<'a> {
    pub fn series(&self) -> Option<&'a AlignedSeries> {
        match self {
            Slot::Empty => None,
            Slot::Populated(series) => Some(series),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

/// All of one participant's recordings in fixed slot order.
#[derive(Debug, Clone)]
pub struct ParticipantRecord<'a> {
    pub slots: [Slot<'a>; SLOT_COUNT],
}

/// Group aligned recordings by participant number.
///
/// The file-data map owns every series; records only borrow from it.
pub fn consolidate(
    file_data: &BTreeMap<String, AlignedSeries>,
) -> Result<BTreeMap<String, ParticipantRecord<'_>>, PipelineError> {
    let mut records: BTreeMap<String, ParticipantRecord> = BTreeMap::new();

    for (name, series) in file_data {
        let key = FileKey::parse(name)?;
        let record = records
            .entry(key.participant.clone())
            .or_insert_with(|| ParticipantRecord {
                slots: [Slot::Empty; SLOT_COUNT],
            });
        record.slots[key.slot_index()] = Slot::Populated(series);
    }

    Ok(records)
}
