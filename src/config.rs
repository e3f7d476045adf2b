//! Run configuration

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Playback rate the per-participant series are resampled to, matching the
/// 30 fps video recordings of the sessions.
pub const DEFAULT_TARGET_FPS: i64 = 30;

/// Inputs and outputs of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Timetable spreadsheet for the intervention sessions.
    pub intervention_schedule: PathBuf,
    /// Timetable spreadsheet for the pre/post sessions.
    pub prepost_schedule: PathBuf,
    /// Root of the device log directory (searched recursively).
    pub data_dir: PathBuf,
    /// Directory receiving `Statistics.csv` and `participants/`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Target playback rate for the series export.
    #[serde(default = "default_target_fps")]
    pub target_fps: i64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_target_fps() -> i64 {
    DEFAULT_TARGET_FPS
}

impl PipelineConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<PipelineConfig, PipelineError> {
        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.target_fps <= 0 {
            return Err(PipelineError::Config(format!(
                "target_fps must be positive, got {}",
                self.target_fps
            )));
        }
        for (label, path) in [
            ("intervention schedule", &self.intervention_schedule),
            ("pre/post schedule", &self.prepost_schedule),
            ("data directory", &self.data_dir),
        ] {
            if !path.exists() {
                return Err(PipelineError::Config(format!(
                    "{} not found: {}",
                    label,
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Path of the statistics table this configuration writes.
    pub fn statistics_path(&self) -> PathBuf {
        self.output_dir.join("Statistics.csv")
    }

    /// Directory of the per-participant series tables.
    pub fn participants_dir(&self) -> PathBuf {
        self.output_dir.join("participants")
    }
}
