//! Counsel EDA - batch alignment pipeline for counseling-session EDA logs
//!
//! The pipeline reconciles three independent sources of truth about each
//! recording - the device's own start-time header, the human-recorded
//! timetable, and the file naming convention - into one coherent
//! per-participant dataset: schedule load → log load → alignment →
//! consolidation → export.
//!
//! ## Modules
//!
//! - **clock / transform / stats**: the numeric layer (time codec, series
//!   operations, summary statistics)
//! - **schedule / recording / discover**: input loading
//! - **aligner / consolidate**: the core alignment and keying logic
//! - **report / pipeline**: exports and orchestration

pub mod aligner;
pub mod clock;
pub mod config;
pub mod consolidate;
pub mod discover;
pub mod error;
pub mod pipeline;
pub mod recording;
pub mod report;
pub mod schedule;
pub mod stats;
pub mod transform;

pub use aligner::{align, AlignedSeries, AlignmentWindow};
pub use config::{PipelineConfig, DEFAULT_TARGET_FPS};
pub use error::PipelineError;
pub use pipeline::{run, RunSummary};
pub use schedule::{Phase, ScheduleEntry, SessionKey};

/// Pipeline version embedded in log output and CLI reports
pub const PIPELINE_VERSION: &str = env!("CARGO_PKG_VERSION");
