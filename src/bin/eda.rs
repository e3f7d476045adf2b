//! EDA CLI - command-line interface for the alignment pipeline
//!
//! Commands:
//! - run: execute the full batch (schedules + log directory → exports)
//! - inspect: print one log file's parsed header and statistics

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use counsel_eda::clock::format_hms;
use counsel_eda::config::{PipelineConfig, DEFAULT_TARGET_FPS};
use counsel_eda::error::PipelineError;
use counsel_eda::recording::load_recording;
use counsel_eda::stats::compute_stats;
use counsel_eda::PIPELINE_VERSION;

/// Align and consolidate counseling-session EDA recordings
#[derive(Parser)]
#[command(name = "eda")]
#[command(version = PIPELINE_VERSION)]
#[command(about = "Batch alignment pipeline for EDA session logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the full batch
    Run {
        /// JSON configuration file; overrides the individual path options
        #[arg(long)]
        config: Option<PathBuf>,

        /// Intervention timetable CSV
        #[arg(long)]
        intervention_schedule: Option<PathBuf>,

        /// Pre/post timetable CSV
        #[arg(long)]
        prepost_schedule: Option<PathBuf>,

        /// Device log directory (searched recursively)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Output directory for Statistics.csv and participants/
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Target playback rate for the series export
        #[arg(long, default_value_t = DEFAULT_TARGET_FPS)]
        fps: i64,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print one log file's parsed header and statistics
    Inspect {
        /// Device log file
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: Cli) -> Result<(), PipelineError> {
    match cli.command {
        Commands::Run {
            config,
            intervention_schedule,
            prepost_schedule,
            data_dir,
            output_dir,
            fps,
            json,
        } => {
            let config = match config {
                Some(path) => PipelineConfig::from_json_file(&path)?,
                None => {
                    let (Some(intervention_schedule), Some(prepost_schedule), Some(data_dir)) =
                        (intervention_schedule, prepost_schedule, data_dir)
                    else {
                        return Err(PipelineError::Config(
                            "either --config or all of --intervention-schedule, \
                             --prepost-schedule and --data-dir are required"
                                .to_string(),
                        ));
                    };
                    PipelineConfig {
                        intervention_schedule,
                        prepost_schedule,
                        data_dir,
                        output_dir,
                        target_fps: fps,
                    }
                }
            };

            let summary = counsel_eda::run(&config)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                for skipped in &summary.files_skipped {
                    println!("skipped: {}", skipped);
                }
                println!(
                    "Processed {} files for {} participants",
                    summary.files_processed, summary.participants
                );
                println!(
                    "Successfully logged data to {}",
                    summary.statistics_path.display()
                );
            }
            Ok(())
        }

        Commands::Inspect { file } => {
            let recording = load_recording(&file)?;
            println!("File:          {}", file.display());
            println!("Sampling rate: {} Hz", recording.sampling_rate_hz);
            println!("Start time:    {}", format_hms(recording.start_time));
            println!("Samples:       {}", recording.samples.len());
            match compute_stats(&recording.samples) {
                Some(stats) => {
                    println!("Mean:          {}", stats.mean);
                    println!("Median:        {}", stats.median);
                    println!("Mode:          {}", stats.mode);
                    println!("Std dev:       {}", stats.stddev);
                }
                None => println!("No samples, no statistics"),
            }
            Ok(())
        }
    }
}
