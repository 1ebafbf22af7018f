//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Seeded voxel terrain streamer")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Streaming range in chunks.
    #[arg(long)]
    pub range: Option<u32>,

    /// Maximum concurrent chunk jobs.
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Worker thread count (0 = one per spare core).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Number of scheduler ticks to run before exiting.
    #[arg(long, default_value_t = 64)]
    pub ticks: u32,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(range) = args.range {
            self.streaming.range = range;
        }
        if let Some(jobs) = args.jobs {
            self.streaming.max_concurrent_jobs = jobs;
        }
        if let Some(workers) = args.workers {
            self.streaming.worker_threads = workers;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
