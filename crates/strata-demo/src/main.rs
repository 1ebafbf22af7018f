//! Headless streaming demo: walks a viewer across the world and streams the
//! chunks around it.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::DVec3;
use strata_config::{CliArgs, Config};
use strata_mesh::CpuMesher;
use strata_stream::{Chunk, ChunkListener, ChunkScheduler, ChunkWorker, SchedulerConfig};
use strata_voxel::{BlockCatalog, ChunkCoord};

/// Time the control thread waits for job results between ticks.
const TICK_WAIT: Duration = Duration::from_millis(16);

/// Blocks per tick the viewer moves along its path.
const VIEWER_SPEED: f64 = 2.0;

/// Running totals over every published chunk.
#[derive(Default)]
struct StreamStats {
    ready: usize,
    evicted: usize,
    quads: usize,
    build_us: u64,
}

impl ChunkListener for StreamStats {
    fn on_chunk_ready(&mut self, chunk: &Chunk) {
        self.ready += 1;
        self.quads += chunk.mesh.quad_count();
        self.build_us += chunk.build_time_us;
        tracing::debug!(
            coord = %chunk.coord,
            triangles = chunk.mesh.triangle_count(),
            solid = chunk.grid.solid_count(),
            "Chunk published"
        );
    }

    fn on_chunk_evicted(&mut self, coord: ChunkCoord) {
        self.evicted += 1;
        tracing::trace!(coord = %coord, "Chunk evicted");
    }
}

/// Viewer position after `tick` ticks: a straight diagonal walk at a shallow
/// angle so both axes cross chunk borders.
fn viewer_position(tick: u32) -> DVec3 {
    let distance = f64::from(tick) * VIEWER_SPEED;
    DVec3::new(distance, 0.0, distance * 0.5)
}

fn scheduler_config(config: &Config) -> SchedulerConfig {
    SchedulerConfig {
        range: config.streaming.range,
        max_concurrent_jobs: config.streaming.max_concurrent_jobs,
        worker_threads: config.streaming.worker_threads,
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .map(|dir| dir.join("strata"))
            .unwrap_or_else(|| PathBuf::from(".strata"))
    });

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let pipeline = match config.build_pipeline() {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!(error = %e, "Invalid terrain configuration");
            return ExitCode::FAILURE;
        }
    };
    let chunk_size = pipeline.dims().size;

    let worker = ChunkWorker::new(
        pipeline,
        Arc::new(CpuMesher),
        Arc::new(BlockCatalog::default_atlas()),
    );
    let mut scheduler = match ChunkScheduler::new(scheduler_config(&config), worker) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start chunk scheduler");
            return ExitCode::FAILURE;
        }
    };

    let stats = Arc::new(std::sync::Mutex::new(StreamStats::default()));
    scheduler.set_listener(Box::new(SharedStats(Arc::clone(&stats))));

    tracing::info!(
        seed = config.world.seed,
        chunk_size,
        range = config.streaming.range,
        ticks = args.ticks,
        "Streaming demo started"
    );

    let start = Instant::now();
    let mut viewer = ChunkCoord::default();
    for tick in 0..args.ticks {
        viewer = ChunkCoord::from_world(viewer_position(tick), chunk_size);
        scheduler.tick(viewer);
        scheduler.wait_for_results(TICK_WAIT);
    }

    // Let the final neighbourhood finish before reporting.
    while !scheduler.is_idle() {
        scheduler.wait_for_results(TICK_WAIT);
        scheduler.tick(viewer);
    }
    scheduler.shutdown();

    if let Ok(stats) = stats.lock() {
        let avg_build_us = stats.build_us.checked_div(stats.ready as u64).unwrap_or(0);
        tracing::info!(
            ready = stats.ready,
            evicted = stats.evicted,
            live = scheduler.live_count(),
            quads = stats.quads,
            avg_build_us,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Streaming demo finished"
        );
    }
    ExitCode::SUCCESS
}

/// Forwards listener events into stats the main loop can read afterwards.
struct SharedStats(Arc<std::sync::Mutex<StreamStats>>);

impl ChunkListener for SharedStats {
    fn on_chunk_ready(&mut self, chunk: &Chunk) {
        if let Ok(mut stats) = self.0.lock() {
            stats.on_chunk_ready(chunk);
        }
    }

    fn on_chunk_evicted(&mut self, coord: ChunkCoord) {
        if let Ok(mut stats) = self.0.lock() {
            stats.on_chunk_evicted(coord);
        }
    }
}
