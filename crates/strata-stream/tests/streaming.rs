//! End-to-end streaming: a viewer walks across the world while the scheduler
//! generates, publishes, and evicts chunks on a real worker pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use strata_mesh::{CpuMesher, RawMeshBuffers, VoxelMesher};
use strata_stream::{Chunk, ChunkListener, ChunkScheduler, ChunkWorker, SchedulerConfig};
use strata_terrain::{ChunkDims, TerrainConfig, TerrainPipeline};
use strata_voxel::{BlockCatalog, ChunkCoord, VoxelGrid};

const RANGE: u32 = 1;

fn pipeline() -> TerrainPipeline {
    TerrainPipeline::new(42, ChunkDims::new(8, 64), TerrainConfig::default()).unwrap()
}

fn scheduler_with(mesher: Arc<dyn VoxelMesher>, jobs: usize) -> ChunkScheduler {
    let worker = ChunkWorker::new(pipeline(), mesher, Arc::new(BlockCatalog::default_atlas()));
    let config = SchedulerConfig {
        range: RANGE,
        max_concurrent_jobs: jobs,
        worker_threads: 3,
    };
    ChunkScheduler::new(config, worker).unwrap()
}

fn settle(scheduler: &mut ChunkScheduler, viewer: ChunkCoord) {
    let start = Instant::now();
    scheduler.tick(viewer);
    while !scheduler.is_idle() {
        scheduler.wait_for_results(Duration::from_millis(100));
        scheduler.tick(viewer);
        assert!(start.elapsed().as_secs() < 60, "Timed out at viewer {viewer}");
    }
}

/// Records each ready chunk together with the viewer it was published under.
struct RangeChecker {
    viewer: Arc<Mutex<ChunkCoord>>,
    violations: Arc<Mutex<Vec<ChunkCoord>>>,
    ready: Arc<Mutex<Vec<ChunkCoord>>>,
}

impl ChunkListener for RangeChecker {
    fn on_chunk_ready(&mut self, chunk: &Chunk) {
        let viewer = *self.viewer.lock().unwrap();
        if viewer.chebyshev_distance(chunk.coord) > RANGE {
            self.violations.lock().unwrap().push(chunk.coord);
        }
        self.ready.lock().unwrap().push(chunk.coord);
    }
}

#[test]
fn walking_viewer_never_publishes_outside_range() {
    let viewer = Arc::new(Mutex::new(ChunkCoord::new(0, 0)));
    let violations = Arc::new(Mutex::new(Vec::new()));
    let ready = Arc::new(Mutex::new(Vec::new()));
    let mut scheduler = scheduler_with(Arc::new(CpuMesher), 4).with_listener(Box::new(RangeChecker {
        viewer: Arc::clone(&viewer),
        violations: Arc::clone(&violations),
        ready: Arc::clone(&ready),
    }));

    // Step fast enough that jobs get cancelled on the way.
    for step in 0..12 {
        let position = ChunkCoord::new(step, step / 3);
        *viewer.lock().unwrap() = position;
        scheduler.tick(position);
        for coord in scheduler.live_coords() {
            assert!(position.chebyshev_distance(coord) <= RANGE);
        }
    }

    let last = *viewer.lock().unwrap();
    settle(&mut scheduler, last);

    assert!(violations.lock().unwrap().is_empty());
    for coord in last.square_around(RANGE) {
        assert!(scheduler.is_live(coord), "{coord} never became ready");
    }
    assert_eq!(scheduler.live_count(), 9);
    assert!(!ready.lock().unwrap().is_empty());
}

#[test]
fn streamed_chunks_match_direct_generation() {
    let mut scheduler = scheduler_with(Arc::new(CpuMesher), 8);
    let viewer = ChunkCoord::new(-3, 5);
    settle(&mut scheduler, viewer);

    let direct = pipeline();
    let catalog = BlockCatalog::default_atlas();
    for coord in viewer.square_around(RANGE) {
        let streamed = scheduler.get(coord).unwrap();
        let generated = direct.generate(coord).unwrap();
        assert_eq!(streamed.grid, generated.grid, "grid differs at {coord}");
        assert_eq!(streamed.mesh, CpuMesher.mesh_reduced(&generated.grid, &catalog));
    }
}

/// Panics on the first `fail_first` calls, then meshes normally.
struct FlakyMesher {
    calls: AtomicUsize,
    fail_first: usize,
}

impl VoxelMesher for FlakyMesher {
    fn mesh(&self, grid: &VoxelGrid, catalog: &BlockCatalog) -> RawMeshBuffers {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.fail_first {
            panic!("simulated mesher fault");
        }
        CpuMesher.mesh(grid, catalog)
    }
}

#[test]
fn failed_jobs_are_retried_until_ready() {
    let mesher = Arc::new(FlakyMesher {
        calls: AtomicUsize::new(0),
        fail_first: 3,
    });
    let mut scheduler = scheduler_with(mesher, 2);
    let viewer = ChunkCoord::new(0, 0);

    let start = Instant::now();
    let mut failed = 0;
    failed += scheduler.tick(viewer).failed;
    // A failed coordinate sits out one tick, so idleness alone is not enough.
    while scheduler.live_count() < 9 || !scheduler.is_idle() {
        scheduler.wait_for_results(Duration::from_millis(100));
        failed += scheduler.tick(viewer).failed;
        assert!(start.elapsed().as_secs() < 60, "Timed out");
    }

    assert_eq!(failed, 3);
    assert_eq!(scheduler.live_count(), 9);
}

#[test]
fn shutdown_lets_running_jobs_finish() {
    let mut scheduler = scheduler_with(Arc::new(CpuMesher), 4);
    scheduler.tick(ChunkCoord::new(0, 0));
    assert!(scheduler.in_flight_count() > 0);
    scheduler.shutdown();
    assert_eq!(scheduler.in_flight_count(), 0);
    // Nothing new is submitted once the pool is gone.
    let report = scheduler.tick(ChunkCoord::new(0, 0));
    assert_eq!(report.submitted, 0);
}
