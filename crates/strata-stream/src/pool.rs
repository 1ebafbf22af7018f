//! Fixed-size pool of named worker threads that build chunks.
//!
//! Tasks arrive over a bounded crossbeam channel and every task produces
//! exactly one [`JobResult`], including tasks skipped because they were
//! cancelled before a worker picked them up. Callers can therefore count
//! outstanding work by counting results.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use strata_mesh::VoxelMesher;
use strata_terrain::TerrainPipeline;
use strata_voxel::{BlockCatalog, ChunkCoord};

use crate::chunk::Chunk;
use crate::error::{JobFailure, SchedulerError};

/// Everything a worker needs to turn a coordinate into a [`Chunk`].
///
/// Shared read-only by all workers.
pub struct ChunkWorker {
    pipeline: TerrainPipeline,
    mesher: Arc<dyn VoxelMesher>,
    catalog: Arc<BlockCatalog>,
}

impl ChunkWorker {
    pub fn new(
        pipeline: TerrainPipeline,
        mesher: Arc<dyn VoxelMesher>,
        catalog: Arc<BlockCatalog>,
    ) -> Self {
        Self {
            pipeline,
            mesher,
            catalog,
        }
    }

    pub fn pipeline(&self) -> &TerrainPipeline {
        &self.pipeline
    }

    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    /// Generates and meshes `coord` on the calling thread.
    ///
    /// A panic anywhere in the terrain stages or the mesher is caught and
    /// reported as [`JobFailure::Panicked`].
    pub fn run(&self, coord: ChunkCoord) -> Result<Chunk, JobFailure> {
        catch_unwind(AssertUnwindSafe(|| self.build(coord)))
            .unwrap_or_else(|payload| Err(JobFailure::Panicked(panic_message(payload.as_ref()))))
    }

    fn build(&self, coord: ChunkCoord) -> Result<Chunk, JobFailure> {
        let start = Instant::now();
        let generated = self.pipeline.generate(coord)?;
        let mesh = self.mesher.mesh_reduced(&generated.grid, &self.catalog);
        Ok(Chunk {
            coord,
            grid: generated.grid,
            height_map: generated.height_map,
            mesh,
            build_time_us: start.elapsed().as_micros() as u64,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

struct ChunkTask {
    coord: ChunkCoord,
    cancelled: Arc<AtomicBool>,
}

/// What a worker did with one task.
#[derive(Debug)]
pub enum JobOutcome {
    Built(Box<Chunk>),
    /// Cancelled before a worker started it.
    Skipped,
    Failed(JobFailure),
}

/// One finished task, returned to the control thread.
#[derive(Debug)]
pub struct JobResult {
    pub coord: ChunkCoord,
    pub outcome: JobOutcome,
}

/// Worker threads plus the task and result channels connecting them to the
/// control thread.
pub struct WorkerPool {
    task_sender: Option<Sender<ChunkTask>>,
    result_receiver: Receiver<JobResult>,
    worker_handles: Vec<JoinHandle<()>>,
    /// Maximum number of tasks queued or running at once.
    capacity: usize,
    /// Tasks submitted whose result has not been sent yet.
    in_flight: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Spawns `thread_count` workers sharing `worker`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Spawn`] if the OS refuses a thread, and
    /// [`SchedulerError::ZeroConcurrency`] if `capacity` is zero.
    pub fn new(
        thread_count: usize,
        capacity: usize,
        worker: Arc<ChunkWorker>,
    ) -> Result<Self, SchedulerError> {
        if capacity == 0 {
            return Err(SchedulerError::ZeroConcurrency);
        }
        let thread_count = thread_count.max(1);
        let (task_tx, task_rx) = crossbeam_channel::bounded::<ChunkTask>(capacity);
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<JobResult>();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(thread_count);
        for index in 0..thread_count {
            let rx = task_rx.clone();
            let tx = result_tx.clone();
            let worker = Arc::clone(&worker);
            let flight = Arc::clone(&in_flight);

            let handle = std::thread::Builder::new()
                .name(format!("chunk-gen-worker-{index}"))
                .spawn(move || {
                    while let Ok(task) = rx.recv() {
                        let outcome = if task.cancelled.load(Ordering::Relaxed) {
                            JobOutcome::Skipped
                        } else {
                            match worker.run(task.coord) {
                                Ok(chunk) => JobOutcome::Built(Box::new(chunk)),
                                Err(failure) => JobOutcome::Failed(failure),
                            }
                        };

                        // Free the slot first so a receiver can resubmit at once.
                        flight.fetch_sub(1, Ordering::Release);
                        let _ = tx.send(JobResult {
                            coord: task.coord,
                            outcome,
                        });
                    }
                })
                .map_err(SchedulerError::Spawn)?;
            handles.push(handle);
        }

        tracing::debug!(threads = thread_count, capacity, "Worker pool started");
        Ok(Self {
            task_sender: Some(task_tx),
            result_receiver: result_rx,
            worker_handles: handles,
            capacity,
            in_flight,
        })
    }

    /// One worker per core, leaving headroom for the control thread.
    pub fn default_thread_count() -> usize {
        let cpus = num_cpus::get().max(2);
        (cpus - 2).max(1)
    }

    /// Queues `coord` for generation. `cancelled` is checked once, right
    /// before a worker starts the task.
    ///
    /// Returns `false` if the pool is at capacity or shut down.
    pub fn submit(&self, coord: ChunkCoord, cancelled: Arc<AtomicBool>) -> bool {
        let Some(sender) = &self.task_sender else {
            return false;
        };
        if self.in_flight.load(Ordering::Acquire) >= self.capacity {
            return false;
        }
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        if sender.try_send(ChunkTask { coord, cancelled }).is_err() {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Next finished result, if any, without blocking.
    pub fn try_recv(&self) -> Option<JobResult> {
        self.result_receiver.try_recv().ok()
    }

    /// Blocks up to `timeout` for the next finished result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<JobResult> {
        match self.result_receiver.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn thread_count(&self) -> usize {
        self.worker_handles.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.task_sender.is_none()
    }

    /// Closes the task channel and joins every worker once it has drained
    /// the tasks already queued. Running jobs are never interrupted.
    pub fn shutdown(&mut self) {
        if self.task_sender.take().is_none() {
            return;
        }
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
        tracing::debug!("Worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
