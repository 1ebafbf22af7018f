//! Viewer-driven chunk lifecycle: eviction, publication, and job requests.
//!
//! The scheduler is the only writer of the live chunk map. Workers hand
//! results back over a channel and every mutation happens inside
//! [`ChunkScheduler::tick`] on the control thread, in a fixed order:
//! evict, then publish, then request. A result is therefore never inserted
//! for a coordinate that the same tick has already evicted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rustc_hash::{FxHashMap, FxHashSet};
use strata_voxel::{BlockId, ChunkCoord};

use crate::chunk::{Chunk, ChunkState};
use crate::error::SchedulerError;
use crate::pool::{ChunkWorker, JobOutcome, JobResult, WorkerPool};
use crate::queue::ChunkQueue;

/// Streaming limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Chebyshev radius, in chunks, kept live around the viewer.
    pub range: u32,
    /// Jobs queued in or running on the pool at once. Must be non-zero.
    pub max_concurrent_jobs: usize,
    /// Worker threads; `0` picks [`WorkerPool::default_thread_count`].
    pub worker_threads: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            range: 4,
            max_concurrent_jobs: 8,
            worker_threads: 0,
        }
    }
}

/// Receives chunk lifecycle events on the control thread.
pub trait ChunkListener: Send {
    /// A chunk became live. Called once per published chunk.
    fn on_chunk_ready(&mut self, chunk: &Chunk);

    /// A live chunk was evicted.
    fn on_chunk_evicted(&mut self, _coord: ChunkCoord) {}
}

/// What one [`ChunkScheduler::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub viewer: ChunkCoord,
    /// Live chunks removed for leaving the range.
    pub evicted: usize,
    /// In-flight jobs newly marked cancelled.
    pub cancelled: usize,
    /// Cancelled in-flight jobs wanted again.
    pub revived: usize,
    /// Queued requests dropped for leaving the range.
    pub dropped: usize,
    /// Chunks inserted into the live map.
    pub published: usize,
    /// Results thrown away because their job was cancelled.
    pub discarded: usize,
    /// Jobs that failed and will be retried.
    pub failed: usize,
    /// Jobs handed to the pool.
    pub submitted: usize,
    pub queued: usize,
    pub in_flight: usize,
    pub live: usize,
}

impl TickReport {
    /// `true` if the tick changed anything.
    pub fn changed(&self) -> bool {
        self.evicted
            + self.cancelled
            + self.revived
            + self.dropped
            + self.published
            + self.discarded
            + self.failed
            + self.submitted
            > 0
    }
}

/// Keeps the chunks around a viewer generated and drops the rest.
pub struct ChunkScheduler {
    config: SchedulerConfig,
    pool: WorkerPool,
    live: FxHashMap<ChunkCoord, Chunk>,
    queue: ChunkQueue,
    /// Submitted jobs and their cancellation flags. Only this thread writes
    /// the flags; workers read them once before starting.
    in_flight: FxHashMap<ChunkCoord, Arc<AtomicBool>>,
    /// Results received by `wait_for_results`, published on the next tick.
    stash: Vec<JobResult>,
    listener: Option<Box<dyn ChunkListener>>,
    viewer: ChunkCoord,
    ticks: u64,
}

impl ChunkScheduler {
    /// Starts the worker pool.
    ///
    /// # Errors
    ///
    /// Fails if `max_concurrent_jobs` is zero, the worker's catalog lacks an
    /// entry for a block terrain can produce, or a thread cannot be spawned.
    pub fn new(config: SchedulerConfig, worker: ChunkWorker) -> Result<Self, SchedulerError> {
        if config.max_concurrent_jobs == 0 {
            return Err(SchedulerError::ZeroConcurrency);
        }
        worker.catalog().require(&BlockId::ALL)?;

        let threads = match config.worker_threads {
            0 => WorkerPool::default_thread_count(),
            n => n,
        };
        let pool = WorkerPool::new(threads, config.max_concurrent_jobs, Arc::new(worker))?;

        tracing::info!(
            range = config.range,
            max_jobs = config.max_concurrent_jobs,
            threads,
            "Chunk scheduler started"
        );
        Ok(Self {
            config,
            pool,
            live: FxHashMap::default(),
            queue: ChunkQueue::new(),
            in_flight: FxHashMap::default(),
            stash: Vec::new(),
            listener: None,
            viewer: ChunkCoord::default(),
            ticks: 0,
        })
    }

    pub fn set_listener(&mut self, listener: Box<dyn ChunkListener>) {
        self.listener = Some(listener);
    }

    pub fn with_listener(mut self, listener: Box<dyn ChunkListener>) -> Self {
        self.set_listener(listener);
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Viewer coordinate of the latest tick.
    pub fn viewer(&self) -> ChunkCoord {
        self.viewer
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.live.get(&coord)
    }

    pub fn is_live(&self, coord: ChunkCoord) -> bool {
        self.live.contains_key(&coord)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.live.keys().copied()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// `true` when nothing is queued, running, or waiting to be published.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.in_flight.is_empty() && self.stash.is_empty()
    }

    /// Lifecycle state of `coord`, or `None` if the scheduler holds nothing
    /// for it.
    pub fn state(&self, coord: ChunkCoord) -> Option<ChunkState> {
        if self.live.contains_key(&coord) {
            return Some(ChunkState::Ready);
        }
        if let Some(flag) = self.in_flight.get(&coord) {
            return Some(if flag.load(Ordering::Relaxed) {
                ChunkState::Cancelled
            } else {
                ChunkState::Generating
            });
        }
        self.queue.contains(coord).then_some(ChunkState::Requested)
    }

    /// Asks for `coord` to be generated. A no-op for coordinates already
    /// live, queued, or generating; a cancelled job is revived instead of
    /// being submitted twice.
    ///
    /// Returns `true` if the request changed anything. Requests farther than
    /// `range` from the viewer are dropped by the next tick.
    pub fn request(&mut self, coord: ChunkCoord) -> bool {
        if self.live.contains_key(&coord) {
            return false;
        }
        if let Some(flag) = self.in_flight.get(&coord) {
            return flag.swap(false, Ordering::Relaxed);
        }
        self.queue.enqueue(coord, self.viewer)
    }

    /// Runs one scheduling pass for a viewer standing in chunk `viewer`.
    /// Never blocks.
    ///
    /// # Panics
    ///
    /// Panics if a finished chunk would be inserted over a live one, which
    /// can only happen through a bookkeeping bug.
    pub fn tick(&mut self, viewer: ChunkCoord) -> TickReport {
        let _span = tracing::debug_span!("scheduler_tick", tick = self.ticks, viewer = %viewer).entered();
        self.ticks += 1;
        self.viewer = viewer;
        let mut report = TickReport {
            viewer,
            ..Default::default()
        };

        self.evict(viewer, &mut report);

        let mut retry_later = FxHashSet::default();
        let mut results = std::mem::take(&mut self.stash);
        while let Some(result) = self.pool.try_recv() {
            results.push(result);
        }
        for result in results {
            self.publish(result, &mut report, &mut retry_later);
        }

        self.request_range(viewer, &retry_later, &mut report);

        debug_assert!(
            self.live
                .keys()
                .all(|c| viewer.chebyshev_distance(*c) <= self.config.range),
            "live chunk outside retention range after tick"
        );

        report.queued = self.queue.len();
        report.in_flight = self.in_flight.len();
        report.live = self.live.len();
        if report.changed() {
            tracing::info!(
                viewer = %viewer,
                live = report.live,
                in_flight = report.in_flight,
                queued = report.queued,
                published = report.published,
                evicted = report.evicted,
                failed = report.failed,
                "Scheduler tick"
            );
        } else {
            tracing::trace!(viewer = %viewer, "Scheduler tick idle");
        }
        report
    }

    /// Blocks until at least one job result is ready or `timeout` passes.
    /// Returns `false` on timeout or when nothing is in flight.
    ///
    /// Received results are held until the next [`tick`](Self::tick).
    pub fn wait_for_results(&mut self, timeout: Duration) -> bool {
        if !self.stash.is_empty() {
            return true;
        }
        if self.in_flight.is_empty() {
            return false;
        }
        match self.pool.recv_timeout(timeout) {
            Some(result) => {
                self.stash.push(result);
                true
            }
            None => false,
        }
    }

    /// Cancels outstanding work, lets workers drain, and joins them.
    /// Live chunks stay readable.
    pub fn shutdown(&mut self) {
        if self.pool.is_shut_down() {
            return;
        }
        for flag in self.in_flight.values() {
            flag.store(true, Ordering::Relaxed);
        }
        self.queue.clear();
        self.pool.shutdown();
        while self.pool.try_recv().is_some() {}
        self.in_flight.clear();
        self.stash.clear();
        tracing::info!(live = self.live.len(), "Chunk scheduler shut down");
    }

    fn evict(&mut self, viewer: ChunkCoord, report: &mut TickReport) {
        let range = self.config.range;

        let mut evicted: Vec<ChunkCoord> = self
            .live
            .keys()
            .filter(|c| viewer.chebyshev_distance(**c) > range)
            .copied()
            .collect();
        evicted.sort_unstable();
        for coord in evicted {
            self.live.remove(&coord);
            if let Some(listener) = self.listener.as_mut() {
                listener.on_chunk_evicted(coord);
            }
            report.evicted += 1;
        }

        for (coord, flag) in &self.in_flight {
            let outside = viewer.chebyshev_distance(*coord) > range;
            let was_cancelled = flag.swap(outside, Ordering::Relaxed);
            if outside && !was_cancelled {
                report.cancelled += 1;
            } else if !outside && was_cancelled {
                report.revived += 1;
            }
        }

        report.dropped = self.queue.retain_within(viewer, range);
    }

    fn publish(
        &mut self,
        result: JobResult,
        report: &mut TickReport,
        retry_later: &mut FxHashSet<ChunkCoord>,
    ) {
        let JobResult { coord, outcome } = result;
        let Some(flag) = self.in_flight.remove(&coord) else {
            panic!("scheduler invariant violated: result for {coord} was never submitted");
        };
        if flag.load(Ordering::Relaxed) {
            tracing::trace!(coord = %coord, "Discarding cancelled chunk");
            report.discarded += 1;
            return;
        }

        match outcome {
            JobOutcome::Built(chunk) => {
                self.insert(*chunk);
                report.published += 1;
            }
            // Revived after the worker already skipped it; requested again below.
            JobOutcome::Skipped => {}
            JobOutcome::Failed(failure) => {
                tracing::error!(coord = %coord, error = %failure, "Chunk job failed, will retry");
                retry_later.insert(coord);
                report.failed += 1;
            }
        }
    }

    fn insert(&mut self, chunk: Chunk) {
        let coord = chunk.coord;
        if self.live.contains_key(&coord) {
            panic!("scheduler invariant violated: chunk {coord} inserted twice");
        }
        tracing::debug!(coord = %coord, quads = chunk.mesh.quad_count(), build_us = chunk.build_time_us, "Chunk ready");
        let chunk = self.live.entry(coord).or_insert(chunk);
        if let Some(listener) = self.listener.as_mut() {
            listener.on_chunk_ready(chunk);
        }
    }

    fn request_range(
        &mut self,
        viewer: ChunkCoord,
        retry_later: &FxHashSet<ChunkCoord>,
        report: &mut TickReport,
    ) {
        for coord in viewer.square_around(self.config.range) {
            if self.live.contains_key(&coord)
                || self.in_flight.contains_key(&coord)
                || retry_later.contains(&coord)
            {
                continue;
            }
            self.queue.enqueue(coord, viewer);
        }

        while self.in_flight.len() < self.config.max_concurrent_jobs {
            let Some(coord) = self.queue.dequeue() else {
                break;
            };
            let flag = Arc::new(AtomicBool::new(false));
            if !self.pool.submit(coord, Arc::clone(&flag)) {
                self.queue.enqueue(coord, viewer);
                break;
            }
            self.in_flight.insert(coord, flag);
            report.submitted += 1;
        }
    }
}

impl Drop for ChunkScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
