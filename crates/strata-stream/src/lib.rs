//! Background chunk streaming around a moving viewer.
//!
//! [`ChunkScheduler`] decides which chunk columns should exist, hands their
//! generation to a fixed [`WorkerPool`], and publishes finished chunks on the
//! control thread. Workers never touch the live chunk map.

pub mod chunk;
pub mod error;
pub mod pool;
pub mod queue;
pub mod scheduler;

pub use chunk::{Chunk, ChunkState};
pub use error::{JobFailure, SchedulerError};
pub use pool::{ChunkWorker, JobOutcome, JobResult, WorkerPool};
pub use queue::ChunkQueue;
pub use scheduler::{ChunkListener, ChunkScheduler, SchedulerConfig, TickReport};
