//! Error types for chunk streaming.

use strata_terrain::StageFault;
use thiserror::Error;

/// Why a chunk job produced no chunk.
///
/// Either way the coordinate returns to "not generated" and is retried on a
/// later tick.
#[derive(Debug, Clone, Error)]
pub enum JobFailure {
    #[error(transparent)]
    Stage(#[from] StageFault),
    #[error("chunk job panicked: {0}")]
    Panicked(String),
}

/// Errors raised while setting up a scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// With no job slots nothing would ever be generated.
    #[error("max_concurrent_jobs must be at least 1")]
    ZeroConcurrency,
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error(transparent)]
    Catalog(#[from] strata_voxel::CatalogError),
}
