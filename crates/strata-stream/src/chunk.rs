//! A finished chunk and the lifecycle states a coordinate moves through.

use std::fmt;

use strata_mesh::ChunkMesh;
use strata_terrain::HeightMap;
use strata_voxel::{ChunkCoord, VoxelGrid};

/// A generated, meshed chunk column.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub grid: VoxelGrid,
    /// Continentalness of each column.
    pub height_map: HeightMap,
    pub mesh: ChunkMesh,
    /// Time spent in terrain stages and meshing, in microseconds.
    pub build_time_us: u64,
}

/// Lifecycle of one coordinate as seen by the scheduler.
///
/// `Requested → Generating → Ready`, or `Generating → Cancelled` when the
/// coordinate leaves the retention range before its job returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Queued, waiting for a free job slot.
    Requested,
    /// Submitted to the worker pool.
    Generating,
    /// Live and published.
    Ready,
    /// Job still running, result will be discarded.
    Cancelled,
}

impl fmt::Display for ChunkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Requested => "requested",
            Self::Generating => "generating",
            Self::Ready => "ready",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}
