//! Chunk-grid coordinates on the horizontal plane.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Identifies a chunk column in the 2D chunk grid.
///
/// Chunks span the full world height, so only `x` and `z` are needed. The
/// world-space origin of a chunk is `(x * size, 0, z * size)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Chunk-grid X coordinate.
    pub x: i32,
    /// Chunk-grid Z coordinate.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns the coordinate of the chunk containing world position `pos`.
    ///
    /// Uses floor division so that negative positions map to negative chunks
    /// (`-0.5` lies in chunk `-1`, not chunk `0`).
    pub fn from_world(pos: DVec3, chunk_size: usize) -> Self {
        let size = chunk_size as f64;
        Self {
            x: (pos.x / size).floor() as i32,
            z: (pos.z / size).floor() as i32,
        }
    }

    /// World-space X/Z of this chunk's minimum corner, in voxels.
    pub fn world_origin(self, chunk_size: usize) -> (i32, i32) {
        let size = chunk_size as i32;
        (self.x * size, self.z * size)
    }

    /// Returns the coordinate offset by `(dx, dz)`.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// Chebyshev (square-ring) distance in chunks.
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }

    /// Squared Euclidean distance in chunks, used to order requests nearest-first.
    pub fn distance_sq(self, other: Self) -> u64 {
        let dx = self.x.abs_diff(other.x) as u64;
        let dz = self.z.abs_diff(other.z) as u64;
        dx * dx + dz * dz
    }

    /// Every coordinate within Chebyshev distance `radius` of `self`.
    pub fn square_around(self, radius: u32) -> impl Iterator<Item = ChunkCoord> {
        let r = radius as i32;
        (-r..=r).flat_map(move |dx| (-r..=r).map(move |dz| self.offset(dx, dz)))
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}
