//! Dense voxel storage for a single chunk column.
//!
//! A chunk is `size × height × size` voxels spanning the full world height,
//! stored as a flat `Vec<BlockId>` with no palette.

use serde::{Deserialize, Serialize};

use crate::block::BlockId;

/// Dense `(size, height, size)` voxel array, row-major with
/// index `(x * height + y) * size + z`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoxelGrid {
    size: usize,
    height: usize,
    blocks: Vec<BlockId>,
}

impl VoxelGrid {
    /// Creates a grid filled with Air.
    pub fn new(size: usize, height: usize) -> Self {
        Self::filled(size, height, BlockId::Air)
    }

    /// Creates a grid filled with `block`.
    pub fn filled(size: usize, height: usize, block: BlockId) -> Self {
        Self {
            size,
            height,
            blocks: vec![block; size * height * size],
        }
    }

    /// Horizontal side length in voxels.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Vertical extent in voxels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of voxels.
    #[inline]
    pub fn volume(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    fn linear_index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.size && y < self.height && z < self.size);
        (x * self.height + y) * self.size + z
    }

    /// Returns `true` if `(x, y, z)` lies inside the grid.
    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.size
            && (y as usize) < self.height
            && (z as usize) < self.size
    }

    /// Returns the block at `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of range.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.blocks[self.linear_index(x, y, z)]
    }

    /// Returns the block at a signed coordinate, or `None` outside the grid.
    #[inline]
    pub fn try_get(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        self.contains(x, y, z)
            .then(|| self.get(x as usize, y as usize, z as usize))
    }

    /// Sets the block at `(x, y, z)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: BlockId) {
        let index = self.linear_index(x, y, z);
        self.blocks[index] = block;
    }

    /// Overwrites every cell with `block`.
    pub fn fill(&mut self, block: BlockId) {
        self.blocks.fill(block);
    }

    /// Sets every cell of column `(x, z)` in `y_range` to Air, clamping the
    /// range to the grid height. Returns the number of cells that changed.
    pub fn clear_span(&mut self, x: usize, z: usize, y_start: i32, y_end: i32) -> usize {
        let start = y_start.max(0) as usize;
        let end = (y_end.max(0) as usize).min(self.height);
        let mut cleared = 0;
        for y in start..end {
            let index = self.linear_index(x, y, z);
            if !self.blocks[index].is_air() {
                self.blocks[index] = BlockId::Air;
                cleared += 1;
            }
        }
        cleared
    }

    /// Raw cell slice in storage order.
    pub fn as_slice(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Number of non-Air cells.
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_air()).count()
    }

    /// Highest non-Air `y` in column `(x, z)`, or `None` for an empty column.
    pub fn surface_y(&self, x: usize, z: usize) -> Option<usize> {
        (0..self.height).rev().find(|&y| !self.get(x, y, z).is_air())
    }
}
