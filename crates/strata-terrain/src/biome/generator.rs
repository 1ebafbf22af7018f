//! Per-chunk instantiation of the biome tree.

use strata_voxel::{BlockId, ChunkCoord, VoxelGrid};

use super::blend::BlendGenerator;
use super::config::BiomeConfig;
use super::mountain::MountainGenerator;
use super::plains::PlainsGenerator;
use crate::error::ConfigurationError;
use crate::height_map::HeightMap;

/// Inputs shared by every generator built for one chunk.
#[derive(Clone, Copy, Debug)]
pub struct BuildContext<'a> {
    pub seed: u64,
    pub coord: ChunkCoord,
    pub size: usize,
    pub continentalness: &'a HeightMap,
}

impl BuildContext<'_> {
    /// World position of the chunk's `(0, 0)` column.
    pub fn origin(&self) -> (i32, i32) {
        self.coord.world_origin(self.size)
    }
}

/// The value a node blends on and the sub-range of it the node owns.
pub(crate) struct NodeInput<'a> {
    pub map: &'a HeightMap,
    pub band: (f64, f64),
}

/// Resolved height of one column and the leaf generator whose block rules
/// apply to it.
#[derive(Clone, Copy, Debug)]
pub struct ColumnSample<'a> {
    pub height: i32,
    pub source: &'a BiomeGenerator,
}

/// A biome tree bound to one chunk.
#[derive(Debug)]
pub enum BiomeGenerator {
    Plains(PlainsGenerator),
    Mountain(MountainGenerator),
    Blend(BlendGenerator),
}

impl BiomeGenerator {
    /// Instantiates `config` for the chunk described by `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EmptyBiomeList`] if a blend has no nodes.
    pub fn build(config: &BiomeConfig, ctx: &BuildContext<'_>) -> Result<Self, ConfigurationError> {
        let input = NodeInput {
            map: ctx.continentalness,
            band: (0.0, 1.0),
        };
        Self::build_node(config, ctx, "root", &input)
    }

    pub(crate) fn build_node(
        config: &BiomeConfig,
        ctx: &BuildContext<'_>,
        path: &str,
        input: &NodeInput<'_>,
    ) -> Result<Self, ConfigurationError> {
        Ok(match config {
            BiomeConfig::Plains(params) => Self::Plains(PlainsGenerator::new(params, ctx, path)),
            BiomeConfig::Mountain(params) => {
                Self::Mountain(MountainGenerator::new(params, ctx, path, input))
            }
            BiomeConfig::Blend(params) => Self::Blend(BlendGenerator::new(params, ctx, path)?),
        })
    }

    /// First column where some blend map in the tree is NaN or infinite.
    /// Finite octave parameters can still overflow when summed.
    pub fn non_finite_blend_column(&self) -> Option<(usize, usize)> {
        match self {
            Self::Blend(g) => g.non_finite_column(),
            Self::Plains(_) | Self::Mountain(_) => None,
        }
    }

    /// Resolves column `(x, z)` down to a leaf.
    pub fn resolve(&self, x: usize, z: usize) -> ColumnSample<'_> {
        match self {
            Self::Plains(g) => ColumnSample {
                height: g.height(x, z),
                source: self,
            },
            Self::Mountain(g) => ColumnSample {
                height: g.height(x, z),
                source: self,
            },
            Self::Blend(g) => g.resolve(x, z),
        }
    }

    /// Surface height of column `(x, z)`.
    pub fn sample_height(&self, x: usize, z: usize) -> i32 {
        self.resolve(x, z).height
    }

    /// Block at `(x, y, z)` for a column whose surface is `height`.
    pub fn sample_block(&self, x: usize, y: i32, z: usize, height: i32) -> BlockId {
        match self {
            Self::Plains(g) => g.block(y, height),
            Self::Mountain(g) => g.block(x, y, z, height),
            Self::Blend(_) => self.resolve(x, z).source.sample_block(x, y, z, height),
        }
    }

    /// Writes column `(x, z)` into `grid`. Cells the biome leaves empty are
    /// not touched.
    pub fn fill_column(&self, x: usize, z: usize, grid: &mut VoxelGrid) {
        let sample = self.resolve(x, z);
        let top = match sample.source {
            Self::Mountain(g) if g.has_overhangs() => grid.height(),
            _ => (sample.height.max(-1) + 1).min(grid.height() as i32) as usize,
        };
        for y in 0..top {
            let block = sample.source.sample_block(x, y as i32, z, sample.height);
            if !block.is_air() {
                grid.set(x, y, z, block);
            }
        }
    }

    /// Short name of the leaf kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Plains(_) => "plains",
            Self::Mountain(_) => "mountain",
            Self::Blend(_) => "blend",
        }
    }
}
