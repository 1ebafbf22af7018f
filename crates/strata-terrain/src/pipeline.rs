//! Stage ordering, validation, and single-chunk generation jobs.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use strata_voxel::{ChunkCoord, VoxelGrid};

use crate::biome::{BiomeConfig, BiomeGenerator, BuildContext};
use crate::cave::{CaveConfig, carve_caves};
use crate::continentalness::{ContinentalnessParams, generate_continentalness};
use crate::error::{ConfigurationError, StageFault};
use crate::height_map::HeightMap;

/// A terrain-shaping stage. Stages run in the order listed here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StageKind {
    Continentalness,
    Biomes,
    Caves,
}

impl StageKind {
    pub const ALL: [StageKind; 3] = [Self::Continentalness, Self::Biomes, Self::Caves];

    pub fn name(self) -> &'static str {
        match self {
            Self::Continentalness => "continentalness",
            Self::Biomes => "biomes",
            Self::Caves => "caves",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Horizontal and vertical chunk extent in voxels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkDims {
    pub size: usize,
    pub height: usize,
}

impl Default for ChunkDims {
    fn default() -> Self {
        Self {
            size: 16,
            height: 128,
        }
    }
}

impl ChunkDims {
    pub fn new(size: usize, height: usize) -> Self {
        Self { size, height }
    }

    pub fn volume(&self) -> usize {
        self.size * self.height * self.size
    }
}

/// Everything that shapes terrain, independent of seed and chunk size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Stages to run, in order.
    pub stages: Vec<StageKind>,
    pub continentalness: ContinentalnessParams,
    pub biomes: BiomeConfig,
    pub caves: CaveConfig,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            stages: StageKind::ALL.to_vec(),
            continentalness: ContinentalnessParams::default(),
            biomes: BiomeConfig::default(),
            caves: CaveConfig::default(),
        }
    }
}

impl TerrainConfig {
    /// Checks stage order and every stage's parameters.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate_stage_order(&self.stages)?;
        self.continentalness.validate()?;
        self.biomes.validate("root")?;
        self.caves.validate()
    }
}

fn validate_stage_order(stages: &[StageKind]) -> Result<(), ConfigurationError> {
    for pair in stages.windows(2) {
        if pair[0] == pair[1] {
            return Err(ConfigurationError::StageOrder {
                stage: pair[1],
                reason: "listed more than once",
            });
        }
        if pair[1] < pair[0] {
            return Err(ConfigurationError::StageOrder {
                stage: pair[1],
                reason: "listed after a stage that depends on it",
            });
        }
    }
    if !stages.contains(&StageKind::Biomes) {
        return Err(ConfigurationError::MissingStage(StageKind::Biomes));
    }
    Ok(())
}

/// Output of one chunk job.
#[derive(Clone, Debug)]
pub struct GeneratedChunk {
    pub coord: ChunkCoord,
    pub grid: VoxelGrid,
    /// Continentalness of each column.
    pub height_map: HeightMap,
    /// Generation time in microseconds.
    pub generation_time_us: u64,
}

struct PipelineShared {
    seed: u64,
    dims: ChunkDims,
    config: TerrainConfig,
}

/// A validated terrain configuration bound to a world seed.
///
/// Cheap to clone; all clones share one configuration.
#[derive(Clone)]
pub struct TerrainPipeline {
    shared: Arc<PipelineShared>,
}

impl fmt::Debug for TerrainPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerrainPipeline")
            .field("seed", &self.shared.seed)
            .field("dims", &self.shared.dims)
            .field("stages", &self.shared.config.stages)
            .finish()
    }
}

impl TerrainPipeline {
    /// Validates `config` and binds it to `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the dimensions are zero, the stage
    /// list is out of order or lacks the biome stage, or any stage's
    /// parameters are malformed.
    pub fn new(seed: u64, dims: ChunkDims, config: TerrainConfig) -> Result<Self, ConfigurationError> {
        if dims.size == 0 || dims.height == 0 {
            return Err(ConfigurationError::InvalidDimensions {
                size: dims.size,
                height: dims.height,
            });
        }
        config.validate()?;

        for path in config.biomes.unordered_blends("root") {
            tracing::warn!(%path, "Biome node thresholds are not in ascending order");
        }

        tracing::debug!(seed, size = dims.size, height = dims.height, stages = ?config.stages, "Terrain pipeline ready");
        Ok(Self {
            shared: Arc::new(PipelineShared { seed, dims, config }),
        })
    }

    pub fn seed(&self) -> u64 {
        self.shared.seed
    }

    pub fn dims(&self) -> ChunkDims {
        self.shared.dims
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.shared.config
    }

    /// Creates the job that generates `coord`.
    pub fn job(&self, coord: ChunkCoord) -> ChunkJob {
        ChunkJob {
            coord,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Generates `coord` on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns the [`StageFault`] of the first failing stage.
    pub fn generate(&self, coord: ChunkCoord) -> Result<GeneratedChunk, StageFault> {
        self.job(coord).execute()
    }
}

/// Generation of one chunk. Single-attempt: a job is consumed by
/// [`ChunkJob::execute`].
pub struct ChunkJob {
    coord: ChunkCoord,
    shared: Arc<PipelineShared>,
}

impl ChunkJob {
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Runs every configured stage in order.
    ///
    /// # Errors
    ///
    /// Returns a [`StageFault`] naming the first stage that fails.
    pub fn execute(self) -> Result<GeneratedChunk, StageFault> {
        let _span = tracing::debug_span!("chunk_job", coord = %self.coord).entered();
        let start = Instant::now();

        let PipelineShared { seed, dims, config } = &*self.shared;
        let mut height_map = HeightMap::new(dims.size);
        let mut grid = VoxelGrid::new(dims.size, dims.height);

        for &stage in &config.stages {
            match stage {
                StageKind::Continentalness => {
                    height_map =
                        generate_continentalness(*seed, self.coord, dims.size, &config.continentalness);
                }
                StageKind::Biomes => {
                    let ctx = BuildContext {
                        seed: *seed,
                        coord: self.coord,
                        size: dims.size,
                        continentalness: &height_map,
                    };
                    let generator = BiomeGenerator::build(&config.biomes, &ctx)
                        .map_err(|e| self.fault(stage, e.to_string()))?;
                    if let Some((x, z)) = generator.non_finite_blend_column() {
                        return Err(
                            self.fault(stage, format!("blend map is not finite at column ({x}, {z})"))
                        );
                    }
                    for x in 0..dims.size {
                        for z in 0..dims.size {
                            generator.fill_column(x, z, &mut grid);
                        }
                    }
                }
                StageKind::Caves => {
                    carve_caves(*seed, self.coord, &mut grid, &config.caves);
                }
            }
        }

        let generation_time_us = start.elapsed().as_micros() as u64;
        tracing::debug!(solid = grid.solid_count(), generation_time_us, "Generated chunk");

        Ok(GeneratedChunk {
            coord: self.coord,
            grid,
            height_map,
            generation_time_us,
        })
    }

    fn fault(&self, stage: StageKind, reason: String) -> StageFault {
        StageFault {
            stage,
            coord: self.coord,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BlendMap, BlendParams};
    use crate::octaves::Octave;
    use crate::seed::hash_grid;

    fn small() -> ChunkDims {
        ChunkDims::new(8, 96)
    }

    #[test]
    fn test_default_config_builds() {
        let pipeline = TerrainPipeline::new(1, small(), TerrainConfig::default());
        assert!(pipeline.is_ok());
    }

    #[test]
    fn test_zero_dims_rejected() {
        let err = TerrainPipeline::new(1, ChunkDims::new(0, 64), TerrainConfig::default()).unwrap_err();
        assert_eq!(err, ConfigurationError::InvalidDimensions { size: 0, height: 64 });
    }

    #[test]
    fn test_stage_order_rules() {
        let config = |stages: Vec<StageKind>| TerrainConfig {
            stages,
            ..Default::default()
        };

        let reversed = config(vec![StageKind::Biomes, StageKind::Continentalness]);
        assert!(matches!(
            reversed.validate(),
            Err(ConfigurationError::StageOrder {
                stage: StageKind::Continentalness,
                ..
            })
        ));

        let duplicated = config(vec![StageKind::Biomes, StageKind::Biomes]);
        assert!(matches!(
            duplicated.validate(),
            Err(ConfigurationError::StageOrder { .. })
        ));

        let missing = config(vec![StageKind::Continentalness, StageKind::Caves]);
        assert_eq!(
            missing.validate(),
            Err(ConfigurationError::MissingStage(StageKind::Biomes))
        );

        assert!(config(vec![StageKind::Biomes]).validate().is_ok());
    }

    #[test]
    fn test_job_is_deterministic() {
        let pipeline = TerrainPipeline::new(42, small(), TerrainConfig::default()).unwrap();
        let a = pipeline.generate(ChunkCoord::new(3, -2)).unwrap();
        let b = pipeline.generate(ChunkCoord::new(3, -2)).unwrap();
        assert_eq!(hash_grid(&a.grid), hash_grid(&b.grid));
        assert_eq!(a.height_map, b.height_map);
    }

    #[test]
    fn test_different_coords_differ() {
        let pipeline = TerrainPipeline::new(42, small(), TerrainConfig::default()).unwrap();
        let a = pipeline.generate(ChunkCoord::new(0, 0)).unwrap();
        let b = pipeline.generate(ChunkCoord::new(40, 40)).unwrap();
        assert_ne!(a.height_map, b.height_map);
    }

    #[test]
    fn test_overflowing_blend_map_faults_biome_stage() {
        // Each octave is finite on its own; their sum is not.
        let huge = Octave {
            scale: 0.0,
            offset_y: f64::MAX,
            ..Default::default()
        };
        let config = TerrainConfig {
            biomes: BiomeConfig::Blend(BlendParams {
                blend_map: BlendMap::Octaves(vec![huge.clone(), huge]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let pipeline = TerrainPipeline::new(3, small(), config).unwrap();
        let fault = pipeline.generate(ChunkCoord::new(2, 7)).unwrap_err();
        assert_eq!(fault.stage, StageKind::Biomes);
        assert_eq!(fault.coord, ChunkCoord::new(2, 7));
        assert!(fault.reason.contains("not finite"), "{}", fault.reason);
    }

    #[test]
    fn test_without_continentalness_map_is_zero() {
        let config = TerrainConfig {
            stages: vec![StageKind::Biomes],
            ..Default::default()
        };
        let pipeline = TerrainPipeline::new(5, small(), config).unwrap();
        let chunk = pipeline.generate(ChunkCoord::new(0, 0)).unwrap();
        assert_eq!(chunk.height_map.range(), Some((0.0, 0.0)));
        assert!(chunk.grid.solid_count() > 0);
    }
}
