use strata_voxel::BlockId;

use super::config::PlainsParams;
use super::generator::BuildContext;
use crate::octaves::OctaveSampler;
use crate::seed::{noise_seed, stage_rng};

/// Grass over a few layers of dirt over stone.
#[derive(Debug)]
pub struct PlainsGenerator {
    base_height: f64,
    dirt_depth: i32,
    sampler: OctaveSampler,
}

impl PlainsGenerator {
    pub(crate) fn new(params: &PlainsParams, ctx: &BuildContext<'_>, path: &str) -> Self {
        let label = format!("biome/{path}");
        let sampler = OctaveSampler::new(
            &mut stage_rng(ctx.seed, &label),
            &params.octaves,
            ctx.origin(),
            noise_seed(ctx.seed, &label),
        );
        Self {
            base_height: params.base_height,
            dirt_depth: params.dirt_depth as i32,
            sampler,
        }
    }

    #[inline]
    pub fn height(&self, x: usize, z: usize) -> i32 {
        (self.base_height + self.sampler.sample(x as i32, z as i32)) as i32
    }

    #[inline]
    pub fn block(&self, y: i32, height: i32) -> BlockId {
        if y > height {
            BlockId::Air
        } else if y == height {
            BlockId::Grass
        } else if y >= height - self.dirt_depth {
            BlockId::Dirt
        } else {
            BlockId::Stone
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::height_map::HeightMap;
    use crate::octaves::Octave;
    use strata_voxel::ChunkCoord;

    fn flat(base_height: f64) -> PlainsGenerator {
        let map = HeightMap::new(16);
        let ctx = BuildContext {
            seed: 1,
            coord: ChunkCoord::new(0, 0),
            size: 16,
            continentalness: &map,
        };
        let params = PlainsParams {
            base_height,
            dirt_depth: 3,
            octaves: vec![Octave {
                scale: 0.0,
                ..Default::default()
            }],
        };
        PlainsGenerator::new(&params, &ctx, "root")
    }

    #[test]
    fn test_flat_height_truncates() {
        assert_eq!(flat(20.9).height(3, 4), 20);
    }

    #[test]
    fn test_layering() {
        let plains = flat(20.0);
        assert_eq!(plains.block(21, 20), BlockId::Air);
        assert_eq!(plains.block(20, 20), BlockId::Grass);
        for y in 17..20 {
            assert_eq!(plains.block(y, 20), BlockId::Dirt, "y={y}");
        }
        assert_eq!(plains.block(16, 20), BlockId::Stone);
        assert_eq!(plains.block(0, 20), BlockId::Stone);
    }
}
