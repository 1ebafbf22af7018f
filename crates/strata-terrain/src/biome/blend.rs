//! Threshold blending between ordered child biomes.
//!
//! Node 0 is the base biome. Walking upward from node 1, a column whose blend
//! value lies below a node's band keeps the previous biome, one above it moves
//! on, and one inside it mixes the two heights with a curve-shaped weight
//! roughened by band noise.

use noise::Perlin;

use super::config::{BlendMap, BlendParams};
use super::generator::{BiomeGenerator, BuildContext, ColumnSample, NodeInput};
use crate::curve::ResponseCurve;
use crate::error::ConfigurationError;
use crate::height_map::HeightMap;
use crate::octaves::{OctaveSampler, perlin01};
use crate::seed::{noise_seed, stage_rng};

#[derive(Debug)]
struct BlendChild {
    generator: BiomeGenerator,
    start: f64,
    width: f64,
}

#[derive(Debug)]
pub struct BlendGenerator {
    map: HeightMap,
    band_noise: Perlin,
    smoothing_frequency: f64,
    smoothing_scale: f64,
    curve: ResponseCurve,
    origin: (i32, i32),
    nodes: Vec<BlendChild>,
}

impl BlendGenerator {
    pub(crate) fn new(
        params: &BlendParams,
        ctx: &BuildContext<'_>,
        path: &str,
    ) -> Result<Self, ConfigurationError> {
        if params.nodes.is_empty() {
            return Err(ConfigurationError::EmptyBiomeList {
                path: path.to_string(),
            });
        }

        let map = match &params.blend_map {
            BlendMap::Continentalness => ctx.continentalness.clone(),
            BlendMap::Octaves(octaves) => {
                let label = format!("biome/{path}/map");
                OctaveSampler::new(
                    &mut stage_rng(ctx.seed, &label),
                    octaves,
                    ctx.origin(),
                    noise_seed(ctx.seed, &label),
                )
                .accumulate_map(ctx.size)
            }
        };

        let mut nodes = Vec::with_capacity(params.nodes.len());
        for (i, node) in params.nodes.iter().enumerate() {
            let end = params
                .nodes
                .get(i + 1)
                .map_or(1.0, |next| next.band_start());
            let input = NodeInput {
                map: &map,
                band: (node.band_start(), end),
            };
            let generator =
                BiomeGenerator::build_node(&node.biome, ctx, &format!("{path}/{i}"), &input)?;
            nodes.push(BlendChild {
                generator,
                start: node.band_start(),
                width: node.smoothing,
            });
        }

        Ok(Self {
            map,
            band_noise: Perlin::new(noise_seed(ctx.seed, &format!("biome/{path}/smoothing"))),
            smoothing_frequency: params.smoothing_frequency,
            smoothing_scale: params.smoothing_scale,
            curve: params.curve,
            origin: ctx.origin(),
            nodes,
        })
    }

    /// The map this blend selects children by.
    pub fn blend_map(&self) -> &HeightMap {
        &self.map
    }

    pub(crate) fn non_finite_column(&self) -> Option<(usize, usize)> {
        self.map.first_non_finite().or_else(|| {
            self.nodes
                .iter()
                .find_map(|node| node.generator.non_finite_blend_column())
        })
    }

    pub(crate) fn resolve(&self, x: usize, z: usize) -> ColumnSample<'_> {
        let value = self.map.get(x, z);
        let mut previous = &self.nodes[0];

        for node in &self.nodes[1..] {
            if value < node.start {
                return previous.generator.resolve(x, z);
            }
            if node.width <= 0.0 || value > node.start + node.width {
                previous = node;
                continue;
            }

            let weight = self.curve.eval((value - node.start) / node.width);
            let base = (1.0 - (2.0 * weight - 1.0).powi(2)) * self.smoothing_scale;
            let multi = weight * (1.0 - base) + self.band_point(x, z) * base;

            let below = previous.generator.resolve(x, z);
            let above = node.generator.resolve(x, z);
            let height =
                (multi * above.height as f64 + (1.0 - multi) * below.height as f64) as i32;
            let source = if multi > 0.5 { above.source } else { below.source };
            return ColumnSample { height, source };
        }

        previous.generator.resolve(x, z)
    }

    fn band_point(&self, x: usize, z: usize) -> f64 {
        let f = self.smoothing_frequency;
        let wx = (self.origin.0 + x as i32) as f64;
        let wz = (self.origin.1 + z as i32) as f64;
        perlin01(&self.band_noise, wx * f, wz * f)
    }
}
