//! Bubble caverns: wide pockets wherever a shape field crosses a threshold.

use noise::{NoiseFn, Perlin};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strata_voxel::{ChunkCoord, VoxelGrid};

use crate::curve::{CurveRange, ResponseCurve};
use crate::error::ConfigurationError;
use crate::height_map::HeightMap;
use crate::octaves::{Octave, OctaveSampler, perlin01, validate_octaves};
use crate::seed::{noise_seed, stage_rng};

/// Configuration for one bubble cavern layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleCaveParams {
    /// Maximum random shift of the shape and centre fields, in voxels.
    pub position_offset: f64,
    /// Frequency of the base shape noise.
    pub map_frequency: f64,
    /// Shape value from which a cavern opens. Must lie in `[0, 1)`.
    pub map_delta: f64,
    /// Cavern height as a function of how far the shape value exceeds
    /// `map_delta`, normalized to `[0, 1]`.
    pub height_curve: CurveRange,
    /// Detail octaves added to the shape noise.
    pub octaves: Vec<Octave>,
    /// Frequency of the noise that places the cavern centre vertically.
    pub height_map_frequency: f64,
    pub min_y: i32,
    pub max_y: i32,
}

impl Default for BubbleCaveParams {
    fn default() -> Self {
        Self {
            position_offset: 10_000.0,
            map_frequency: 0.04,
            map_delta: 0.55,
            height_curve: CurveRange::new(ResponseCurve::SmoothStep, 2.0, 14.0),
            octaves: vec![Octave {
                scale: 0.3,
                frequency: 0.1,
                ..Default::default()
            }],
            height_map_frequency: 0.02,
            min_y: 12,
            max_y: 40,
        }
    }
}

impl BubbleCaveParams {
    pub(crate) fn validate(&self, context: &str) -> Result<(), ConfigurationError> {
        let invalid = |reason| ConfigurationError::InvalidCaveParams {
            context: context.to_string(),
            reason,
        };
        let fields = [
            self.position_offset,
            self.map_frequency,
            self.map_delta,
            self.height_map_frequency,
        ];
        if fields.iter().any(|v| !v.is_finite()) || !self.height_curve.is_finite() {
            return Err(invalid("non-finite value"));
        }
        if !(0.0..1.0).contains(&self.map_delta) {
            return Err(invalid("map_delta must lie in [0, 1)"));
        }
        if self.min_y > self.max_y {
            return Err(invalid("min_y is above max_y"));
        }
        validate_octaves(&self.octaves, context)
    }
}

/// A bubble cavern layer bound to one chunk.
pub struct BubbleCarver<'a> {
    params: &'a BubbleCaveParams,
    shape: (i32, i32),
    centre: (i32, i32),
    shape_noise: Perlin,
    centre_noise: Perlin,
    detail: HeightMap,
}

impl<'a> BubbleCarver<'a> {
    /// Draws this layer's field offsets from its `label` stream.
    pub fn new(
        params: &'a BubbleCaveParams,
        seed: u64,
        label: &str,
        coord: ChunkCoord,
        size: usize,
    ) -> Self {
        let mut rng = stage_rng(seed, label);
        let (ox, oz) = coord.world_origin(size);
        let mut shift = |origin: i32| origin + (params.position_offset * rng.random::<f64>()) as i32;
        let shape = (shift(ox), shift(oz));
        let centre = (shift(ox), shift(oz));
        let detail = OctaveSampler::new(&mut rng, &params.octaves, (ox, oz), noise_seed(seed, label))
            .accumulate_map(size);

        Self {
            params,
            shape,
            centre,
            shape_noise: Perlin::new(noise_seed(seed, &format!("{label}/shape"))),
            centre_noise: Perlin::new(noise_seed(seed, &format!("{label}/y"))),
            detail,
        }
    }

    /// Clears every cavern span in the chunk. Returns the number of cells
    /// that changed.
    pub fn carve(&self, grid: &mut VoxelGrid) -> usize {
        let p = self.params;
        let mut cleared = 0;
        for x in 0..grid.size() {
            for z in 0..grid.size() {
                let sx = (self.shape.0 + x as i32) as f64 * p.map_frequency;
                let sz = (self.shape.1 + z as i32) as f64 * p.map_frequency;
                let value = self.shape_noise.get([sx, sz]) + self.detail.get(x, z);
                if value < p.map_delta {
                    continue;
                }

                let hx = (self.centre.0 + x as i32) as f64 * p.height_map_frequency;
                let hz = (self.centre.1 + z as i32) as f64 * p.height_map_frequency;
                let centre =
                    p.min_y as f64 + (p.max_y - p.min_y) as f64 * perlin01(&self.centre_noise, hx, hz);
                let height = p.height_curve.eval((value - p.map_delta) / (1.0 - p.map_delta));

                let half = height * 0.5;
                let start = (centre - half).floor() as i32;
                let end = (centre + half).ceil() as i32;
                cleared += grid.clear_span(x, z, start, end);
            }
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_voxel::BlockId;

    #[test]
    fn test_validate_bounds() {
        assert!(BubbleCaveParams::default().validate("bubble").is_ok());
        let bad_delta = BubbleCaveParams {
            map_delta: 1.0,
            ..Default::default()
        };
        assert!(bad_delta.validate("bubble").is_err());
        let inverted = BubbleCaveParams {
            min_y: 50,
            max_y: 10,
            ..Default::default()
        };
        assert!(inverted.validate("bubble").is_err());
    }

    #[test]
    fn test_zero_delta_opens_everywhere_detail_allows() {
        // With map_delta 0 and a strongly positive detail bias every column
        // opens a cavern.
        let params = BubbleCaveParams {
            map_delta: 0.0,
            octaves: vec![Octave {
                scale: 0.0,
                offset_y: 2.0,
                ..Default::default()
            }],
            height_curve: CurveRange::new(ResponseCurve::Linear, 4.0, 4.0),
            min_y: 10,
            max_y: 10,
            ..Default::default()
        };
        let mut grid = VoxelGrid::filled(4, 32, BlockId::Stone);
        let carver = BubbleCarver::new(&params, 1, "cave/bubble/0", ChunkCoord::new(0, 0), 4);
        let cleared = carver.carve(&mut grid);

        assert_eq!(cleared, 4 * 4 * 4);
        for y in 8..12 {
            assert_eq!(grid.get(2, y, 2), BlockId::Air, "y={y}");
        }
        assert_eq!(grid.get(2, 7, 2), BlockId::Stone);
        assert_eq!(grid.get(2, 12, 2), BlockId::Stone);
    }
}
