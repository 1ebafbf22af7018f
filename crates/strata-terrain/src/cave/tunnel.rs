//! Long tunnels: narrow passages along the ridges of a shape field.

use serde::{Deserialize, Serialize};
use strata_voxel::{ChunkCoord, VoxelGrid};

use crate::error::ConfigurationError;
use crate::octaves::{Octave, OctaveSampler, validate_octaves};
use crate::seed::{noise_seed, stage_rng};

/// Fades tunnels out where a mask field is low.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelMask {
    /// Mask value below which no tunnel is carved.
    pub intensity: f64,
    /// Mask value below which tunnels start to shrink.
    pub start_fade: f64,
    pub octave: Octave,
}

impl Default for TunnelMask {
    fn default() -> Self {
        Self {
            intensity: 0.3,
            start_fade: 0.5,
            octave: Octave {
                scale: 0.5,
                frequency: 0.005,
                offset_y: 0.5,
                ..Default::default()
            },
        }
    }
}

/// Configuration for one tunnel layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelParams {
    /// Shape values strictly between the two intensities carve a tunnel.
    pub min_intensity: f64,
    pub max_intensity: f64,
    pub min_height: i32,
    pub max_height: i32,
    /// Side of the square neighbourhood averaged to smooth tunnel height.
    pub sample_size: usize,
    /// Share of the neighbourhood average in the final height, `[0, 1]`.
    pub sample_weight: f64,
    pub shape: Vec<Octave>,
    pub min_y: i32,
    pub max_y: i32,
    /// Octaves placing the tunnel centre between `min_y` and `max_y`.
    pub y_map: Vec<Octave>,
    pub mask: Option<TunnelMask>,
}

impl Default for TunnelParams {
    fn default() -> Self {
        Self {
            min_intensity: 0.45,
            max_intensity: 0.55,
            min_height: 3,
            max_height: 7,
            sample_size: 4,
            sample_weight: 0.5,
            shape: vec![Octave {
                scale: 0.5,
                frequency: 0.015,
                offset_y: 0.5,
                ..Default::default()
            }],
            min_y: 10,
            max_y: 50,
            y_map: vec![Octave {
                scale: 0.5,
                frequency: 0.01,
                offset_y: 0.5,
                ..Default::default()
            }],
            mask: None,
        }
    }
}

impl TunnelParams {
    pub(crate) fn validate(&self, context: &str) -> Result<(), ConfigurationError> {
        let invalid = |reason| ConfigurationError::InvalidCaveParams {
            context: context.to_string(),
            reason,
        };
        if !self.min_intensity.is_finite() || !self.max_intensity.is_finite() {
            return Err(invalid("non-finite intensity"));
        }
        if self.max_intensity <= self.min_intensity {
            return Err(invalid("max_intensity must exceed min_intensity"));
        }
        if self.min_height > self.max_height {
            return Err(invalid("min_height is above max_height"));
        }
        if self.min_y > self.max_y {
            return Err(invalid("min_y is above max_y"));
        }
        if !(0.0..=1.0).contains(&self.sample_weight) {
            return Err(invalid("sample_weight must lie in [0, 1]"));
        }
        if let Some(mask) = &self.mask {
            if !mask.intensity.is_finite() || !mask.start_fade.is_finite() {
                return Err(invalid("non-finite mask value"));
            }
            if mask.start_fade <= mask.intensity {
                return Err(invalid("mask start_fade must exceed mask intensity"));
            }
            validate_octaves(std::slice::from_ref(&mask.octave), &format!("{context}/mask"))?;
        }
        validate_octaves(&self.shape, &format!("{context}/shape"))?;
        validate_octaves(&self.y_map, &format!("{context}/y"))
    }

    fn in_range(&self, value: f64) -> bool {
        self.min_intensity < value && value < self.max_intensity
    }

    /// `sin(π t)` over the intensity range: 0 at both edges, 1 in the middle.
    fn normalize(&self, value: f64) -> f64 {
        let t = (value - self.min_intensity) / (self.max_intensity - self.min_intensity);
        (std::f64::consts::PI * t).sin()
    }
}

/// A tunnel layer bound to one chunk.
pub struct TunnelCarver<'a> {
    params: &'a TunnelParams,
    shape: OctaveSampler,
    y_map: OctaveSampler,
    mask: Option<OctaveSampler>,
}

impl<'a> TunnelCarver<'a> {
    pub fn new(params: &'a TunnelParams, seed: u64, label: &str, coord: ChunkCoord, size: usize) -> Self {
        let mut rng = stage_rng(seed, label);
        let origin = coord.world_origin(size);
        let mut sampler = |octaves: &[Octave], field: &str| {
            OctaveSampler::new(
                &mut rng,
                octaves,
                origin,
                noise_seed(seed, &format!("{label}/{field}")),
            )
        };
        let shape = sampler(&params.shape, "shape");
        let y_map = sampler(&params.y_map, "y");
        let mask = params
            .mask
            .as_ref()
            .map(|m| sampler(std::slice::from_ref(&m.octave), "mask"));
        Self {
            params,
            shape,
            y_map,
            mask,
        }
    }

    /// Mean normalized shape value over the square neighbourhood of `(x, z)`,
    /// counting out-of-range samples as zero.
    fn neighbourhood_average(&self, x: i32, z: i32) -> f64 {
        let p = self.params;
        if p.sample_size == 0 {
            return 0.0;
        }
        let half = (p.sample_size / 2) as i32;
        let mut total = 0.0;
        for sx in x - half..x + half {
            for sz in z - half..z + half {
                let value = self.shape.sample(sx, sz);
                if p.in_range(value) {
                    total += p.normalize(value);
                }
            }
        }
        total / (p.sample_size * p.sample_size) as f64
    }

    /// Clears every tunnel span in the chunk. Returns the number of cells
    /// that changed.
    pub fn carve(&self, grid: &mut VoxelGrid) -> usize {
        let p = self.params;
        let mut cleared = 0;
        for x in 0..grid.size() {
            for z in 0..grid.size() {
                let (xi, zi) = (x as i32, z as i32);
                let mask_value = self.mask.as_ref().map(|m| m.sample(xi, zi));
                if let (Some(mask), Some(value)) = (&p.mask, mask_value) {
                    if value < mask.intensity {
                        continue;
                    }
                }

                let value = self.shape.sample(xi, zi);
                if !p.in_range(value) {
                    continue;
                }

                let blended = p.sample_weight * self.neighbourhood_average(xi, zi)
                    + (1.0 - p.sample_weight) * p.normalize(value);
                let mut height =
                    p.min_height as f64 + (p.max_height - p.min_height) as f64 * blended;

                if let (Some(mask), Some(value)) = (&p.mask, mask_value) {
                    if value < mask.start_fade {
                        let fade = (value - mask.intensity) / (mask.start_fade - mask.intensity);
                        height -= p.max_height as f64 * (1.0 - fade);
                    }
                }

                let centre = p.min_y as f64 + (p.max_y - p.min_y) as f64 * self.y_map.sample(xi, zi);
                let half = height * 0.5;
                let start = (centre - half).floor() as i32;
                let end = (centre + half).ceil() as i32;
                cleared += grid.clear_span(x, z, start, end);
            }
        }
        cleared
    }
}
