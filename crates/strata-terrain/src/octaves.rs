//! Multi-octave noise sampling with seeded per-octave spatial jitter.
//!
//! Each octave contributes `offset_y + perlin(p * frequency) * scale`. The
//! sampler shifts every octave by a random integer offset drawn once at
//! construction, so a sampler is a fixed, pure function of its inputs for its
//! whole lifetime.

use noise::{NoiseFn, Perlin};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::height_map::HeightMap;

/// One layer of noise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Octave {
    /// Amplitude multiplier applied to the raw noise value.
    pub scale: f64,
    /// Spatial frequency. Higher values give smaller features.
    pub frequency: f64,
    /// Maximum random shift along X, in voxels.
    pub offset_x: f64,
    /// Constant bias added to every 2D sample; maximum random Y shift for 3D.
    pub offset_y: f64,
    /// Maximum random shift along Z, in voxels.
    pub offset_z: f64,
}

impl Default for Octave {
    fn default() -> Self {
        Self {
            scale: 1.0,
            frequency: 0.05,
            offset_x: 10_000.0,
            offset_y: 0.0,
            offset_z: 10_000.0,
        }
    }
}

impl Octave {
    /// Samples this octave in 2D at an already-shifted position.
    #[inline]
    pub fn sample(&self, noise: &Perlin, x: i32, z: i32) -> f64 {
        let px = x as f64 * self.frequency;
        let pz = z as f64 * self.frequency;
        self.offset_y + noise.get([px, pz]) * self.scale
    }

    /// Samples this octave in 3D at an already-shifted position.
    #[inline]
    pub fn sample_3d(&self, noise: &Perlin, x: i32, y: i32, z: i32) -> f64 {
        let f = self.frequency;
        noise.get([x as f64 * f, y as f64 * f, z as f64 * f]) * self.scale
    }

    fn check(&self, context: &str, index: usize) -> Result<(), ConfigurationError> {
        let malformed = |reason| ConfigurationError::MalformedOctave {
            context: context.to_string(),
            index,
            reason,
        };
        let fields = [
            self.scale,
            self.frequency,
            self.offset_x,
            self.offset_y,
            self.offset_z,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(malformed("non-finite value"));
        }
        if self.frequency <= 0.0 {
            return Err(malformed("frequency must be positive"));
        }
        Ok(())
    }
}

/// Checks every octave in a list.
///
/// # Errors
///
/// Returns [`ConfigurationError::MalformedOctave`] for the first bad octave.
pub fn validate_octaves(octaves: &[Octave], context: &str) -> Result<(), ConfigurationError> {
    octaves
        .iter()
        .enumerate()
        .try_for_each(|(i, octave)| octave.check(context, i))
}

/// Remaps a Perlin sample from `[-1, 1]` to `[0, 1]`.
#[inline]
pub fn perlin01(noise: &Perlin, x: f64, z: f64) -> f64 {
    (0.5 + noise.get([x, z]) * 0.5).clamp(0.0, 1.0)
}

fn jitter(rng: &mut impl Rng, origin: i32, max_offset: f64) -> i32 {
    origin + (max_offset * rng.random::<f64>()) as i32
}

/// 2D multi-octave sampler.
#[derive(Clone, Debug)]
pub struct OctaveSampler {
    octaves: Vec<Octave>,
    positions: Vec<(i32, i32)>,
    noise: Perlin,
}

impl OctaveSampler {
    /// Creates a sampler whose local `(0, 0)` sits at world `origin`.
    ///
    /// Draws two values per octave from `rng`, in octave order.
    pub fn new(rng: &mut impl Rng, octaves: &[Octave], origin: (i32, i32), noise_seed: u32) -> Self {
        let positions = octaves
            .iter()
            .map(|o| (jitter(rng, origin.0, o.offset_x), jitter(rng, origin.1, o.offset_z)))
            .collect();
        Self {
            octaves: octaves.to_vec(),
            positions,
            noise: Perlin::new(noise_seed),
        }
    }

    /// Sum of all octaves at local column `(x, z)`. Local coordinates may lie
    /// outside the chunk.
    pub fn sample(&self, x: i32, z: i32) -> f64 {
        self.octaves
            .iter()
            .zip(&self.positions)
            .map(|(octave, &(px, pz))| octave.sample(&self.noise, x + px, z + pz))
            .sum()
    }

    /// Samples every column of a `size × size` chunk.
    pub fn accumulate_map(&self, size: usize) -> HeightMap {
        HeightMap::from_fn(size, |x, z| self.sample(x as i32, z as i32))
    }

    /// Returns `true` if the sampler has no octaves (always samples `0`).
    pub fn is_empty(&self) -> bool {
        self.octaves.is_empty()
    }
}

/// 3D multi-octave sampler.
#[derive(Clone, Debug)]
pub struct OctaveSampler3d {
    octaves: Vec<Octave>,
    positions: Vec<(i32, i32, i32)>,
    noise: Perlin,
    amplitude: f64,
}

impl OctaveSampler3d {
    /// Creates a sampler whose local `(0, 0, 0)` sits at world `(origin.0, 0, origin.1)`.
    ///
    /// Draws three values per octave from `rng`, in octave order.
    pub fn new(rng: &mut impl Rng, octaves: &[Octave], origin: (i32, i32), noise_seed: u32) -> Self {
        let positions = octaves
            .iter()
            .map(|o| {
                (
                    jitter(rng, origin.0, o.offset_x),
                    jitter(rng, 0, o.offset_y),
                    jitter(rng, origin.1, o.offset_z),
                )
            })
            .collect();
        Self {
            amplitude: octaves.iter().map(|o| o.scale.abs()).sum(),
            octaves: octaves.to_vec(),
            positions,
            noise: Perlin::new(noise_seed),
        }
    }

    /// Sum of all octaves at local voxel `(x, y, z)`.
    pub fn sample(&self, x: i32, y: i32, z: i32) -> f64 {
        self.octaves
            .iter()
            .zip(&self.positions)
            .map(|(octave, &(px, py, pz))| {
                octave.sample_3d(&self.noise, x + px, y + py, z + pz)
            })
            .sum()
    }

    /// Upper bound on `|sample|`.
    pub fn max_amplitude(&self) -> f64 {
        self.amplitude
    }
}
