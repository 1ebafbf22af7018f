//! Serializable biome tree configuration.

use serde::{Deserialize, Serialize};

use crate::curve::{CurveRange, ResponseCurve};
use crate::error::ConfigurationError;
use crate::octaves::{Octave, validate_octaves};

/// One biome generator in the tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BiomeConfig {
    /// Rolling grassland over dirt and stone.
    Plains(PlainsParams),
    /// Stone peaks driven by the blend value, with optional snow and overhangs.
    Mountain(MountainParams),
    /// Blends an ordered list of child biomes by a scalar map.
    Blend(BlendParams),
}

impl Default for BiomeConfig {
    fn default() -> Self {
        Self::Blend(BlendParams::default())
    }
}

/// A child of a blend, active from `threshold` upward.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeNode {
    pub biome: BiomeConfig,
    /// Blend-map value at the centre of the transition into this node.
    pub threshold: f64,
    /// Width of the transition band. Zero gives a hard step.
    #[serde(default)]
    pub smoothing: f64,
}

impl BiomeNode {
    pub fn new(biome: BiomeConfig, threshold: f64, smoothing: f64) -> Self {
        Self {
            biome,
            threshold,
            smoothing,
        }
    }

    /// Lower edge of the transition band.
    #[inline]
    pub fn band_start(&self) -> f64 {
        self.threshold - self.smoothing / 2.0
    }
}

/// Scalar map a blend selects its children by.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum BlendMap {
    /// The chunk's continentalness map.
    #[default]
    Continentalness,
    /// A private octave field.
    Octaves(Vec<Octave>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendParams {
    pub blend_map: BlendMap,
    /// Frequency of the noise that roughens transition bands.
    pub smoothing_frequency: f64,
    /// How far band noise may pull the blend weight. `0` gives a pure
    /// curve-shaped transition.
    pub smoothing_scale: f64,
    pub curve: ResponseCurve,
    /// Children in ascending threshold order. The first is the base biome.
    pub nodes: Vec<BiomeNode>,
}

impl Default for BlendParams {
    fn default() -> Self {
        Self {
            blend_map: BlendMap::Continentalness,
            smoothing_frequency: 0.05,
            smoothing_scale: 0.3,
            curve: ResponseCurve::SmoothStep,
            nodes: vec![
                BiomeNode::new(BiomeConfig::Plains(PlainsParams::default()), 0.0, 0.0),
                BiomeNode::new(BiomeConfig::Mountain(MountainParams::default()), 0.55, 0.1),
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlainsParams {
    pub base_height: f64,
    /// Dirt layers between the grass surface and stone. Default: 3.
    pub dirt_depth: usize,
    pub octaves: Vec<Octave>,
}

impl Default for PlainsParams {
    fn default() -> Self {
        Self {
            base_height: 40.0,
            dirt_depth: 3,
            octaves: vec![
                Octave {
                    scale: 6.0,
                    frequency: 0.02,
                    ..Default::default()
                },
                Octave {
                    scale: 2.0,
                    frequency: 0.08,
                    ..Default::default()
                },
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountainParams {
    pub base_height: f64,
    /// Height added across the node's share of the blend map.
    pub height_band: CurveRange,
    /// Detail noise added on top of the band.
    pub octaves: Vec<Octave>,
    /// Surface cells at or above this height become Snow.
    pub snow_line: Option<i32>,
    pub overhang: Option<OverhangParams>,
}

impl Default for MountainParams {
    fn default() -> Self {
        Self {
            base_height: 40.0,
            height_band: CurveRange::new(ResponseCurve::Quadratic, 0.0, 48.0),
            octaves: vec![Octave {
                scale: 4.0,
                frequency: 0.05,
                ..Default::default()
            }],
            snow_line: Some(80),
            overhang: None,
        }
    }
}

/// 3D density carving for mountain faces.
///
/// `density = noise + (height - y) * rate`, where `rate` is `falloff_below`
/// under the surface and `falloff_above` over it. A cell is solid iff
/// `density > threshold`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverhangParams {
    pub octaves: Vec<Octave>,
    pub threshold: f64,
    pub falloff_below: f64,
    pub falloff_above: f64,
}

impl Default for OverhangParams {
    fn default() -> Self {
        Self {
            octaves: vec![Octave {
                scale: 1.0,
                frequency: 0.08,
                ..Default::default()
            }],
            threshold: 0.0,
            falloff_below: 0.15,
            falloff_above: 0.25,
        }
    }
}

impl BiomeConfig {
    /// Checks the whole subtree rooted here. `path` names this node in errors.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, depth first.
    pub fn validate(&self, path: &str) -> Result<(), ConfigurationError> {
        let invalid = |reason| ConfigurationError::InvalidBiomeNode {
            path: path.to_string(),
            reason,
        };
        match self {
            Self::Plains(p) => {
                if !p.base_height.is_finite() {
                    return Err(invalid("plains base height is not finite"));
                }
                validate_octaves(&p.octaves, path)
            }
            Self::Mountain(m) => {
                if !m.base_height.is_finite() || !m.height_band.is_finite() {
                    return Err(invalid("mountain height parameters are not finite"));
                }
                validate_octaves(&m.octaves, path)?;
                if let Some(overhang) = &m.overhang {
                    let rates = [overhang.threshold, overhang.falloff_below, overhang.falloff_above];
                    if rates.iter().any(|v| !v.is_finite()) {
                        return Err(invalid("overhang parameters are not finite"));
                    }
                    validate_octaves(&overhang.octaves, &format!("{path}/overhang"))?;
                }
                Ok(())
            }
            Self::Blend(b) => {
                if b.nodes.is_empty() {
                    return Err(ConfigurationError::EmptyBiomeList {
                        path: path.to_string(),
                    });
                }
                if !b.smoothing_frequency.is_finite() || !b.smoothing_scale.is_finite() {
                    return Err(invalid("blend smoothing is not finite"));
                }
                if let BlendMap::Octaves(octaves) = &b.blend_map {
                    validate_octaves(octaves, &format!("{path}/map"))?;
                }
                for (i, node) in b.nodes.iter().enumerate() {
                    let child = format!("{path}/{i}");
                    if !node.threshold.is_finite() || !node.smoothing.is_finite() {
                        return Err(ConfigurationError::InvalidBiomeNode {
                            path: child,
                            reason: "threshold and smoothing must be finite",
                        });
                    }
                    if node.smoothing < 0.0 {
                        return Err(ConfigurationError::InvalidBiomeNode {
                            path: child,
                            reason: "smoothing must not be negative",
                        });
                    }
                    node.biome.validate(&child)?;
                }
                Ok(())
            }
        }
    }

    /// Paths of every blend whose node thresholds are not ascending.
    pub fn unordered_blends(&self, path: &str) -> Vec<String> {
        let mut found = Vec::new();
        self.collect_unordered(path, &mut found);
        found
    }

    fn collect_unordered(&self, path: &str, found: &mut Vec<String>) {
        if let Self::Blend(b) = self {
            if b.nodes.windows(2).any(|w| w[1].threshold < w[0].threshold) {
                found.push(path.to_string());
            }
            for (i, node) in b.nodes.iter().enumerate() {
                node.biome.collect_unordered(&format!("{path}/{i}"), found);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plains() -> BiomeConfig {
        BiomeConfig::Plains(PlainsParams::default())
    }

    #[test]
    fn test_default_tree_is_valid() {
        assert!(BiomeConfig::default().validate("root").is_ok());
        assert!(BiomeConfig::default().unordered_blends("root").is_empty());
    }

    #[test]
    fn test_empty_nested_blend_reports_path() {
        let inner = BiomeConfig::Blend(BlendParams {
            nodes: Vec::new(),
            ..Default::default()
        });
        let outer = BiomeConfig::Blend(BlendParams {
            nodes: vec![
                BiomeNode::new(plains(), 0.0, 0.0),
                BiomeNode::new(inner, 0.5, 0.1),
            ],
            ..Default::default()
        });
        assert_eq!(
            outer.validate("root"),
            Err(ConfigurationError::EmptyBiomeList {
                path: "root/1".to_string()
            })
        );
    }

    #[test]
    fn test_negative_smoothing_rejected() {
        let blend = BiomeConfig::Blend(BlendParams {
            nodes: vec![BiomeNode::new(plains(), 0.2, -0.1)],
            ..Default::default()
        });
        assert!(matches!(
            blend.validate("root"),
            Err(ConfigurationError::InvalidBiomeNode { .. })
        ));
    }

    #[test]
    fn test_unordered_thresholds_detected_but_valid() {
        let blend = BiomeConfig::Blend(BlendParams {
            nodes: vec![
                BiomeNode::new(plains(), 0.6, 0.0),
                BiomeNode::new(plains(), 0.3, 0.0),
            ],
            ..Default::default()
        });
        assert!(blend.validate("root").is_ok());
        assert_eq!(blend.unordered_blends("root"), vec!["root".to_string()]);
    }

    #[test]
    fn test_band_start() {
        let node = BiomeNode::new(plains(), 0.5, 0.2);
        assert!((node.band_start() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_ron_round_trip_of_default_tree() {
        let config = BiomeConfig::default();
        let text = ron::to_string(&config).unwrap();
        let parsed: BiomeConfig = ron::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
