//! Seeded terrain generation: multi-octave noise, continentalness, biome
//! blending, cave carving, and the chunk job that runs them in order.

pub mod biome;
pub mod cave;
pub mod continentalness;
pub mod curve;
pub mod error;
pub mod height_map;
pub mod octaves;
pub mod pipeline;
pub mod seed;

pub use biome::{BiomeConfig, BiomeGenerator, BiomeNode, BlendMap, BlendParams, MountainParams, PlainsParams};
pub use cave::{BubbleCaveParams, CarveStats, CaveConfig, TunnelParams, carve_caves};
pub use continentalness::{ContinentalnessParams, generate_continentalness};
pub use curve::{CurveRange, ResponseCurve};
pub use error::{ConfigurationError, StageFault};
pub use height_map::HeightMap;
pub use octaves::{Octave, OctaveSampler, OctaveSampler3d};
pub use pipeline::{ChunkDims, ChunkJob, GeneratedChunk, StageKind, TerrainConfig, TerrainPipeline};
pub use seed::hash_grid;
