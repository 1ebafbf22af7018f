//! Biome tree: configuration, per-chunk generators, and height blending.
//!
//! A [`BiomeConfig`] is either a leaf biome or a blend over an ordered list of
//! child nodes, which may themselves be blends. [`BiomeGenerator::build`]
//! binds the tree to one chunk; columns are then resolved to a height and the
//! leaf whose block rules fill them.

mod blend;
mod config;
mod generator;
mod mountain;
mod plains;

pub use blend::BlendGenerator;
pub use config::{
    BiomeConfig, BiomeNode, BlendMap, BlendParams, MountainParams, OverhangParams, PlainsParams,
};
pub use generator::{BiomeGenerator, BuildContext, ColumnSample};
pub use mountain::MountainGenerator;
pub use plains::PlainsGenerator;
