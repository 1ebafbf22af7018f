//! Voxel primitives: block ids, dense chunk grids, chunk coordinates, and the block UV catalog.

pub mod block;
pub mod catalog;
pub mod coord;
pub mod grid;

pub use block::BlockId;
pub use catalog::{BlockCatalog, BlockUv, CatalogError, FaceUvs};
pub use coord::ChunkCoord;
pub use grid::VoxelGrid;
