//! Chunk meshing: the voxel-to-triangle contract, a face-culling CPU mesher,
//! and the reducer that compacts worst-case buffers into a dense mesh.

pub mod buffers;
pub mod chunk_mesh;
pub mod face_direction;
pub mod mesher;
pub mod reducer;

pub use buffers::{RawMeshBuffers, Triangle};
pub use chunk_mesh::ChunkMesh;
pub use face_direction::FaceDirection;
pub use mesher::{CpuMesher, VoxelMesher};
pub use reducer::reduce_mesh;
