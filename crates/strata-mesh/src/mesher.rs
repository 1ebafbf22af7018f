//! The voxel-to-triangle contract and its CPU reference implementation.

use strata_voxel::{BlockCatalog, VoxelGrid};

use crate::buffers::RawMeshBuffers;
use crate::chunk_mesh::ChunkMesh;
use crate::face_direction::FaceDirection;
use crate::reducer::reduce_mesh;

/// Turns a voxel grid into raw triangle buffers.
///
/// Implementations must return buffers sized by
/// [`RawMeshBuffers::worst_case`] for the grid's volume, emit exactly four
/// vertices and two triangles per visible face, and leave every unused
/// triangle slot zeroed.
pub trait VoxelMesher: Send + Sync {
    fn mesh(&self, grid: &VoxelGrid, catalog: &BlockCatalog) -> RawMeshBuffers;

    /// Meshes `grid` and compacts the result.
    fn mesh_reduced(&self, grid: &VoxelGrid, catalog: &BlockCatalog) -> ChunkMesh {
        reduce_mesh(self.mesh(grid, catalog))
    }
}

/// Face-culling mesher: one quad per voxel face whose neighbour is Air or
/// outside the chunk.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuMesher;

impl VoxelMesher for CpuMesher {
    fn mesh(&self, grid: &VoxelGrid, catalog: &BlockCatalog) -> RawMeshBuffers {
        let mut buffers = RawMeshBuffers::worst_case(grid.volume());
        let mut quad = 0;

        for x in 0..grid.size() {
            for y in 0..grid.height() {
                for z in 0..grid.size() {
                    let block = grid.get(x, y, z);
                    if block.is_air() {
                        continue;
                    }
                    for face in FaceDirection::ALL {
                        let (nx, ny, nz) = face.neighbor(x, y, z);
                        if grid.try_get(nx, ny, nz).is_some_and(|n| !n.is_air()) {
                            continue;
                        }
                        let (uv_min, uv_max) = catalog.face_rect(block, face.index());
                        buffers.write_quad(
                            quad,
                            face,
                            [x as f32, y as f32, z as f32],
                            uv_min,
                            uv_max,
                        );
                        quad += 1;
                    }
                }
            }
        }

        tracing::trace!(quads = quad, "Meshed chunk");
        buffers
    }
}
