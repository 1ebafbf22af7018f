//! Compacts worst-case mesher output into a dense [`ChunkMesh`].

use crate::buffers::{RawMeshBuffers, TRIANGLES_PER_QUAD, Triangle, VERTICES_PER_QUAD};
use crate::chunk_mesh::ChunkMesh;

/// Reads triangles up to the first sentinel and drops every unused vertex
/// slot. Index order is preserved.
///
/// The vertex arrays are cut to `indices.len() / 6 * 4`, which relies on the
/// mesher emitting exactly four vertices and two triangles per quad.
pub fn reduce_mesh(raw: RawMeshBuffers) -> ChunkMesh {
    let RawMeshBuffers {
        mut positions,
        mut normals,
        mut uvs,
        triangles,
    } = raw;

    let used = triangles
        .iter()
        .position(Triangle::is_sentinel)
        .unwrap_or(triangles.len());
    let indices: Vec<u32> = bytemuck::cast_slice(&triangles[..used]).to_vec();

    let vertex_count = indices.len() / (TRIANGLES_PER_QUAD * 3) * VERTICES_PER_QUAD;
    for buffer in [&mut positions, &mut normals] {
        buffer.truncate(vertex_count);
        buffer.shrink_to_fit();
    }
    uvs.truncate(vertex_count);
    uvs.shrink_to_fit();

    tracing::trace!(triangles = used, vertices = vertex_count, "Reduced mesh");
    ChunkMesh {
        vertices: positions,
        normals,
        uvs,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face_direction::FaceDirection;

    #[test]
    fn test_reduce_empty_buffers() {
        let mesh = reduce_mesh(RawMeshBuffers::worst_case(8));
        assert!(mesh.is_empty());
        assert!(mesh.vertices.is_empty());
        assert!(mesh.is_well_formed());
    }

    #[test]
    fn test_reduce_stops_at_sentinel() {
        let mut raw = RawMeshBuffers::worst_case(2);
        raw.write_quad(0, FaceDirection::PosX, [0.0; 3], [0.0; 2], [1.0; 2]);
        raw.write_quad(1, FaceDirection::NegZ, [1.0, 0.0, 0.0], [0.0; 2], [1.0; 2]);

        let mesh = reduce_mesh(raw);
        assert_eq!(mesh.indices.len(), 12);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.normals.len(), 8);
        assert_eq!(mesh.uvs.len(), 8);
        assert!(mesh.is_well_formed());
    }

    #[test]
    fn test_reduce_preserves_index_order() {
        let mut raw = RawMeshBuffers::worst_case(1);
        raw.write_quad(0, FaceDirection::PosY, [0.0; 3], [0.0; 2], [1.0; 2]);
        raw.write_quad(1, FaceDirection::NegY, [0.0; 3], [0.0; 2], [1.0; 2]);

        let mesh = reduce_mesh(raw);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_reduce_full_buffer_without_sentinel() {
        let mut raw = RawMeshBuffers::worst_case(1);
        for (quad, face) in FaceDirection::ALL.into_iter().enumerate() {
            raw.write_quad(quad, face, [0.0; 3], [0.0; 2], [1.0; 2]);
        }
        let mesh = reduce_mesh(raw);
        assert_eq!(mesh.quad_count(), 6);
        assert_eq!(mesh.vertices.len(), 24);
        assert!(mesh.is_well_formed());
    }
}
