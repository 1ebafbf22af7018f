//! Dense indexed mesh produced by the reducer.

use crate::buffers::{TRIANGLES_PER_QUAD, VERTICES_PER_QUAD};
use crate::face_direction::FaceDirection;

/// Compact, render-ready mesh for one chunk.
///
/// Vertex attributes are parallel arrays; `indices` holds three entries per
/// triangle and six per quad.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl ChunkMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the total number of quads in the mesh.
    pub fn quad_count(&self) -> usize {
        self.indices.len() / (TRIANGLES_PER_QUAD * 3)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// `true` if the index and vertex counts agree with whole quads and every
    /// index points at a vertex.
    pub fn is_well_formed(&self) -> bool {
        let quads = self.quad_count();
        self.indices.len() % (TRIANGLES_PER_QUAD * 3) == 0
            && self.vertices.len() == quads * VERTICES_PER_QUAD
            && self.normals.len() == self.vertices.len()
            && self.uvs.len() == self.vertices.len()
            && self
                .indices
                .iter()
                .all(|&i| (i as usize) < self.vertices.len())
    }

    /// Counts the number of quads emitted for a specific face direction.
    pub fn count_quads_for_direction(&self, direction: FaceDirection) -> usize {
        let normal = direction.normal();
        self.normals
            .iter()
            .step_by(VERTICES_PER_QUAD)
            .filter(|n| **n == normal)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mesh() {
        let mesh = ChunkMesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.quad_count(), 0);
        assert!(mesh.is_well_formed());
    }

    #[test]
    fn test_partial_quad_is_malformed() {
        let mesh = ChunkMesh {
            vertices: vec![[0.0; 3]; 4],
            normals: vec![[0.0; 3]; 4],
            uvs: vec![[0.0; 2]; 4],
            indices: vec![0, 1, 2],
        };
        assert!(!mesh.is_well_formed());
    }

    #[test]
    fn test_out_of_range_index_is_malformed() {
        let mesh = ChunkMesh {
            vertices: vec![[0.0; 3]; 4],
            normals: vec![[0.0; 3]; 4],
            uvs: vec![[0.0; 2]; 4],
            indices: vec![0, 1, 2, 0, 2, 4],
        };
        assert!(!mesh.is_well_formed());
    }
}
