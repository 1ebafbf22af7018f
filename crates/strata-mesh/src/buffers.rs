//! Worst-case-sized output buffers shared by every mesher implementation.
//!
//! A mesher cannot know how many faces it will emit until it has visited
//! every voxel, so it writes into buffers large enough for every face of
//! every voxel. Unused triangle slots stay zeroed; the first all-zero
//! [`Triangle`] marks the end of the data.

use crate::face_direction::FaceDirection;

/// Faces per voxel.
pub const FACES_PER_VOXEL: usize = 6;
/// Vertices emitted per quad.
pub const VERTICES_PER_QUAD: usize = 4;
/// Triangles emitted per quad.
pub const TRIANGLES_PER_QUAD: usize = 2;

/// Three vertex indices. The all-zero triangle is the end-of-data sentinel;
/// a real triangle never repeats an index, so it cannot be all zero.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Triangle(pub [u32; 3]);

static_assertions::assert_eq_size!(Triangle, [u32; 3]);

impl Triangle {
    pub const SENTINEL: Triangle = Triangle([0, 0, 0]);

    #[inline]
    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }
}

/// Raw mesher output: parallel vertex attribute arrays plus a
/// sentinel-terminated triangle buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawMeshBuffers {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub triangles: Vec<Triangle>,
}

impl RawMeshBuffers {
    /// Vertex slots needed to mesh `voxels` voxels in the worst case.
    pub fn worst_case_vertices(voxels: usize) -> usize {
        voxels * FACES_PER_VOXEL * VERTICES_PER_QUAD
    }

    /// Triangle slots needed to mesh `voxels` voxels in the worst case.
    pub fn worst_case_triangles(voxels: usize) -> usize {
        voxels * FACES_PER_VOXEL * TRIANGLES_PER_QUAD
    }

    /// Zero-filled buffers large enough for every face of `voxels` voxels.
    pub fn worst_case(voxels: usize) -> Self {
        let vertices = Self::worst_case_vertices(voxels);
        Self {
            positions: vec![[0.0; 3]; vertices],
            normals: vec![[0.0; 3]; vertices],
            uvs: vec![[0.0; 2]; vertices],
            triangles: vec![Triangle::SENTINEL; Self::worst_case_triangles(voxels)],
        }
    }

    /// Number of quads the buffers can hold.
    pub fn quad_capacity(&self) -> usize {
        self.triangles.len() / TRIANGLES_PER_QUAD
    }

    /// Writes one unit face of the voxel at `origin` into quad slot `quad`.
    ///
    /// `uv_min`/`uv_max` span the face's texture rectangle; the rectangle is
    /// laid onto the face's `(u, v)` axes.
    ///
    /// # Panics
    ///
    /// Panics if `quad >= self.quad_capacity()`.
    pub fn write_quad(
        &mut self,
        quad: usize,
        face: FaceDirection,
        origin: [f32; 3],
        uv_min: [f32; 2],
        uv_max: [f32; 2],
    ) {
        let (_, u_axis, v_axis) = face.sweep_axes();
        let normal = face.normal();
        let base = quad * VERTICES_PER_QUAD;

        for (i, corner) in face.corners().iter().enumerate() {
            self.positions[base + i] = [
                origin[0] + corner[0],
                origin[1] + corner[1],
                origin[2] + corner[2],
            ];
            self.normals[base + i] = normal;
            self.uvs[base + i] = [
                uv_min[0] + (uv_max[0] - uv_min[0]) * corner[u_axis],
                uv_min[1] + (uv_max[1] - uv_min[1]) * corner[v_axis],
            ];
        }

        let b = base as u32;
        let t = quad * TRIANGLES_PER_QUAD;
        self.triangles[t] = Triangle([b, b + 1, b + 2]);
        self.triangles[t + 1] = Triangle([b, b + 2, b + 3]);
    }
}
