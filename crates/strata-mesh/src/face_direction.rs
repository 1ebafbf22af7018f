//! Face orientations used by the mesher and the reducer's per-face counts.

/// Axis-aligned direction a voxel face looks towards.
///
/// The discriminant is the face index into the block catalog's UV table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FaceDirection {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

impl FaceDirection {
    /// Catalog order.
    pub const ALL: [FaceDirection; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// Unit step from a voxel to the neighbour this face touches.
    pub fn delta(self) -> [i32; 3] {
        match self {
            Self::PosX => [1, 0, 0],
            Self::NegX => [-1, 0, 0],
            Self::PosY => [0, 1, 0],
            Self::NegY => [0, -1, 0],
            Self::PosZ => [0, 0, 1],
            Self::NegZ => [0, 0, -1],
        }
    }

    /// Grid position of the voxel across this face from `(x, y, z)`. May lie
    /// outside the chunk.
    pub fn neighbor(self, x: usize, y: usize, z: usize) -> (i32, i32, i32) {
        let [dx, dy, dz] = self.delta();
        (x as i32 + dx, y as i32 + dy, z as i32 + dz)
    }

    pub fn normal(self) -> [f32; 3] {
        self.delta().map(|d| d as f32)
    }

    /// `(layer, u, v)` axes: the normal axis and the two axes spanning the
    /// face, as 0=X, 1=Y, 2=Z. UVs are laid along `u` and `v`.
    pub fn sweep_axes(self) -> (usize, usize, usize) {
        match self {
            Self::PosX | Self::NegX => (0, 2, 1),
            Self::PosY | Self::NegY => (1, 0, 2),
            Self::PosZ | Self::NegZ => (2, 0, 1),
        }
    }

    /// Corners of this face on the unit cube, counter-clockwise when viewed
    /// from outside.
    pub fn corners(self) -> [[f32; 3]; 4] {
        match self {
            Self::PosX => [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
            Self::NegX => [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
            Self::PosY => [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
            Self::NegY => [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
            Self::PosZ => [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
            Self::NegZ => [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    #[test]
    fn test_index_matches_catalog_order() {
        for (i, dir) in FaceDirection::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }

    #[test]
    fn test_neighbor_steps_one_voxel() {
        assert_eq!(FaceDirection::PosY.neighbor(5, 10, 15), (5, 11, 15));
        assert_eq!(FaceDirection::NegZ.neighbor(5, 10, 15), (5, 10, 14));
    }

    #[test]
    fn test_neighbor_can_leave_the_chunk() {
        assert_eq!(FaceDirection::NegX.neighbor(0, 0, 0), (-1, 0, 0));
    }

    #[test]
    fn test_normal_is_unit_and_along_layer_axis() {
        for dir in FaceDirection::ALL {
            let n = dir.normal();
            let (layer, u, v) = dir.sweep_axes();
            assert_eq!(n[layer].abs(), 1.0, "{dir:?}");
            assert_eq!(n[u], 0.0);
            assert_eq!(n[v], 0.0);
        }
    }

    #[test]
    fn test_corners_wind_counter_clockwise_around_normal() {
        for dir in FaceDirection::ALL {
            let c = dir.corners();
            let n = cross(sub(c[1], c[0]), sub(c[2], c[0]));
            assert_eq!(n, dir.normal(), "Winding of {dir:?}");
        }
    }

    #[test]
    fn test_corners_lie_on_face_plane() {
        for dir in FaceDirection::ALL {
            let (layer, _, _) = dir.sweep_axes();
            let expected = if dir.normal()[layer] > 0.0 { 1.0 } else { 0.0 };
            for corner in dir.corners() {
                assert_eq!(corner[layer], expected, "{dir:?}");
            }
        }
    }
}
