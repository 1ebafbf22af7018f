//! Block identifiers stored in every voxel cell.
//!
//! The set is closed: terrain stages and the mesher match on it exhaustively.
//! Air is discriminant 0 so that a zeroed grid is empty space.

use serde::{Deserialize, Serialize};

/// Compact identifier stored inside every voxel cell (1 byte).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockId {
    /// Empty space. Never meshed.
    #[default]
    Air = 0,
    /// Plains surface.
    Grass = 1,
    /// Soil layer under grass.
    Dirt = 2,
    /// Bulk rock.
    Stone = 3,
    /// Mountain caps above the snow line.
    Snow = 4,
}

impl BlockId {
    /// Every block in discriminant order.
    pub const ALL: [BlockId; 5] = [
        Self::Air,
        Self::Grass,
        Self::Dirt,
        Self::Stone,
        Self::Snow,
    ];

    /// Number of distinct block ids.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns `true` for the empty sentinel.
    #[inline]
    pub fn is_air(self) -> bool {
        self == Self::Air
    }

    /// Index of this block in [`BlockId::ALL`], used for parallel lookup tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`BlockId::index`]. Returns `None` for out-of-range values.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Lowercase name, matching the serialized form used in catalog files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Grass => "grass",
            Self::Dirt => "dirt",
            Self::Stone => "stone",
            Self::Snow => "snow",
        }
    }
}
