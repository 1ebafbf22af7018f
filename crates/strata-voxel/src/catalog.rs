//! Block catalog: per-block, per-face texture-atlas rectangles.
//!
//! The catalog is built once at startup and shared read-only with every mesher
//! invocation. Entries are stored in a dense array indexed in parallel with
//! [`BlockId`] discriminants, so lookup is a single index.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::block::BlockId;

/// Optional per-face UV origins. `None` falls back to the entry's default.
///
/// Faces are addressed by index in the order `+X, -X, +Y, -Y, +Z, -Z`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceUvs {
    /// +X face.
    pub right: Option<[f32; 2]>,
    /// -X face.
    pub left: Option<[f32; 2]>,
    /// +Y face.
    pub top: Option<[f32; 2]>,
    /// -Y face.
    pub bottom: Option<[f32; 2]>,
    /// +Z face.
    pub forward: Option<[f32; 2]>,
    /// -Z face.
    pub backward: Option<[f32; 2]>,
}

impl FaceUvs {
    /// Returns the override for face `index` (`0..6`, order `+X, -X, +Y, -Y, +Z, -Z`).
    pub fn get(&self, index: usize) -> Option<[f32; 2]> {
        match index {
            0 => self.right,
            1 => self.left,
            2 => self.top,
            3 => self.bottom,
            4 => self.forward,
            5 => self.backward,
            _ => None,
        }
    }
}

/// Catalog entry for one block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockUv {
    /// The block this entry describes.
    pub block: BlockId,
    /// Atlas origin used for any face without an override.
    pub default_uv: [f32; 2],
    /// Per-face overrides.
    #[serde(default)]
    pub faces: FaceUvs,
}

/// Errors raised while building a [`BlockCatalog`].
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// Two entries describe the same block.
    #[error("duplicate catalog entry for block {0:?}")]
    Duplicate(BlockId),
    /// A block that terrain can produce has no entry.
    #[error("catalog has no entry for block {0:?}")]
    Missing(BlockId),
    /// Air cannot be textured.
    #[error("air must not have a catalog entry")]
    AirEntry,
}

/// Read-only UV lookup table consumed by the mesher.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockCatalog {
    tile_size: [f32; 2],
    entries: [Option<BlockUv>; BlockId::COUNT],
}

impl BlockCatalog {
    /// Builds a catalog from an unordered entry list.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Duplicate`] if a block appears twice and
    /// [`CatalogError::AirEntry`] if Air is listed.
    pub fn new(tile_size: [f32; 2], list: Vec<BlockUv>) -> Result<Self, CatalogError> {
        let mut entries: [Option<BlockUv>; BlockId::COUNT] = Default::default();
        for entry in list {
            if entry.block.is_air() {
                return Err(CatalogError::AirEntry);
            }
            let slot = &mut entries[entry.block.index()];
            if slot.is_some() {
                return Err(CatalogError::Duplicate(entry.block));
            }
            *slot = Some(entry);
        }
        Ok(Self { tile_size, entries })
    }

    /// A catalog laying every solid block out on one row of a 4×4 atlas.
    pub fn default_atlas() -> Self {
        let tile = 0.25;
        let entries = BlockId::ALL
            .iter()
            .filter(|b| !b.is_air())
            .enumerate()
            .map(|(column, &block)| BlockUv {
                block,
                default_uv: [column as f32 * tile, 0.0],
                faces: FaceUvs::default(),
            });
        let mut catalog = Self {
            tile_size: [tile, tile],
            entries: Default::default(),
        };
        for entry in entries {
            let index = entry.block.index();
            catalog.entries[index] = Some(entry);
        }
        // Grass bottom shows the dirt tile, its sides the second atlas row.
        if let Some(grass) = catalog.entries[BlockId::Grass.index()].as_mut() {
            let dirt = [tile, 0.0];
            grass.faces = FaceUvs {
                top: None,
                bottom: Some(dirt),
                right: Some([0.0, tile]),
                left: Some([0.0, tile]),
                forward: Some([0.0, tile]),
                backward: Some([0.0, tile]),
            };
        }
        catalog
    }

    /// Checks that every block in `blocks` (other than Air) has an entry.
    ///
    /// # Errors
    ///
    /// Returns the first block without an entry.
    pub fn require(&self, blocks: &[BlockId]) -> Result<(), CatalogError> {
        blocks
            .iter()
            .filter(|b| !b.is_air())
            .find(|b| self.entries[b.index()].is_none())
            .map_or(Ok(()), |&b| Err(CatalogError::Missing(b)))
    }

    /// Atlas extent of one tile.
    pub fn tile_size(&self) -> [f32; 2] {
        self.tile_size
    }

    /// Returns the entry for `block`, if any.
    pub fn get(&self, block: BlockId) -> Option<&BlockUv> {
        self.entries[block.index()].as_ref()
    }

    /// UV rectangle `(min, max)` for `block` on face `face` (`0..6`).
    ///
    /// Blocks without an entry map to the zero tile.
    pub fn face_rect(&self, block: BlockId, face: usize) -> ([f32; 2], [f32; 2]) {
        let origin = self
            .get(block)
            .map(|e| e.faces.get(face).unwrap_or(e.default_uv))
            .unwrap_or([0.0, 0.0]);
        let max = [origin[0] + self.tile_size[0], origin[1] + self.tile_size[1]];
        (origin, max)
    }
}
