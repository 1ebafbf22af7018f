//! Deterministic seeded generation utilities.
//!
//! Every random stream in the pipeline is derived from the world seed and a
//! stage label, so results never depend on which thread ran a job or in which
//! order chunks were generated.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use strata_voxel::VoxelGrid;

// ---------------------------------------------------------------------------
// Seed derivation
// ---------------------------------------------------------------------------

/// Derive a u64 seed for one pipeline stage from the world seed.
///
/// Uses SipHash (via std's `DefaultHasher`) to combine the world seed with
/// the stage label into a well-distributed u64. The chunk coordinate is
/// deliberately not mixed in: streams that place noise fields must agree
/// between neighbouring chunks or the fields would tear at chunk borders.
pub fn derive_stage_seed(world_seed: u64, stage: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    stage.hash(&mut hasher);
    hasher.finish()
}

/// Derive a deterministic RNG for a pipeline stage.
///
/// The returned RNG produces an identical sequence for the same
/// `(world_seed, stage)` pair, regardless of thread or platform.
pub fn stage_rng(world_seed: u64, stage: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_stage_seed(world_seed, stage))
}

/// Derive the 32-bit permutation seed for a stage's noise function.
pub fn noise_seed(world_seed: u64, stage: &str) -> u32 {
    let seed = derive_stage_seed(world_seed, stage);
    (seed ^ (seed >> 32)) as u32
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Hash the contents of a `VoxelGrid` for determinism comparison.
pub fn hash_grid(grid: &VoxelGrid) -> u64 {
    let mut hasher = DefaultHasher::new();
    grid.size().hash(&mut hasher);
    grid.height().hash(&mut hasher);
    for block in grid.as_slice() {
        (*block as u8).hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;
    use strata_voxel::BlockId;

    #[test]
    fn test_derive_stage_seed_deterministic() {
        let seed_a = derive_stage_seed(999, "continentalness");
        let seed_b = derive_stage_seed(999, "continentalness");
        assert_eq!(seed_a, seed_b, "Same inputs must produce same derived seed");
    }

    #[test]
    fn test_derive_stage_seed_different_stages() {
        let seed_a = derive_stage_seed(42, "cave/bubble/0");
        let seed_b = derive_stage_seed(42, "cave/bubble/1");
        assert_ne!(
            seed_a, seed_b,
            "Different stage labels should produce different seeds"
        );
    }

    #[test]
    fn test_derive_stage_seed_different_world_seeds() {
        let seed_a = derive_stage_seed(0, "biome/0");
        let seed_b = derive_stage_seed(1, "biome/0");
        assert_ne!(
            seed_a, seed_b,
            "Different world seeds should produce different stage seeds"
        );
    }

    #[test]
    fn test_chacha8_rng_deterministic() {
        let mut rng_a = stage_rng(42, "continentalness");
        let mut rng_b = stage_rng(42, "continentalness");

        for _ in 0..1000 {
            assert_eq!(
                rng_a.next_u64(),
                rng_b.next_u64(),
                "ChaCha8Rng sequences must match for same seed"
            );
        }
    }

    #[test]
    fn test_rng_identical_across_threads() {
        let handle = std::thread::spawn(|| stage_rng(7, "biome/1").next_u64());
        let local = stage_rng(7, "biome/1").next_u64();
        assert_eq!(handle.join().unwrap(), local);
    }

    #[test]
    fn test_hash_grid_detects_single_voxel_change() {
        let mut grid = VoxelGrid::filled(4, 4, BlockId::Stone);
        let before = hash_grid(&grid);
        assert_eq!(before, hash_grid(&grid.clone()));

        grid.set(3, 3, 3, BlockId::Air);
        assert_ne!(before, hash_grid(&grid));
    }
}
