//! Cave carving: bubble caverns and long tunnels.
//!
//! Every carver draws from its own seeded stream (`cave/bubble/<i>`,
//! `cave/tunnel/<i>`), so adding, removing or reordering one layer never
//! shifts another. Carvers only ever write Air, which makes the stage
//! idempotent.

mod bubble;
mod tunnel;

use serde::{Deserialize, Serialize};
use strata_voxel::{ChunkCoord, VoxelGrid};

pub use bubble::{BubbleCarver, BubbleCaveParams};
pub use tunnel::{TunnelCarver, TunnelMask, TunnelParams};

use crate::error::ConfigurationError;

/// All cave layers applied to each chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveConfig {
    pub bubbles: Vec<BubbleCaveParams>,
    pub tunnels: Vec<TunnelParams>,
}

impl Default for CaveConfig {
    fn default() -> Self {
        Self {
            bubbles: vec![BubbleCaveParams::default()],
            tunnels: vec![TunnelParams::default()],
        }
    }
}

impl CaveConfig {
    /// A configuration with no cave layers.
    pub fn none() -> Self {
        Self {
            bubbles: Vec::new(),
            tunnels: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty() && self.tunnels.is_empty()
    }

    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidCaveParams`] or
    /// [`ConfigurationError::MalformedOctave`] for the first bad layer.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (i, bubble) in self.bubbles.iter().enumerate() {
            bubble.validate(&bubble_label(i))?;
        }
        for (i, tunnel) in self.tunnels.iter().enumerate() {
            tunnel.validate(&tunnel_label(i))?;
        }
        Ok(())
    }
}

fn bubble_label(index: usize) -> String {
    format!("cave/bubble/{index}")
}

fn tunnel_label(index: usize) -> String {
    format!("cave/tunnel/{index}")
}

/// Cells cleared by one carving pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CarveStats {
    pub bubble_cells: usize,
    pub tunnel_cells: usize,
}

impl CarveStats {
    pub fn total(&self) -> usize {
        self.bubble_cells + self.tunnel_cells
    }
}

/// Applies every cave layer in `config` to `grid`.
pub fn carve_caves(
    seed: u64,
    coord: ChunkCoord,
    grid: &mut VoxelGrid,
    config: &CaveConfig,
) -> CarveStats {
    let size = grid.size();
    let mut stats = CarveStats::default();

    for (i, params) in config.bubbles.iter().enumerate() {
        stats.bubble_cells += BubbleCarver::new(params, seed, &bubble_label(i), coord, size).carve(grid);
    }
    for (i, params) in config.tunnels.iter().enumerate() {
        stats.tunnel_cells += TunnelCarver::new(params, seed, &tunnel_label(i), coord, size).carve(grid);
    }

    tracing::trace!(%coord, bubble = stats.bubble_cells, tunnel = stats.tunnel_cells, "Carved caves");
    stats
}
