//! Terrain pipeline error types.

use strata_voxel::ChunkCoord;

use crate::pipeline::StageKind;

/// Problems in the terrain configuration. Detected when the pipeline is
/// built; no chunk is ever generated from an invalid configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// Chunk dimensions are zero.
    #[error("invalid chunk dimensions {size}x{height}")]
    InvalidDimensions {
        /// Horizontal chunk size.
        size: usize,
        /// Vertical chunk size.
        height: usize,
    },

    /// A blend node has no children.
    #[error("biome blend at {path} has no nodes")]
    EmptyBiomeList {
        /// Location of the blend inside the biome tree.
        path: String,
    },

    /// A blend node has a non-finite threshold or a negative smoothing width.
    #[error("invalid biome node at {path}: {reason}")]
    InvalidBiomeNode {
        /// Location of the node inside the biome tree.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// An octave has a non-finite field or a non-positive frequency.
    #[error("malformed octave {index} in {context}: {reason}")]
    MalformedOctave {
        /// Which octave list the octave belongs to.
        context: String,
        /// Position of the octave within its list.
        index: usize,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A stage is listed twice or before a stage it depends on.
    #[error("stage {stage} is out of order: {reason}")]
    StageOrder {
        /// The offending stage.
        stage: StageKind,
        /// What ordering rule it breaks.
        reason: &'static str,
    },

    /// A stage required by the configuration is not in the stage list.
    #[error("required stage {0} is missing")]
    MissingStage(StageKind),

    /// Cave parameters would divide by zero or produce inverted ranges.
    #[error("invalid cave parameters in {context}: {reason}")]
    InvalidCaveParams {
        /// Which carver the parameters belong to.
        context: String,
        /// What is wrong with them.
        reason: &'static str,
    },
}

/// A stage failed while generating one chunk. Only that chunk's job is
/// aborted; the coordinate may be retried later.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("stage {stage} failed for chunk {coord}: {reason}")]
pub struct StageFault {
    /// The stage that failed.
    pub stage: StageKind,
    /// The chunk being generated.
    pub coord: ChunkCoord,
    /// Human-readable cause.
    pub reason: String,
}
