//! Error types for the enrichment pipeline.

use thiserror::Error;

/// Result type for enrichment operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal precondition failures. Degraded per-frame conditions never surface
/// here; they are counted in [`crate::Diagnostics`] instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("frame sequence is empty")]
    EmptyFrames,

    #[error("ball was not detected in any frame")]
    NoBallDetections,

    #[error(
        "team initialization needs at least two distinct player colors in the first frame, \
         found {found}"
    )]
    InsufficientPlayers { found: usize },

    #[error("track dataset covers {tracks} frames but {frames} frames were supplied")]
    FrameCountMismatch { frames: usize, tracks: usize },

    #[error("frame {frame} holds {count} ball tracks, at most one is allowed")]
    MultipleBalls { frame: usize, count: usize },

    #[error("camera movement sequence has {movements} entries for {frames} frames")]
    MovementCountMismatch { frames: usize, movements: usize },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
