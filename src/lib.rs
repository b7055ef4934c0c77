//! Enrichment of per-frame football tracks.
//!
//! Raw player, referee and ball boxes coming from an external detector and
//! tracker are enriched with camera-stabilized positions, a team label per
//! player and the ball possession state of every frame.
//!
//! ```ignore
//! use pitch_tracks::{EnrichmentPipeline, PipelineConfig};
//!
//! let pipeline = EnrichmentPipeline::new(PipelineConfig::default());
//! let enrichment = pipeline.run(&frames, tracks)?;
//! println!("{:?}", enrichment.possession_share.last());
//! ```

pub mod ball;
pub mod cache;
pub mod camera;
pub mod config;
mod diagnostics;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod pipeline;
pub mod possession;
pub mod team;
pub mod tracks;

pub use cache::{ArtifactCache, ArtifactKind, CacheError};
pub use camera::{CameraMotionConfig, CameraMotionEstimator, CameraMovement};
pub use config::PipelineConfig;
pub use diagnostics::Diagnostics;
pub use error::{Error, Result};
pub use frame::Frame;
pub use geometry::{BBox, Point};
pub use pipeline::{Enrichment, EnrichmentPipeline, RunError, TrackSource};
pub use possession::{PossessionConfig, PossessionResolver};
pub use team::{TeamAssigner, TeamConfig};
pub use tracks::{
    BALL_TRACK_ID, FrameTracks, FrameTracksBuilder, ObjectClass, Rgb, Team, TrackId, TrackRecord,
    Tracks,
};
