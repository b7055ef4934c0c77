//! Per-frame track dataset produced by the external tracker and enriched in place.

mod builder;
mod dataset;
mod record;

pub use builder::FrameTracksBuilder;
pub use dataset::{FrameTracks, Tracks, annotate_positions};
pub use record::{BALL_TRACK_ID, ObjectClass, Rgb, Team, TrackId, TrackRecord};
