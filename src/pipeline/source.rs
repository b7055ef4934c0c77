//! Trait for the external detector and multi-object tracker.

use std::convert::Infallible;

use crate::frame::Frame;
use crate::tracks::Tracks;

/// Producer of raw per-frame tracks.
///
/// Implement this trait to connect a detector and tracker to the pipeline.
/// Implementations must return one entry per frame for every object class,
/// with goalkeepers already folded into players and at most one ball per
/// frame.
///
/// # Example
///
/// ```ignore
/// use pitch_tracks::{Frame, TrackSource, Tracks};
///
/// struct MyTracker {
///     // Your detector and tracker here
/// }
///
/// impl TrackSource for MyTracker {
///     type Error = std::io::Error;
///
///     fn track(&mut self, frames: &[Frame]) -> Result<Tracks, Self::Error> {
///         Ok(Tracks::with_frames(frames.len()))
///     }
/// }
/// ```
pub trait TrackSource {
    /// Error type for tracking failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Detect and track every object of the video.
    fn track(&mut self, frames: &[Frame]) -> Result<Tracks, Self::Error>;
}

/// Tracks computed earlier act as their own source.
impl TrackSource for Tracks {
    type Error = Infallible;

    fn track(&mut self, _frames: &[Frame]) -> Result<Tracks, Self::Error> {
        Ok(self.clone())
    }
}
