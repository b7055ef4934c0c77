//! Builder for assembling one frame of tracker output.

use super::dataset::FrameTracks;
use super::record::{BALL_TRACK_ID, TrackId, TrackRecord};
use crate::geometry::BBox;

/// Builder for one frame of tracker output, partitioned by object class.
#[derive(Debug, Clone, Default)]
pub struct FrameTracksBuilder {
    players: FrameTracks,
    referees: FrameTracks,
    ball: Option<BBox>,
}

impl FrameTracksBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player box. A repeated id replaces the earlier box.
    pub fn player(mut self, id: TrackId, bbox: BBox) -> Self {
        self.players.insert(id, TrackRecord::new(bbox));
        self
    }

    /// Add a referee box. A repeated id replaces the earlier box.
    pub fn referee(mut self, id: TrackId, bbox: BBox) -> Self {
        self.referees.insert(id, TrackRecord::new(bbox));
        self
    }

    /// Set the ball box, stored under [`BALL_TRACK_ID`].
    pub fn ball(mut self, bbox: BBox) -> Self {
        self.ball = Some(bbox);
        self
    }

    /// Split into `(players, referees, ball)` maps.
    pub fn build(self) -> (FrameTracks, FrameTracks, FrameTracks) {
        let ball = self
            .ball
            .map(|b| FrameTracks::from([(BALL_TRACK_ID, TrackRecord::new(b))]))
            .unwrap_or_default();
        (self.players, self.referees, ball)
    }
}
