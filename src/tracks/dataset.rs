use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::builder::FrameTracksBuilder;
use super::record::{ObjectClass, TrackId, TrackRecord};
use crate::error::{Error, Result};
use crate::geometry::BBox;

/// Records of one object class in one frame, iterated in ascending track id.
pub type FrameTracks = BTreeMap<TrackId, TrackRecord>;

/// Track dataset for a whole video: one [`FrameTracks`] per frame and class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tracks {
    pub players: Vec<FrameTracks>,
    #[serde(alias = "referee")]
    pub referees: Vec<FrameTracks>,
    pub ball: Vec<FrameTracks>,
}

impl Tracks {
    /// An empty dataset covering `frame_count` frames.
    pub fn with_frames(frame_count: usize) -> Self {
        Self {
            players: vec![FrameTracks::new(); frame_count],
            referees: vec![FrameTracks::new(); frame_count],
            ball: vec![FrameTracks::new(); frame_count],
        }
    }

    pub fn frame_count(&self) -> usize {
        self.players.len()
    }

    pub fn class(&self, class: ObjectClass) -> &[FrameTracks] {
        match class {
            ObjectClass::Player => &self.players,
            ObjectClass::Referee => &self.referees,
            ObjectClass::Ball => &self.ball,
        }
    }

    pub fn class_mut(&mut self, class: ObjectClass) -> &mut Vec<FrameTracks> {
        match class {
            ObjectClass::Player => &mut self.players,
            ObjectClass::Referee => &mut self.referees,
            ObjectClass::Ball => &mut self.ball,
        }
    }

    /// Append one frame.
    pub fn push_frame(&mut self, frame: FrameTracksBuilder) {
        let (players, referees, ball) = frame.build();
        self.players.push(players);
        self.referees.push(referees);
        self.ball.push(ball);
    }

    /// Ball box of `frame`, if the ball was detected there.
    pub fn ball_bbox(&self, frame: usize) -> Option<BBox> {
        self.ball
            .get(frame)
            .and_then(|b| b.values().next())
            .map(TrackRecord::bbox)
    }

    /// Check the dataset shape against the number of decoded frames.
    pub fn validate(&self, frame_count: usize) -> Result<()> {
        for class in ObjectClass::ALL {
            let len = self.class(class).len();
            if len != frame_count {
                return Err(Error::FrameCountMismatch {
                    frames: frame_count,
                    tracks: len,
                });
            }
        }
        if let Some((frame, b)) = self.ball.iter().enumerate().find(|(_, b)| b.len() > 1) {
            return Err(Error::MultipleBalls {
                frame,
                count: b.len(),
            });
        }
        Ok(())
    }
}

/// Derive `position` for every record: ball boxes use their center, people
/// their foot position.
pub fn annotate_positions(tracks: &mut Tracks) {
    for class in ObjectClass::ALL {
        for frame in tracks.class_mut(class).iter_mut() {
            for record in frame.values_mut() {
                record.position = Some(record.reference_point(class));
            }
        }
    }
}
