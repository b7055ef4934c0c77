//! Ball possession per frame and its team sequence.

use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, distance};
use crate::tracks::{FrameTracks, Team, TrackId};

/// Distances closer than this are treated as equal.
const TIE_TOLERANCE: f32 = 1e-4;

/// Tunables of the possession resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PossessionConfig {
    /// A player only gets the ball when its foot point is strictly closer
    /// than this to the ball center.
    pub max_distance: f32,
}

impl Default for PossessionConfig {
    fn default() -> Self {
        Self { max_distance: 70.0 }
    }
}

/// Assigns the ball to the nearest player and carries the last possessing
/// team over frames where nobody is close enough.
#[derive(Debug, Clone)]
pub struct PossessionResolver {
    config: PossessionConfig,
    last: Option<Team>,
}

impl PossessionResolver {
    pub fn new(config: PossessionConfig) -> Self {
        Self { config, last: None }
    }

    /// Team recorded for the most recent frame.
    pub fn last(&self) -> Option<Team> {
        self.last
    }

    /// Nearest qualifying player of a frame.
    ///
    /// Players are visited in ascending track id and only a strictly smaller
    /// distance replaces the current best, so equidistant players resolve to
    /// the lowest id.
    pub fn nearest_player(&self, players: &FrameTracks, ball: &BBox) -> Option<TrackId> {
        let ball_center = ball.center();
        let mut best: Option<(TrackId, f32)> = None;
        for (&id, record) in players {
            let d = distance(record.bbox().foot_position(), ball_center);
            if d >= self.config.max_distance {
                continue;
            }
            match best {
                Some((_, best_d)) if d >= best_d - TIE_TOLERANCE => {}
                _ => best = Some((id, d)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Resolve one frame: mark the possessor's `has_ball` and return the
    /// frame's possession entry.
    ///
    /// Flags left over from earlier runs are cleared first. With no
    /// qualifying player, no record is marked and the previous frame's entry
    /// is repeated.
    pub fn step(&mut self, players: &mut FrameTracks, ball: &BBox) -> FramePossession {
        for record in players.values_mut() {
            record.has_ball = false;
        }
        let player = self.nearest_player(players, ball);
        if let Some(record) = player.and_then(|id| players.get_mut(&id)) {
            record.has_ball = true;
            self.last = Some(record.team.unwrap_or(Team::Unknown));
        }
        FramePossession {
            player,
            team: self.last,
        }
    }
}

/// Outcome of resolving one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePossession {
    /// Player marked with the ball, if any qualified.
    pub player: Option<TrackId>,
    /// Possession entry of the frame, carried over when `player` is `None`.
    pub team: Option<Team>,
}

/// Running share of frames controlled by each team, up to and including
/// every frame.
///
/// Frames without a known possessing team do not count towards either side;
/// before the first such frame both shares are zero.
pub fn possession_share(possession: &[Option<Team>]) -> Vec<[f32; 2]> {
    let mut counts = [0usize; 2];
    possession
        .iter()
        .map(|entry| {
            if let Some(i) = entry.and_then(Team::index) {
                counts[i] += 1;
            }
            let total = counts[0] + counts[1];
            if total == 0 {
                [0.0, 0.0]
            } else {
                [
                    counts[0] as f32 / total as f32,
                    counts[1] as f32 / total as f32,
                ]
            }
        })
        .collect()
}
