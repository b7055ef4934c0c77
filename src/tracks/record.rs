use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, Point};

/// Identifier assigned by the external tracker, stable across frames.
pub type TrackId = u32;

/// Track id under which the ball is stored in every frame.
pub const BALL_TRACK_ID: TrackId = 1;

/// Object class of a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectClass {
    Player,
    Referee,
    Ball,
}

impl ObjectClass {
    pub const ALL: [ObjectClass; 3] = [
        ObjectClass::Player,
        ObjectClass::Referee,
        ObjectClass::Ball,
    ];
}

/// Team label of a player.
///
/// Serialized as `1`, `2`, or `0` for a player whose shirt color could not be
/// read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Team {
    One,
    Two,
    Unknown,
}

impl Team {
    /// Cluster index of a known team.
    pub fn index(self) -> Option<usize> {
        match self {
            Team::One => Some(0),
            Team::Two => Some(1),
            Team::Unknown => None,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Team::One,
            1 => Team::Two,
            _ => Team::Unknown,
        }
    }
}

impl From<Team> for u8 {
    fn from(team: Team) -> u8 {
        match team {
            Team::One => 1,
            Team::Two => 2,
            Team::Unknown => 0,
        }
    }
}

impl TryFrom<u8> for Team {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Team::One),
            2 => Ok(Team::Two),
            0 => Ok(Team::Unknown),
            other => Err(format!("invalid team label {other}")),
        }
    }
}

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Round a floating point color to the nearest 8-bit triple.
    pub fn from_f32(c: [f32; 3]) -> Self {
        Rgb(c.map(|v| v.round().clamp(0.0, 255.0) as u8))
    }
}

/// One tracked entity in one frame.
///
/// `bbox` belongs to the tracker and is read-only here; every other field is
/// derived by the enrichment stages and stays `None` / `false` until the
/// owning stage has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    bbox: BBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_adjusted: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_color: Option<Rgb>,
    #[serde(default)]
    pub has_ball: bool,
}

impl TrackRecord {
    pub fn new(bbox: BBox) -> Self {
        Self {
            bbox,
            position: None,
            position_adjusted: None,
            team: None,
            team_color: None,
            has_ball: false,
        }
    }

    #[inline]
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    /// Reference point of the record for its class.
    pub fn reference_point(&self, class: ObjectClass) -> Point {
        match class {
            ObjectClass::Ball => self.bbox.center(),
            ObjectClass::Player | ObjectClass::Referee => self.bbox.foot_position(),
        }
    }
}
