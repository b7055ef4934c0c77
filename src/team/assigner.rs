use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::color::dominant_color;
use super::kmeans::{KMeans2, nearest};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::geometry::BBox;
use crate::tracks::{FrameTracks, Rgb, Team, TrackId};

/// Tunables of the team color model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    /// Iteration cap of both the per-crop and the per-team clustering.
    pub max_iterations: usize,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
        }
    }
}

/// Two-team color model plus the per-track stability cache.
#[derive(Debug, Clone)]
pub struct TeamAssigner {
    kmeans: KMeans2,
    centroids: [[f32; 3]; 2],
    cache: HashMap<TrackId, Team>,
}

impl TeamAssigner {
    /// Fit the team centroids on the players of the first frame.
    ///
    /// Fails when fewer than two distinct shirt colors can be read.
    pub fn fit(config: &TeamConfig, frame: &Frame, players: &FrameTracks) -> Result<Self> {
        let kmeans = KMeans2::new(config.max_iterations);
        let colors: Vec<[f32; 3]> = players
            .values()
            .filter_map(|p| dominant_color(frame.crop(&p.bbox()), &kmeans))
            .collect();

        let clustering = kmeans
            .fit_colors(&colors)
            .filter(|c| c.centroids[0] != c.centroids[1])
            .ok_or(Error::InsufficientPlayers {
                found: distinct(&colors),
            })?;

        info!(
            players = colors.len(),
            team_one = ?clustering.centroids[0],
            team_two = ?clustering.centroids[1],
            "team colors fitted"
        );

        Ok(Self {
            kmeans,
            centroids: clustering.centroids,
            cache: HashMap::new(),
        })
    }

    /// Centroid colors of team one and team two.
    pub fn centroids(&self) -> [[f32; 3]; 2] {
        self.centroids
    }

    /// Rendering color of a team; `None` for [`Team::Unknown`].
    pub fn team_color(&self, team: Team) -> Option<Rgb> {
        team.index().map(|i| Rgb::from_f32(self.centroids[i]))
    }

    /// Team cached for a track id, if it was classified before.
    pub fn cached(&self, id: TrackId) -> Option<Team> {
        self.cache.get(&id).copied()
    }

    /// Team of one player detection.
    ///
    /// The first successful classification of a track id is cached and
    /// returned for every later call. A crop without usable pixels yields
    /// [`Team::Unknown`] and is not cached.
    pub fn assign(&mut self, frame: &Frame, bbox: &BBox, id: TrackId) -> Team {
        if let Some(team) = self.cached(id) {
            return team;
        }
        match dominant_color(frame.crop(bbox), &self.kmeans) {
            Some(color) => {
                let team = Team::from_index(nearest(&self.centroids, color));
                debug!(track_id = id, ?team, "player classified");
                self.cache.insert(id, team);
                team
            }
            None => Team::Unknown,
        }
    }

    /// Classify every player of a frame and write `team` and `team_color`.
    ///
    /// All labels are computed before any record is touched.
    pub fn assign_frame(
        &mut self,
        frame: &Frame,
        players: &mut FrameTracks,
        diagnostics: &mut Diagnostics,
    ) {
        let labels: Vec<(TrackId, Team)> = players
            .iter()
            .map(|(&id, record)| (id, self.assign(frame, &record.bbox(), id)))
            .collect();

        for (id, team) in labels {
            if team == Team::Unknown {
                diagnostics.unknown_team_classifications += 1;
            }
            if let Some(record) = players.get_mut(&id) {
                record.team = Some(team);
                record.team_color = self.team_color(team);
            }
        }
    }
}

fn distinct(colors: &[[f32; 3]]) -> usize {
    let mut seen: Vec<[f32; 3]> = Vec::new();
    for c in colors {
        if !seen.contains(c) {
            seen.push(*c);
        }
    }
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::FrameTracksBuilder;

    const GRASS: [u8; 3] = [40, 160, 40];
    const RED: [u8; 3] = [220, 20, 20];
    const BLUE: [u8; 3] = [20, 20, 220];

    fn paint_player(frame: &mut Frame, x: usize, y: usize, shirt: [u8; 3]) -> BBox {
        frame.fill_rect(x + 5, y + 2, x + 15, y + 40, shirt);
        BBox::new(x as f32, y as f32, (x + 20) as f32, (y + 40) as f32)
    }

    fn first_frame() -> (Frame, FrameTracks) {
        let mut frame = Frame::filled(200, 100, GRASS);
        let b1 = paint_player(&mut frame, 10, 10, RED);
        let b2 = paint_player(&mut frame, 40, 10, BLUE);
        let b3 = paint_player(&mut frame, 70, 10, RED);
        let b4 = paint_player(&mut frame, 100, 10, BLUE);
        let (players, _, _) = FrameTracksBuilder::new()
            .player(1, b1)
            .player(2, b2)
            .player(3, b3)
            .player(4, b4)
            .build();
        (frame, players)
    }

    #[test]
    fn test_fit_finds_kit_colors() {
        let (frame, players) = first_frame();
        let assigner = TeamAssigner::fit(&TeamConfig::default(), &frame, &players).unwrap();
        assert_eq!(assigner.team_color(Team::One), Some(Rgb(RED)));
        assert_eq!(assigner.team_color(Team::Two), Some(Rgb(BLUE)));
        assert_eq!(assigner.team_color(Team::Unknown), None);
    }

    #[test]
    fn test_assign_frame_labels_by_color() {
        let (frame, mut players) = first_frame();
        let mut assigner = TeamAssigner::fit(&TeamConfig::default(), &frame, &players).unwrap();
        let mut diagnostics = Diagnostics::default();
        assigner.assign_frame(&frame, &mut players, &mut diagnostics);

        assert_eq!(players[&1].team, Some(Team::One));
        assert_eq!(players[&2].team, Some(Team::Two));
        assert_eq!(players[&3].team, Some(Team::One));
        assert_eq!(players[&4].team, Some(Team::Two));
        assert_eq!(players[&2].team_color, Some(Rgb(BLUE)));
        assert_eq!(diagnostics.unknown_team_classifications, 0);
    }

    #[test]
    fn test_cached_team_is_stable() {
        let (frame, players) = first_frame();
        let mut assigner = TeamAssigner::fit(&TeamConfig::default(), &frame, &players).unwrap();
        let red_box = players[&1].bbox();
        let blue_box = players[&2].bbox();
        assert_eq!(assigner.assign(&frame, &red_box, 1), Team::One);
        // Same id over a blue shirt keeps its first team.
        assert_eq!(assigner.assign(&frame, &blue_box, 1), Team::One);
    }

    #[test]
    fn test_degenerate_crop_is_unknown_until_classified() {
        let (frame, players) = first_frame();
        let mut assigner = TeamAssigner::fit(&TeamConfig::default(), &frame, &players).unwrap();
        let empty = BBox::new(50.0, 50.0, 50.0, 50.0);
        assert_eq!(assigner.assign(&frame, &empty, 9), Team::Unknown);
        assert_eq!(assigner.cached(9), None);
        assert_eq!(assigner.assign(&frame, &players[&2].bbox(), 9), Team::Two);
        assert_eq!(assigner.assign(&frame, &empty, 9), Team::Two);
    }

    #[test]
    fn test_grass_only_crop_is_unknown() {
        let (frame, players) = first_frame();
        let mut assigner = TeamAssigner::fit(&TeamConfig::default(), &frame, &players).unwrap();
        let grass = BBox::new(120.0, 10.0, 140.0, 50.0);
        assert_eq!(assigner.assign(&frame, &grass, 9), Team::Unknown);
        assert_eq!(assigner.cached(9), None);
    }

    #[test]
    fn test_fit_skips_grass_only_players() {
        let (frame, mut players) = first_frame();
        players.insert(5, crate::tracks::TrackRecord::new(BBox::new(150.0, 10.0, 170.0, 50.0)));
        let assigner = TeamAssigner::fit(&TeamConfig::default(), &frame, &players).unwrap();
        assert_eq!(assigner.team_color(Team::One), Some(Rgb(RED)));
        assert_eq!(assigner.team_color(Team::Two), Some(Rgb(BLUE)));
    }

    #[test]
    fn test_fit_needs_two_colors() {
        let mut frame = Frame::filled(200, 100, GRASS);
        let b1 = paint_player(&mut frame, 10, 10, RED);
        let b2 = paint_player(&mut frame, 40, 10, RED);
        let (players, _, _) = FrameTracksBuilder::new().player(1, b1).player(2, b2).build();
        let err = TeamAssigner::fit(&TeamConfig::default(), &frame, &players).unwrap_err();
        assert!(matches!(err, Error::InsufficientPlayers { found: 1 }));

        let err =
            TeamAssigner::fit(&TeamConfig::default(), &frame, &FrameTracks::new()).unwrap_err();
        assert!(matches!(err, Error::InsufficientPlayers { found: 0 }));
    }
}
