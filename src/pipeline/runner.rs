//! EnrichmentPipeline running every stage over one video.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::TrackSource;
use crate::ball::{interpolate_ball, missing_frames};
use crate::cache::{ArtifactCache, ArtifactKind};
use crate::camera::{CameraMotionEstimator, CameraMovement, adjust_positions};
use crate::config::PipelineConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::possession::{PossessionResolver, possession_share};
use crate::team::TeamAssigner;
use crate::tracks::{Rgb, Team, Tracks, annotate_positions};

/// Everything the pipeline produces for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Input tracks with positions, teams and possession flags filled in.
    pub tracks: Tracks,
    /// Camera movement of every frame.
    pub camera_movements: Vec<CameraMovement>,
    /// Possessing team of every frame.
    pub possession: Vec<Option<Team>>,
    /// Running `[team one, team two]` ball-control share of every frame.
    pub possession_share: Vec<[f32; 2]>,
    /// Rendering colors of team one and team two.
    pub team_colors: [Rgb; 2],
    pub diagnostics: Diagnostics,
}

/// Failure of a run that pulls its tracks from a [`TrackSource`].
#[derive(Debug, Error)]
pub enum RunError<E: std::error::Error + 'static> {
    #[error("track source failed: {0}")]
    Source(#[source] E),

    #[error(transparent)]
    Enrich(#[from] Error),
}

/// Runs camera compensation, ball interpolation, team assignment and
/// possession resolution over a decoded video.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentPipeline {
    config: PipelineConfig,
    cache: Option<(ArtifactCache, String)>,
}

impl EnrichmentPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            cache: None,
        }
    }

    /// Pipeline with default tunables.
    pub fn with_default_config() -> Self {
        Self::new(PipelineConfig::default())
    }

    /// Reuse raw tracks and camera movements cached under `key`.
    pub fn with_cache(mut self, cache: ArtifactCache, key: impl Into<String>) -> Self {
        self.cache = Some((cache, key.into()));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Pull raw tracks from `source` (or the cache) and enrich them.
    pub fn run_with_source<S: TrackSource>(
        &self,
        frames: &[Frame],
        source: &mut S,
    ) -> std::result::Result<Enrichment, RunError<S::Error>> {
        if frames.is_empty() {
            return Err(Error::EmptyFrames.into());
        }
        let mut diagnostics = Diagnostics::default();

        let cached = self.load_cached::<Tracks, _>(ArtifactKind::Tracks, &mut diagnostics, |t| {
            t.validate(frames.len()).is_ok()
        });
        let tracks = match cached {
            Some(tracks) => tracks,
            None => {
                let tracks = source.track(frames).map_err(RunError::Source)?;
                self.store_cached(ArtifactKind::Tracks, &tracks);
                tracks
            }
        };

        Ok(self.enrich(frames, tracks, diagnostics)?)
    }

    /// Enrich tracks that are already in memory.
    pub fn run(&self, frames: &[Frame], tracks: Tracks) -> Result<Enrichment> {
        self.enrich(frames, tracks, Diagnostics::default())
    }

    fn enrich(
        &self,
        frames: &[Frame],
        mut tracks: Tracks,
        mut diagnostics: Diagnostics,
    ) -> Result<Enrichment> {
        let first = frames.first().ok_or(Error::EmptyFrames)?;
        tracks.validate(frames.len())?;
        let missing_ball = missing_frames(&tracks.ball);
        if missing_ball == frames.len() {
            return Err(Error::NoBallDetections);
        }
        info!(frames = frames.len(), "enriching tracks");

        annotate_positions(&mut tracks);

        let camera_movements = self.camera_movements(frames, &mut diagnostics)?;
        adjust_positions(&mut tracks, &camera_movements)?;

        tracks.ball = interpolate_ball(&tracks.ball)?;
        diagnostics.interpolated_ball_frames = missing_ball;
        // Filled ball frames only carry a box so far.
        annotate_positions(&mut tracks);
        adjust_positions(&mut tracks, &camera_movements)?;
        info!(filled = missing_ball, "ball trajectory interpolated");

        let mut assigner = TeamAssigner::fit(&self.config.team, first, &tracks.players[0])?;
        for (frame, players) in frames.iter().zip(tracks.players.iter_mut()) {
            assigner.assign_frame(frame, players, &mut diagnostics);
        }

        let mut resolver = PossessionResolver::new(self.config.possession.clone());
        let mut possession = Vec::with_capacity(frames.len());
        for (index, players) in tracks.players.iter_mut().enumerate() {
            let ball = tracks.ball[index]
                .values()
                .next()
                .map(|b| b.bbox())
                .ok_or(Error::NoBallDetections)?;
            let entry = resolver.step(players, &ball);
            if entry.player.is_none() {
                diagnostics.frames_without_possession += 1;
            }
            possession.push(entry.team);
        }
        if diagnostics.frames_without_possession > 0 {
            warn!(
                frames = diagnostics.frames_without_possession,
                "frames without a player close enough to the ball"
            );
        }

        let team_colors = [
            Rgb::from_f32(assigner.centroids()[0]),
            Rgb::from_f32(assigner.centroids()[1]),
        ];
        info!(?diagnostics, "enrichment finished");

        Ok(Enrichment {
            possession_share: possession_share(&possession),
            tracks,
            camera_movements,
            possession,
            team_colors,
            diagnostics,
        })
    }

    fn camera_movements(
        &self,
        frames: &[Frame],
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<CameraMovement>> {
        let cached = self.load_cached::<Vec<CameraMovement>, _>(
            ArtifactKind::CameraMovements,
            diagnostics,
            |m| m.len() == frames.len(),
        );
        if let Some(movements) = cached {
            return Ok(movements);
        }

        let estimator = CameraMotionEstimator::new(self.config.camera.clone());
        let movements = estimator.estimate(frames, diagnostics)?;
        self.store_cached(ArtifactKind::CameraMovements, &movements);
        Ok(movements)
    }

    /// Load a cached artifact, discarding it when it fails `fits`.
    fn load_cached<T, F>(
        &self,
        kind: ArtifactKind,
        diagnostics: &mut Diagnostics,
        fits: F,
    ) -> Option<T>
    where
        T: serde::de::DeserializeOwned,
        F: FnOnce(&T) -> bool,
    {
        let (cache, key) = self.cache.as_ref()?;
        match cache.load::<T>(kind, key) {
            Ok(Some(value)) if fits(&value) => {
                diagnostics.cache_hits += 1;
                info!(?kind, key = %key, "using cached artifact");
                Some(value)
            }
            Ok(Some(_)) => {
                diagnostics.cache_discards += 1;
                warn!(?kind, key = %key, "cached artifact does not match the video, recomputing");
                if let Err(e) = cache.remove(kind, key) {
                    warn!(?kind, error = %e, "failed to remove stale artifact");
                }
                None
            }
            Ok(None) => None,
            Err(e) => {
                diagnostics.cache_discards += 1;
                warn!(?kind, key = %key, error = %e, "unreadable cached artifact, recomputing");
                None
            }
        }
    }

    fn store_cached<T: Serialize>(&self, kind: ArtifactKind, value: &T) {
        if let Some((cache, key)) = &self.cache {
            if let Err(e) = cache.store(kind, key, value) {
                warn!(?kind, key = %key, error = %e, "failed to cache artifact");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;
    use crate::tracks::FrameTracksBuilder;

    struct FailingSource;

    #[derive(Debug, Error)]
    #[error("detector offline")]
    struct Offline;

    impl TrackSource for FailingSource {
        type Error = Offline;

        fn track(&mut self, _frames: &[Frame]) -> std::result::Result<Tracks, Self::Error> {
            Err(Offline)
        }
    }

    #[test]
    fn test_empty_frames() {
        let pipeline = EnrichmentPipeline::with_default_config();
        let err = pipeline.run(&[], Tracks::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyFrames));
    }

    #[test]
    fn test_no_ball_is_fatal() {
        let pipeline = EnrichmentPipeline::with_default_config();
        let frames = vec![Frame::filled(32, 32, [0, 90, 0]); 2];
        let mut tracks = Tracks::default();
        tracks.push_frame(FrameTracksBuilder::new().player(1, BBox::new(0.0, 0.0, 8.0, 16.0)));
        tracks.push_frame(FrameTracksBuilder::new());
        let err = pipeline.run(&frames, tracks).unwrap_err();
        assert!(matches!(err, Error::NoBallDetections));
    }

    #[test]
    fn test_frame_count_mismatch() {
        let pipeline = EnrichmentPipeline::with_default_config();
        let frames = vec![Frame::filled(32, 32, [0, 90, 0]); 3];
        let err = pipeline.run(&frames, Tracks::with_frames(2)).unwrap_err();
        assert!(matches!(err, Error::FrameCountMismatch { frames: 3, tracks: 2 }));
    }

    #[test]
    fn test_source_error_is_surfaced() {
        let pipeline = EnrichmentPipeline::with_default_config();
        let frames = vec![Frame::filled(32, 32, [0, 90, 0])];
        let err = pipeline.run_with_source(&frames, &mut FailingSource).unwrap_err();
        assert!(matches!(err, RunError::Source(Offline)));
    }
}
