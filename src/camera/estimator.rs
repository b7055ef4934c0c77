//! Frame-to-frame camera movement estimation and position compensation.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::CameraMotionConfig;
use super::features::FeatureDetector;
use super::optical_flow::LucasKanade;
use super::pyramid::Pyramid;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::geometry::{Point, distance, xy_distance};
use crate::tracks::{ObjectClass, Tracks};

/// Camera translation of one frame relative to the previous one.
///
/// Stored as `feature_before - feature_after`, so subtracting it from a
/// position moves the position back into the previous frame's coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraMovement {
    pub dx: f32,
    pub dy: f32,
}

impl CameraMovement {
    pub const ZERO: CameraMovement = CameraMovement { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// `position - self`, componentwise.
    #[inline]
    pub fn compensate(&self, position: Point) -> Point {
        Point::new(position.x - self.dx, position.y - self.dy)
    }
}

/// The strongest feature displacement of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEstimate {
    pub distance: f32,
    pub movement: CameraMovement,
}

/// Pick the `(old, new)` pair with the largest displacement.
///
/// The first pair reaching a strictly larger distance wins, starting from
/// zero, so a set of motionless pairs yields a zero movement. Returns `None`
/// for an empty set.
pub fn select_dominant_motion<I>(pairs: I) -> Option<MotionEstimate>
where
    I: IntoIterator<Item = (Point, Point)>,
{
    let mut best: Option<MotionEstimate> = None;
    for (old, new) in pairs {
        let current = best.get_or_insert(MotionEstimate {
            distance: 0.0,
            movement: CameraMovement::ZERO,
        });
        let d = distance(new, old);
        if d > current.distance {
            let (dx, dy) = xy_distance(old, new);
            *current = MotionEstimate {
                distance: d,
                movement: CameraMovement::new(dx, dy),
            };
        }
    }
    best
}

/// Running state carried from one frame to the next.
#[derive(Debug, Clone)]
pub struct FlowState {
    pyramid: Pyramid,
    features: Vec<Point>,
}

impl FlowState {
    pub fn features(&self) -> &[Point] {
        &self.features
    }
}

/// How a frame's movement was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Displacement above the threshold; features were re-seeded.
    Accepted,
    /// Displacement at or below the threshold; features carried over.
    BelowThreshold,
    /// No feature could be tracked; features were re-seeded.
    NoFeatures,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub movement: CameraMovement,
    pub kind: StepKind,
}

/// Estimates per-frame camera movement from background feature flow.
#[derive(Debug, Clone)]
pub struct CameraMotionEstimator {
    config: CameraMotionConfig,
    detector: FeatureDetector,
    flow: LucasKanade,
}

impl CameraMotionEstimator {
    pub fn new(config: CameraMotionConfig) -> Self {
        let detector = FeatureDetector::new(&config);
        let flow = LucasKanade::new(&config);
        Self {
            config,
            detector,
            flow,
        }
    }

    pub fn config(&self) -> &CameraMotionConfig {
        &self.config
    }

    /// Seed the running state from the first frame.
    pub fn seed(&self, first: &Frame) -> FlowState {
        self.state_for(first)
    }

    fn state_for(&self, frame: &Frame) -> FlowState {
        let gray = frame.to_gray();
        let features = self.detector.detect(&gray);
        let pyramid = Pyramid::build(gray, self.config.pyramid_levels);
        FlowState { pyramid, features }
    }

    /// Advance the running state by one frame and return that frame's movement.
    pub fn step(&self, state: &mut FlowState, frame: &Frame) -> StepOutcome {
        let gray = frame.to_gray();
        let pyramid = Pyramid::build(gray, self.config.pyramid_levels);

        let tracked = self
            .flow
            .track(&state.pyramid, &pyramid, &state.features)
            .into_iter()
            .filter(|r| r.is_tracked())
            .map(|r| (r.from, r.to));

        let outcome = match select_dominant_motion(tracked) {
            None => {
                state.features = self.detector.detect(pyramid.base());
                StepOutcome {
                    movement: CameraMovement::ZERO,
                    kind: StepKind::NoFeatures,
                }
            }
            Some(estimate) if estimate.distance > self.config.min_motion_distance => {
                state.features = self.detector.detect(pyramid.base());
                StepOutcome {
                    movement: estimate.movement,
                    kind: StepKind::Accepted,
                }
            }
            Some(_) => StepOutcome {
                movement: CameraMovement::ZERO,
                kind: StepKind::BelowThreshold,
            },
        };

        state.pyramid = pyramid;
        outcome
    }

    /// Movement of every frame; frame 0 is always zero.
    pub fn estimate(
        &self,
        frames: &[Frame],
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<CameraMovement>> {
        let first = frames.first().ok_or(Error::EmptyFrames)?;
        let mut state = self.seed(first);
        info!(
            frames = frames.len(),
            features = state.features.len(),
            "estimating camera movement"
        );

        let mut movements = Vec::with_capacity(frames.len());
        movements.push(CameraMovement::ZERO);
        for (index, frame) in frames.iter().enumerate().skip(1) {
            let outcome = self.step(&mut state, frame);
            match outcome.kind {
                StepKind::Accepted => {
                    diagnostics.accepted_motion_frames += 1;
                    diagnostics.reseeded_frames += 1;
                    debug!(
                        frame = index,
                        dx = outcome.movement.dx,
                        dy = outcome.movement.dy,
                        features = state.features.len(),
                        "camera movement accepted"
                    );
                }
                StepKind::NoFeatures => {
                    diagnostics.frames_without_features += 1;
                    diagnostics.reseeded_frames += 1;
                    debug!(frame = index, "no trackable features, re-seeding");
                }
                StepKind::BelowThreshold => {}
            }
            movements.push(outcome.movement);
        }
        Ok(movements)
    }
}

/// Set `position_adjusted = position - movement[frame]` on every record.
///
/// Records without a `position` get their class reference point first.
pub fn adjust_positions(tracks: &mut Tracks, movements: &[CameraMovement]) -> Result<()> {
    let frames = tracks.frame_count();
    if movements.len() != frames {
        return Err(Error::MovementCountMismatch {
            frames,
            movements: movements.len(),
        });
    }
    for class in ObjectClass::ALL {
        for (frame, records) in tracks.class_mut(class).iter_mut().enumerate() {
            let movement = movements[frame];
            for record in records.values_mut() {
                let position = match record.position {
                    Some(p) => p,
                    None => {
                        let p = record.reference_point(class);
                        record.position = Some(p);
                        p
                    }
                };
                record.position_adjusted = Some(movement.compensate(position));
            }
        }
    }
    Ok(())
}
