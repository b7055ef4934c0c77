use serde::{Deserialize, Serialize};

/// Counters for degraded per-frame conditions that were absorbed without
/// failing the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Frames where optical flow tracked no feature at all.
    pub frames_without_features: usize,
    /// Frames after which the background feature set was detected afresh.
    pub reseeded_frames: usize,
    /// Frames whose camera movement exceeded the jitter threshold.
    pub accepted_motion_frames: usize,
    /// Ball boxes synthesized by interpolation.
    pub interpolated_ball_frames: usize,
    /// Player classifications that fell back to an unknown team.
    pub unknown_team_classifications: usize,
    /// Frames where no player was close enough to the ball.
    pub frames_without_possession: usize,
    /// Cached artifacts reused verbatim.
    pub cache_hits: usize,
    /// Cached artifacts dropped because they did not fit the video.
    pub cache_discards: usize,
}
