//! Camera egomotion estimation from background optical flow.
//!
//! Features are seeded inside vertical bands of the frame that are assumed to
//! show static background (advertising boards, stands), tracked frame to frame
//! with pyramidal Lucas-Kanade, and the largest feature displacement is taken
//! as the camera translation for that frame.

mod config;
mod estimator;
mod features;
mod optical_flow;
mod pyramid;

pub use config::CameraMotionConfig;
pub use estimator::{
    CameraMotionEstimator, CameraMovement, FlowState, MotionEstimate, StepKind, StepOutcome,
    adjust_positions, select_dominant_motion,
};
pub use features::FeatureDetector;
pub use optical_flow::{FlowResult, FlowStatus, LucasKanade};
pub use pyramid::{Pyramid, interpolate_bilinear};
